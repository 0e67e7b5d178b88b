//! Shared exponential backoff used by `BrokerClient`, `Fetcher`, and
//! `LiveStream` reconnection (base 500ms, factor 2, ±25% jitter, 3 retries).

use rand::Rng;
use std::time::Duration;

pub const MAX_RETRIES: u32 = 3;
const BASE: Duration = Duration::from_millis(500);
const FACTOR: u32 = 2;
const JITTER_FRACTION: f64 = 0.25;

/// Delay before retry attempt `attempt` (0-indexed: the delay before the
/// *first* retry, after the initial attempt already failed once).
pub fn backoff_delay(attempt: u32) -> Duration {
    let exp = BASE.as_millis() as u64 * FACTOR.pow(attempt) as u64;
    let jitter = rand::thread_rng().gen_range(-JITTER_FRACTION..=JITTER_FRACTION);
    let jittered = (exp as f64) * (1.0 + jitter);
    Duration::from_millis(jittered.max(0.0) as u64)
}

/// Runs `op` up to `MAX_RETRIES + 1` times, sleeping with [`backoff_delay`]
/// between attempts. Returns the last error if every attempt fails.
pub async fn retry_with_backoff<T, E, F, Fut>(mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(v) => return Ok(v),
            Err(e) => {
                if attempt >= MAX_RETRIES {
                    return Err(e);
                }
                tokio::time::sleep(backoff_delay(attempt)).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_grows_exponentially_within_jitter_bounds() {
        for attempt in 0..4 {
            let base = 500u64 * 2u64.pow(attempt);
            let d = backoff_delay(attempt).as_millis() as u64;
            let lo = (base as f64 * 0.75) as u64;
            let hi = (base as f64 * 1.25) as u64;
            assert!(d >= lo && d <= hi, "attempt {attempt}: {d} not in [{lo},{hi}]");
        }
    }

    #[tokio::test]
    async fn retries_until_max_then_gives_up() {
        let calls = std::sync::atomic::AtomicU32::new(0);
        let result: Result<(), &str> = retry_with_backoff(|| {
            calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            async { Err("nope") }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), MAX_RETRIES + 1);
    }

    #[tokio::test]
    async fn succeeds_without_retrying_when_first_attempt_works() {
        let calls = std::sync::atomic::AtomicU32::new(0);
        let result: Result<u32, &str> = retry_with_backoff(|| {
            calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            async { Ok(42) }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }
}
