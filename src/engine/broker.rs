/*!
§4.2 BrokerClient: lists archive file URLs for `(collector, data_type,
window)` from the BGPKIT broker HTTP API, with the retry/backoff policy
shared across the engine's network-facing components (see [`crate::engine::backoff`]).
*/
use crate::engine::backoff::retry_with_backoff;
use crate::engine::config::DataType;
use crate::engine::error::EngineError;
use serde::Deserialize;
use std::env;

const DEFAULT_BROKER_URL: &str = "https://api.bgpkit.com/v3/broker";

/// One archive descriptor returned by the broker, per §6's response schema.
#[derive(Debug, Clone, Deserialize)]
pub struct ArchiveDescriptor {
    pub url: String,
    pub collector: String,
    #[serde(rename = "data_type")]
    pub data_type: String,
    #[serde(rename = "ts_start")]
    pub nominal_time: f64,
    #[serde(rename = "rough_size")]
    pub size: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct BrokerResponseData {
    files: Vec<ArchiveDescriptor>,
}

#[derive(Debug, Deserialize)]
struct BrokerResponse {
    data: BrokerResponseData,
}

/// Queries the BGPKIT broker for archive descriptors. The base URL defaults
/// to the BGPKIT broker's public endpoint and is overridable via the
/// `BGPSTREAM_BROKER_URL` environment variable (§4.2).
pub struct BrokerClient {
    base_url: String,
    client: reqwest::Client,
}

impl BrokerClient {
    pub fn new() -> Self {
        let base_url =
            env::var("BGPSTREAM_BROKER_URL").unwrap_or_else(|_| DEFAULT_BROKER_URL.to_string());
        BrokerClient {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    /// §4.2: returns archive descriptors for one `(collector, data_type)`
    /// pair intersecting `[ts_start, ts_end)`. Retries up to 3 times with
    /// exponential backoff; a fourth failure surfaces as `EngineError::Broker`.
    pub async fn list_files(
        &self,
        collector: &str,
        data_type: DataType,
        ts_start: f64,
        ts_end: f64,
    ) -> Result<Vec<ArchiveDescriptor>, EngineError> {
        let url = self.base_url.clone();
        let data_type_str = data_type.as_str().to_string();
        let collector = collector.to_string();

        retry_with_backoff(|| {
            let url = url.clone();
            let data_type_str = data_type_str.clone();
            let collector = collector.clone();
            let client = self.client.clone();
            async move {
                tracing::debug!(collector = %collector, data_type = %data_type_str, "querying broker");
                let resp = client
                    .get(&url)
                    .query(&[
                        ("collectors", collector.as_str()),
                        ("data_type", data_type_str.as_str()),
                        ("ts_start", ts_start.to_string().as_str()),
                        ("ts_end", ts_end.to_string().as_str()),
                    ])
                    .send()
                    .await
                    .map_err(|e| EngineError::Broker(e.to_string()))?;

                if !resp.status().is_success() {
                    return Err(EngineError::Broker(format!(
                        "broker returned status {}",
                        resp.status()
                    )));
                }

                let parsed: BrokerResponse = resp
                    .json()
                    .await
                    .map_err(|e| EngineError::Broker(format!("invalid broker response: {e}")))?;
                Ok(parsed.data.files)
            }
        })
        .await
        .inspect_err(|e| tracing::error!(error = %e, "broker unreachable after retries"))
    }
}

impl Default for BrokerClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_base_url_is_bgpkit_broker() {
        let client = BrokerClient::new();
        assert_eq!(client.base_url, DEFAULT_BROKER_URL);
    }
}
