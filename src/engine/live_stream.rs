/*!
§4.7 LiveStream: one WebSocket connection to the RIS Live endpoint,
multiplexing every configured collector's subscription over that single
socket, reconnecting with backoff on unexpected close, and feeding a
[`JitterBuffer`](crate::engine::jitter_buffer::JitterBuffer) to produce a
merged, time-ordered sequence of [`BgpElement`]s.
*/
use crate::engine::backoff::backoff_delay;
use crate::engine::config::LiveConfig;
use crate::engine::element::{BgpElement, ElemKind, ElementFields};
use crate::engine::error::EngineError;
use crate::engine::filter::FilterAdapters;
use crate::engine::jitter_buffer::JitterBuffer;
use crate::models::{BgpElem, ElemType};
use crate::parser::parse_ris_live_message;
use crate::parser::rislive::messages::client::RisLiveClientMessage;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

const RIS_LIVE_URL: &str = "wss://ris-live.ripe.net/v1/ws/?client=bgpstream-rs";
/// §4.8.8/§7 LiveError: escalate to fatal only after this many consecutive
/// reconnect failures within the window below.
const MAX_CONSECUTIVE_RECONNECT_FAILURES: u32 = 5;
const RECONNECT_FAILURE_WINDOW_SECS: f64 = 60.0;

/// Pulls the RIS Live frame's `data.host` out of the raw JSON text and
/// returns its short collector id (e.g. `rrc25.ripe.net` -> `rrc25`).
/// `parse_ris_live_message` discards `host` when building a [`BgpElem`],
/// so the frame has to be inspected separately to recover it.
fn frame_host(text: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(text).ok()?;
    let host = value.get("data")?.get("host")?.as_str()?;
    Some(host.split('.').next().unwrap_or(host).to_string())
}

fn map_elem(elem: BgpElem, collector: &str) -> BgpElement {
    let kind = match elem.elem_type {
        ElemType::ANNOUNCE => ElemKind::Announce,
        ElemType::WITHDRAW => ElemKind::Withdraw,
    };
    let communities = elem
        .communities
        .map(|cs| cs.into_iter().map(|c| c.to_string()).collect())
        .unwrap_or_default();
    BgpElement {
        kind,
        collector: collector.to_string(),
        time: elem.timestamp,
        peer_asn: elem.peer_asn.into(),
        peer_address: elem.peer_ip,
        fields: ElementFields {
            prefix: Some(elem.prefix.prefix.to_string()),
            as_path: elem.as_path.map(|p| p.to_string()),
            next_hop: elem.next_hop.map(|h| h.to_string()),
            communities,
        },
    }
}

/// Opens the RIS Live WebSocket, subscribes to every configured collector,
/// and streams [`BgpElement`]s through a [`JitterBuffer`] to the returned
/// channel receiver. The background task reconnects on unexpected close
/// (§4.7) and sends `Err` on the channel only once the fatal escalation
/// threshold in §7 is reached.
pub struct LiveStream {
    receiver: mpsc::Receiver<Result<BgpElement, EngineError>>,
}

impl LiveStream {
    pub fn spawn(config: LiveConfig) -> Self {
        let (tx, rx) = mpsc::channel(1024);
        tokio::spawn(run(config, tx));
        LiveStream { receiver: rx }
    }

    pub async fn next(&mut self) -> Option<Result<BgpElement, EngineError>> {
        self.receiver.recv().await
    }
}

async fn run(config: LiveConfig, tx: mpsc::Sender<Result<BgpElement, EngineError>>) {
    let mut jitter = JitterBuffer::new(config.jitter_buffer_delay);
    let mut consecutive_failures: u32 = 0;
    let mut first_failure_at: Option<std::time::Instant> = None;

    loop {
        match run_once(&config, &mut jitter, &tx).await {
            Ok(()) => return, // channel closed by consumer
            Err(e) => {
                tracing::warn!(error = %e, "live stream disconnected, reconnecting");

                let now = std::time::Instant::now();
                match first_failure_at {
                    Some(t) if now.duration_since(t).as_secs_f64() <= RECONNECT_FAILURE_WINDOW_SECS => {
                        consecutive_failures += 1;
                    }
                    _ => {
                        first_failure_at = Some(now);
                        consecutive_failures = 1;
                    }
                }

                if consecutive_failures >= MAX_CONSECUTIVE_RECONNECT_FAILURES {
                    let _ = tx
                        .send(Err(EngineError::Live(format!(
                            "{consecutive_failures} consecutive reconnect failures within {RECONNECT_FAILURE_WINDOW_SECS}s: {e}"
                        ))))
                        .await;
                    return;
                }

                tokio::time::sleep(backoff_delay(consecutive_failures.saturating_sub(1))).await;
            }
        }
    }
}

async fn run_once(
    config: &LiveConfig,
    jitter: &mut JitterBuffer,
    tx: &mpsc::Sender<Result<BgpElement, EngineError>>,
) -> Result<(), String> {
    let (ws_stream, _) = tokio_tungstenite::connect_async(RIS_LIVE_URL)
        .await
        .map_err(|e| e.to_string())?;
    let (mut write, mut read) = ws_stream.split();

    for collector in &config.collectors {
        let sub = FilterAdapters::to_subscribe(&config.filters, collector);
        write
            .send(Message::Text(sub.to_json_string().into()))
            .await
            .map_err(|e| e.to_string())?;
    }

    while let Some(msg) = read.next().await {
        let msg = msg.map_err(|e| e.to_string())?;
        let text = match msg {
            Message::Text(t) => t.to_string(),
            Message::Close(_) => return Err("server closed connection".to_string()),
            _ => continue,
        };

        let elems = match parse_ris_live_message(&text) {
            Ok(elems) => elems,
            Err(e) => {
                tracing::debug!(error = ?e, "skipping malformed ris-live frame");
                continue;
            }
        };
        if elems.is_empty() {
            continue;
        }

        let collector = frame_host(&text).unwrap_or_else(|| "ris-live".to_string());

        for elem in elems {
            let bgp_element = map_elem(elem, &collector);
            for ready in jitter.push(bgp_element) {
                if tx.send(Ok(ready)).await.is_err() {
                    return Ok(());
                }
            }
        }
    }

    for flushed in jitter.flush() {
        if tx.send(Ok(flushed)).await.is_err() {
            return Ok(());
        }
    }

    Err("websocket stream ended".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Asn, ElemType, NetworkPrefix};
    use std::net::Ipv4Addr;

    #[test]
    fn maps_withdraw_elem_kind() {
        let elem = BgpElem {
            timestamp: 1.0,
            elem_type: ElemType::WITHDRAW,
            peer_ip: Ipv4Addr::new(192, 0, 2, 1).into(),
            peer_asn: Asn::new_32bit(100),
            prefix: NetworkPrefix {
                prefix: "10.0.0.0/8".parse().unwrap(),
                path_id: None,
            },
            next_hop: None,
            as_path: None,
            origin_asns: None,
            origin: None,
            local_pref: None,
            med: None,
            communities: None,
            atomic: false,
            aggr_asn: None,
            aggr_ip: None,
            only_to_customer: None,
            unknown: None,
            deprecated: None,
        };
        let mapped = map_elem(elem, "rrc00");
        assert_eq!(mapped.kind, ElemKind::Withdraw);
        assert_eq!(mapped.fields.prefix.as_deref(), Some("10.0.0.0/8"));
    }

    #[test]
    fn frame_host_strips_domain_suffix() {
        let text = r#"{"type":"ris_message","data":{"host":"rrc25.ripe.net","type":"UPDATE"}}"#;
        assert_eq!(frame_host(text), Some("rrc25".to_string()));
    }

    #[test]
    fn frame_host_passes_through_bare_host() {
        let text = r#"{"type":"ris_message","data":{"host":"rrc00","type":"UPDATE"}}"#;
        assert_eq!(frame_host(text), Some("rrc00".to_string()));
    }

    #[test]
    fn frame_host_none_when_missing() {
        let text = r#"{"type":"ris_error","data":{}}"#;
        assert_eq!(frame_host(text), None);
    }
}
