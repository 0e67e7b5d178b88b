/*!
§4.4 ChunkScheduler: partitions `[start_time, end_time)` into `chunk_time`-wide
half-open windows and drives each window's Broker -> Fetcher -> ParserDriver
-> MergeSorter pipeline in turn, so elements are emitted in a single global
time order across the whole historic pull (§4.6's ordering guarantee spans
the entire stream, not just one chunk).
*/
use crate::engine::broker::BrokerClient;
use crate::engine::config::HistoricConfig;
use crate::engine::element::BgpElement;
use crate::engine::error::{Diagnostic, DiagnosticSummary, EngineError};
use crate::engine::fetcher::{storage_root, Fetcher};
use crate::engine::filter::FilterAdapters;
use crate::engine::merge_sorter::MergeSorter;
use crate::engine::parser_driver;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Half-open `[start, end)` windows of width `chunk_time`, per §4.4 step 1.
/// The final window is clipped to `end_time` rather than overshooting it.
fn partition_windows(start_time: f64, end_time: f64, chunk_time_secs: f64) -> Vec<(f64, f64)> {
    let mut windows = Vec::new();
    let mut cursor = start_time;
    while cursor < end_time {
        let next = (cursor + chunk_time_secs).min(end_time);
        windows.push((cursor, next));
        cursor = next;
    }
    windows
}

/// Whether `element` belongs to the half-open `[chunk_start, chunk_end)`
/// window, per §4.4 step 4. A fetched file can span past either edge (e.g.
/// a RIB dump taken shortly before `chunk_end`), so emission from the merged
/// per-chunk stream must be clamped to the window explicitly.
fn in_window(element: &BgpElement, chunk_start: f64, chunk_end: f64) -> bool {
    element.time >= chunk_start && element.time < chunk_end
}

/// Runs one [`HistoricConfig`] to completion, streaming merged [`BgpElement`]s
/// out through `tx` and recording every recoverable failure into `diagnostics`
/// rather than aborting the pull (§7's accumulate-don't-abort error policy).
pub async fn run(
    config: HistoricConfig,
    tx: mpsc::Sender<BgpElement>,
    diagnostics: Arc<Mutex<DiagnosticSummary>>,
) {
    let broker = BrokerClient::new();
    let storage_root = storage_root(config.cache_dir.as_deref(), config.ram_fetch);
    let fetcher = match Fetcher::new(config.max_concurrent_downloads, storage_root, config.cache_dir.is_some()) {
        Ok(fetcher) => fetcher,
        Err(e) => {
            diagnostics.lock().unwrap().push(Diagnostic::Fetch {
                url: "fetcher:init".to_string(),
                reason: e.to_string(),
            });
            return;
        }
    };
    let cli_target = crate::engine::filter::FilterTarget::Other;

    let windows = partition_windows(
        config.start_time,
        config.end_time,
        config.chunk_time.as_secs_f64(),
    );

    for (chunk_start, chunk_end) in windows {
        tracing::debug!(chunk_start, chunk_end, "chunk: opening window");

        let mut descriptors = Vec::new();
        for collector in &config.collectors {
            for data_type in &config.data_types {
                match broker
                    .list_files(collector, *data_type, chunk_start, chunk_end)
                    .await
                {
                    Ok(mut files) => descriptors.append(&mut files),
                    Err(e) => {
                        tracing::warn!(collector, error = %e, "chunk: broker query failed, skipping collector/type");
                        diagnostics.lock().unwrap().push(Diagnostic::Fetch {
                            url: format!("broker:{collector}:{}", data_type.as_str()),
                            reason: e.to_string(),
                        });
                    }
                }
            }
        }

        if descriptors.is_empty() {
            tracing::debug!(chunk_start, chunk_end, "chunk: no archive files, skipping");
            continue;
        }

        let mut fetches = Vec::with_capacity(descriptors.len());
        for descriptor in &descriptors {
            fetches.push(fetcher.fetch(descriptor));
        }
        let fetch_results = futures_util::future::join_all(fetches).await;

        let mut per_file_streams = Vec::new();
        let filter_string = FilterAdapters::to_cli_string(
            &config.filters,
            &config.collectors,
            &config
                .data_types
                .iter()
                .map(|dt| dt.as_str())
                .collect::<Vec<_>>(),
            cli_target,
        );

        for (descriptor, result) in descriptors.iter().zip(fetch_results) {
            let ready = match result {
                Ok(ready) => ready,
                Err(e) => {
                    tracing::warn!(url = %descriptor.url, error = %e, "chunk: fetch failed, skipping file");
                    diagnostics.lock().unwrap().push(Diagnostic::Fetch {
                        url: descriptor.url.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            match parser_driver::parse_file(
                config.parser,
                ready.path.clone(),
                ready.collector.clone(),
                &config.filters,
                &filter_string,
            )
            .await
            {
                Ok(elements) => per_file_streams.push(elements.into_iter()),
                Err(diagnostic) => {
                    tracing::warn!(path = %ready.path.display(), "chunk: parse failed, skipping file");
                    diagnostics.lock().unwrap().push(diagnostic);
                }
            }
        }

        let merged = MergeSorter::new(per_file_streams)
            .filter(|element| in_window(element, chunk_start, chunk_end));
        for element in merged {
            if tx.send(element).await.is_err() {
                // consumer dropped the stream; reclaim this chunk and stop.
                let _ = fetcher.reclaim().await;
                return;
            }
        }

        if config.cache_dir.is_none() {
            if let Err(e) = fetcher.reclaim().await {
                tracing::warn!(error = %e, "chunk: failed to reclaim temp storage");
            }
        }
    }
}

/// Spawns [`run`] as a background task and returns the receiving half of its
/// output channel plus a shared handle to its diagnostics.
pub struct HistoricStream {
    receiver: mpsc::Receiver<BgpElement>,
    diagnostics: Arc<Mutex<DiagnosticSummary>>,
}

impl HistoricStream {
    pub fn spawn(config: HistoricConfig) -> Self {
        let (tx, rx) = mpsc::channel(1024);
        let diagnostics = Arc::new(Mutex::new(DiagnosticSummary::new()));
        tokio::spawn(run(config, tx, diagnostics.clone()));
        HistoricStream {
            receiver: rx,
            diagnostics,
        }
    }

    pub async fn next(&mut self) -> Option<BgpElement> {
        self.receiver.recv().await
    }

    /// Accumulated file- and record-scoped failures so far. Safe to call
    /// concurrently with `next`, but note entries may still arrive after a
    /// given snapshot (§7 "readable at close").
    pub fn diagnostics(&self) -> DiagnosticSummary {
        self.diagnostics.lock().unwrap().clone()
    }
}
