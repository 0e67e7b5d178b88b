/*!
§4.9 StreamFacade: the single entry point a consumer drives. Dispatches to
the historic or live pipeline based on which [`EngineConfig`] variant it was
built from, and defers opening any network/file resource until the first
pull (§4.9's "lazy" requirement) — `open` only validates and stores the
config; `next` is what actually spawns the background pipeline, on first
call.
*/
use crate::engine::chunk_scheduler::HistoricStream;
use crate::engine::config::EngineConfig;
use crate::engine::element::BgpElement;
use crate::engine::error::{DiagnosticSummary, EngineError};
use crate::engine::live_stream::LiveStream;

enum Pipeline {
    Historic(HistoricStream),
    Live(LiveStream),
}

/// The unified handle over a historic or live BGP stream. Construct with
/// [`StreamFacade::open`], then pull elements with [`StreamFacade::next`]
/// until it returns `None` or an error.
pub struct StreamFacade {
    config: Option<EngineConfig>,
    pipeline: Option<Pipeline>,
}

impl StreamFacade {
    /// §4.9: validates `config` was already built through
    /// [`crate::engine::config::HistoricConfig::new`] or
    /// [`crate::engine::config::LiveConfig::new`] (both of which reject
    /// invalid state at construction, so there is nothing further to
    /// validate here) and defers pipeline startup to the first `next` call.
    pub fn open(config: EngineConfig) -> Self {
        StreamFacade {
            config: Some(config),
            pipeline: None,
        }
    }

    fn ensure_started(&mut self) {
        if self.pipeline.is_some() {
            return;
        }
        let config = self.config.take().expect("ensure_started called more than once without a config");
        self.pipeline = Some(match config {
            EngineConfig::Historic(cfg) => Pipeline::Historic(HistoricStream::spawn(cfg)),
            EngineConfig::Live(cfg) => Pipeline::Live(LiveStream::spawn(cfg)),
        });
    }

    /// Pulls the next time-ordered [`BgpElement`], opening the underlying
    /// pipeline lazily on the first call. Returns `None` once a historic
    /// stream is exhausted; a live stream only ends on fatal escalation
    /// (§7), surfaced as `Some(Err(..))`.
    pub async fn next(&mut self) -> Option<Result<BgpElement, EngineError>> {
        self.ensure_started();
        match self.pipeline.as_mut().expect("pipeline started above") {
            Pipeline::Historic(stream) => stream.next().await.map(Ok),
            Pipeline::Live(stream) => stream.next().await,
        }
    }

    /// Accumulated recoverable failures so far (§7). Only the historic
    /// pipeline accumulates file/record diagnostics today; a live pipeline
    /// escalates every failure through `next`'s `Err` arm instead, so this
    /// returns an empty summary for a live stream.
    pub fn diagnostics(&self) -> DiagnosticSummary {
        match &self.pipeline {
            Some(Pipeline::Historic(stream)) => stream.diagnostics(),
            _ => DiagnosticSummary::new(),
        }
    }

    /// Closes the stream before it would otherwise end, dropping the
    /// background pipeline task and its channel. Safe to call even if
    /// `next` was never called.
    pub fn close(mut self) {
        self.pipeline = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::LiveConfig;
    use crate::engine::filter::FilterSpec;

    #[test]
    fn open_does_not_start_the_pipeline() {
        let cfg = LiveConfig::new(vec!["rrc00".to_string()], FilterSpec::new(), None).unwrap();
        let facade = StreamFacade::open(EngineConfig::Live(cfg));
        assert!(facade.pipeline.is_none());
    }
}
