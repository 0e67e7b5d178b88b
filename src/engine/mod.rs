/*!
The streaming engine: a historic-archive and live-WebSocket BGP update
pipeline built on top of this crate's own MRT/BGP parser, in the manner
described by the distilled `bgpstream`-style system this module realizes.

Most consumers only need [`StreamFacade`], [`EngineConfig`],
[`HistoricConfig`], [`LiveConfig`], and [`FilterSpec`] — the submodules below
are the pipeline's internal stages and are public so advanced consumers can
drive them directly (e.g. a caller that wants its own chunking policy).
*/
pub mod backoff;
pub mod broker;
pub mod chunk_scheduler;
pub mod config;
pub mod element;
pub mod error;
pub mod facade;
pub mod fetcher;
pub mod filter;
pub mod jitter_buffer;
pub mod live_stream;
pub mod merge_sorter;
pub mod parser_driver;

pub use config::{DataType, EngineConfig, HistoricConfig, LiveConfig, ParserBackendKind};
pub use element::{BgpElement, ElemKind, ElementFields};
pub use error::{Diagnostic, DiagnosticSummary, EngineError};
pub use facade::StreamFacade;
pub use filter::{FilterAdapters, FilterSpec, FilterTarget, IpVersion, PrefixFilter, UpdateType};
