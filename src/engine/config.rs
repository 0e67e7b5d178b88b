/*!
Validated, immutable configuration records for the streaming engine: §3's
`HistoricConfig`, `LiveConfig`, and the parser backend selector.

Mirrors the crate's existing "validate once at construction, no mutation
after" discipline (see [`crate::parser::filter::Filter::new`]) rather than
accepting an untyped map and mutating fields post-hoc.
*/
use crate::engine::error::EngineError;
use crate::engine::filter::FilterSpec;
use std::path::PathBuf;
use std::time::Duration;

/// Which MRT parsing backend a [`HistoricConfig`] should drive.
///
/// `Bgpkit` is the in-process library backend realized by this crate's own
/// `parser` module; the other three are external binaries discovered on
/// `PATH` at stream-open time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserBackendKind {
    /// In-process, this crate's own MRT/BGP parser.
    Bgpkit,
    /// External `bgpkit-parser` CLI binary.
    BgpkitCli,
    /// External `pybgpstream` binary.
    PyBgpstream,
    /// External `bgpdump` binary.
    Bgpdump,
}

impl ParserBackendKind {
    pub fn from_str(s: &str) -> Result<Self, EngineError> {
        match s {
            "pybgpkit" | "bgpkit" => Ok(ParserBackendKind::Bgpkit),
            "bgpkit-cli" => Ok(ParserBackendKind::BgpkitCli),
            "pybgpstream" => Ok(ParserBackendKind::PyBgpstream),
            "bgpdump" => Ok(ParserBackendKind::Bgpdump),
            other => Err(EngineError::Config(format!("unknown parser backend: {other}"))),
        }
    }

    /// The external binary name to discover via `PATH`, or `None` for the
    /// in-process backend.
    pub fn binary_name(&self) -> Option<&'static str> {
        match self {
            ParserBackendKind::Bgpkit => None,
            ParserBackendKind::BgpkitCli => Some("bgpkit-parser"),
            ParserBackendKind::PyBgpstream => Some("pybgpstream"),
            ParserBackendKind::Bgpdump => Some("bgpdump"),
        }
    }
}

/// §3: the set of MRT data types a historic stream draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Ribs,
    Updates,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Ribs => "ribs",
            DataType::Updates => "updates",
        }
    }
}

const DEFAULT_MAX_CONCURRENT_DOWNLOADS: usize = 10;
const DEFAULT_CHUNK_TIME: Duration = Duration::from_secs(2 * 60 * 60);
const DEFAULT_JITTER_BUFFER_DELAY: f64 = 10.0;

/// §3 `HistoricConfig`. Constructed only via [`HistoricConfig::new`], which
/// performs every validation named in §3's Invariants; there is no public
/// way to obtain an unvalidated instance.
#[derive(Debug, Clone)]
pub struct HistoricConfig {
    pub start_time: f64,
    pub end_time: f64,
    pub collectors: Vec<String>,
    pub data_types: Vec<DataType>,
    pub filters: FilterSpec,
    pub max_concurrent_downloads: usize,
    pub cache_dir: Option<PathBuf>,
    pub ram_fetch: bool,
    pub chunk_time: Duration,
    pub parser: ParserBackendKind,
}

impl HistoricConfig {
    /// Validates and builds a `HistoricConfig`. Fails if `collectors` is
    /// empty, `start_time >= end_time`, or `data_types` is empty (an empty
    /// list means "not requested", so it defaults to `{updates}` rather than
    /// being accepted as "nothing").
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        start_time: f64,
        end_time: f64,
        collectors: Vec<String>,
        data_types: Option<Vec<DataType>>,
        filters: FilterSpec,
        max_concurrent_downloads: Option<usize>,
        cache_dir: Option<PathBuf>,
        ram_fetch: Option<bool>,
        chunk_time: Option<Duration>,
        parser: ParserBackendKind,
    ) -> Result<Self, EngineError> {
        if start_time >= end_time {
            return Err(EngineError::Config(
                "start_time must be strictly before end_time".to_string(),
            ));
        }
        if collectors.is_empty() {
            return Err(EngineError::Config(
                "at least one collector must be configured".to_string(),
            ));
        }
        filters.validate()?;

        let data_types = match data_types {
            Some(dt) if !dt.is_empty() => dt,
            _ => vec![DataType::Updates],
        };

        Ok(HistoricConfig {
            start_time,
            end_time,
            collectors,
            data_types,
            filters,
            max_concurrent_downloads: max_concurrent_downloads
                .unwrap_or(DEFAULT_MAX_CONCURRENT_DOWNLOADS),
            cache_dir,
            ram_fetch: ram_fetch.unwrap_or(true),
            chunk_time: chunk_time.unwrap_or(DEFAULT_CHUNK_TIME),
            parser,
        })
    }
}

/// §3 `LiveConfig`. Unlike the distilled spec's source, `data_types` has no
/// field at all here — it is implicitly always `{updates}` for the live
/// path, so there is nothing for a validator to silently overwrite (see
/// SPEC_FULL.md §9's "Mutable config post-construction" redesign note).
#[derive(Debug, Clone)]
pub struct LiveConfig {
    pub collectors: Vec<String>,
    pub filters: FilterSpec,
    pub jitter_buffer_delay: f64,
}

impl LiveConfig {
    pub fn new(
        collectors: Vec<String>,
        filters: FilterSpec,
        jitter_buffer_delay: Option<f64>,
    ) -> Result<Self, EngineError> {
        if collectors.is_empty() {
            return Err(EngineError::Config(
                "at least one collector must be configured".to_string(),
            ));
        }
        filters.validate()?;

        Ok(LiveConfig {
            collectors,
            filters,
            jitter_buffer_delay: jitter_buffer_delay.unwrap_or(DEFAULT_JITTER_BUFFER_DELAY).max(0.0),
        })
    }
}

/// Dispatches [`crate::engine::facade::StreamFacade`] to the historic or
/// live pipeline. §9: "the source selects live mode when both `start_time`
/// and `end_time` are absent" is realized here as a sum type built by a
/// single validating entry point rather than two optional fields on one
/// struct.
#[derive(Debug, Clone)]
pub enum EngineConfig {
    Historic(HistoricConfig),
    Live(LiveConfig),
}
