/*!
Error taxonomy for the streaming engine. Mirrors the hand-rolled `Display`
style used by [`crate::error::ParserError`] rather than a derive-macro error
crate: every top-level variant is fatal to the whole stream, while file- and
record-scoped failures are accumulated into a [`DiagnosticSummary`] instead of
aborting a pull.
*/
use std::fmt::{self, Display, Formatter};
use std::io;

/// Fatal error returned from engine construction or from a stream pull that
/// cannot be recovered from.
#[derive(Debug)]
pub enum EngineError {
    /// Invalid window, conflicting prefix filters, unknown parser backend,
    /// missing external binary. Raised at construction.
    Config(String),
    /// Broker unreachable after the retry budget is exhausted.
    Broker(String),
    /// A WebSocket collector could not be kept alive: five consecutive
    /// reconnect attempts failed within sixty seconds.
    Live(String),
    Io(io::Error),
}

impl Display for EngineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Config(s) => write!(f, "configuration error: {s}"),
            EngineError::Broker(s) => write!(f, "broker error: {s}"),
            EngineError::Live(s) => write!(f, "live stream error: {s}"),
            EngineError::Io(e) => write!(f, "io error: {e}"),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<io::Error> for EngineError {
    fn from(e: io::Error) -> Self {
        EngineError::Io(e)
    }
}

/// A single file- or record-scoped failure recorded without aborting the
/// stream. Accumulated in [`DiagnosticSummary`] and surfaced at close.
#[derive(Debug, Clone)]
pub enum Diagnostic {
    /// A file could not be downloaded after retries; the file was skipped.
    Fetch { url: String, reason: String },
    /// A parser backend crashed or produced unreadable output for a file.
    Parser { path: String, reason: String },
    /// A single malformed MRT record or RIS Live frame was skipped.
    Record { context: String, reason: String },
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::Fetch { url, reason } => write!(f, "fetch failed for {url}: {reason}"),
            Diagnostic::Parser { path, reason } => write!(f, "parser failed for {path}: {reason}"),
            Diagnostic::Record { context, reason } => {
                write!(f, "record skipped ({context}): {reason}")
            }
        }
    }
}

/// Per-stream accumulator of recoverable errors, readable at close. Not
/// thread-safe by itself; callers that record from multiple tasks wrap it in
/// a mutex (see `ChunkScheduler`).
#[derive(Debug, Default, Clone)]
pub struct DiagnosticSummary {
    entries: Vec<Diagnostic>,
}

impl DiagnosticSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn fetch_failures(&self) -> usize {
        self.entries
            .iter()
            .filter(|d| matches!(d, Diagnostic::Fetch { .. }))
            .count()
    }

    pub fn parser_failures(&self) -> usize {
        self.entries
            .iter()
            .filter(|d| matches!(d, Diagnostic::Parser { .. }))
            .count()
    }
}
