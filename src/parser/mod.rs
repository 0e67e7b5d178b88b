/*!
Provides parsing of MRT/BGP binary data into [`MrtRecord`]s and [`BgpElem`]s.
*/
pub mod bgp;
mod comparable_regex;
pub mod filter;
pub mod iters;
pub mod mrt;
#[cfg(feature = "rislive")]
pub mod rislive;
pub mod rpki;
mod utils;

pub use comparable_regex::ComparableRegex;

pub(crate) use bgp::parse_bgp_message;
pub(crate) use mrt::{
    parse_bgp4mp, parse_mrt_record, parse_table_dump_message, parse_table_dump_v2_message,
};
pub(crate) use utils::parse_nlri_list;
pub use utils::ReadUtils;

pub use crate::error::ParserError;
pub use filter::{Filter, Filterable};
pub use mrt::mrt_elem::{BgpElem, ElemType, Elementor};
#[cfg(feature = "rislive")]
pub use rislive::parse_ris_live_message;

use crate::error::ParserErrorWithBytes;
use crate::io::{get_cached_reader, get_reader};
use crate::models::MrtRecord;
use std::io::Read;

/// Streaming parser over a [`Read`]er of MRT-encoded bytes.
///
/// Construct with [`BgpkitParser::new`] for local or remote files (transparently
/// decompressing `.gz`/`.bz2`), or [`BgpkitParser::from_reader`] for an arbitrary
/// reader. Iterate directly for [`MrtRecord`]s, or use
/// [`into_elem_iter`](crate::parser::iters::IntoRecordIterator::into_elem_iter) for
/// per-prefix [`BgpElem`]s.
pub struct BgpkitParser<R> {
    reader: R,
    pub(crate) filters: Vec<Filter>,
}

impl BgpkitParser<Box<dyn Read>> {
    /// Creates a new parser from a path to a local or remote MRT file.
    pub fn new(path: &str) -> Result<Self, ParserError> {
        let reader = get_reader(path)?;
        Ok(BgpkitParser {
            reader,
            filters: vec![],
        })
    }

    /// Like [`BgpkitParser::new`], but caches the downloaded bytes under
    /// `cache_dir` so a later run against the same path reads from disk.
    pub fn new_cached(path: &str, cache_dir: &str) -> Result<Self, ParserError> {
        let reader = get_cached_reader(path, cache_dir)?;
        Ok(BgpkitParser {
            reader,
            filters: vec![],
        })
    }
}

impl<R: Read> BgpkitParser<R> {
    /// Creates a new parser from an object that implements the [Read] trait.
    pub fn from_reader(reader: R) -> Self {
        BgpkitParser {
            reader,
            filters: vec![],
        }
    }

    /// Adds a filter that will be applied when iterating [`BgpElem`]s out of this parser.
    ///
    /// See the [filter] module for the list of supported filter types.
    pub fn add_filter(mut self, filter_type: &str, filter_value: &str) -> Result<Self, ParserError> {
        self.filters.push(Filter::new(filter_type, filter_value)?);
        Ok(self)
    }

    /// Reads and parses the next [`MrtRecord`] out of the underlying reader.
    pub fn next_record(&mut self) -> Result<MrtRecord, ParserErrorWithBytes> {
        parse_mrt_record(&mut self.reader)
    }
}
