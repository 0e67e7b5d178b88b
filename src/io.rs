use std::io::{BufReader, Read};
use crate::ParserError;

/// create a [BufReader] on heap from a given path to a file, located locally or remotely.
/// Transparently decompresses `.gz`/`.bz2` based on the file extension via `oneio`.
pub(crate) fn get_reader(path: &str) -> Result<Box<dyn Read>, ParserError> {
    let reader = oneio::get_reader(path)?;
    Ok(Box::new(BufReader::new(reader)))
}

/// like [get_reader], but persists the downloaded bytes under `cache_dir` so a
/// later call against the same `path` reads from disk instead of the network.
pub(crate) fn get_cached_reader(path: &str, cache_dir: &str) -> Result<Box<dyn Read>, ParserError> {
    let reader = oneio::get_cache_reader(path, cache_dir, false)?;
    Ok(Box::new(BufReader::new(reader)))
}
