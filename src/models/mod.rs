//! Wire-format data model for BGP and MRT, independent of how it is parsed
//! or consumed.

pub mod bgp;
pub mod mrt;
pub mod network;
pub mod rpki;

pub use bgp::*;
pub use mrt::*;
pub use network::*;

use std::fmt::{Display, Formatter};

/// Error parsing a textual representation of a model type (e.g. a prefix
/// string) into its structured form.
#[derive(Debug)]
pub enum BgpModelsError {
    PrefixParsingError(String),
}

impl Display for BgpModelsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            BgpModelsError::PrefixParsingError(msg) => {
                write!(f, "cannot convert str to IP prefix: {msg}")
            }
        }
    }
}

impl std::error::Error for BgpModelsError {}

impl From<ipnet::AddrParseError> for BgpModelsError {
    fn from(err: ipnet::AddrParseError) -> Self {
        BgpModelsError::PrefixParsingError(err.to_string())
    }
}
