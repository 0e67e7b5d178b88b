//! This module contains the RIS-live server message definitions.
//!
//! Official manual available at <https://ris-live.ripe.net/manual/#server-messages>
pub mod pong;
pub mod raw_bytes;
pub mod ris_error;
pub mod ris_message;
pub mod ris_rrc_list;
pub mod ris_subscribe_ok;

pub use pong::Pong;
pub use raw_bytes::parse_raw_bytes;
pub use ris_error::RisError;
pub use ris_message::RisMessage;
pub use ris_message::RisMessageEnum;
pub use ris_rrc_list::RisRrcList;
pub use ris_subscribe_ok::RisSubscribeOk;
