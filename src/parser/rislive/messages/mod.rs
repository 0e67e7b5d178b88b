#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
pub mod client;
pub mod server;

use serde::{Deserialize, Serialize};

pub use client::*;
pub use server::*;

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum RisLiveMessage {
    #[serde(rename = "ris_message")]
    RisMessage(RisMessage),
    #[serde(rename = "ris_error")]
    RisError(RisError),
    #[serde(rename = "ris_rrc_list")]
    RisRrcList(Option<RisRrcList>),
    #[serde(rename = "ris_subscribe_ok")]
    RisSubscribeOk(RisSubscribeOk),
    #[serde(rename = "pong")]
    Pong(Option<Pong>),
}
