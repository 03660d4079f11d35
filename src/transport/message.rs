//! Broker protocol frames.
//!
//! Spoken over WebSocket text frames between the relay broker and its
//! clients (the listener, or anything publishing events).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Creates a queue. Without a name the broker picks one.
    #[serde(rename = "declare")]
    Declare {
        #[serde(default)]
        queue: Option<String>,
    },
    #[serde(rename = "bind")]
    Bind { queue: String, topic: String },
    #[serde(rename = "consume")]
    Consume { queue: String },
    #[serde(rename = "publish")]
    Publish { topic: String, payload: String },
    #[serde(rename = "ack")]
    Ack { delivery_tag: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "declared")]
    Declared { queue: String },
    #[serde(rename = "bound")]
    Bound { queue: String, topic: String },
    #[serde(rename = "consuming")]
    Consuming { queue: String },
    #[serde(rename = "deliver")]
    Deliver {
        topic: String,
        payload: String,
        delivery_tag: u64,
        timestamp: i64,
    },
    #[serde(rename = "error")]
    Error { message: String },
}
