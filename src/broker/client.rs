//! Client representation
//!
//! `Client` models a connection to the relay and holds the sending side of
//! a per-client channel the broker uses to push frames. The transport owns
//! the receiving side and forwards it onto the socket.

use tokio::sync::mpsc::UnboundedSender;
use tungstenite::protocol::Message as WsMessage;
use uuid::Uuid;

pub type ClientId = String;

#[derive(Debug)]
pub struct Client {
    pub id: ClientId,
    pub sender: UnboundedSender<WsMessage>,
}

impl Client {
    /// Create a new client with a sender channel. The `id` is a UUID used
    /// to identify the client across broker operations.
    pub fn new(sender: UnboundedSender<WsMessage>) -> Self {
        Self {
            id: format!("client-{}", Uuid::new_v4()),
            sender,
        }
    }
}
