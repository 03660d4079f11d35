//! A live connection to the broker.
//!
//! `BrokerSession` sends client frames and reads server frames. Ping, pong
//! and binary frames are skipped; a close frame or a read error is a lost
//! connection.

use futures_util::{SinkExt, StreamExt};
use std::fmt;
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tungstenite::protocol::Message as WsMessage;

use crate::transport::message::{ClientMessage, ServerMessage};
use crate::utils::error::ListenerError;

pub struct BrokerSession {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl BrokerSession {
    pub fn new(stream: WebSocketStream<MaybeTlsStream<TcpStream>>) -> Self {
        Self { stream }
    }

    pub async fn send(&mut self, frame: &ClientMessage) -> Result<(), ListenerError> {
        let text =
            serde_json::to_string(frame).map_err(|e| ListenerError::Protocol(e.to_string()))?;
        self.stream
            .send(WsMessage::text(text))
            .await
            .map_err(|e| ListenerError::Consume(e.to_string()))
    }

    pub async fn recv(&mut self) -> Result<ServerMessage, ListenerError> {
        while let Some(frame) = self.stream.next().await {
            match frame.map_err(|e| ListenerError::Consume(e.to_string()))? {
                WsMessage::Text(text) => {
                    return serde_json::from_str(text.as_str()).map_err(|e| {
                        ListenerError::Protocol(format!("undecodable broker frame: {e}"))
                    });
                }
                WsMessage::Close(_) => break,
                _ => continue,
            }
        }
        Err(ListenerError::Consume(
            "connection closed by broker".to_string(),
        ))
    }

    /// Sends a close frame. Errors are ignored; the connection is going away.
    pub async fn close(&mut self) {
        let _ = self.stream.close(None).await;
    }
}

impl fmt::Debug for BrokerSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrokerSession").finish_non_exhaustive()
    }
}
