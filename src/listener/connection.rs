//! Broker connection manager
//!
//! Dials the broker until it answers, sleeping `n²` seconds after failed
//! attempt `n`, and gives up with `ConnectExhausted` after `max_attempts`.
//! The manager is the only writer of the connection state; callers borrow
//! the connected handle from it.

use async_trait::async_trait;
use std::fmt;
use tokio_tungstenite::connect_async;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::backoff::{RetryDecision, after_failure};
use super::session::BrokerSession;
use crate::utils::error::ListenerError;

/// Opens one connection to the broker.
#[async_trait]
pub trait Dialer: Send + Sync {
    type Handle: Send;
    type Error: fmt::Display + Send;

    async fn dial(&self) -> Result<Self::Handle, Self::Error>;
}

/// Dials the broker's WebSocket endpoint.
#[derive(Debug, Clone)]
pub struct WsDialer {
    url: String,
}

impl WsDialer {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait]
impl Dialer for WsDialer {
    type Handle = BrokerSession;
    type Error = tungstenite::Error;

    async fn dial(&self) -> Result<BrokerSession, tungstenite::Error> {
        let (stream, _response) = connect_async(self.url.as_str()).await?;
        Ok(BrokerSession::new(stream))
    }
}

#[derive(Debug)]
pub enum ConnectionState<H> {
    Disconnected,
    /// Attempt number in flight, starting at 0.
    Connecting(u32),
    Connected(H),
    Exhausted,
}

impl<H> ConnectionState<H> {
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected(_))
    }
}

pub struct ConnectionManager<D: Dialer> {
    dialer: D,
    max_attempts: u32,
    state: ConnectionState<D::Handle>,
}

impl<D: Dialer> ConnectionManager<D> {
    pub fn new(dialer: D, max_attempts: u32) -> Self {
        Self {
            dialer,
            max_attempts: max_attempts.max(1),
            state: ConnectionState::Disconnected,
        }
    }

    pub fn state(&self) -> &ConnectionState<D::Handle> {
        &self.state
    }

    pub fn handle_mut(&mut self) -> Option<&mut D::Handle> {
        match &mut self.state {
            ConnectionState::Connected(handle) => Some(handle),
            _ => None,
        }
    }

    /// Gives up the current handle, if any, and returns to `Disconnected`.
    pub fn disconnect(&mut self) -> Option<D::Handle> {
        match std::mem::replace(&mut self.state, ConnectionState::Disconnected) {
            ConnectionState::Connected(handle) => Some(handle),
            _ => None,
        }
    }

    /// Connects, retrying with backoff. Any previous handle is dropped.
    ///
    /// Stops early with `Cancelled` when `cancel` fires before a connection
    /// is made.
    pub async fn connect(
        &mut self,
        cancel: &CancellationToken,
    ) -> Result<&mut D::Handle, ListenerError> {
        self.state = ConnectionState::Disconnected;
        let mut attempt = 0;

        loop {
            if cancel.is_cancelled() {
                self.state = ConnectionState::Disconnected;
                return Err(ListenerError::Cancelled);
            }

            self.state = ConnectionState::Connecting(attempt);
            let err = match self.dialer.dial().await {
                Ok(handle) => {
                    info!(attempt, "Connected to broker");
                    self.state = ConnectionState::Connected(handle);
                    break;
                }
                Err(e) => e,
            };
            warn!(attempt, error = %err, "Broker not yet ready");

            match after_failure(attempt, self.max_attempts) {
                RetryDecision::Exhausted => {
                    self.state = ConnectionState::Exhausted;
                    return Err(ListenerError::ConnectExhausted {
                        attempts: attempt + 1,
                        last_error: err.to_string(),
                    });
                }
                RetryDecision::Retry {
                    next_attempt,
                    delay,
                } => {
                    info!(delay_secs = delay.as_secs(), "Backing off");
                    tokio::select! {
                        _ = cancel.cancelled() => {
                            self.state = ConnectionState::Disconnected;
                            return Err(ListenerError::Cancelled);
                        }
                        _ = tokio::time::sleep(delay) => {}
                    }
                    attempt = next_attempt;
                }
            }
        }

        self.handle_mut().ok_or_else(|| {
            ListenerError::Protocol("connection state lost after connecting".to_string())
        })
    }
}
