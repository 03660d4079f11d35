//! Error types shared by the gateway, the listener and the relay broker.
//!
//! Gateway errors never escape a dispatch: they are folded into a
//! `ResponseEnvelope`. Listener errors propagate to whoever supervises the
//! connection (the binary exits non-zero on them). Broker errors are reported
//! back to the offending relay client as an `error` frame.

use thiserror::Error;

/// Failures that stop a gateway request before any downstream call is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The inbound envelope was not valid JSON or lacked a usable `action`.
    #[error("{0}")]
    Decode(String),

    /// The `action` did not name a known capability.
    #[error("unknown action")]
    UnknownAction(String),
}

/// Failures of the broker connection manager and the topic consumer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListenerError {
    #[error("broker unreachable after {attempts} attempts: {last_error}")]
    ConnectExhausted { attempts: u32, last_error: String },

    /// The broker connection was lost while consuming.
    #[error("consume failed: {0}")]
    Consume(String),

    /// The broker answered with something the listener did not expect.
    #[error("broker protocol error: {0}")]
    Protocol(String),

    #[error("stopped by shutdown signal")]
    Cancelled,
}

/// Failures of relay broker operations requested by a client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BrokerError {
    #[error("queue '{0}' not found")]
    UnknownQueue(String),

    #[error("queue '{0}' is owned by another connection")]
    QueueInUse(String),

    #[error("invalid topic filter '{0}'")]
    InvalidFilter(String),

    #[error("unknown delivery tag {0}")]
    UnknownDeliveryTag(u64),
}
