//! The `listener` module keeps a connection to the broker and consumes the
//! configured topics.
//!
//! - `backoff`: the quadratic retry schedule.
//! - `connection`: dialing with retries and the connection state machine.
//! - `session`: framing on a live broker connection.
//! - `consumer`: queue declaration, topic binding and delivery.
//! - `handler`: forwards delivered log events to the logger service.

pub mod backoff;
pub mod connection;
pub mod consumer;
pub mod handler;
pub mod session;

pub use backoff::{DEFAULT_MAX_ATTEMPTS, RetryDecision, after_failure, backoff_delay};
pub use connection::{ConnectionManager, ConnectionState, Dialer, WsDialer};
pub use consumer::{
    Disposition, InboundMessage, MessageHandler, Subscription, TopicBinding, TopicConsumer,
};
pub use handler::LogForwarder;
pub use session::BrokerSession;

#[cfg(test)]
mod tests;
