//! The `broker` module is a small topic-routed message broker (the relay)
//! that the listener consumes from.
//!
//! - `engine`: queues, bindings, routing and acknowledgements.
//! - `topic`: topic filter matching.
//! - `client`: a connected relay client.

pub mod client;
pub mod engine;
pub mod message;
pub mod queue;
pub mod topic;

pub use client::Client;
pub use engine::Broker;
pub use topic::TopicFilter;
