//! # Switchyard
//!
//! `switchyard` fronts a set of downstream services with one request
//! gateway and keeps a resilient consumer attached to a topic broker.
//!
//! ## Core Modules
//!
//! - `gateway`: decodes action envelopes, routes them and normalizes replies.
//! - `connector`: single HTTP calls to the auth, logger and mail services.
//! - `listener`: broker connection with backoff and topic consumption.
//! - `broker`: the in-memory topic relay the listener consumes from.
//! - `transport`: WebSocket endpoints for the gateway and the relay.
//! - `config`: layered settings from file and environment.
//! - `utils`: logging setup and error types.

pub mod broker;
pub mod config;
pub mod connector;
pub mod gateway;
pub mod listener;
pub mod transport;
pub mod utils;
