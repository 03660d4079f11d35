//! The `transport` module handles network communication with clients over
//! WebSockets.
//!
//! - `gateway`: the request/response endpoint in front of the dispatcher.
//! - `websocket`: the relay broker endpoint.
//! - `message`: the broker protocol frames, shared with the listener.

pub mod gateway;
pub mod message;
pub mod websocket;

pub use gateway::{serve_gateway, start_gateway_server};
pub use message::{ClientMessage, ServerMessage};
pub use websocket::{serve_relay, start_relay_server};

#[cfg(test)]
mod tests;
