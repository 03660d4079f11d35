//! The `gateway` module turns a generic action envelope into a call to one
//! downstream capability and normalizes the result.
//!
//! - `envelope`: the inbound request and outbound response shapes.
//! - `dispatcher`: routing by `action` and outcome translation.

pub mod dispatcher;
pub mod envelope;

pub use dispatcher::{Dispatcher, translate};
pub use envelope::{RequestEnvelope, ResponseEnvelope};
