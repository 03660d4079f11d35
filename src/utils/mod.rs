//! The `utils` module provides shared definitions used across `switchyard`:
//! the error taxonomy and the tracing subscriber setup.

pub mod error;
pub mod logging;

#[cfg(test)]
mod tests;
