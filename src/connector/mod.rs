//! The `connector` module performs single outbound calls to the downstream
//! capabilities (auth, logger, mail) and normalizes their answers into a
//! `ConnectorOutcome`.
//!
//! Calls are never retried here. A failed call surfaces immediately.

pub mod http;
pub mod outcome;
pub mod payload;

use async_trait::async_trait;

pub use http::HttpConnector;
pub use outcome::ConnectorOutcome;
pub use payload::{AuthPayload, Capability, LogPayload, MailPayload, Request};

/// One round-trip to the capability a `Request` is addressed to.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn call(&self, request: &Request) -> ConnectorOutcome;
}

#[async_trait]
impl<C: Connector + ?Sized> Connector for std::sync::Arc<C> {
    async fn call(&self, request: &Request) -> ConnectorOutcome {
        (**self).call(request).await
    }
}
