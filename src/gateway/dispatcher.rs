//! Gateway dispatcher
//!
//! Decodes a request envelope, routes it to the connector by its `action`
//! and folds whatever happens into a `ResponseEnvelope`. Nothing is retried
//! or cached and nothing is carried between calls, so concurrent dispatches
//! can share one `Dispatcher` freely.

use tracing::{info, warn};

use super::envelope::{RequestEnvelope, ResponseEnvelope};
use crate::connector::{Capability, Connector, ConnectorOutcome, Request};

#[derive(Debug)]
pub struct Dispatcher<C> {
    connector: C,
}

impl<C: Connector> Dispatcher<C> {
    pub fn new(connector: C) -> Self {
        Self { connector }
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Handles one raw JSON envelope. Never fails: decode and routing errors
    /// come back as `error=true` responses without a downstream call.
    pub async fn dispatch(&self, raw: &str) -> ResponseEnvelope {
        let request = match RequestEnvelope::decode(raw).and_then(RequestEnvelope::into_request) {
            Ok(request) => request,
            Err(e) => {
                warn!(error = ?e, "rejected gateway request");
                return ResponseEnvelope::failure(e.to_string());
            }
        };

        self.dispatch_request(&request).await
    }

    pub async fn dispatch_request(&self, request: &Request) -> ResponseEnvelope {
        let capability = request.capability();
        info!(action = %capability, "dispatching");

        let outcome = self.connector.call(request).await;
        translate(capability, outcome)
    }
}

/// Maps a connector outcome onto the caller-facing response.
///
/// Only auth hands its data back to the caller.
pub fn translate(capability: Capability, outcome: ConnectorOutcome) -> ResponseEnvelope {
    match outcome {
        ConnectorOutcome::Accepted(data) => {
            let data = match capability {
                Capability::Auth => data,
                Capability::Log | Capability::Mail => None,
            };
            ResponseEnvelope::success(capability.success_message(), data)
        }
        ConnectorOutcome::Unauthorized => ResponseEnvelope::failure("invalid credentials"),
        ConnectorOutcome::Rejected { status, reason } => {
            warn!(action = %capability, status, reason = %reason, "downstream rejected call");
            ResponseEnvelope::failure(format!("error calling {capability} service"))
        }
        ConnectorOutcome::TransportFailure(cause) => ResponseEnvelope::failure(cause),
    }
}
