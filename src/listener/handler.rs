//! Default message handler for the listener.
//!
//! Each delivered body is a `{name, data}` log event. It is sent to the
//! logger capability and acknowledged once the logger accepts it.

use async_trait::async_trait;
use tracing::{debug, warn};

use super::consumer::{Disposition, InboundMessage, MessageHandler};
use crate::connector::{Connector, LogPayload, Request};

#[derive(Debug)]
pub struct LogForwarder<C> {
    connector: C,
}

impl<C: Connector> LogForwarder<C> {
    pub fn new(connector: C) -> Self {
        Self { connector }
    }
}

#[async_trait]
impl<C: Connector> MessageHandler for LogForwarder<C> {
    async fn handle(&mut self, message: &InboundMessage) -> Disposition {
        let payload: LogPayload = match serde_json::from_slice(&message.body) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(topic = %message.topic, error = %e, "Undecodable log event");
                return Disposition::Leave;
            }
        };

        let outcome = self.connector.call(&Request::Log(payload)).await;
        if outcome.is_accepted() {
            debug!(topic = %message.topic, "Forwarded log event");
            Disposition::Ack
        } else {
            warn!(topic = %message.topic, ?outcome, "Logger did not accept event");
            Disposition::Leave
        }
    }
}
