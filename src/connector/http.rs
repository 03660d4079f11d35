//! HTTP connector
//!
//! Posts each payload as JSON to the capability's configured URL. A
//! capability accepts a call by answering `202 Accepted`. The auth
//! capability also answers `401` for bad credentials and wraps its result
//! in a response envelope body; the other capabilities have no such
//! distinction and any non-202 status is a plain rejection.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::Connector;
use super::outcome::ConnectorOutcome;
use super::payload::{Capability, Request};
use crate::config::ServiceSettings;

/// Body the auth capability sends with a `202`.
#[derive(Debug, Deserialize)]
struct AuthReply {
    error: bool,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct HttpConnector {
    client: Client,
    auth_url: String,
    log_url: String,
    mail_url: String,
}

impl HttpConnector {
    /// Builds a connector whose calls time out after `timeout_secs`.
    pub fn new(settings: &ServiceSettings) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            auth_url: settings.auth_url.clone(),
            log_url: settings.log_url.clone(),
            mail_url: settings.mail_url.clone(),
        })
    }

    pub fn url_for(&self, capability: Capability) -> &str {
        match capability {
            Capability::Auth => &self.auth_url,
            Capability::Log => &self.log_url,
            Capability::Mail => &self.mail_url,
        }
    }
}

#[async_trait]
impl Connector for HttpConnector {
    async fn call(&self, request: &Request) -> ConnectorOutcome {
        let capability = request.capability();
        let url = self.url_for(capability);
        debug!(%capability, url, "calling downstream service");

        let response = match self.client.post(url).json(request).send().await {
            Ok(response) => response,
            Err(e) => return ConnectorOutcome::TransportFailure(e.to_string()),
        };

        let status = response.status();
        if capability == Capability::Auth && status == StatusCode::UNAUTHORIZED {
            return ConnectorOutcome::Unauthorized;
        }
        if status != StatusCode::ACCEPTED {
            let reason = response.text().await.unwrap_or_default();
            return ConnectorOutcome::Rejected {
                status: status.as_u16(),
                reason,
            };
        }

        match capability {
            Capability::Auth => match response.json::<AuthReply>().await {
                Ok(reply) if reply.error => {
                    debug!(message = %reply.message, "auth service refused credentials");
                    ConnectorOutcome::Unauthorized
                }
                Ok(reply) => ConnectorOutcome::Accepted(reply.data),
                Err(e) => ConnectorOutcome::TransportFailure(e.to_string()),
            },
            Capability::Log | Capability::Mail => ConnectorOutcome::Accepted(None),
        }
    }
}
