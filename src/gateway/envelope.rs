use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::connector::{AuthPayload, Capability, LogPayload, MailPayload, Request};
use crate::utils::error::GatewayError;

/// Inbound gateway request as it arrives on the wire.
///
/// `action` selects the capability; only the payload named by it is
/// forwarded. A missing payload for the chosen action forwards that
/// payload's empty default. Unknown fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct RequestEnvelope {
    pub action: String,
    #[serde(default)]
    pub auth: Option<AuthPayload>,
    #[serde(default)]
    pub log: Option<LogPayload>,
    #[serde(default)]
    pub mail: Option<MailPayload>,
}

impl RequestEnvelope {
    pub fn decode(raw: &str) -> Result<Self, GatewayError> {
        serde_json::from_str(raw).map_err(|e| GatewayError::Decode(e.to_string()))
    }

    /// Resolves the discriminator into a typed request, dropping the
    /// payloads that do not belong to it.
    pub fn into_request(self) -> Result<Request, GatewayError> {
        match Capability::from_action(&self.action) {
            Some(Capability::Auth) => Ok(Request::Auth(self.auth.unwrap_or_default())),
            Some(Capability::Log) => Ok(Request::Log(self.log.unwrap_or_default())),
            Some(Capability::Mail) => Ok(Request::Mail(self.mail.unwrap_or_default())),
            None => Err(GatewayError::UnknownAction(self.action)),
        }
    }
}

/// Uniform answer to every gateway request.
///
/// `data` is only ever set on success and is omitted from the JSON when
/// absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub error: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ResponseEnvelope {
    pub fn success(message: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            error: false,
            message: message.into(),
            data,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            error: true,
            message: message.into(),
            data: None,
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            r#"{"error":true,"message":"failed to encode response"}"#.to_string()
        })
    }
}
