use serde::{Deserialize, Serialize};
use std::fmt;

/// The fixed set of downstream capabilities the gateway can reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Auth,
    Log,
    Mail,
}

impl Capability {
    /// Looks up the capability named by an envelope's `action`.
    pub fn from_action(action: &str) -> Option<Self> {
        match action {
            "auth" => Some(Self::Auth),
            "log" => Some(Self::Log),
            "mail" => Some(Self::Mail),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::Log => "log",
            Self::Mail => "mail",
        }
    }

    /// Message returned to the caller when the capability accepted the call.
    pub fn success_message(self) -> &'static str {
        match self {
            Self::Auth => "Authenticated!",
            Self::Log => "Logged item!",
            Self::Mail => "Sent mail!",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Credential pair forwarded to the auth capability.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthPayload {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for AuthPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthPayload")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Structured log record forwarded to the logger capability.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogPayload {
    pub name: String,
    pub data: String,
}

/// Mail record forwarded to the mail capability.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MailPayload {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub message: String,
}

/// One typed call to a downstream capability.
///
/// Serializes as the bare payload, which is the body each capability
/// expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Request {
    Auth(AuthPayload),
    Log(LogPayload),
    Mail(MailPayload),
}

impl Request {
    pub fn capability(&self) -> Capability {
        match self {
            Self::Auth(_) => Capability::Auth,
            Self::Log(_) => Capability::Log,
            Self::Mail(_) => Capability::Mail,
        }
    }
}
