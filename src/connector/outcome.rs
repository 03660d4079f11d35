use serde_json::Value;

/// Result of one downstream call.
///
/// Never shown to gateway callers directly; the dispatcher translates it
/// into a `ResponseEnvelope`.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectorOutcome {
    /// The capability accepted the call. Only auth returns data.
    Accepted(Option<Value>),
    /// The auth capability rejected the credentials.
    Unauthorized,
    /// The capability answered with an unexpected status.
    Rejected { status: u16, reason: String },
    /// The call never produced a usable answer.
    TransportFailure(String),
}

impl ConnectorOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }
}
