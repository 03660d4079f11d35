use serde::Deserialize;

/// Top-level configuration settings for the application.
///
/// Each section belongs to one subcommand, except `services` which the
/// gateway and the listener share.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Settings {
    pub gateway: GatewaySettings,
    pub services: ServiceSettings,
    pub listener: ListenerSettings,
    pub relay: RelaySettings,
    pub log: LogSettings,
}

/// Address the gateway WebSocket endpoint binds to.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct GatewaySettings {
    pub host: String,
    pub port: u16,
}

/// Fixed addresses of the downstream capabilities.
///
/// `timeout_secs` bounds every outbound call.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ServiceSettings {
    pub auth_url: String,
    pub log_url: String,
    pub mail_url: String,
    pub timeout_secs: u64,
}

/// Broker connection and topic binding for the listener.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ListenerSettings {
    pub broker_url: String,
    pub topics: Vec<String>,
    /// Fixed queue name. When unset the broker assigns one.
    pub queue: Option<String>,
    pub max_attempts: u32,
}

/// Address the relay broker binds to.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct RelaySettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LogSettings {
    pub level: String,
}

/// Partial configuration settings loaded from files or environment.
///
/// Allows partial specification of settings. Missing values are filled from
/// `Settings::default()`.
#[derive(Debug, Deserialize, Default)]
pub struct PartialSettings {
    pub gateway: Option<PartialGatewaySettings>,
    pub services: Option<PartialServiceSettings>,
    pub listener: Option<PartialListenerSettings>,
    pub relay: Option<PartialRelaySettings>,
    pub log: Option<PartialLogSettings>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PartialGatewaySettings {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PartialServiceSettings {
    pub auth_url: Option<String>,
    pub log_url: Option<String>,
    pub mail_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PartialListenerSettings {
    pub broker_url: Option<String>,
    pub topics: Option<Vec<String>>,
    pub queue: Option<String>,
    pub max_attempts: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PartialRelaySettings {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PartialLogSettings {
    pub level: Option<String>,
}

/// Provides default values for `Settings`.
///
/// The service URLs and topics match the deployment the services were
/// written for: each capability is reachable by its container hostname.
impl Default for Settings {
    fn default() -> Self {
        Self {
            gateway: GatewaySettings {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            services: ServiceSettings {
                auth_url: "http://authentication-service/authenticate".to_string(),
                log_url: "http://logger-service/log".to_string(),
                mail_url: "http://mail-service/send".to_string(),
                timeout_secs: 10,
            },
            listener: ListenerSettings {
                broker_url: "ws://127.0.0.1:5672".to_string(),
                topics: vec![
                    "log.INFO".to_string(),
                    "log.WARNING".to_string(),
                    "log.ERROR".to_string(),
                ],
                queue: None,
                max_attempts: 6,
            },
            relay: RelaySettings {
                host: "0.0.0.0".to_string(),
                port: 5672,
            },
            log: LogSettings {
                level: "info".to_string(),
            },
        }
    }
}

impl PartialSettings {
    /// Fills every missing value from `default`.
    pub fn merge(self, default: Settings) -> Settings {
        let gateway = self.gateway.unwrap_or_default();
        let services = self.services.unwrap_or_default();
        let listener = self.listener.unwrap_or_default();
        let relay = self.relay.unwrap_or_default();
        let log = self.log.unwrap_or_default();

        Settings {
            gateway: GatewaySettings {
                host: gateway.host.unwrap_or(default.gateway.host),
                port: gateway.port.unwrap_or(default.gateway.port),
            },
            services: ServiceSettings {
                auth_url: services.auth_url.unwrap_or(default.services.auth_url),
                log_url: services.log_url.unwrap_or(default.services.log_url),
                mail_url: services.mail_url.unwrap_or(default.services.mail_url),
                timeout_secs: services
                    .timeout_secs
                    .unwrap_or(default.services.timeout_secs),
            },
            listener: ListenerSettings {
                broker_url: listener.broker_url.unwrap_or(default.listener.broker_url),
                topics: listener.topics.unwrap_or(default.listener.topics),
                queue: listener
                    .queue
                    .filter(|q| !q.is_empty())
                    .or(default.listener.queue),
                max_attempts: listener
                    .max_attempts
                    .unwrap_or(default.listener.max_attempts),
            },
            relay: RelaySettings {
                host: relay.host.unwrap_or(default.relay.host),
                port: relay.port.unwrap_or(default.relay.port),
            },
            log: LogSettings {
                level: log.level.unwrap_or(default.log.level),
            },
        }
    }
}
