use super::error::{GatewayError, ListenerError};
use super::logging::{self, parse_level};
use crate::config::LogSettings;
use tracing::Level;

#[test]
fn parse_level_accepts_config_spellings() {
    assert_eq!(parse_level("info"), Some(Level::INFO));
    assert_eq!(parse_level("WARNING"), Some(Level::WARN));
    assert_eq!(parse_level(" Debug "), Some(Level::DEBUG));
    assert_eq!(parse_level("trace"), Some(Level::TRACE));
    assert_eq!(parse_level("error"), Some(Level::ERROR));
    assert_eq!(parse_level("nonsense"), None);
}

#[test]
fn logging_init_tolerates_repeat_and_unknown_levels() {
    for level in ["info", "debug", "nonsense"] {
        logging::init(&LogSettings {
            level: level.to_string(),
        });
    }
}

#[test]
fn unknown_action_displays_fixed_message() {
    let err = GatewayError::UnknownAction("launch".to_string());
    assert_eq!(err.to_string(), "unknown action");
}

#[test]
fn connect_exhausted_names_attempts_and_cause() {
    let err = ListenerError::ConnectExhausted {
        attempts: 6,
        last_error: "connection refused".to_string(),
    };
    let text = err.to_string();
    assert!(text.contains('6'));
    assert!(text.contains("connection refused"));
}
