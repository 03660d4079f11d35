//! Tracing subscriber setup, driven by the `[log]` config section.

use tracing::Level;

use crate::config::LogSettings;

/// Installs the global fmt subscriber at the configured level.
///
/// Later calls are no-ops, so tests may call it freely. An unrecognised
/// level falls back to `info` and is reported once the subscriber is up.
pub fn init(settings: &LogSettings) {
    let level = parse_level(&settings.level);

    let _ = tracing_subscriber::fmt()
        .with_max_level(level.unwrap_or(Level::INFO))
        .with_target(false)
        .try_init();

    if level.is_none() {
        tracing::warn!(level = %settings.level, "Unknown log level, using info");
    }
}

/// Case-insensitive level name; `warning` is accepted for `warn`.
pub fn parse_level(name: &str) -> Option<Level> {
    match name.trim().to_ascii_lowercase().as_str() {
        "error" => Some(Level::ERROR),
        "warn" | "warning" => Some(Level::WARN),
        "info" => Some(Level::INFO),
        "debug" => Some(Level::DEBUG),
        "trace" => Some(Level::TRACE),
        _ => None,
    }
}
