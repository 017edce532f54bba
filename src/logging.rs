//! Logging setup for programs embedding microdao.
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to the hosting program. This is the subscriber the `microdao` binary uses.

use crate::config::LoggingConfig;
use crate::core::{DaoError, Result};
use tracing_subscriber::EnvFilter;

const DEFAULT_LEVEL: &str = "info";

/// Builds the filter for a configured level. `RUST_LOG` wins when set.
pub fn env_filter(level: Option<&str>) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    let level = level.unwrap_or(DEFAULT_LEVEL);
    match level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" | "off" => {}
        _ => return Err(DaoError::Config(format!("invalid log level '{}'", level))),
    }
    EnvFilter::try_new(format!("microdao={}", level.to_lowercase()))
        .map_err(|e| DaoError::Config(format!("invalid log level '{}': {}", level, e)))
}

/// Installs a stderr `fmt` subscriber as the global default.
pub fn init_logging(config: Option<&LoggingConfig>) -> Result<()> {
    let filter = env_filter(config.and_then(|c| c.level.as_deref()))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| DaoError::Config(format!("failed to install subscriber: {}", e)))
}
