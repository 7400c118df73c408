//! # Logging & Tracing Infrastructure
//!
//! Configures the `tracing-subscriber` stack used by the playback core:
//! - Pretty, compact and JSON output formats
//! - `EnvFilter`-based module-level filtering (`RUST_LOG` compatible)
//! - Idempotent initialization for test runs
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
//!
//! init_logging(LoggingConfig::default().with_format(LogFormat::Compact))?;
//! tracing::info!("player core started");
//! ```

use crate::error::{Error, Result};
use tracing_subscriber::{filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable pretty format with colors
    Pretty,
    /// Structured JSON format for machine parsing
    Json,
    /// Compact format for production
    Compact,
}

impl Default for LogFormat {
    fn default() -> Self {
        #[cfg(debug_assertions)]
        return Self::Pretty;

        #[cfg(not(debug_assertions))]
        return Self::Json;
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Output format
    pub format: LogFormat,
    /// Filter directives; falls back to `RUST_LOG`, then this value.
    pub default_filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            default_filter: "info".to_string(),
        }
    }
}

impl LoggingConfig {
    /// Sets the output format.
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets the fallback filter directives (e.g. `"core_playback=debug"`).
    pub fn with_default_filter(mut self, filter: impl Into<String>) -> Self {
        self.default_filter = filter.into();
        self
    }
}

/// Initializes the global tracing subscriber.
///
/// Honors `RUST_LOG` when set; otherwise applies the configured fallback
/// filter. Returns [`Error::Logging`] when a subscriber is already
/// installed, which callers in test harnesses may safely ignore.
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.default_filter))
        .map_err(|e| Error::Logging(format!("Invalid filter directives: {}", e)))?;

    let registry = tracing_subscriber::registry().with(filter);

    let result = match config.format {
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().pretty())
            .try_init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        LogFormat::Compact => registry
            .with(tracing_subscriber::fmt::layer().compact())
            .try_init(),
    };

    result.map_err(|e| Error::Logging(format!("Subscriber already installed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_is_info() {
        let config = LoggingConfig::default();
        assert_eq!(config.default_filter, "info");
    }

    #[test]
    fn builder_overrides_apply() {
        let config = LoggingConfig::default()
            .with_format(LogFormat::Json)
            .with_default_filter("core_playback=trace");
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.default_filter, "core_playback=trace");
    }

    #[test]
    fn double_init_reports_logging_error() {
        let first = init_logging(LoggingConfig::default().with_format(LogFormat::Compact));
        let second = init_logging(LoggingConfig::default());
        // Whichever call comes second (other tests may have installed a
        // subscriber first), the failure mode must be Error::Logging.
        if first.is_ok() {
            assert!(matches!(second, Err(Error::Logging(_))));
        }
    }
}
