//! Process-wide logging setup.
//!
//! Async code logs through `tracing`; the database layer uses `log`. Both end
//! up in the same subscriber because `log` records are forwarded by
//! [`tracing_log::LogTracer`].

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

use crate::config::{LogFormat, LoggingConfig};
use crate::error::LoggingError;

/// Builds the filter: `RUST_LOG` when set, otherwise the configured level.
pub fn build_filter(config: &LoggingConfig) -> Result<EnvFilter, LoggingError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.level).map_err(|e| LoggingError::InvalidFilter {
        directive: config.level.clone(),
        reason: e.to_string(),
    })
}

/// Installs the global subscriber. Fails if logging was already initialized.
pub fn init_logging(config: &LoggingConfig) -> Result<(), LoggingError> {
    let filter = build_filter(config)?;

    tracing_log::LogTracer::init().map_err(already_initialized)?;

    let result = match config.format {
        LogFormat::Pretty => {
            let subscriber = Registry::default()
                .with(filter)
                .with(fmt::layer().with_target(false).with_line_number(true));
            tracing::subscriber::set_global_default(subscriber)
        }
        LogFormat::Json => {
            let subscriber = Registry::default()
                .with(filter)
                .with(fmt::layer().json().with_current_span(true));
            tracing::subscriber::set_global_default(subscriber)
        }
    };

    result.map_err(already_initialized)
}

fn already_initialized(e: impl std::fmt::Display) -> LoggingError {
    LoggingError::AlreadyInitialized(e.to_string())
}
