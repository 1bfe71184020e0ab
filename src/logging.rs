//! Logging configuration for the stream synchronization engine.
//!
//! Console-only tracing setup. Consumers embedding the engine in a larger
//! application will usually install their own subscriber instead.

use thiserror::Error;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Logging-related errors.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Failed to initialize logging: {0}")]
    InitFailure(String),
}

/// Type alias for logging operation results.
pub type LoggingResult<T> = std::result::Result<T, LoggingError>;

/// Initialize console logging with the given level.
///
/// The `RUST_LOG` environment variable takes precedence over `level` when
/// set. Returns an error if a global subscriber is already installed.
pub fn init_console_logging(level: LevelFilter) -> LoggingResult<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env()
        .map_err(|e| LoggingError::InitFailure(e.to_string()))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| LoggingError::InitFailure(e.to_string()))
}
