//! Tracing subscriber setup for the binary.

use crate::config::LogFormat;
use crate::constants::TRACING_SERVICE_NAME;
use crate::errors::{AppError, AppResult};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global subscriber.
///
/// `RUST_LOG` wins over `default_level` when set. Output goes to stderr so
/// command output on stdout stays clean.
///
/// # Errors
///
/// Returns `AppError::Config` if the filter is malformed or a subscriber is
/// already installed.
pub fn init(format: LogFormat, default_level: &str) -> AppResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| AppError::Config(format!("Invalid log filter '{}': {}", default_level, e)))?;

    let registry = tracing_subscriber::registry().with(filter);
    let result = match format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Text => registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init(),
    };

    result.map_err(|e| AppError::Config(format!("Failed to install logger: {}", e)))?;
    tracing::debug!(service = TRACING_SERVICE_NAME, "Logging initialized");
    Ok(())
}
