//! Configuration management for the entryit application.
//!
//! This module handles loading and validating configuration settings from environment
//! variables, with sensible defaults.
//!
//! # Environment Variables
//!
//! - `ENTRYIT_DB`: Path to the SQLite database file (defaults to ~/.local/share/entryit/entryit.db)
//! - `ENTRYIT_LOG_FORMAT`: `text` or `json` (defaults to `text`)
//! - `RUST_LOG`: Log filter directive (defaults to `info`)
//! - `HOME`: Used for expanding the default database path

use crate::constants::{
    DEFAULT_DB_SUBPATH, DEFAULT_LOG_LEVEL, ENV_VAR_ENTRYIT_DB, ENV_VAR_ENTRYIT_LOG_FORMAT,
    ENV_VAR_HOME, ENV_VAR_RUST_LOG, LOG_FORMAT_JSON, LOG_FORMAT_TEXT, REDACTED_PLACEHOLDER,
};
use crate::errors::{AppError, AppResult};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            LOG_FORMAT_TEXT => Ok(LogFormat::Text),
            LOG_FORMAT_JSON => Ok(LogFormat::Json),
            other => Err(AppError::Config(format!(
                "Unknown log format '{}'. Expected '{}' or '{}'",
                other, LOG_FORMAT_TEXT, LOG_FORMAT_JSON
            ))),
        }
    }
}

/// Configuration for the entryit application.
///
/// # Examples
///
/// Creating a configuration manually:
/// ```
/// use entryit::config::{Config, LogFormat};
/// use std::path::PathBuf;
///
/// let config = Config {
///     db_path: PathBuf::from("/var/lib/entryit/app.db"),
///     log_format: LogFormat::Json,
///     log_level: "debug".to_string(),
/// };
/// assert!(config.validate().is_ok());
/// ```
pub struct Config {
    /// Location of the SQLite database file.
    pub db_path: PathBuf,

    /// Log output format.
    pub log_format: LogFormat,

    /// `EnvFilter` directive, e.g. `info` or `entryit=debug`.
    pub log_level: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("db_path", &REDACTED_PLACEHOLDER)
            .field("log_format", &self.log_format)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            db_path: PathBuf::from(""),
            log_format: LogFormat::Text,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl Config {
    /// Loads configuration from environment variables with sensible defaults.
    ///
    /// The database path is expanded with `shellexpand`, so `~` and
    /// `$VAR` references are resolved.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if:
    /// - The database path expansion fails or yields an empty path
    /// - `ENTRYIT_LOG_FORMAT` names an unknown format
    pub fn load() -> AppResult<Self> {
        let db_path_str = env::var(ENV_VAR_ENTRYIT_DB).unwrap_or_else(|_| {
            let home = env::var(ENV_VAR_HOME).unwrap_or_default();
            format!("{}/{}", home, DEFAULT_DB_SUBPATH)
        });

        let db_path = Self::expand_path(&db_path_str)?;

        let log_format = match env::var(ENV_VAR_ENTRYIT_LOG_FORMAT) {
            Ok(value) => value.parse()?,
            Err(_) => LogFormat::Text,
        };

        let log_level =
            env::var(ENV_VAR_RUST_LOG).unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());

        Ok(Config {
            db_path,
            log_format,
            log_level,
        })
    }

    /// Expands `~` and environment variables in a user-supplied path.
    pub fn expand_path(raw: &str) -> AppResult<PathBuf> {
        let expanded = shellexpand::full(raw)
            .map_err(|e| AppError::Config(format!("Failed to expand path: {}", e)))?;
        let path = PathBuf::from(expanded.into_owned());

        if path.as_os_str().is_empty() {
            return Err(AppError::Config("Database path is empty".to_string()));
        }
        Ok(path)
    }

    /// Validates that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` with one of the following messages:
    /// - "Database path is empty"
    /// - "Database path must be an absolute path"
    /// - "Log level is empty"
    pub fn validate(&self) -> AppResult<()> {
        if self.db_path.as_os_str().is_empty() {
            return Err(AppError::Config("Database path is empty".to_string()));
        }

        if !self.db_path.is_absolute() {
            return Err(AppError::Config(
                "Database path must be an absolute path".to_string(),
            ));
        }

        if self.log_level.trim().is_empty() {
            return Err(AppError::Config("Log level is empty".to_string()));
        }

        Ok(())
    }
}
