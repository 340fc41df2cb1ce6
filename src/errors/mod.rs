//! Error handling utilities for the entryit application.
//!
//! This module provides the central error type `AppError` which represents all
//! possible error conditions that might occur in the application, as well as the
//! convenience type alias `AppResult` for functions that can return these errors.
//!
//! Every public operation returns an `AppResult`. Recoverable conditions such as a
//! missing entry, a duplicate email or a wrong password are ordinary `Err` values;
//! there is no separate fatal tier.

use thiserror::Error;

/// Represents specific error cases that can occur during database operations.
///
/// # Examples
///
/// ```
/// use entryit::errors::DatabaseError;
///
/// let error = DatabaseError::Custom("transaction aborted".to_string());
/// assert!(format!("{}", error).contains("transaction aborted"));
/// ```
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// SQLite database error.
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection pool error.
    #[error("Failed to get connection from pool: {0}\n\nThis may indicate database connection issues. Try closing other entryit instances.")]
    Pool(#[from] r2d2::Error),

    /// Custom database error with detailed message.
    #[error("Database error: {0}")]
    Custom(String),
}

/// Represents failures of the password hashing primitives.
///
/// A wrong password is never a `CryptoError`; it is reported as
/// [`AppError::IncorrectCredential`]. These variants cover malformed stored
/// hashes and hasher failures.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Hashing a password failed.
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    /// A stored hash could not be parsed.
    #[error("Stored password hash is malformed: {0}")]
    MalformedHash(String),
}

/// Stable discriminant of an [`AppError`], used by callers that branch on the
/// failure category rather than the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    AuthenticationRequired,
    NotFound,
    Duplicate,
    Unauthorized,
    InvalidArgument,
    IncorrectCredential,
    PersistenceFailure,
    Config,
    Io,
    Crypto,
    Export,
}

#[derive(Debug, Error)]
pub enum AppError {
    /// No user is logged in.
    #[error("Authentication required: please log in first")]
    AuthenticationRequired,

    /// A user, journal, tag or streak record does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Email, username or tag name collision.
    #[error("Already exists: {0}")]
    Duplicate(String),

    /// The record belongs to another user.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// A required argument is missing or out of range.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Wrong login or unlock password.
    #[error("Incorrect credential: {0}")]
    IncorrectCredential(String),

    /// Errors related to configuration loading or validation.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input/output errors from filesystem operations.
    ///
    /// This variant automatically converts from `std::io::Error` through the `From` trait.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Errors related to password hashing.
    #[error("Cryptographic error: {0}")]
    Crypto(#[from] CryptoError),

    /// Errors related to database operations.
    ///
    /// This variant uses a dedicated DatabaseError type to provide detailed
    /// information about what went wrong with database operations.
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// A document renderer failed to produce output.
    #[error("Export error: {0}")]
    Export(String),
}

impl AppError {
    /// Returns the failure category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::AuthenticationRequired => ErrorKind::AuthenticationRequired,
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::Duplicate(_) => ErrorKind::Duplicate,
            AppError::Unauthorized(_) => ErrorKind::Unauthorized,
            AppError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            AppError::IncorrectCredential(_) => ErrorKind::IncorrectCredential,
            AppError::Config(_) => ErrorKind::Config,
            AppError::Io(_) => ErrorKind::Io,
            AppError::Crypto(_) => ErrorKind::Crypto,
            AppError::Database(_) => ErrorKind::PersistenceFailure,
            AppError::Export(_) => ErrorKind::Export,
        }
    }

    /// Whether this is a user-level condition (bad input, missing record,
    /// wrong password) rather than an infrastructure failure.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self.kind(),
            ErrorKind::PersistenceFailure | ErrorKind::Io | ErrorKind::Crypto | ErrorKind::Config
        )
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(e: rusqlite::Error) -> Self {
        AppError::Database(DatabaseError::Sqlite(e))
    }
}

impl From<r2d2::Error> for AppError {
    fn from(e: r2d2::Error) -> Self {
        AppError::Database(DatabaseError::Pool(e))
    }
}

/// A type alias for `Result<T, AppError>` to simplify function signatures.
///
/// # Examples
///
/// ```
/// use entryit::errors::{AppResult, AppError};
///
/// fn might_fail(month: u32) -> AppResult<u32> {
///     if !(1..=12).contains(&month) {
///         return Err(AppError::InvalidArgument("month must be between 1 and 12".to_string()));
///     }
///     Ok(month)
/// }
///
/// assert!(might_fail(13).is_err());
/// ```
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as StdError;
    use std::io;

    #[test]
    fn test_app_error_from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let app_error: AppError = io_error.into();

        match app_error {
            AppError::Io(inner) => {
                assert_eq!(inner.kind(), io::ErrorKind::NotFound);
            }
            _ => panic!("Expected AppError::Io variant"),
        }
    }

    #[test]
    fn test_app_error_display() {
        let config_error = AppError::Config("Invalid configuration".to_string());
        assert_eq!(
            format!("{}", config_error),
            "Configuration error: Invalid configuration"
        );

        let not_found = AppError::NotFound("No journal entry for today".to_string());
        assert_eq!(
            format!("{}", not_found),
            "Not found: No journal entry for today"
        );

        let unlock = AppError::IncorrectCredential("Incorrect password".to_string());
        assert!(format!("{}", unlock).contains("Incorrect password"));

        assert!(format!("{}", AppError::AuthenticationRequired).contains("log in"));
    }

    #[test]
    fn test_sqlite_error_maps_to_persistence_failure() {
        let err: AppError = rusqlite::Error::QueryReturnedNoRows.into();
        assert_eq!(err.kind(), ErrorKind::PersistenceFailure);
        assert!(!err.is_recoverable());
        assert!(matches!(err, AppError::Database(DatabaseError::Sqlite(_))));
    }

    #[test]
    fn test_recoverable_kinds() {
        assert!(AppError::Duplicate("email".to_string()).is_recoverable());
        assert!(AppError::AuthenticationRequired.is_recoverable());
        assert!(AppError::InvalidArgument("month".to_string()).is_recoverable());
        assert!(!AppError::Config("bad".to_string()).is_recoverable());
    }

    #[test]
    fn test_app_error_source_chaining() {
        let db_error = DatabaseError::Custom("tx failed".to_string());
        let app_error = AppError::Database(db_error);

        let source = app_error.source().expect("database error has a source");
        assert!(source.to_string().contains("tx failed"));
    }
}
