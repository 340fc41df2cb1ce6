//! Constants used throughout the application.
//!
//! This module contains all constants used in the entryit application, organized
//! into logical groups. Having constants centralized makes them easier to find,
//! modify, and reference consistently.

// Application Metadata
/// The name of the application.
pub const APP_NAME: &str = "entryit";
/// The description of the application used in CLI help text.
pub const APP_DESCRIPTION: &str = "A daily journal with moods, tags and writing streaks";

// Logging
/// Log format identifier for plain text.
pub const LOG_FORMAT_TEXT: &str = "text";
/// Log format identifier for JSON.
pub const LOG_FORMAT_JSON: &str = "json";
/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";
/// Service name used in tracing spans and structured logs.
pub const TRACING_SERVICE_NAME: &str = "entryit";

// Configuration Keys & Environment Variables
/// Environment variable for the database file location.
pub const ENV_VAR_ENTRYIT_DB: &str = "ENTRYIT_DB";
/// Environment variable selecting the log output format.
pub const ENV_VAR_ENTRYIT_LOG_FORMAT: &str = "ENTRYIT_LOG_FORMAT";
/// Standard environment variable for log filtering.
pub const ENV_VAR_RUST_LOG: &str = "RUST_LOG";
/// Non-interactive account password (tests, scripts).
pub const ENV_VAR_ENTRYIT_PASSWORD: &str = "ENTRYIT_PASSWORD";
/// Non-interactive journal lock password (tests, scripts).
pub const ENV_VAR_ENTRYIT_LOCK_PASSWORD: &str = "ENTRYIT_LOCK_PASSWORD";
/// Standard environment variable for the user's home directory.
pub const ENV_VAR_HOME: &str = "HOME";
/// Default database location, relative to the home directory.
pub const DEFAULT_DB_SUBPATH: &str = ".local/share/entryit/entryit.db";
/// Placeholder string for redacted information in debug output.
pub const REDACTED_PLACEHOLDER: &str = "[REDACTED]";

// Database
/// Maximum number of pooled SQLite connections.
pub const DB_POOL_MAX_SIZE: u32 = 5;
/// Busy timeout applied to each pooled connection, in milliseconds.
pub const DB_BUSY_TIMEOUT_MS: u64 = 5_000;

// Journal
/// Tag type for seeded tags.
pub const TAG_TYPE_PREDEFINED: &str = "pre-defined";
/// Tag type for user-created tags.
pub const TAG_TYPE_CUSTOM: &str = "custom";
/// Message returned when today's entry is created.
pub const MSG_JOURNAL_CREATED: &str = "Journal entry created successfully";
/// Message returned when today's entry is updated.
pub const MSG_JOURNAL_UPDATED: &str = "Journal entry updated successfully";
/// Message returned when unlocking an entry that has no lock.
pub const MSG_JOURNAL_NOT_LOCKED: &str = "Journal is not locked";
/// Message returned when the unlock password matches.
pub const MSG_JOURNAL_UNLOCKED: &str = "Journal unlocked successfully";
/// Failure message for the today's-entry delete variant.
pub const MSG_NO_ENTRY_TODAY: &str = "No journal entry for today";
/// Failure message for a wrong unlock password.
pub const MSG_INCORRECT_PASSWORD: &str = "Incorrect password";

// Search
/// Default page size for journal listings.
pub const DEFAULT_PER_PAGE: u32 = 10;

// Validation
/// Minimum account password length.
pub const MIN_PASSWORD_LENGTH: usize = 6;

// Date/Time Logic
/// Date format string for ISO date format (YYYY-MM-DD).
pub const DATE_FORMAT_ISO: &str = "%Y-%m-%d";
/// Date format string for compact date format (YYYYMMDD).
pub const DATE_FORMAT_COMPACT: &str = "%Y%m%d";
/// Date format used in exported document headers.
pub const EXPORT_HEADER_DATE_FORMAT: &str = "%B %d, %Y: %A";
