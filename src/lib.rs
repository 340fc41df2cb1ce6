/*!
# EntryIt

EntryIt is the core of a daily journaling app: accounts, one journal entry
per day with moods and tags, optional per-entry password locks, writing
streaks, search and dashboard aggregations, and export of resolved entries
to document renderers.

## Architecture

- `db`: SQLite storage through an r2d2 pool; one module per table
- `ops`: Synchronous operations that take the acting user and the date explicitly
- `app`: The async [`EntryIt`] facade with the session cache and change events
- `crypto`: Argon2id hashing for account and journal-lock passwords
- `config` / `logging`: Environment configuration and tracing setup for the binary
- `cli`: Command-line interface handling using clap

## Usage Example

```rust,no_run
use entryit::models::SaveJournalRequest;
use entryit::{Config, EntryIt};

#[tokio::main]
async fn main() -> entryit::AppResult<()> {
    let app = EntryIt::open(&Config::load()?)?;
    app.login("alice", "alicepw1!").await?;

    let mood = app.get_moods().await?[0].id;
    let saved = app
        .save_journal(SaveJournalRequest {
            title: "First day".to_string(),
            primary_mood: mood,
            ..Default::default()
        })
        .await?;
    println!("{} (streak {})", saved.message, saved.updated_streak);
    Ok(())
}
```
*/

/// Async facade: session, clock and change notification
pub mod app;
/// Command-line interface for parsing and handling user arguments
pub mod cli;
/// Time source for "today" and "now"
pub mod clock;
/// Configuration loading and management
pub mod config;
/// Application-wide constants
pub mod constants;
/// Password hashing
pub mod crypto;
/// Storage layer
pub mod db;
/// Error types and utilities for error handling
pub mod errors;
/// Tracing subscriber setup
pub mod logging;
/// Domain types shared across layers
pub mod models;
/// Journaling operations
pub mod ops;
/// Session cache and change events
pub mod session;
/// Input validation helpers
pub mod validation;

// Re-export important types for convenience
pub use app::EntryIt;
pub use config::Config;
pub use errors::{AppError, AppResult, ErrorKind};
pub use session::ChangeEvent;
