//! High-level journaling operations.
//!
//! Each operation takes the [`Database`](crate::db::Database), the acting
//! user and, where the calendar matters, `today`/`now` explicitly. Compound
//! writes run inside a single transaction.

pub mod auth;
pub mod catalog;
pub mod dashboard;
pub mod export;
pub mod journal;
pub mod search;
pub mod streak;

// Re-export commonly used functions
pub use auth::{load_current_user, login, sign_up};
pub use catalog::{add_custom_tag, get_moods, get_tags, resolve_moods, resolve_tags};
pub use dashboard::{current_month_streak, mood_distribution, word_count_distributions};
pub use export::{
    export_journal, export_range, DocumentRenderer, ExportJournal, JsonRenderer, MarkdownRenderer,
};
pub use journal::{
    delete_journal, delete_today_journal, get_journal, get_journal_lock_status, save_journal,
    unlock_journal,
};
pub use search::get_journal_lists;
pub use streak::{decrement_streak, increment_streak};
