//! Domain types shared by the storage layer, the operations and the facade.
//!
//! Everything here is plain data. Records that mirror a table row one-to-one
//! live next to their queries in `db`; these are the shapes callers see.

use crate::constants::{DEFAULT_PER_PAGE, TAG_TYPE_CUSTOM, TAG_TYPE_PREDEFINED};
use crate::errors::AppError;
use crate::validation;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Whether a tag was seeded or created by a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TagType {
    PreDefined,
    Custom,
}

impl TagType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TagType::PreDefined => TAG_TYPE_PREDEFINED,
            TagType::Custom => TAG_TYPE_CUSTOM,
        }
    }
}

impl fmt::Display for TagType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TagType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            TAG_TYPE_PREDEFINED => Ok(TagType::PreDefined),
            TAG_TYPE_CUSTOM => Ok(TagType::Custom),
            other => Err(AppError::InvalidArgument(format!(
                "Unknown tag type '{}'",
                other
            ))),
        }
    }
}

/// A tag from the shared catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub tag_type: TagType,
    pub created_at: DateTime<Utc>,
}

/// A mood from the shared catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mood {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub emoji: String,
    pub created_at: DateTime<Utc>,
}

/// Denormalized view of the logged-in user.
///
/// This is a snapshot: streak counters change in storage whenever a journal
/// is created or deleted, and the snapshot only follows when the facade
/// applies the counters a mutating call returned, or on `refresh_user`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentUser {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub username: String,
    pub current_streak: u32,
    pub longest_streak: u32,
}

impl CurrentUser {
    pub fn initials(&self) -> String {
        validation::initials(&self.full_name)
    }
}

/// Input to sign-up.
#[derive(Debug, Clone)]
pub struct SignUpRequest {
    pub full_name: String,
    pub email: String,
    pub username: String,
    pub password: String,
    /// Default password used when a journal is locked "with the default password".
    pub journal_lock_password: String,
}

/// Input to `save_journal`. Always targets today's entry.
#[derive(Debug, Clone, Default)]
pub struct SaveJournalRequest {
    pub title: String,
    /// Rendered (rich) content.
    pub content: String,
    /// Plain text used for search and export.
    pub raw_content: String,
    pub word_count: u32,
    pub primary_mood: Uuid,
    pub secondary_mood1: Option<Uuid>,
    pub secondary_mood2: Option<Uuid>,
    pub lock: bool,
    pub use_default_password: bool,
    pub custom_password: Option<String>,
    pub tag_ids: Vec<Uuid>,
}

/// Whether a save created today's entry or updated it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveOutcome {
    Created,
    Updated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaveResponse {
    pub journal_id: Uuid,
    pub outcome: SaveOutcome,
    pub message: String,
    pub updated_streak: u32,
}

/// Counters returned by the streak engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StreakCounters {
    pub current_streak: u32,
    pub longest_streak: u32,
}

/// A fully hydrated journal entry.
///
/// Returned regardless of lock state; gating the content behind
/// `unlock_journal` is the caller's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JournalView {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub raw_content: String,
    pub word_count: u32,
    pub primary_mood: Uuid,
    pub secondary_mood1: Option<Uuid>,
    pub secondary_mood2: Option<Uuid>,
    pub is_locked: bool,
    pub save_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LockStatus {
    pub journal_id: Uuid,
    pub is_locked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnlockResponse {
    pub journal_id: Uuid,
    pub has_unlocked: bool,
    pub message: String,
}

/// Filters for the paginated journal listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalSearchFilters {
    /// Case-insensitive substring; matches title always, content only when unlocked.
    pub search_key: Option<String>,
    pub from_date: Option<NaiveDate>,
    pub to_date: NaiveDate,
    pub mood_ids: Vec<Uuid>,
    pub tag_ids: Vec<Uuid>,
    /// 1-indexed.
    pub page: u32,
    pub per_page: u32,
}

impl JournalSearchFilters {
    /// Unfiltered listing up to and including `to_date`, first page.
    pub fn up_to(to_date: NaiveDate) -> Self {
        Self {
            search_key: None,
            from_date: None,
            to_date,
            mood_ids: Vec::new(),
            tag_ids: Vec::new(),
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

/// Content, mood and tag detail of an unlocked search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JournalExtraInfo {
    pub content: String,
    pub raw_content: String,
    pub word_count: u32,
    pub primary_mood: Option<Mood>,
    pub secondary_mood1: Option<Mood>,
    pub secondary_mood2: Option<Mood>,
    pub tags: Vec<Tag>,
}

/// One row of a listing. `journal_info` is `None` for locked entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JournalSearchItem {
    pub journal_id: Uuid,
    pub title: String,
    pub save_date: NaiveDate,
    pub is_locked: bool,
    pub journal_info: Option<JournalExtraInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JournalSearchResult {
    pub results: Vec<JournalSearchItem>,
    pub current_page: u32,
    pub total_pages: u32,
    pub total_count: u64,
}

/// Inclusive save-date window for dashboard queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: Option<NaiveDate>, to: NaiveDate) -> Self {
        Self { from, to }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoodDistribution {
    pub mood: Mood,
    pub count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WordCountPoint {
    pub date: NaiveDate,
    pub word_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_type_roundtrip_strings() {
        assert_eq!("custom".parse::<TagType>().unwrap(), TagType::Custom);
        assert_eq!(
            "pre-defined".parse::<TagType>().unwrap(),
            TagType::PreDefined
        );
        assert!("global".parse::<TagType>().is_err());
        assert_eq!(TagType::PreDefined.to_string(), "pre-defined");
    }

    #[test]
    fn test_search_filters_defaults() {
        let to = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let filters = JournalSearchFilters::up_to(to);
        assert_eq!(filters.page, 1);
        assert_eq!(filters.per_page, DEFAULT_PER_PAGE);
        assert!(filters.search_key.is_none());
    }

    #[test]
    fn test_current_user_initials() {
        let user = CurrentUser {
            id: Uuid::new_v4(),
            full_name: "alice liddell".to_string(),
            email: "alice@x.com".to_string(),
            username: "alice".to_string(),
            current_streak: 0,
            longest_streak: 0,
        };
        assert_eq!(user.initials(), "AL");
    }
}
