//! Database schema definitions and initialization.
//!
//! Tables are created if absent; there is no versioned migration system.
//! Uniqueness constraints carry the data invariants: one journal per user
//! per save date, one activity record per user per day, and no duplicate
//! journal/tag pairs.

use crate::constants::TAG_TYPE_PREDEFINED;
use crate::errors::{AppResult, DatabaseError};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use tracing::{debug, info};
use uuid::Uuid;

/// Seeded moods: (name, category, emoji).
pub const DEFAULT_MOODS: &[(&str, &str, &str)] = &[
    ("Happy", "positive", "😊"),
    ("Excited", "positive", "🤩"),
    ("Relaxed", "positive", "😌"),
    ("Grateful", "positive", "🙏"),
    ("Confident", "positive", "😎"),
    ("Calm", "neutral", "🙂"),
    ("Thoughtful", "neutral", "🤔"),
    ("Curious", "neutral", "🧐"),
    ("Nostalgic", "neutral", "🥹"),
    ("Bored", "neutral", "😐"),
    ("Sad", "negative", "😢"),
    ("Angry", "negative", "😠"),
    ("Stressed", "negative", "😫"),
    ("Lonely", "negative", "😔"),
    ("Anxious", "negative", "😰"),
];

/// Seeded pre-defined tags.
pub const DEFAULT_TAGS: &[&str] = &[
    "Work",
    "Career",
    "Studies",
    "Family",
    "Friends",
    "Relationships",
    "Health",
    "Fitness",
    "Personal Growth",
    "Self-care",
    "Hobbies",
    "Travel",
    "Nature",
    "Finance",
    "Spirituality",
    "Birthday",
    "Holiday",
    "Vacation",
    "Celebration",
    "Exercise",
    "Reading",
    "Writing",
    "Cooking",
    "Meditation",
    "Yoga",
    "Music",
    "Shopping",
    "Parenting",
    "Projects",
    "Planning",
    "Reflection",
];

/// Creates all database tables and indexes.
///
/// This function is idempotent - it uses `CREATE TABLE IF NOT EXISTS`
/// so it's safe to call multiple times.
///
/// # Tables
///
/// - `users`: Accounts, password hashes and streak counters
/// - `moods`: Mood catalog
/// - `tags`: Tag catalog (pre-defined and custom)
/// - `journals`: One row per user per save date
/// - `journal_tags`: Journal/tag associations
/// - `streaks`: Daily activity records
///
/// # Errors
///
/// Returns an error if any DDL statement fails.
pub fn create_tables(conn: &Connection) -> AppResult<()> {
    debug!("Creating database tables");

    conn.execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(DatabaseError::Sqlite)?;

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            full_name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            journal_lock_hash TEXT NOT NULL,
            current_streak INTEGER NOT NULL DEFAULT 0 CHECK(current_streak >= 0),
            longest_streak INTEGER NOT NULL DEFAULT 0 CHECK(longest_streak >= current_streak),
            created_at DATETIME NOT NULL
        );
        "#,
    )
    .map_err(DatabaseError::Sqlite)?;

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS moods (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            category TEXT NOT NULL,
            emoji TEXT NOT NULL,
            created_at DATETIME NOT NULL
        );

        CREATE TABLE IF NOT EXISTS tags (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            type TEXT NOT NULL CHECK(type IN ('pre-defined', 'custom')),
            created_at DATETIME NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_tags_name ON tags(name COLLATE NOCASE);
        "#,
    )
    .map_err(DatabaseError::Sqlite)?;

    // Moods are weak references: no foreign keys from journals to moods.
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS journals (
            id TEXT PRIMARY KEY,
            created_by TEXT NOT NULL,
            title TEXT NOT NULL,
            content TEXT NOT NULL,
            raw_content TEXT NOT NULL,
            word_count INTEGER NOT NULL DEFAULT 0,
            primary_mood TEXT NOT NULL,
            secondary_mood1 TEXT,
            secondary_mood2 TEXT,
            is_locked INTEGER NOT NULL DEFAULT 0,
            lock_hash TEXT NOT NULL DEFAULT '',
            save_date DATE NOT NULL,
            created_at DATETIME NOT NULL,
            last_updated_at DATETIME NOT NULL,
            FOREIGN KEY (created_by) REFERENCES users(id),
            UNIQUE(created_by, save_date)
        );

        CREATE INDEX IF NOT EXISTS idx_journals_user_date ON journals(created_by, save_date DESC);
        "#,
    )
    .map_err(DatabaseError::Sqlite)?;

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS journal_tags (
            id TEXT PRIMARY KEY,
            journal_id TEXT NOT NULL,
            tag_id TEXT NOT NULL,
            created_at DATETIME NOT NULL,
            FOREIGN KEY (journal_id) REFERENCES journals(id) ON DELETE CASCADE,
            FOREIGN KEY (tag_id) REFERENCES tags(id) ON DELETE CASCADE,
            UNIQUE(journal_id, tag_id)
        );

        CREATE INDEX IF NOT EXISTS idx_journal_tags_journal_id ON journal_tags(journal_id);
        CREATE INDEX IF NOT EXISTS idx_journal_tags_tag_id ON journal_tags(tag_id);
        "#,
    )
    .map_err(DatabaseError::Sqlite)?;

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS streaks (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            activity_date DATE NOT NULL,
            created_at DATETIME NOT NULL,
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
            UNIQUE(user_id, activity_date)
        );

        CREATE INDEX IF NOT EXISTS idx_streaks_user_date ON streaks(user_id, activity_date DESC);
        "#,
    )
    .map_err(DatabaseError::Sqlite)?;

    debug!("Database tables created successfully");
    Ok(())
}

/// Seeds the mood catalog and pre-defined tags if they are empty.
///
/// Each catalog is seeded at most once; user-created tags do not count as
/// "pre-defined" so a database with only custom tags still receives the seed.
pub fn seed_catalogs(conn: &Connection, now: DateTime<Utc>) -> AppResult<()> {
    let mood_count: i64 = conn
        .query_row("SELECT COUNT(*) FROM moods", [], |row| row.get(0))
        .map_err(DatabaseError::Sqlite)?;

    if mood_count == 0 {
        let mut stmt = conn
            .prepare(
                "INSERT INTO moods (id, name, category, emoji, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            )
            .map_err(DatabaseError::Sqlite)?;
        for (name, category, emoji) in DEFAULT_MOODS {
            stmt.execute(params![Uuid::new_v4().to_string(), name, category, emoji, now])
                .map_err(DatabaseError::Sqlite)?;
        }
        info!("Seeded {} moods", DEFAULT_MOODS.len());
    }

    let tag_count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM tags WHERE type = ?1",
            [TAG_TYPE_PREDEFINED],
            |row| row.get(0),
        )
        .map_err(DatabaseError::Sqlite)?;

    if tag_count == 0 {
        let mut stmt = conn
            .prepare("INSERT INTO tags (id, name, type, created_at) VALUES (?1, ?2, ?3, ?4)")
            .map_err(DatabaseError::Sqlite)?;
        for name in DEFAULT_TAGS {
            stmt.execute(params![
                Uuid::new_v4().to_string(),
                name,
                TAG_TYPE_PREDEFINED,
                now
            ])
            .map_err(DatabaseError::Sqlite)?;
        }
        info!("Seeded {} pre-defined tags", DEFAULT_TAGS.len());
    }

    Ok(())
}
