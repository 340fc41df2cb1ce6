//! Journal CRUD and the filtered listing query.
//!
//! The natural key of a journal is `(created_by, save_date)`; lookups for
//! "today's entry" go through [`find_by_date`], never by id.

use crate::db::{opt_uuid_column, placeholders, uuid_column, UNICODE_LOWER_FN};
use crate::errors::{AppResult, DatabaseError};
use crate::models::{DateRange, JournalSearchFilters};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::ToSql;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use tracing::debug;
use uuid::Uuid;

/// A row of the `journals` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalRecord {
    pub id: Uuid,
    pub created_by: Uuid,
    pub title: String,
    pub content: String,
    pub raw_content: String,
    pub word_count: u32,
    pub primary_mood: Uuid,
    pub secondary_mood1: Option<Uuid>,
    pub secondary_mood2: Option<Uuid>,
    pub is_locked: bool,
    /// Empty when the journal is not locked.
    pub lock_hash: String,
    pub save_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
}

impl JournalRecord {
    /// Mood ids referenced by this journal, primary first.
    pub fn mood_ids(&self) -> Vec<Uuid> {
        std::iter::once(self.primary_mood)
            .chain(self.secondary_mood1)
            .chain(self.secondary_mood2)
            .collect()
    }
}

const JOURNAL_COLUMNS: &str = "j.id, j.created_by, j.title, j.content, j.raw_content, j.word_count, \
     j.primary_mood, j.secondary_mood1, j.secondary_mood2, j.is_locked, j.lock_hash, \
     j.save_date, j.created_at, j.last_updated_at";

fn map_journal(row: &Row<'_>) -> rusqlite::Result<JournalRecord> {
    Ok(JournalRecord {
        id: uuid_column(row, 0)?,
        created_by: uuid_column(row, 1)?,
        title: row.get(2)?,
        content: row.get(3)?,
        raw_content: row.get(4)?,
        word_count: row.get::<_, i64>(5)?.max(0) as u32,
        primary_mood: uuid_column(row, 6)?,
        secondary_mood1: opt_uuid_column(row, 7)?,
        secondary_mood2: opt_uuid_column(row, 8)?,
        is_locked: row.get(9)?,
        lock_hash: row.get(10)?,
        save_date: row.get(11)?,
        created_at: row.get(12)?,
        last_updated_at: row.get(13)?,
    })
}

/// Inserts a new journal row.
pub fn insert_journal(conn: &Connection, journal: &JournalRecord) -> AppResult<()> {
    debug!(
        "Inserting journal {} for {} on {}",
        journal.id, journal.created_by, journal.save_date
    );

    conn.execute(
        r#"
        INSERT INTO journals (id, created_by, title, content, raw_content, word_count,
                              primary_mood, secondary_mood1, secondary_mood2, is_locked, lock_hash,
                              save_date, created_at, last_updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
        "#,
        params![
            journal.id.to_string(),
            journal.created_by.to_string(),
            journal.title,
            journal.content,
            journal.raw_content,
            journal.word_count as i64,
            journal.primary_mood.to_string(),
            journal.secondary_mood1.map(|id| id.to_string()),
            journal.secondary_mood2.map(|id| id.to_string()),
            journal.is_locked,
            journal.lock_hash,
            journal.save_date,
            journal.created_at,
            journal.last_updated_at,
        ],
    )
    .map_err(DatabaseError::Sqlite)?;
    Ok(())
}

/// Overwrites the mutable fields of an existing journal.
///
/// Owner, save date and creation time are never changed.
pub fn update_journal(conn: &Connection, journal: &JournalRecord) -> AppResult<usize> {
    debug!("Updating journal {}", journal.id);

    let rows = conn
        .execute(
            r#"
            UPDATE journals SET
                title = ?2,
                content = ?3,
                raw_content = ?4,
                word_count = ?5,
                primary_mood = ?6,
                secondary_mood1 = ?7,
                secondary_mood2 = ?8,
                is_locked = ?9,
                lock_hash = ?10,
                last_updated_at = ?11
            WHERE id = ?1
            "#,
            params![
                journal.id.to_string(),
                journal.title,
                journal.content,
                journal.raw_content,
                journal.word_count as i64,
                journal.primary_mood.to_string(),
                journal.secondary_mood1.map(|id| id.to_string()),
                journal.secondary_mood2.map(|id| id.to_string()),
                journal.is_locked,
                journal.lock_hash,
                journal.last_updated_at,
            ],
        )
        .map_err(DatabaseError::Sqlite)?;
    Ok(rows)
}

/// The user's journal for `date`, if any.
pub fn find_by_date(
    conn: &Connection,
    user_id: Uuid,
    date: NaiveDate,
) -> AppResult<Option<JournalRecord>> {
    let sql = format!(
        "SELECT {} FROM journals j WHERE j.created_by = ?1 AND j.save_date = ?2",
        JOURNAL_COLUMNS
    );
    conn.query_row(&sql, params![user_id.to_string(), date], map_journal)
        .optional()
        .map_err(|e| DatabaseError::Sqlite(e).into())
}

/// A journal by id, regardless of owner.
pub fn find_by_id(conn: &Connection, journal_id: Uuid) -> AppResult<Option<JournalRecord>> {
    let sql = format!("SELECT {} FROM journals j WHERE j.id = ?1", JOURNAL_COLUMNS);
    conn.query_row(&sql, [journal_id.to_string()], map_journal)
        .optional()
        .map_err(|e| DatabaseError::Sqlite(e).into())
}

/// Deletes a journal row. Tag associations cascade.
pub fn delete_journal(conn: &Connection, journal_id: Uuid) -> AppResult<usize> {
    debug!("Deleting journal {}", journal_id);

    let rows = conn
        .execute(
            "DELETE FROM journals WHERE id = ?1",
            [journal_id.to_string()],
        )
        .map_err(DatabaseError::Sqlite)?;
    Ok(rows)
}

/// The user's journals within a save-date window, ascending by date.
pub fn list_in_range(
    conn: &Connection,
    user_id: Uuid,
    range: DateRange,
) -> AppResult<Vec<JournalRecord>> {
    let mut sql = format!(
        "SELECT {} FROM journals j WHERE j.created_by = ? AND j.save_date <= ?",
        JOURNAL_COLUMNS
    );
    let mut values: Vec<Box<dyn ToSql>> = vec![Box::new(user_id.to_string()), Box::new(range.to)];
    if let Some(from) = range.from {
        sql.push_str(" AND j.save_date >= ?");
        values.push(Box::new(from));
    }
    sql.push_str(" ORDER BY j.save_date ASC");

    let mut stmt = conn.prepare(&sql).map_err(DatabaseError::Sqlite)?;
    let journals = stmt
        .query_map(params_from_iter(values.iter()), map_journal)
        .map_err(DatabaseError::Sqlite)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(DatabaseError::Sqlite)?;
    Ok(journals)
}

/// Escapes `%`, `_` and `\` for a `LIKE ... ESCAPE '\'` pattern.
fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for ch in needle.to_lowercase().chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

/// Builds the shared `WHERE` clause of the listing query.
///
/// Content only matches the search key when the journal is unlocked, so a
/// locked entry can be found by title but never by what it says.
fn search_predicate(user_id: Uuid, filters: &JournalSearchFilters) -> (String, Vec<Box<dyn ToSql>>) {
    let mut clauses = vec!["j.created_by = ?".to_string(), "j.save_date <= ?".to_string()];
    let mut values: Vec<Box<dyn ToSql>> =
        vec![Box::new(user_id.to_string()), Box::new(filters.to_date)];

    if let Some(from) = filters.from_date {
        clauses.push("j.save_date >= ?".to_string());
        values.push(Box::new(from));
    }

    if let Some(key) = filters.search_key.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
        clauses.push(format!(
            "({0}(j.title) LIKE ? ESCAPE '\\' OR (j.is_locked = 0 AND {0}(j.raw_content) LIKE ? ESCAPE '\\'))",
            UNICODE_LOWER_FN
        ));
        let pattern = like_pattern(key);
        values.push(Box::new(pattern.clone()));
        values.push(Box::new(pattern));
    }

    if !filters.mood_ids.is_empty() {
        let marks = placeholders(filters.mood_ids.len());
        clauses.push(format!(
            "(j.primary_mood IN ({0}) OR j.secondary_mood1 IN ({0}) OR j.secondary_mood2 IN ({0}))",
            marks
        ));
        for _ in 0..3 {
            for id in &filters.mood_ids {
                values.push(Box::new(id.to_string()));
            }
        }
    }

    if !filters.tag_ids.is_empty() {
        clauses.push(format!(
            "EXISTS (SELECT 1 FROM journal_tags jt WHERE jt.journal_id = j.id AND jt.tag_id IN ({}))",
            placeholders(filters.tag_ids.len())
        ));
        for id in &filters.tag_ids {
            values.push(Box::new(id.to_string()));
        }
    }

    (clauses.join(" AND "), values)
}

/// Runs the filtered listing: total match count plus one page of rows,
/// newest save date first.
pub fn search(
    conn: &Connection,
    user_id: Uuid,
    filters: &JournalSearchFilters,
    limit: u32,
    offset: u64,
) -> AppResult<(u64, Vec<JournalRecord>)> {
    let (predicate, mut values) = search_predicate(user_id, filters);

    let count_sql = format!("SELECT COUNT(*) FROM journals j WHERE {}", predicate);
    let total: i64 = conn
        .query_row(&count_sql, params_from_iter(values.iter()), |row| row.get(0))
        .map_err(DatabaseError::Sqlite)?;

    let page_sql = format!(
        "SELECT {} FROM journals j WHERE {} ORDER BY j.save_date DESC LIMIT ? OFFSET ?",
        JOURNAL_COLUMNS, predicate
    );
    values.push(Box::new(limit as i64));
    values.push(Box::new(offset as i64));

    let mut stmt = conn.prepare(&page_sql).map_err(DatabaseError::Sqlite)?;
    let rows = stmt
        .query_map(params_from_iter(values.iter()), map_journal)
        .map_err(DatabaseError::Sqlite)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(DatabaseError::Sqlite)?;

    debug!("Listing matched {} journals, returning {}", total, rows.len());
    Ok((total.max(0) as u64, rows))
}
