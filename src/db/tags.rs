//! Tag catalog and journal/tag associations.

use crate::db::{placeholders, uuid_column};
use crate::errors::{AppResult, DatabaseError};
use crate::models::{Tag, TagType};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

fn tag_type_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<TagType> {
    let raw: String = row.get(idx)?;
    raw.parse::<TagType>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn map_tag(row: &Row<'_>) -> rusqlite::Result<Tag> {
    Ok(Tag {
        id: uuid_column(row, 0)?,
        name: row.get(1)?,
        tag_type: tag_type_column(row, 2)?,
        created_at: row.get(3)?,
    })
}

/// All tags, pre-defined first, then by name.
pub fn list_tags(conn: &Connection) -> AppResult<Vec<Tag>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, name, type, created_at FROM tags ORDER BY type DESC, name COLLATE NOCASE",
        )
        .map_err(DatabaseError::Sqlite)?;

    let tags = stmt
        .query_map([], map_tag)
        .map_err(DatabaseError::Sqlite)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(DatabaseError::Sqlite)?;
    Ok(tags)
}

/// Inserts a tag row.
pub fn insert_tag(conn: &Connection, tag: &Tag) -> AppResult<()> {
    debug!("Inserting {} tag {}", tag.tag_type, tag.id);

    conn.execute(
        "INSERT INTO tags (id, name, type, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![
            tag.id.to_string(),
            tag.name,
            tag.tag_type.as_str(),
            tag.created_at
        ],
    )
    .map_err(DatabaseError::Sqlite)?;
    Ok(())
}

/// Case-insensitive lookup by name.
pub fn find_by_name(conn: &Connection, name: &str) -> AppResult<Option<Tag>> {
    conn.query_row(
        "SELECT id, name, type, created_at FROM tags WHERE name = ?1 COLLATE NOCASE LIMIT 1",
        [name.trim()],
        map_tag,
    )
    .optional()
    .map_err(|e| DatabaseError::Sqlite(e).into())
}

/// Tag ids currently associated with a journal.
pub fn tag_ids_for_journal(conn: &Connection, journal_id: Uuid) -> AppResult<Vec<Uuid>> {
    let mut stmt = conn
        .prepare("SELECT tag_id FROM journal_tags WHERE journal_id = ?1")
        .map_err(DatabaseError::Sqlite)?;

    let ids = stmt
        .query_map([journal_id.to_string()], |row| uuid_column(row, 0))
        .map_err(DatabaseError::Sqlite)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(DatabaseError::Sqlite)?;
    Ok(ids)
}

/// Tags associated with a single journal.
pub fn tags_for_journal(conn: &Connection, journal_id: Uuid) -> AppResult<Vec<Tag>> {
    let mut by_journal = tags_for_journals(conn, &[journal_id])?;
    Ok(by_journal.remove(&journal_id).unwrap_or_default())
}

/// Batch lookup of the tags of many journals in one query.
///
/// Journals without tags are absent from the map.
pub fn tags_for_journals(
    conn: &Connection,
    journal_ids: &[Uuid],
) -> AppResult<HashMap<Uuid, Vec<Tag>>> {
    if journal_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let sql = format!(
        r#"
        SELECT jt.journal_id, t.id, t.name, t.type, t.created_at
        FROM journal_tags jt
        JOIN tags t ON t.id = jt.tag_id
        WHERE jt.journal_id IN ({})
        ORDER BY t.name COLLATE NOCASE
        "#,
        placeholders(journal_ids.len())
    );
    let mut stmt = conn.prepare(&sql).map_err(DatabaseError::Sqlite)?;
    let rows = stmt
        .query_map(
            params_from_iter(journal_ids.iter().map(|id| id.to_string())),
            |row| {
                Ok((
                    uuid_column(row, 0)?,
                    Tag {
                        id: uuid_column(row, 1)?,
                        name: row.get(2)?,
                        tag_type: tag_type_column(row, 3)?,
                        created_at: row.get(4)?,
                    },
                ))
            },
        )
        .map_err(DatabaseError::Sqlite)?;

    let mut by_journal: HashMap<Uuid, Vec<Tag>> = HashMap::new();
    for row in rows {
        let (journal_id, tag) = row.map_err(DatabaseError::Sqlite)?;
        by_journal.entry(journal_id).or_default().push(tag);
    }
    Ok(by_journal)
}

/// Associates tags with a journal, one row per tag.
pub fn add_journal_tags(
    conn: &Connection,
    journal_id: Uuid,
    tag_ids: &[Uuid],
    now: DateTime<Utc>,
) -> AppResult<usize> {
    if tag_ids.is_empty() {
        return Ok(0);
    }
    debug!("Adding {} tags to journal {}", tag_ids.len(), journal_id);

    let mut stmt = conn
        .prepare(
            "INSERT INTO journal_tags (id, journal_id, tag_id, created_at) VALUES (?1, ?2, ?3, ?4)",
        )
        .map_err(DatabaseError::Sqlite)?;

    let mut inserted = 0;
    for tag_id in tag_ids {
        inserted += stmt
            .execute(params![
                Uuid::new_v4().to_string(),
                journal_id.to_string(),
                tag_id.to_string(),
                now
            ])
            .map_err(DatabaseError::Sqlite)?;
    }
    Ok(inserted)
}

/// Removes the given tag associations from a journal.
pub fn remove_journal_tags(conn: &Connection, journal_id: Uuid, tag_ids: &[Uuid]) -> AppResult<usize> {
    if tag_ids.is_empty() {
        return Ok(0);
    }
    debug!("Removing {} tags from journal {}", tag_ids.len(), journal_id);

    let sql = format!(
        "DELETE FROM journal_tags WHERE journal_id = ? AND tag_id IN ({})",
        placeholders(tag_ids.len())
    );
    let values = std::iter::once(journal_id.to_string()).chain(tag_ids.iter().map(|id| id.to_string()));
    let removed = conn
        .execute(&sql, params_from_iter(values))
        .map_err(DatabaseError::Sqlite)?;
    Ok(removed)
}

/// Removes every tag association of a journal.
pub fn delete_all_for_journal(conn: &Connection, journal_id: Uuid) -> AppResult<usize> {
    let removed = conn
        .execute(
            "DELETE FROM journal_tags WHERE journal_id = ?1",
            [journal_id.to_string()],
        )
        .map_err(DatabaseError::Sqlite)?;
    Ok(removed)
}
