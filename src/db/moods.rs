//! Mood catalog queries.

use crate::db::{placeholders, uuid_column};
use crate::errors::{AppResult, DatabaseError};
use crate::models::Mood;
use rusqlite::{params_from_iter, Connection, OptionalExtension, Row};
use std::collections::HashMap;
use uuid::Uuid;

fn map_mood(row: &Row<'_>) -> rusqlite::Result<Mood> {
    Ok(Mood {
        id: uuid_column(row, 0)?,
        name: row.get(1)?,
        category: row.get(2)?,
        emoji: row.get(3)?,
        created_at: row.get(4)?,
    })
}

/// All moods, grouped by category then name.
pub fn list_moods(conn: &Connection) -> AppResult<Vec<Mood>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, name, category, emoji, created_at FROM moods ORDER BY category, name",
        )
        .map_err(DatabaseError::Sqlite)?;

    let moods = stmt
        .query_map([], map_mood)
        .map_err(DatabaseError::Sqlite)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(DatabaseError::Sqlite)?;
    Ok(moods)
}

/// Batch lookup of moods by id. Unknown ids are absent from the map.
pub fn moods_by_ids(conn: &Connection, ids: &[Uuid]) -> AppResult<HashMap<Uuid, Mood>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let sql = format!(
        "SELECT id, name, category, emoji, created_at FROM moods WHERE id IN ({})",
        placeholders(ids.len())
    );
    let mut stmt = conn.prepare(&sql).map_err(DatabaseError::Sqlite)?;
    let rows = stmt
        .query_map(params_from_iter(ids.iter().map(|id| id.to_string())), map_mood)
        .map_err(DatabaseError::Sqlite)?;

    let mut moods = HashMap::with_capacity(ids.len());
    for mood in rows {
        let mood = mood.map_err(DatabaseError::Sqlite)?;
        moods.insert(mood.id, mood);
    }
    Ok(moods)
}

/// Case-insensitive lookup by name.
pub fn find_by_name(conn: &Connection, name: &str) -> AppResult<Option<Mood>> {
    conn.query_row(
        "SELECT id, name, category, emoji, created_at FROM moods WHERE name = ?1 COLLATE NOCASE",
        [name.trim()],
        map_mood,
    )
    .optional()
    .map_err(|e| DatabaseError::Sqlite(e).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::DEFAULT_MOODS;
    use crate::db::test_support::test_db;

    #[test]
    fn test_list_moods_returns_seed() {
        let (_dir, db) = test_db();
        let conn = db.get_conn().unwrap();
        let moods = list_moods(&conn).unwrap();
        assert_eq!(moods.len(), DEFAULT_MOODS.len());
        assert!(moods.iter().any(|m| m.name == "Happy" && m.emoji == "😊"));
    }

    #[test]
    fn test_moods_by_ids_skips_unknown() {
        let (_dir, db) = test_db();
        let conn = db.get_conn().unwrap();
        let happy = find_by_name(&conn, "happy").unwrap().unwrap();
        let sad = find_by_name(&conn, "SAD").unwrap().unwrap();

        let map = moods_by_ids(&conn, &[happy.id, sad.id, Uuid::new_v4()]).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map[&happy.id].name, "Happy");
        assert!(moods_by_ids(&conn, &[]).unwrap().is_empty());
    }
}
