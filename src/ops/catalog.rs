//! Mood and tag catalogs.

use crate::db::{moods, tags, Database};
use crate::errors::{AppError, AppResult};
use crate::models::{Mood, Tag, TagType};
use crate::validation::is_blank;
use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

/// All moods in the catalog.
pub fn get_moods(db: &Database) -> AppResult<Vec<Mood>> {
    let conn = db.get_conn()?;
    moods::list_moods(&conn)
}

/// All tags, pre-defined and custom.
pub fn get_tags(db: &Database) -> AppResult<Vec<Tag>> {
    let conn = db.get_conn()?;
    tags::list_tags(&conn)
}

/// Adds a custom tag to the shared catalog.
///
/// # Errors
///
/// - `InvalidArgument` if the name is blank
/// - `Duplicate` if a tag with the same name exists, ignoring case
pub fn add_custom_tag(db: &Database, name: &str, now: DateTime<Utc>) -> AppResult<Tag> {
    if is_blank(name) {
        return Err(AppError::InvalidArgument(
            "Tag name cannot be empty".to_string(),
        ));
    }
    let name = name.trim();

    let tag = db.transaction(|tx| {
        if tags::find_by_name(tx, name)?.is_some() {
            return Err(AppError::Duplicate(format!("Tag '{}' already exists", name)));
        }

        let tag = Tag {
            id: Uuid::new_v4(),
            name: name.to_string(),
            tag_type: TagType::Custom,
            created_at: now,
        };
        tags::insert_tag(tx, &tag)?;
        Ok(tag)
    })?;

    info!("Added custom tag {}", tag.id);
    Ok(tag)
}

/// Resolves mood names to ids, case-insensitively.
pub fn resolve_moods(db: &Database, names: &[String]) -> AppResult<Vec<Uuid>> {
    let conn = db.get_conn()?;
    names
        .iter()
        .map(|name| {
            moods::find_by_name(&conn, name)?
                .map(|mood| mood.id)
                .ok_or_else(|| AppError::NotFound(format!("Mood '{}' not found", name)))
        })
        .collect()
}

/// Resolves tag names to ids, case-insensitively.
pub fn resolve_tags(db: &Database, names: &[String]) -> AppResult<Vec<Uuid>> {
    let conn = db.get_conn()?;
    names
        .iter()
        .map(|name| {
            tags::find_by_name(&conn, name)?
                .map(|tag| tag.id)
                .ok_or_else(|| AppError::NotFound(format!("Tag '{}' not found", name)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::{DEFAULT_MOODS, DEFAULT_TAGS};
    use crate::db::test_support::test_db;
    use crate::errors::ErrorKind;

    #[test]
    fn test_catalogs_are_seeded() {
        let (_dir, db) = test_db();
        assert_eq!(get_moods(&db).unwrap().len(), DEFAULT_MOODS.len());
        let tags = get_tags(&db).unwrap();
        assert_eq!(tags.len(), DEFAULT_TAGS.len());
        assert!(tags.iter().all(|t| t.tag_type == TagType::PreDefined));
    }

    #[test]
    fn test_add_custom_tag() {
        let (_dir, db) = test_db();
        let tag = add_custom_tag(&db, "  Gardening ", Utc::now()).unwrap();
        assert_eq!(tag.name, "Gardening");
        assert_eq!(tag.tag_type, TagType::Custom);
        assert_eq!(get_tags(&db).unwrap().len(), DEFAULT_TAGS.len() + 1);

        let err = add_custom_tag(&db, "gardening", Utc::now()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Duplicate);
        let err = add_custom_tag(&db, "work", Utc::now()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Duplicate);
        let err = add_custom_tag(&db, "   ", Utc::now()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_resolve_names() {
        let (_dir, db) = test_db();
        let ids = resolve_tags(&db, &["work".to_string(), "TRAVEL".to_string()]).unwrap();
        assert_eq!(ids.len(), 2);

        let mood_name = DEFAULT_MOODS[0].0.to_uppercase();
        assert_eq!(resolve_moods(&db, &[mood_name]).unwrap().len(), 1);

        let err = resolve_tags(&db, &["no such tag".to_string()]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
