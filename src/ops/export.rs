//! Export of fully-resolved journals to document renderers.
//!
//! The core resolves moods and tags, applies ownership and lock checks, and
//! hands plain [`ExportJournal`] values to a [`DocumentRenderer`]. Layout is
//! the renderer's business.

use crate::constants::{EXPORT_HEADER_DATE_FORMAT, MSG_INCORRECT_PASSWORD};
use crate::crypto::verify_password;
use crate::db::journals::{self, JournalRecord};
use crate::db::{moods, tags, Database};
use crate::errors::{AppError, AppResult};
use crate::models::{CurrentUser, DateRange, Mood, Tag};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::Connection;
use serde::Serialize;
use std::fmt::Write as _;
use tracing::{debug, info};
use uuid::Uuid;

/// A journal with every reference resolved, ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportJournal {
    pub title: String,
    pub save_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
    pub word_count: u32,
    /// Rich-text body as written in the editor.
    pub content: String,
    /// Plain-text body.
    pub raw_content: String,
    pub primary_mood: Option<Mood>,
    pub secondary_moods: Vec<Mood>,
    pub tags: Vec<Tag>,
}

/// Turns resolved journals into document bytes.
pub trait DocumentRenderer: Send + Sync {
    fn render(&self, journals: &[ExportJournal]) -> AppResult<Vec<u8>>;

    /// Extension for files holding this renderer's output, without the dot.
    fn file_extension(&self) -> &'static str;
}

/// Plain Markdown, one section per journal.
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkdownRenderer;

impl DocumentRenderer for MarkdownRenderer {
    fn render(&self, journals: &[ExportJournal]) -> AppResult<Vec<u8>> {
        let mut out = String::new();
        for (i, journal) in journals.iter().enumerate() {
            if i > 0 {
                out.push_str("\n---\n\n");
            }
            write_markdown(&mut out, journal)
                .map_err(|e| AppError::Export(format!("Failed to render markdown: {}", e)))?;
        }
        Ok(out.into_bytes())
    }

    fn file_extension(&self) -> &'static str {
        "md"
    }
}

fn write_markdown(out: &mut String, journal: &ExportJournal) -> std::fmt::Result {
    writeln!(out, "# {}", journal.title)?;
    writeln!(out)?;
    writeln!(
        out,
        "*{}* · {} words",
        journal.save_date.format(EXPORT_HEADER_DATE_FORMAT),
        journal.word_count
    )?;

    let moods: Vec<String> = journal
        .primary_mood
        .iter()
        .chain(journal.secondary_moods.iter())
        .map(|m| format!("{} {}", m.emoji, m.name))
        .collect();
    if !moods.is_empty() {
        writeln!(out, "Mood: {}", moods.join(", "))?;
    }
    if !journal.tags.is_empty() {
        let names: Vec<&str> = journal.tags.iter().map(|t| t.name.as_str()).collect();
        writeln!(out, "Tags: {}", names.join(", "))?;
    }

    writeln!(out)?;
    writeln!(out, "{}", journal.raw_content.trim_end())
}

/// Pretty-printed JSON array of journals.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonRenderer;

impl DocumentRenderer for JsonRenderer {
    fn render(&self, journals: &[ExportJournal]) -> AppResult<Vec<u8>> {
        serde_json::to_vec_pretty(journals)
            .map_err(|e| AppError::Export(format!("Failed to serialize journals: {}", e)))
    }

    fn file_extension(&self) -> &'static str {
        "json"
    }
}

fn resolve(conn: &Connection, journals: Vec<JournalRecord>) -> AppResult<Vec<ExportJournal>> {
    let journal_ids: Vec<Uuid> = journals.iter().map(|j| j.id).collect();
    let mut mood_ids: Vec<Uuid> = journals.iter().flat_map(|j| j.mood_ids()).collect();
    mood_ids.sort_unstable();
    mood_ids.dedup();

    let mut tags_by_journal = tags::tags_for_journals(conn, &journal_ids)?;
    let mood_lookup = moods::moods_by_ids(conn, &mood_ids)?;

    let resolved = journals
        .into_iter()
        .map(|journal| ExportJournal {
            primary_mood: mood_lookup.get(&journal.primary_mood).cloned(),
            secondary_moods: journal
                .secondary_mood1
                .iter()
                .chain(journal.secondary_mood2.iter())
                .filter_map(|id| mood_lookup.get(id).cloned())
                .collect(),
            tags: tags_by_journal.remove(&journal.id).unwrap_or_default(),
            title: journal.title,
            save_date: journal.save_date,
            created_at: journal.created_at,
            last_updated_at: journal.last_updated_at,
            word_count: journal.word_count,
            content: journal.content,
            raw_content: journal.raw_content,
        })
        .collect();
    Ok(resolved)
}

/// Resolves one journal for export.
///
/// # Errors
///
/// - `NotFound` / `Unauthorized` if the journal is missing or not the user's
/// - `IncorrectCredential` if the journal is locked and `unlock_password`
///   is absent or wrong
pub fn export_journal(
    db: &Database,
    user: &CurrentUser,
    journal_id: Uuid,
    unlock_password: Option<&str>,
) -> AppResult<ExportJournal> {
    let conn = db.get_conn()?;
    let journal = journals::find_by_id(&conn, journal_id)?
        .ok_or_else(|| AppError::NotFound(format!("Journal {} not found", journal_id)))?;
    if journal.created_by != user.id {
        return Err(AppError::Unauthorized(
            "This journal belongs to another user".to_string(),
        ));
    }

    if journal.is_locked {
        let verified = match unlock_password {
            Some(password) if !password.is_empty() => verify_password(password, &journal.lock_hash)?,
            _ => false,
        };
        if !verified {
            return Err(AppError::IncorrectCredential(
                MSG_INCORRECT_PASSWORD.to_string(),
            ));
        }
    }

    let mut resolved = resolve(&conn, vec![journal])?;
    info!("Exporting journal {}", journal_id);
    resolved
        .pop()
        .ok_or_else(|| AppError::NotFound(format!("Journal {} not found", journal_id)))
}

/// Resolves the user's journals in `range`, oldest first. Locked journals
/// are left out.
pub fn export_range(
    db: &Database,
    user: &CurrentUser,
    range: DateRange,
) -> AppResult<Vec<ExportJournal>> {
    let conn = db.get_conn()?;
    let all = journals::list_in_range(&conn, user.id, range)?;
    let total = all.len();
    let unlocked: Vec<JournalRecord> = all.into_iter().filter(|j| !j.is_locked).collect();
    debug!("Exporting {} of {} journals in range", unlocked.len(), total);

    resolve(&conn, unlocked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::test_db;
    use crate::errors::ErrorKind;
    use crate::models::{SaveJournalRequest, TagType};
    use crate::ops::auth::{alice_request, login, sign_up};
    use crate::ops::catalog::{get_moods, resolve_tags};
    use crate::ops::journal::save_journal;

    fn ymd(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn sample(title: &str, body: &str) -> ExportJournal {
        let now = Utc::now();
        ExportJournal {
            title: title.to_string(),
            save_date: ymd(1),
            created_at: now,
            last_updated_at: now,
            word_count: 3,
            content: format!("<p>{}</p>", body),
            raw_content: body.to_string(),
            primary_mood: Some(Mood {
                id: Uuid::new_v4(),
                name: "Happy".to_string(),
                category: "positive".to_string(),
                emoji: "😊".to_string(),
                created_at: now,
            }),
            secondary_moods: Vec::new(),
            tags: vec![Tag {
                id: Uuid::new_v4(),
                name: "Work".to_string(),
                tag_type: TagType::PreDefined,
                created_at: now,
            }],
        }
    }

    #[test]
    fn test_markdown_renderer() {
        let bytes = MarkdownRenderer
            .render(&[sample("First", "one two three"), sample("Second", "four")])
            .unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert!(text.starts_with("# First\n"));
        assert!(text.contains("Mood: 😊 Happy"));
        assert!(text.contains("Tags: Work"));
        assert!(text.contains("\n---\n\n# Second\n"));
        assert_eq!(MarkdownRenderer.file_extension(), "md");
    }

    #[test]
    fn test_json_renderer() {
        let bytes = JsonRenderer.render(&[sample("First", "body")]).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value[0]["title"], "First");
        assert_eq!(value[0]["save_date"], "2024-05-01");
        assert_eq!(value[0]["tags"][0]["name"], "Work");
        assert_eq!(value[0]["content"], "<p>body</p>");
        assert_eq!(value[0]["raw_content"], "body");
    }

    #[test]
    fn test_export_checks_lock_and_skips_locked_in_range() {
        let (_dir, db) = test_db();
        sign_up(&db, &alice_request(), Utc::now()).unwrap();
        let user = login(&db, "alice", "alicepw1!").unwrap();
        let mood = get_moods(&db).unwrap()[0].clone();

        let open = SaveJournalRequest {
            title: "Open".to_string(),
            content: "<p><b>nothing</b> to hide</p>".to_string(),
            raw_content: "nothing to hide".to_string(),
            primary_mood: mood.id,
            tag_ids: resolve_tags(&db, &["Work".to_string()]).unwrap(),
            ..Default::default()
        };
        let open_id = save_journal(&db, &user, &open, ymd(1), Utc::now()).unwrap().journal_id;

        let locked = SaveJournalRequest {
            title: "Closed".to_string(),
            primary_mood: mood.id,
            lock: true,
            use_default_password: true,
            ..Default::default()
        };
        let locked_id = save_journal(&db, &user, &locked, ymd(2), Utc::now()).unwrap().journal_id;

        let exported = export_journal(&db, &user, open_id, None).unwrap();
        assert_eq!(exported.primary_mood.unwrap().id, mood.id);
        assert_eq!(exported.tags[0].name, "Work");
        assert_eq!(exported.content, "<p><b>nothing</b> to hide</p>");
        assert_eq!(exported.raw_content, "nothing to hide");

        let err = export_journal(&db, &user, locked_id, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IncorrectCredential);
        let err = export_journal(&db, &user, locked_id, Some("wrong")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IncorrectCredential);
        assert_eq!(export_journal(&db, &user, locked_id, Some("lockpw")).unwrap().title, "Closed");

        let range = export_range(&db, &user, DateRange::new(None, ymd(31))).unwrap();
        assert_eq!(range.len(), 1);
        assert_eq!(range[0].title, "Open");
    }
}
