//! Journal entry lifecycle: save, get, delete, lock status and unlock.
//!
//! There is at most one journal per user per local calendar date. Saving
//! creates today's entry on first call and updates it in place afterwards.
//! Each compound operation (save with tag reconciliation and streak update,
//! delete with tag cleanup and streak update) runs in one transaction.

use crate::constants::{
    MSG_INCORRECT_PASSWORD, MSG_JOURNAL_CREATED, MSG_JOURNAL_NOT_LOCKED, MSG_JOURNAL_UNLOCKED,
    MSG_JOURNAL_UPDATED, MSG_NO_ENTRY_TODAY,
};
use crate::crypto::{hash_password, verify_password};
use crate::db::journals::{self, JournalRecord};
use crate::db::{tags, users, Database};
use crate::errors::{AppError, AppResult};
use crate::models::{
    CurrentUser, JournalView, LockStatus, SaveJournalRequest, SaveOutcome, SaveResponse,
    StreakCounters, UnlockResponse,
};
use crate::ops::streak;
use crate::validation::is_blank;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::Connection;
use std::collections::HashSet;
use tracing::{debug, info};
use uuid::Uuid;

/// Outcome of a tag reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagDiff {
    pub to_add: Vec<Uuid>,
    pub to_remove: Vec<Uuid>,
}

impl TagDiff {
    /// Computes the associations to insert and delete so that `current`
    /// becomes exactly `requested`. Duplicates in `requested` collapse and
    /// the request order is kept for additions.
    pub fn between(current: &[Uuid], requested: &[Uuid]) -> Self {
        let current_set: HashSet<Uuid> = current.iter().copied().collect();
        let requested_set: HashSet<Uuid> = requested.iter().copied().collect();

        let mut seen = HashSet::new();
        let to_add = requested
            .iter()
            .copied()
            .filter(|id| !current_set.contains(id) && seen.insert(*id))
            .collect();
        let to_remove = current
            .iter()
            .copied()
            .filter(|id| !requested_set.contains(id))
            .collect();

        TagDiff { to_add, to_remove }
    }

    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

/// Hashes a custom lock password, or `None` when the save does not need one.
fn custom_lock_hash(request: &SaveJournalRequest) -> AppResult<Option<String>> {
    if !request.lock || request.use_default_password {
        return Ok(None);
    }
    match request.custom_password.as_deref() {
        Some(password) if !is_blank(password) => hash_password(password).map(Some),
        _ => Err(AppError::InvalidArgument(
            "A password is required to lock a journal".to_string(),
        )),
    }
}

/// The hash stored with the journal: empty when unlocked, the user's
/// default lock hash, or the freshly hashed custom password.
fn resolve_lock_hash(
    conn: &Connection,
    user_id: Uuid,
    request: &SaveJournalRequest,
    custom_hash: Option<&str>,
) -> AppResult<String> {
    if !request.lock {
        return Ok(String::new());
    }
    if let Some(hash) = custom_hash {
        return Ok(hash.to_string());
    }

    let user = users::get_user(conn, user_id)?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;
    Ok(user.journal_lock_hash)
}

/// Creates or updates today's journal for `user`.
///
/// On creation the streak engine is advanced in the same transaction and
/// the new streak is reported. On update, tag associations are reconciled
/// by diff and the user's stored current streak is reported unchanged.
///
/// # Errors
///
/// - `InvalidArgument` for a blank title, or locking with a custom password that is blank
/// - `Database` if any write fails; nothing from the call is persisted in that case
pub fn save_journal(
    db: &Database,
    user: &CurrentUser,
    request: &SaveJournalRequest,
    today: NaiveDate,
    now: DateTime<Utc>,
) -> AppResult<SaveResponse> {
    if is_blank(&request.title) {
        return Err(AppError::InvalidArgument(
            "Journal title is required".to_string(),
        ));
    }
    if request.primary_mood.is_nil() {
        return Err(AppError::InvalidArgument(
            "A primary mood is required".to_string(),
        ));
    }

    // Hash before taking the write lock.
    let custom_hash = custom_lock_hash(request)?;

    let response = db.transaction(|tx| {
        let lock_hash = resolve_lock_hash(tx, user.id, request, custom_hash.as_deref())?;

        match journals::find_by_date(tx, user.id, today)? {
            None => create_today(tx, user.id, request, lock_hash, today, now),
            Some(existing) => update_today(tx, user.id, existing, request, lock_hash, now),
        }
    })?;

    info!(
        "Journal {} {:?} for user {} on {}",
        response.journal_id, response.outcome, user.id, today
    );
    Ok(response)
}

fn create_today(
    conn: &Connection,
    user_id: Uuid,
    request: &SaveJournalRequest,
    lock_hash: String,
    today: NaiveDate,
    now: DateTime<Utc>,
) -> AppResult<SaveResponse> {
    let counters = streak::increment_streak(conn, user_id, today, now)?;

    let journal = JournalRecord {
        id: Uuid::new_v4(),
        created_by: user_id,
        title: request.title.clone(),
        content: request.content.clone(),
        raw_content: request.raw_content.clone(),
        word_count: request.word_count,
        primary_mood: request.primary_mood,
        secondary_mood1: request.secondary_mood1,
        secondary_mood2: request.secondary_mood2,
        is_locked: request.lock,
        lock_hash,
        save_date: today,
        created_at: now,
        last_updated_at: now,
    };
    journals::insert_journal(conn, &journal)?;

    let diff = TagDiff::between(&[], &request.tag_ids);
    tags::add_journal_tags(conn, journal.id, &diff.to_add, now)?;

    Ok(SaveResponse {
        journal_id: journal.id,
        outcome: SaveOutcome::Created,
        message: MSG_JOURNAL_CREATED.to_string(),
        updated_streak: counters.current_streak,
    })
}

fn update_today(
    conn: &Connection,
    user_id: Uuid,
    existing: JournalRecord,
    request: &SaveJournalRequest,
    lock_hash: String,
    now: DateTime<Utc>,
) -> AppResult<SaveResponse> {
    let journal = JournalRecord {
        title: request.title.clone(),
        content: request.content.clone(),
        raw_content: request.raw_content.clone(),
        word_count: request.word_count,
        primary_mood: request.primary_mood,
        secondary_mood1: request.secondary_mood1,
        secondary_mood2: request.secondary_mood2,
        is_locked: request.lock,
        lock_hash,
        last_updated_at: now,
        ..existing
    };
    journals::update_journal(conn, &journal)?;

    let current = tags::tag_ids_for_journal(conn, journal.id)?;
    let diff = TagDiff::between(&current, &request.tag_ids);
    if !diff.is_empty() {
        debug!(
            "Reconciling tags for journal {}: +{} -{}",
            journal.id,
            diff.to_add.len(),
            diff.to_remove.len()
        );
        tags::remove_journal_tags(conn, journal.id, &diff.to_remove)?;
        tags::add_journal_tags(conn, journal.id, &diff.to_add, now)?;
    }

    let user = users::get_user(conn, user_id)?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

    Ok(SaveResponse {
        journal_id: journal.id,
        outcome: SaveOutcome::Updated,
        message: MSG_JOURNAL_UPDATED.to_string(),
        updated_streak: user.current_streak.max(0) as u32,
    })
}

/// Deletes today's journal, its tag associations and today's streak
/// activity together.
///
/// # Errors
///
/// - `NotFound` ("No journal entry for today") if there is nothing to delete
/// - `NotFound` from the streak engine if today's activity record is missing;
///   the journal is kept in that case
pub fn delete_today_journal(
    db: &Database,
    user: &CurrentUser,
    today: NaiveDate,
) -> AppResult<StreakCounters> {
    let counters = db.transaction(|tx| {
        let journal = journals::find_by_date(tx, user.id, today)?
            .ok_or_else(|| AppError::NotFound(MSG_NO_ENTRY_TODAY.to_string()))?;

        tags::delete_all_for_journal(tx, journal.id)?;
        journals::delete_journal(tx, journal.id)?;
        streak::decrement_streak(tx, user.id, today)
    })?;

    info!("Deleted today's journal for user {}", user.id);
    Ok(counters)
}

/// Deletes a journal by id. Only today's entry may be deleted; the streak is
/// not touched by this variant.
///
/// # Errors
///
/// - `InvalidArgument` for a nil id, or an entry whose save date is not today
/// - `NotFound` if the journal does not exist
/// - `Unauthorized` if it belongs to another user
pub fn delete_journal(
    db: &Database,
    user: &CurrentUser,
    journal_id: Uuid,
    today: NaiveDate,
) -> AppResult<()> {
    if journal_id.is_nil() || user.id.is_nil() {
        return Err(AppError::InvalidArgument(
            "User id and journal id are required".to_string(),
        ));
    }

    db.transaction(|tx| {
        let journal = owned_journal(tx, user.id, journal_id)?;
        if journal.save_date != today {
            return Err(AppError::InvalidArgument(
                "Cannot delete an entry not created today".to_string(),
            ));
        }

        tags::delete_all_for_journal(tx, journal.id)?;
        journals::delete_journal(tx, journal.id)?;
        Ok(())
    })?;

    info!("Deleted journal {} for user {}", journal_id, user.id);
    Ok(())
}

/// Fetches a journal the user owns.
fn owned_journal(conn: &Connection, user_id: Uuid, journal_id: Uuid) -> AppResult<JournalRecord> {
    let journal = journals::find_by_id(conn, journal_id)?
        .ok_or_else(|| AppError::NotFound(format!("Journal {} not found", journal_id)))?;

    if journal.created_by != user_id {
        return Err(AppError::Unauthorized(
            "This journal belongs to another user".to_string(),
        ));
    }
    Ok(journal)
}

fn to_view(conn: &Connection, journal: JournalRecord) -> AppResult<JournalView> {
    let tags = tags::tags_for_journal(conn, journal.id)?;
    Ok(JournalView {
        id: journal.id,
        title: journal.title,
        content: journal.content,
        raw_content: journal.raw_content,
        word_count: journal.word_count,
        primary_mood: journal.primary_mood,
        secondary_mood1: journal.secondary_mood1,
        secondary_mood2: journal.secondary_mood2,
        is_locked: journal.is_locked,
        save_date: journal.save_date,
        created_at: journal.created_at,
        last_updated_at: journal.last_updated_at,
        tags,
    })
}

/// Loads a hydrated journal: today's entry when `for_today`, otherwise the
/// entry with `journal_id`.
///
/// Content is returned whether or not the entry is locked.
pub fn get_journal(
    db: &Database,
    user: &CurrentUser,
    for_today: bool,
    journal_id: Option<Uuid>,
    today: NaiveDate,
) -> AppResult<JournalView> {
    let conn = db.get_conn()?;

    let journal = if for_today {
        journals::find_by_date(&conn, user.id, today)?
            .ok_or_else(|| AppError::NotFound(MSG_NO_ENTRY_TODAY.to_string()))?
    } else {
        let journal_id = journal_id.filter(|id| !id.is_nil()).ok_or_else(|| {
            AppError::InvalidArgument("A journal id is required".to_string())
        })?;
        owned_journal(&conn, user.id, journal_id)?
    };

    to_view(&conn, journal)
}

/// Reports whether a journal is locked.
pub fn get_journal_lock_status(
    db: &Database,
    user: &CurrentUser,
    journal_id: Uuid,
) -> AppResult<LockStatus> {
    if journal_id.is_nil() {
        return Err(AppError::InvalidArgument(
            "A journal id is required".to_string(),
        ));
    }

    let conn = db.get_conn()?;
    let journal = owned_journal(&conn, user.id, journal_id)?;
    Ok(LockStatus {
        journal_id: journal.id,
        is_locked: journal.is_locked,
    })
}

/// Checks an unlock password against a journal's lock.
///
/// This is a verification gate only: the stored lock flag and hash are
/// never modified.
///
/// # Errors
///
/// Returns `IncorrectCredential` ("Incorrect password") on mismatch.
pub fn unlock_journal(
    db: &Database,
    user: &CurrentUser,
    journal_id: Uuid,
    password: &str,
) -> AppResult<UnlockResponse> {
    if journal_id.is_nil() {
        return Err(AppError::InvalidArgument(
            "A journal id is required".to_string(),
        ));
    }

    let journal = {
        let conn = db.get_conn()?;
        owned_journal(&conn, user.id, journal_id)?
    };

    if !journal.is_locked {
        return Ok(UnlockResponse {
            journal_id,
            has_unlocked: true,
            message: MSG_JOURNAL_NOT_LOCKED.to_string(),
        });
    }

    if password.is_empty() || !verify_password(password, &journal.lock_hash)? {
        debug!("Unlock rejected for journal {}", journal_id);
        return Err(AppError::IncorrectCredential(
            MSG_INCORRECT_PASSWORD.to_string(),
        ));
    }

    Ok(UnlockResponse {
        journal_id,
        has_unlocked: true,
        message: MSG_JOURNAL_UNLOCKED.to_string(),
    })
}
