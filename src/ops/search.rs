//! Filtered, paginated journal listing.

use crate::db::journals::{self, JournalRecord};
use crate::db::{moods, tags, Database};
use crate::errors::{AppError, AppResult};
use crate::models::{
    CurrentUser, JournalExtraInfo, JournalSearchFilters, JournalSearchItem, JournalSearchResult,
    Mood, Tag,
};
use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;

/// Number of pages needed for `total` rows at `per_page` rows per page.
pub fn total_pages(total: u64, per_page: u32) -> u32 {
    if per_page == 0 {
        return 0;
    }
    let pages = total.div_ceil(u64::from(per_page));
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// Lists the user's journals matching `filters`, newest first.
///
/// # Flow
///
/// 1. Count matches and fetch one page with a single predicate
/// 2. Batch-load tags and moods for the unlocked rows of the page
/// 3. Attach detail to unlocked rows only
///
/// Locked rows carry id, title, date and the lock flag; their content,
/// moods and tags never leave this function.
///
/// # Errors
///
/// Returns `InvalidArgument` if `page` or `per_page` is zero.
pub fn get_journal_lists(
    db: &Database,
    user: &CurrentUser,
    filters: &JournalSearchFilters,
) -> AppResult<JournalSearchResult> {
    if filters.page == 0 || filters.per_page == 0 {
        return Err(AppError::InvalidArgument(
            "page and per_page must be at least 1".to_string(),
        ));
    }

    info!(
        "Listing journals for user {} (page {}, {} per page)",
        user.id, filters.page, filters.per_page
    );

    let conn = db.get_conn()?;
    let offset = u64::from(filters.page - 1) * u64::from(filters.per_page);
    let (total, rows) = journals::search(&conn, user.id, filters, filters.per_page, offset)?;

    let unlocked: Vec<&JournalRecord> = rows.iter().filter(|j| !j.is_locked).collect();
    let journal_ids: Vec<Uuid> = unlocked.iter().map(|j| j.id).collect();
    let mut mood_ids: Vec<Uuid> = unlocked.iter().flat_map(|j| j.mood_ids()).collect();
    mood_ids.sort_unstable();
    mood_ids.dedup();

    let mut tags_by_journal = tags::tags_for_journals(&conn, &journal_ids)?;
    let mood_lookup = moods::moods_by_ids(&conn, &mood_ids)?;
    debug!(
        "Hydrating {} of {} rows ({} moods)",
        journal_ids.len(),
        rows.len(),
        mood_lookup.len()
    );

    let results = rows
        .into_iter()
        .map(|journal| {
            let journal_info = if journal.is_locked {
                None
            } else {
                let tags = tags_by_journal.remove(&journal.id).unwrap_or_default();
                Some(extra_info(&journal, tags, &mood_lookup))
            };
            JournalSearchItem {
                journal_id: journal.id,
                title: journal.title,
                save_date: journal.save_date,
                is_locked: journal.is_locked,
                journal_info,
            }
        })
        .collect();

    Ok(JournalSearchResult {
        results,
        current_page: filters.page,
        total_pages: total_pages(total, filters.per_page),
        total_count: total,
    })
}

fn extra_info(
    journal: &JournalRecord,
    tags: Vec<Tag>,
    moods: &HashMap<Uuid, Mood>,
) -> JournalExtraInfo {
    let resolve = |id: Option<Uuid>| id.and_then(|id| moods.get(&id).cloned());
    JournalExtraInfo {
        content: journal.content.clone(),
        raw_content: journal.raw_content.clone(),
        word_count: journal.word_count,
        primary_mood: resolve(Some(journal.primary_mood)),
        secondary_mood1: resolve(journal.secondary_mood1),
        secondary_mood2: resolve(journal.secondary_mood2),
        tags,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::test_db;
    use crate::errors::ErrorKind;
    use crate::models::SaveJournalRequest;
    use crate::ops::auth::{alice_request, login, sign_up};
    use crate::ops::journal::save_journal;
    use chrono::{Days, NaiveDate, Utc};
    use tempfile::TempDir;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn setup() -> (TempDir, Database, CurrentUser, Vec<Uuid>) {
        let (dir, db) = test_db();
        sign_up(&db, &alice_request(), Utc::now()).unwrap();
        let user = login(&db, "alice", "alicepw1!").unwrap();
        let conn = db.get_conn().unwrap();
        let mood_ids = moods::list_moods(&conn).unwrap().into_iter().map(|m| m.id).collect();
        (dir, db, user, mood_ids)
    }

    fn save_on(db: &Database, user: &CurrentUser, offset: u64, req: SaveJournalRequest) {
        let date = start().checked_add_days(Days::new(offset)).unwrap();
        save_journal(db, user, &req, date, Utc::now()).unwrap();
    }

    fn entry(title: &str, body: &str, mood: Uuid) -> SaveJournalRequest {
        SaveJournalRequest {
            title: title.to_string(),
            content: format!("<p>{}</p>", body),
            raw_content: body.to_string(),
            word_count: 1,
            primary_mood: mood,
            ..Default::default()
        }
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(25, 10), 3);
        assert_eq!(total_pages(5, 0), 0);
    }

    #[test]
    fn test_pagination_over_25_entries() {
        let (_dir, db, user, moods) = setup();
        for i in 0..25 {
            save_on(&db, &user, i, entry(&format!("Day {}", i), "walked", moods[0]));
        }

        let mut filters = JournalSearchFilters::up_to(start().checked_add_days(Days::new(30)).unwrap());
        filters.per_page = 10;
        filters.page = 3;

        let result = get_journal_lists(&db, &user, &filters).unwrap();
        assert_eq!(result.total_pages, 3);
        assert_eq!(result.total_count, 25);
        assert_eq!(result.current_page, 3);
        assert_eq!(result.results.len(), 5);

        let dates: Vec<NaiveDate> = result.results.iter().map(|r| r.save_date).collect();
        let mut sorted = dates.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(dates, sorted);
        assert_eq!(dates[4], start());
    }

    #[test]
    fn test_locked_rows_hide_detail_and_content_matches() {
        let (_dir, db, user, moods) = setup();
        save_on(&db, &user, 0, entry("Open diary", "pineapple pizza", moods[0]));
        let mut locked = entry("Private thoughts", "pineapple secret", moods[1]);
        locked.lock = true;
        locked.use_default_password = true;
        save_on(&db, &user, 1, locked);

        let mut filters = JournalSearchFilters::up_to(start().checked_add_days(Days::new(5)).unwrap());
        let all = get_journal_lists(&db, &user, &filters).unwrap();
        assert_eq!(all.results.len(), 2);
        let private = all.results.iter().find(|r| r.is_locked).unwrap();
        assert!(private.journal_info.is_none());
        let open = all.results.iter().find(|r| !r.is_locked).unwrap();
        let info = open.journal_info.as_ref().unwrap();
        assert_eq!(info.raw_content, "pineapple pizza");
        assert_eq!(info.primary_mood.as_ref().unwrap().id, moods[0]);

        // Content search skips locked entries.
        filters.search_key = Some("PINEAPPLE".to_string());
        let hits = get_journal_lists(&db, &user, &filters).unwrap();
        assert_eq!(hits.results.len(), 1);
        assert_eq!(hits.results[0].title, "Open diary");

        // Title search still finds them, without detail.
        filters.search_key = Some("private".to_string());
        let hits = get_journal_lists(&db, &user, &filters).unwrap();
        assert_eq!(hits.results.len(), 1);
        assert!(hits.results[0].journal_info.is_none());
    }

    #[test]
    fn test_search_folds_non_ascii_case() {
        let (_dir, db, user, moods) = setup();
        save_on(&db, &user, 0, entry("Über Café", "Ein Spaziergang", moods[0]));
        save_on(&db, &user, 1, entry("Plain day", "ÉCOLE again", moods[0]));

        let mut filters = JournalSearchFilters::up_to(start().checked_add_days(Days::new(5)).unwrap());
        filters.search_key = Some("über".to_string());
        let hits = get_journal_lists(&db, &user, &filters).unwrap();
        assert_eq!(hits.total_count, 1);
        assert_eq!(hits.results[0].title, "Über Café");

        filters.search_key = Some("CAFÉ".to_string());
        assert_eq!(get_journal_lists(&db, &user, &filters).unwrap().total_count, 1);

        filters.search_key = Some("école".to_string());
        let hits = get_journal_lists(&db, &user, &filters).unwrap();
        assert_eq!(hits.total_count, 1);
        assert_eq!(hits.results[0].title, "Plain day");
    }

    #[test]
    fn test_mood_and_tag_filters() {
        let (_dir, db, user, moods) = setup();
        let work = {
            let conn = db.get_conn().unwrap();
            tags::find_by_name(&conn, "Work").unwrap().unwrap().id
        };

        let mut first = entry("One", "a", moods[0]);
        first.secondary_mood1 = Some(moods[2]);
        first.tag_ids = vec![work];
        save_on(&db, &user, 0, first);
        save_on(&db, &user, 1, entry("Two", "b", moods[1]));

        let mut filters = JournalSearchFilters::up_to(start().checked_add_days(Days::new(5)).unwrap());
        filters.mood_ids = vec![moods[2]];
        let hits = get_journal_lists(&db, &user, &filters).unwrap();
        assert_eq!(hits.results.len(), 1);
        assert_eq!(hits.results[0].title, "One");
        assert_eq!(hits.results[0].journal_info.as_ref().unwrap().tags.len(), 1);

        filters.mood_ids.clear();
        filters.tag_ids = vec![work];
        assert_eq!(get_journal_lists(&db, &user, &filters).unwrap().total_count, 1);
    }

    #[test]
    fn test_empty_result_and_bad_page() {
        let (_dir, db, user, _moods) = setup();
        let mut filters = JournalSearchFilters::up_to(start());
        let result = get_journal_lists(&db, &user, &filters).unwrap();
        assert_eq!(result.total_pages, 0);
        assert!(result.results.is_empty());

        filters.page = 0;
        let err = get_journal_lists(&db, &user, &filters).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }
}
