//! Dashboard aggregations: mood distribution, word-count series and the
//! monthly activity calendar.

use crate::db::journals;
use crate::db::{moods, Database};
use crate::errors::{AppError, AppResult};
use crate::models::{CurrentUser, DateRange, MoodDistribution, WordCountPoint};
use chrono::{Datelike, NaiveDate};
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

/// Counts each mood across the primary and both secondary slots of the
/// user's journals in `range`, most frequent first.
///
/// Moods missing from the catalog are skipped. Ties are broken by mood name
/// so the order is stable.
pub fn mood_distribution(
    db: &Database,
    user: &CurrentUser,
    range: DateRange,
) -> AppResult<Vec<MoodDistribution>> {
    let conn = db.get_conn()?;
    let journals = journals::list_in_range(&conn, user.id, range)?;

    let mut counts: HashMap<Uuid, u32> = HashMap::new();
    for journal in &journals {
        for mood_id in journal.mood_ids() {
            *counts.entry(mood_id).or_insert(0) += 1;
        }
    }

    let ids: Vec<Uuid> = counts.keys().copied().collect();
    let lookup = moods::moods_by_ids(&conn, &ids)?;

    let mut distribution: Vec<MoodDistribution> = counts
        .into_iter()
        .filter_map(|(id, count)| {
            lookup
                .get(&id)
                .cloned()
                .map(|mood| MoodDistribution { mood, count })
        })
        .collect();
    distribution.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.mood.name.cmp(&b.mood.name)));

    debug!(
        "Mood distribution over {} journals: {} moods",
        journals.len(),
        distribution.len()
    );
    Ok(distribution)
}

/// `(save_date, word_count)` per journal in `range`, oldest first.
pub fn word_count_distributions(
    db: &Database,
    user: &CurrentUser,
    range: DateRange,
) -> AppResult<Vec<WordCountPoint>> {
    let conn = db.get_conn()?;
    let points = journals::list_in_range(&conn, user.id, range)?
        .into_iter()
        .map(|j| WordCountPoint {
            date: j.save_date,
            word_count: j.word_count,
        })
        .collect();
    Ok(points)
}

/// First and last day of `month` in `year`.
///
/// # Errors
///
/// Returns `InvalidArgument` if `month` is outside 1-12.
pub fn month_bounds(year: i32, month: u32) -> AppResult<(NaiveDate, NaiveDate)> {
    let invalid = || AppError::InvalidArgument(format!("Month must be between 1 and 12, got {}", month));

    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    let last = next_first
        .and_then(|d| d.pred_opt())
        .ok_or_else(invalid)?;
    Ok((first, last))
}

/// Save dates with an entry in `month` of the current year, ascending.
pub fn current_month_streak(
    db: &Database,
    user: &CurrentUser,
    month: u32,
    today: NaiveDate,
) -> AppResult<Vec<NaiveDate>> {
    let (first, last) = month_bounds(today.year(), month)?;

    let conn = db.get_conn()?;
    let dates = journals::list_in_range(&conn, user.id, DateRange::new(Some(first), last))?
        .into_iter()
        .map(|j| j.save_date)
        .collect();
    Ok(dates)
}
