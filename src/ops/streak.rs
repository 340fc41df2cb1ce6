//! Daily writing streak engine.
//!
//! The counters on the user row are a fold over the activity log in
//! `streaks`. Both operations take a plain connection so they run inside the
//! journal save/delete transaction that triggers them.

use crate::db::{streaks, users};
use crate::errors::{AppError, AppResult};
use crate::models::StreakCounters;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::Connection;
use tracing::{debug, info};
use uuid::Uuid;

/// Records activity for `today` and advances the counters.
///
/// - Activity already recorded today: no change (idempotent).
/// - Last activity was yesterday: current streak + 1.
/// - Otherwise (gap or first activity): current streak = 1.
///
/// The longest streak is raised to the current streak when exceeded.
pub fn increment_streak(
    conn: &Connection,
    user_id: Uuid,
    today: NaiveDate,
    now: DateTime<Utc>,
) -> AppResult<StreakCounters> {
    let user = users::get_user(conn, user_id)?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

    let last_activity = streaks::latest_activity_date(conn, user_id)?;
    let yesterday = today.pred_opt();

    if last_activity == Some(today) {
        debug!("Activity already recorded today for user {}", user_id);
        return Ok(counters(user.current_streak, user.longest_streak));
    }

    let current = if last_activity.is_some() && last_activity == yesterday {
        user.current_streak + 1
    } else {
        1
    };
    let longest = user.longest_streak.max(current);

    streaks::insert_activity(conn, user_id, today, now)?;
    users::update_streak_counters(conn, user_id, current, longest)?;

    info!("Streak for user {} is now {}", user_id, current);
    Ok(counters(current, longest))
}

/// Removes today's activity record and steps the current streak back by one.
///
/// The streak is not recomputed from the remaining log, and the longest
/// streak is never lowered.
///
/// # Errors
///
/// Returns `NotFound` if there is no activity record for `today`.
pub fn decrement_streak(
    conn: &Connection,
    user_id: Uuid,
    today: NaiveDate,
) -> AppResult<StreakCounters> {
    let user = users::get_user(conn, user_id)?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

    if streaks::delete_activity(conn, user_id, today)? == 0 {
        return Err(AppError::NotFound(
            "No streak record for today to decrement".to_string(),
        ));
    }

    let current = (user.current_streak - 1).max(0);
    users::update_streak_counters(conn, user_id, current, user.longest_streak)?;

    info!("Streak for user {} decremented to {}", user_id, current);
    Ok(counters(current, user.longest_streak))
}

fn counters(current: i64, longest: i64) -> StreakCounters {
    StreakCounters {
        current_streak: current.max(0) as u32,
        longest_streak: longest.max(0) as u32,
    }
}
