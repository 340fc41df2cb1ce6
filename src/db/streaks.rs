//! Daily activity records backing the streak counters.
//!
//! A row for (user, date) means the user had journal activity that day.

use crate::errors::{AppResult, DatabaseError};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;
use uuid::Uuid;

/// Most recent activity date for a user, if any.
pub fn latest_activity_date(conn: &Connection, user_id: Uuid) -> AppResult<Option<NaiveDate>> {
    conn.query_row(
        "SELECT activity_date FROM streaks WHERE user_id = ?1 ORDER BY activity_date DESC LIMIT 1",
        [user_id.to_string()],
        |row| row.get(0),
    )
    .optional()
    .map_err(|e| DatabaseError::Sqlite(e).into())
}

/// Records activity for `date`.
pub fn insert_activity(
    conn: &Connection,
    user_id: Uuid,
    date: NaiveDate,
    now: DateTime<Utc>,
) -> AppResult<()> {
    debug!("Recording activity for user {} on {}", user_id, date);

    conn.execute(
        "INSERT INTO streaks (id, user_id, activity_date, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![Uuid::new_v4().to_string(), user_id.to_string(), date, now],
    )
    .map_err(DatabaseError::Sqlite)?;
    Ok(())
}

/// Removes the activity record for `date`. Returns the number of rows removed.
pub fn delete_activity(conn: &Connection, user_id: Uuid, date: NaiveDate) -> AppResult<usize> {
    debug!("Removing activity for user {} on {}", user_id, date);

    let rows = conn
        .execute(
            "DELETE FROM streaks WHERE user_id = ?1 AND activity_date = ?2",
            params![user_id.to_string(), date],
        )
        .map_err(DatabaseError::Sqlite)?;
    Ok(rows)
}

/// Whether an activity record exists for `date`.
pub fn activity_exists(conn: &Connection, user_id: Uuid, date: NaiveDate) -> AppResult<bool> {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM streaks WHERE user_id = ?1 AND activity_date = ?2",
            params![user_id.to_string(), date],
            |row| row.get(0),
        )
        .map_err(DatabaseError::Sqlite)?;
    Ok(count > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::test_db;
    use crate::db::users::{insert_user, sample_user};

    #[test]
    fn test_latest_activity_date_orders_by_date() {
        let (_dir, db) = test_db();
        let conn = db.get_conn().unwrap();
        let user = sample_user("alice");
        insert_user(&conn, &user).unwrap();

        assert!(latest_activity_date(&conn, user.id).unwrap().is_none());

        let d1 = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let d3 = NaiveDate::from_ymd_opt(2024, 3, 3).unwrap();
        insert_activity(&conn, user.id, d3, Utc::now()).unwrap();
        insert_activity(&conn, user.id, d1, Utc::now()).unwrap();

        assert_eq!(latest_activity_date(&conn, user.id).unwrap(), Some(d3));
    }

    #[test]
    fn test_one_record_per_day() {
        let (_dir, db) = test_db();
        let conn = db.get_conn().unwrap();
        let user = sample_user("alice");
        insert_user(&conn, &user).unwrap();

        let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        insert_activity(&conn, user.id, day, Utc::now()).unwrap();
        assert!(insert_activity(&conn, user.id, day, Utc::now()).is_err());
    }

    #[test]
    fn test_delete_activity() {
        let (_dir, db) = test_db();
        let conn = db.get_conn().unwrap();
        let user = sample_user("alice");
        insert_user(&conn, &user).unwrap();

        let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        insert_activity(&conn, user.id, day, Utc::now()).unwrap();
        assert!(activity_exists(&conn, user.id, day).unwrap());

        assert_eq!(delete_activity(&conn, user.id, day).unwrap(), 1);
        assert!(!activity_exists(&conn, user.id, day).unwrap());
        assert_eq!(delete_activity(&conn, user.id, day).unwrap(), 0);
    }
}
