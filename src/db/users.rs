//! User accounts and streak counters.

use crate::db::uuid_column;
use crate::errors::{AppResult, DatabaseError};
use crate::models::CurrentUser;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;
use uuid::Uuid;

/// A row of the `users` table.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub journal_lock_hash: String,
    pub current_streak: i64,
    pub longest_streak: i64,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    /// Session view of this user.
    pub fn to_current_user(&self) -> CurrentUser {
        CurrentUser {
            id: self.id,
            full_name: self.full_name.clone(),
            email: self.email.clone(),
            username: self.username.clone(),
            current_streak: self.current_streak.max(0) as u32,
            longest_streak: self.longest_streak.max(0) as u32,
        }
    }
}

const USER_COLUMNS: &str = "id, full_name, email, username, password_hash, journal_lock_hash, \
                            current_streak, longest_streak, created_at";

fn map_user(row: &Row<'_>) -> rusqlite::Result<UserRecord> {
    Ok(UserRecord {
        id: uuid_column(row, 0)?,
        full_name: row.get(1)?,
        email: row.get(2)?,
        username: row.get(3)?,
        password_hash: row.get(4)?,
        journal_lock_hash: row.get(5)?,
        current_streak: row.get(6)?,
        longest_streak: row.get(7)?,
        created_at: row.get(8)?,
    })
}

/// Inserts a new user with zeroed streak counters.
pub fn insert_user(conn: &Connection, user: &UserRecord) -> AppResult<()> {
    debug!("Inserting user {}", user.id);

    conn.execute(
        r#"
        INSERT INTO users (id, full_name, email, username, password_hash, journal_lock_hash,
                           current_streak, longest_streak, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
        params![
            user.id.to_string(),
            user.full_name,
            user.email,
            user.username,
            user.password_hash,
            user.journal_lock_hash,
            user.current_streak,
            user.longest_streak,
            user.created_at,
        ],
    )
    .map_err(DatabaseError::Sqlite)?;

    Ok(())
}

/// Whether an account with exactly this email exists.
pub fn email_exists(conn: &Connection, email: &str) -> AppResult<bool> {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM users WHERE email = ?1",
            [email],
            |row| row.get(0),
        )
        .map_err(DatabaseError::Sqlite)?;
    Ok(count > 0)
}

/// Whether an account with exactly this username exists.
pub fn username_exists(conn: &Connection, username: &str) -> AppResult<bool> {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM users WHERE username = ?1",
            [username],
            |row| row.get(0),
        )
        .map_err(DatabaseError::Sqlite)?;
    Ok(count > 0)
}

/// Looks a user up by email when the identifier contains `@`, otherwise by
/// username. Usernames never contain `@`, so at most one row can match.
pub fn find_by_identifier(conn: &Connection, identifier: &str) -> AppResult<Option<UserRecord>> {
    let column = if identifier.contains('@') { "email" } else { "username" };
    let sql = format!("SELECT {} FROM users WHERE {} = ?1", USER_COLUMNS, column);
    conn.query_row(&sql, [identifier], map_user)
        .optional()
        .map_err(|e| DatabaseError::Sqlite(e).into())
}

/// Looks a user up by id.
pub fn get_user(conn: &Connection, user_id: Uuid) -> AppResult<Option<UserRecord>> {
    let sql = format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS);
    conn.query_row(&sql, [user_id.to_string()], map_user)
        .optional()
        .map_err(|e| DatabaseError::Sqlite(e).into())
}

/// Writes both streak counters in one statement.
///
/// Returns the number of rows updated (0 if the user does not exist).
pub fn update_streak_counters(
    conn: &Connection,
    user_id: Uuid,
    current_streak: i64,
    longest_streak: i64,
) -> AppResult<usize> {
    debug!(
        "Updating streak counters for user {}: current={}, longest={}",
        user_id, current_streak, longest_streak
    );

    let rows = conn
        .execute(
            "UPDATE users SET current_streak = ?1, longest_streak = ?2 WHERE id = ?3",
            params![current_streak, longest_streak, user_id.to_string()],
        )
        .map_err(DatabaseError::Sqlite)?;
    Ok(rows)
}

#[cfg(test)]
pub(crate) fn sample_user(username: &str) -> UserRecord {
    UserRecord {
        id: Uuid::new_v4(),
        full_name: format!("{} tester", username),
        email: format!("{}@x.com", username),
        username: username.to_string(),
        password_hash: "hash".to_string(),
        journal_lock_hash: "lock-hash".to_string(),
        current_streak: 0,
        longest_streak: 0,
        created_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::test_db;

    #[test]
    fn test_insert_and_find_user() {
        let (_dir, db) = test_db();
        let conn = db.get_conn().unwrap();
        let user = sample_user("alice");
        insert_user(&conn, &user).unwrap();

        let by_name = find_by_identifier(&conn, "alice").unwrap().unwrap();
        let by_email = find_by_identifier(&conn, "alice@x.com").unwrap().unwrap();
        assert_eq!(by_name.id, user.id);
        assert_eq!(by_email.id, user.id);
        assert!(find_by_identifier(&conn, "bob").unwrap().is_none());

        let by_id = get_user(&conn, user.id).unwrap().unwrap();
        assert_eq!(by_id.username, "alice");
    }

    #[test]
    fn test_existence_checks_are_case_sensitive() {
        let (_dir, db) = test_db();
        let conn = db.get_conn().unwrap();
        insert_user(&conn, &sample_user("alice")).unwrap();

        assert!(email_exists(&conn, "alice@x.com").unwrap());
        assert!(!email_exists(&conn, "ALICE@x.com").unwrap());
        assert!(username_exists(&conn, "alice").unwrap());
        assert!(!username_exists(&conn, "Alice").unwrap());
    }

    #[test]
    fn test_update_streak_counters() {
        let (_dir, db) = test_db();
        let conn = db.get_conn().unwrap();
        let user = sample_user("alice");
        insert_user(&conn, &user).unwrap();

        assert_eq!(update_streak_counters(&conn, user.id, 2, 5).unwrap(), 1);
        let stored = get_user(&conn, user.id).unwrap().unwrap();
        assert_eq!(stored.current_streak, 2);
        assert_eq!(stored.longest_streak, 5);

        assert_eq!(
            update_streak_counters(&conn, Uuid::new_v4(), 1, 1).unwrap(),
            0
        );
    }
}
