//! Account sign-up, login and user refresh.

use crate::crypto::{hash_password, verify_password};
use crate::db::users::{self, UserRecord};
use crate::db::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{CurrentUser, SignUpRequest};
use crate::validation::{any_blank, is_blank, is_valid_email, is_valid_password};
use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

/// Creates an account and returns its id.
///
/// Both the account password and the default journal-lock password are
/// stored as salted hashes.
///
/// # Errors
///
/// - `InvalidArgument` for blank fields, a username containing `@`, a
///   malformed email or a weak password
/// - `Duplicate` if the email or username is already registered (exact match)
pub fn sign_up(db: &Database, request: &SignUpRequest, now: DateTime<Utc>) -> AppResult<Uuid> {
    validate_sign_up(request)?;

    // Hash before taking the write lock.
    let password_hash = hash_password(&request.password)?;
    let journal_lock_hash = hash_password(&request.journal_lock_password)?;

    let user = UserRecord {
        id: Uuid::new_v4(),
        full_name: request.full_name.trim().to_string(),
        email: request.email.trim().to_string(),
        username: request.username.trim().to_string(),
        password_hash,
        journal_lock_hash,
        current_streak: 0,
        longest_streak: 0,
        created_at: now,
    };

    db.transaction(|tx| {
        if users::email_exists(tx, &user.email)? {
            return Err(AppError::Duplicate(format!(
                "An account with email '{}' already exists",
                user.email
            )));
        }
        if users::username_exists(tx, &user.username)? {
            return Err(AppError::Duplicate(format!(
                "Username '{}' is already taken",
                user.username
            )));
        }
        users::insert_user(tx, &user)
    })?;

    info!("Created account {}", user.id);
    Ok(user.id)
}

fn validate_sign_up(request: &SignUpRequest) -> AppResult<()> {
    if any_blank(&[
        request.full_name.as_str(),
        request.email.as_str(),
        request.username.as_str(),
        request.password.as_str(),
    ]) {
        return Err(AppError::InvalidArgument(
            "Full name, email, username and password are required".to_string(),
        ));
    }
    if request.username.contains('@') {
        return Err(AppError::InvalidArgument(
            "Username must not contain '@'".to_string(),
        ));
    }
    if !is_valid_email(request.email.trim()) {
        return Err(AppError::InvalidArgument(format!(
            "'{}' is not a valid email address",
            request.email.trim()
        )));
    }
    if !is_valid_password(&request.password) {
        return Err(AppError::InvalidArgument(
            "Password must be at least 6 characters and contain a letter, a number and a symbol"
                .to_string(),
        ));
    }
    if is_blank(&request.journal_lock_password) {
        return Err(AppError::InvalidArgument(
            "A default journal lock password is required".to_string(),
        ));
    }
    Ok(())
}

/// Authenticates by email (any identifier containing `@`) or username.
///
/// # Errors
///
/// - `NotFound` if no account matches the identifier
/// - `IncorrectCredential` if the password does not match
pub fn login(db: &Database, identifier: &str, password: &str) -> AppResult<CurrentUser> {
    let identifier = identifier.trim();
    if is_blank(identifier) || password.is_empty() {
        return Err(AppError::InvalidArgument(
            "Username or email and password are required".to_string(),
        ));
    }

    let conn = db.get_conn()?;
    let user = users::find_by_identifier(&conn, identifier)?
        .ok_or_else(|| AppError::NotFound(format!("No account found for '{}'", identifier)))?;
    drop(conn);

    if !verify_password(password, &user.password_hash)? {
        debug!("Password mismatch for account {}", user.id);
        return Err(AppError::IncorrectCredential(
            "Invalid username/email or password".to_string(),
        ));
    }

    info!("User {} logged in", user.id);
    Ok(user.to_current_user())
}

/// Re-reads a user's persisted profile and streak counters.
pub fn load_current_user(db: &Database, user_id: Uuid) -> AppResult<CurrentUser> {
    let conn = db.get_conn()?;
    users::get_user(&conn, user_id)?
        .map(|user| user.to_current_user())
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))
}

#[cfg(test)]
pub(crate) fn alice_request() -> SignUpRequest {
    SignUpRequest {
        full_name: "Alice Liddell".to_string(),
        email: "alice@x.com".to_string(),
        username: "alice".to_string(),
        password: "alicepw1!".to_string(),
        journal_lock_password: "lockpw".to_string(),
    }
}
