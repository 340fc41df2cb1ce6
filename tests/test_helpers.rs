#![allow(dead_code)]

use assert_cmd::Command;
use chrono::NaiveDate;
use entryit::clock::FixedClock;
use entryit::db::Database;
use entryit::models::SignUpRequest;
use entryit::EntryIt;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

pub const TEST_PASSWORD: &str = "alicepw1!";
pub const TEST_LOCK_PASSWORD: &str = "lockpw";

/// Creates a `Command` for the `entryit` binary with a clean, non-interactive
/// environment pointed at `db_path`.
pub fn base_entryit_command(db_path: &Path) -> Command {
    let mut cmd = Command::cargo_bin("entryit").expect("entryit binary not built");
    cmd.env_clear();
    if let Ok(path) = std::env::var("PATH") {
        cmd.env("PATH", path);
    }
    cmd.env("HOME", "/tmp")
        .env("ENTRYIT_DB", db_path)
        .env("ENTRYIT_PASSWORD", TEST_PASSWORD)
        .env("ENTRYIT_LOCK_PASSWORD", TEST_LOCK_PASSWORD);
    cmd
}

pub fn alice() -> SignUpRequest {
    SignUpRequest {
        full_name: "Alice Liddell".to_string(),
        email: "alice@x.com".to_string(),
        username: "alice".to_string(),
        password: TEST_PASSWORD.to_string(),
        journal_lock_password: TEST_LOCK_PASSWORD.to_string(),
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// A fresh database in a temp dir, shared by the returned handle and clock.
pub fn open_app(start: NaiveDate) -> (TempDir, EntryIt, Arc<FixedClock>) {
    let temp_dir = TempDir::new().expect("create temp dir");
    let db = Database::open(&temp_dir.path().join("entryit.db")).expect("open database");
    db.initialize_schema().expect("initialize schema");

    let clock = Arc::new(FixedClock::new(start));
    let app = EntryIt::with_database(db, clock.clone());
    (temp_dir, app, clock)
}

/// Signs up the alice account and logs in as it.
pub async fn logged_in_alice(app: &EntryIt) {
    app.sign_up(alice()).await.expect("sign up");
    app.login("alice", TEST_PASSWORD).await.expect("login");
}
