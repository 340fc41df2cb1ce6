//! Async facade over the journaling core.
//!
//! [`EntryIt`] is what a presentation layer talks to. It owns the database
//! handle, the logged-in user, the clock and the change channel. Storage
//! work runs on tokio's blocking pool, so the only suspension points of an
//! operation are its persistence calls.
//!
//! Failures are logged here, once, and returned unchanged.

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::db::Database;
use crate::errors::{AppError, AppResult, DatabaseError};
use crate::models::{
    CurrentUser, DateRange, JournalSearchFilters, JournalSearchResult, JournalView, LockStatus,
    Mood, MoodDistribution, SaveJournalRequest, SaveResponse, SignUpRequest, StreakCounters, Tag,
    UnlockResponse, WordCountPoint,
};
use crate::ops;
use crate::ops::export::ExportJournal;
use crate::session::{ChangeEvent, ChangeNotifier, Session};
use chrono::NaiveDate;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};
use uuid::Uuid;
use zeroize::Zeroizing;

/// Handle to an open journal store and its session.
///
/// Clones share the session and the change channel. Two handles built with
/// [`EntryIt::with_database`] over the same database have independent
/// sessions, which is how a stale cached user arises.
#[derive(Clone)]
pub struct EntryIt {
    db: Database,
    session: Session,
    clock: Arc<dyn Clock>,
    events: ChangeNotifier,
}

impl std::fmt::Debug for EntryIt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryIt").finish_non_exhaustive()
    }
}

impl EntryIt {
    /// Opens the database named by `config`, creating the schema if needed.
    pub fn open(config: &Config) -> AppResult<Self> {
        config.validate()?;
        let db = Database::open(&config.db_path)?;
        db.initialize_schema()?;
        Ok(Self::with_database(db, Arc::new(SystemClock)))
    }

    /// Wraps an already-initialized database.
    pub fn with_database(db: Database, clock: Arc<dyn Clock>) -> Self {
        Self {
            db,
            session: Session::new(),
            clock,
            events: ChangeNotifier::new(),
        }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Today's local date according to this handle's clock.
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Receives every [`ChangeEvent`] published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.events.subscribe()
    }

    /// Runs blocking storage work off the async runtime and logs a failure.
    async fn run<T, F>(&self, op: &'static str, f: F) -> AppResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Database) -> AppResult<T> + Send + 'static,
    {
        debug!("Running {}", op);
        let db = self.db.clone();
        let result = match tokio::task::spawn_blocking(move || f(&db)).await {
            Ok(result) => result,
            Err(e) => Err(DatabaseError::Custom(format!("{} task failed: {}", op, e)).into()),
        };

        if let Err(e) = &result {
            log_failure(op, e);
        }
        result
    }

    async fn require_user(&self, op: &'static str) -> AppResult<CurrentUser> {
        match self.session.current().await {
            Some(user) => Ok(user),
            None => {
                let err = AppError::AuthenticationRequired;
                log_failure(op, &err);
                Err(err)
            }
        }
    }

    // Credentials and session

    /// Creates an account. Does not log the new user in.
    pub async fn sign_up(&self, request: SignUpRequest) -> AppResult<Uuid> {
        let now = self.clock.now_utc();
        let user_id = self
            .run("sign_up", move |db| ops::sign_up(db, &request, now))
            .await?;
        self.events.notify(ChangeEvent::SignedUp { user_id });
        Ok(user_id)
    }

    /// Logs in by email or username and caches the user.
    pub async fn login(&self, identifier: &str, password: &str) -> AppResult<CurrentUser> {
        let identifier = identifier.to_string();
        let password = Zeroizing::new(password.to_string());
        let user = self
            .run("login", move |db| ops::login(db, &identifier, &password))
            .await?;

        self.session.set(user.clone()).await;
        self.events.notify(ChangeEvent::LoggedIn { user_id: user.id });
        Ok(user)
    }

    /// Clears the session. Logging out with nobody logged in is a no-op.
    pub async fn logout(&self) {
        if let Some(user) = self.session.clear().await {
            info!("User {} logged out", user.id);
            self.events.notify(ChangeEvent::LoggedOut { user_id: user.id });
        }
    }

    /// The cached user, which may lag behind storage.
    pub async fn current_user(&self) -> Option<CurrentUser> {
        self.session.current().await
    }

    /// Re-reads the logged-in user from storage into the session.
    pub async fn refresh_user(&self) -> AppResult<CurrentUser> {
        let user = self.require_user("refresh_user").await?;
        let fresh = self
            .run("refresh_user", move |db| ops::load_current_user(db, user.id))
            .await?;
        self.session.set(fresh.clone()).await;
        Ok(fresh)
    }

    // Journal entries

    /// Creates or updates today's journal.
    pub async fn save_journal(&self, request: SaveJournalRequest) -> AppResult<SaveResponse> {
        let user = self.require_user("save_journal").await?;
        let (today, now) = (self.clock.today(), self.clock.now_utc());

        let response = self
            .run("save_journal", move |db| {
                ops::save_journal(db, &user, &request, today, now)
            })
            .await?;

        self.session.apply_current_streak(response.updated_streak).await;
        self.events.notify(ChangeEvent::JournalSaved {
            journal_id: response.journal_id,
            current_streak: response.updated_streak,
        });
        Ok(response)
    }

    /// Today's journal when `for_today`, otherwise the journal with `journal_id`.
    pub async fn get_journal(
        &self,
        for_today: bool,
        journal_id: Option<Uuid>,
    ) -> AppResult<JournalView> {
        let user = self.require_user("get_journal").await?;
        let today = self.clock.today();
        self.run("get_journal", move |db| {
            ops::get_journal(db, &user, for_today, journal_id, today)
        })
        .await
    }

    /// Deletes today's journal and rolls back today's streak activity.
    pub async fn delete_today_journal(&self) -> AppResult<StreakCounters> {
        let user = self.require_user("delete_today_journal").await?;
        let today = self.clock.today();

        let counters = self
            .run("delete_today_journal", move |db| {
                ops::delete_today_journal(db, &user, today)
            })
            .await?;

        self.session.apply_counters(counters).await;
        self.events.notify(ChangeEvent::JournalDeleted {
            journal_id: None,
            current_streak: counters.current_streak,
        });
        Ok(counters)
    }

    /// Deletes today's journal by id without touching the streak.
    pub async fn delete_journal(&self, journal_id: Uuid) -> AppResult<()> {
        let user = self.require_user("delete_journal").await?;
        let current_streak = user.current_streak;
        let today = self.clock.today();

        self.run("delete_journal", move |db| {
            ops::delete_journal(db, &user, journal_id, today)
        })
        .await?;

        self.events.notify(ChangeEvent::JournalDeleted {
            journal_id: Some(journal_id),
            current_streak,
        });
        Ok(())
    }

    pub async fn get_journal_lists(
        &self,
        filters: JournalSearchFilters,
    ) -> AppResult<JournalSearchResult> {
        let user = self.require_user("get_journal_lists").await?;
        self.run("get_journal_lists", move |db| {
            ops::get_journal_lists(db, &user, &filters)
        })
        .await
    }

    pub async fn get_journal_lock_status(&self, journal_id: Uuid) -> AppResult<LockStatus> {
        let user = self.require_user("get_journal_lock_status").await?;
        self.run("get_journal_lock_status", move |db| {
            ops::get_journal_lock_status(db, &user, journal_id)
        })
        .await
    }

    /// Verifies an unlock password. Nothing is persisted.
    pub async fn unlock_journal(&self, journal_id: Uuid, password: &str) -> AppResult<UnlockResponse> {
        let user = self.require_user("unlock_journal").await?;
        let password = Zeroizing::new(password.to_string());
        self.run("unlock_journal", move |db| {
            ops::unlock_journal(db, &user, journal_id, &password)
        })
        .await
    }

    // Streak engine

    /// Records today's activity in its own transaction.
    pub async fn increment_streak(&self) -> AppResult<StreakCounters> {
        let user = self.require_user("increment_streak").await?;
        let (today, now) = (self.clock.today(), self.clock.now_utc());

        let counters = self
            .run("increment_streak", move |db| {
                db.transaction(|tx| ops::increment_streak(tx, user.id, today, now))
            })
            .await?;
        self.session.apply_counters(counters).await;
        Ok(counters)
    }

    /// Removes today's activity in its own transaction.
    pub async fn decrement_streak(&self) -> AppResult<StreakCounters> {
        let user = self.require_user("decrement_streak").await?;
        let today = self.clock.today();

        let counters = self
            .run("decrement_streak", move |db| {
                db.transaction(|tx| ops::decrement_streak(tx, user.id, today))
            })
            .await?;
        self.session.apply_counters(counters).await;
        Ok(counters)
    }

    // Catalogs

    pub async fn get_moods(&self) -> AppResult<Vec<Mood>> {
        self.run("get_moods", ops::get_moods).await
    }

    pub async fn get_tags(&self) -> AppResult<Vec<Tag>> {
        self.run("get_tags", ops::get_tags).await
    }

    pub async fn add_custom_tag(&self, name: &str) -> AppResult<Tag> {
        self.require_user("add_custom_tag").await?;
        let name = name.to_string();
        let now = self.clock.now_utc();

        let tag = self
            .run("add_custom_tag", move |db| ops::add_custom_tag(db, &name, now))
            .await?;
        self.events.notify(ChangeEvent::TagAdded { tag_id: tag.id });
        Ok(tag)
    }

    pub async fn resolve_moods(&self, names: Vec<String>) -> AppResult<Vec<Uuid>> {
        self.run("resolve_moods", move |db| ops::resolve_moods(db, &names))
            .await
    }

    pub async fn resolve_tags(&self, names: Vec<String>) -> AppResult<Vec<Uuid>> {
        self.run("resolve_tags", move |db| ops::resolve_tags(db, &names))
            .await
    }

    // Dashboard

    pub async fn get_mood_distribution(&self, range: DateRange) -> AppResult<Vec<MoodDistribution>> {
        let user = self.require_user("get_mood_distribution").await?;
        self.run("get_mood_distribution", move |db| {
            ops::mood_distribution(db, &user, range)
        })
        .await
    }

    pub async fn get_word_count_distributions(
        &self,
        range: DateRange,
    ) -> AppResult<Vec<WordCountPoint>> {
        let user = self.require_user("get_word_count_distributions").await?;
        self.run("get_word_count_distributions", move |db| {
            ops::word_count_distributions(db, &user, range)
        })
        .await
    }

    /// Days with an entry in `month` (1-12) of the current year.
    pub async fn get_current_month_streak(&self, month: u32) -> AppResult<Vec<NaiveDate>> {
        let user = self.require_user("get_current_month_streak").await?;
        let today = self.clock.today();
        self.run("get_current_month_streak", move |db| {
            ops::current_month_streak(db, &user, month, today)
        })
        .await
    }

    // Export

    pub async fn export_journal(
        &self,
        journal_id: Uuid,
        unlock_password: Option<&str>,
    ) -> AppResult<ExportJournal> {
        let user = self.require_user("export_journal").await?;
        let password = unlock_password.map(|p| Zeroizing::new(p.to_string()));
        self.run("export_journal", move |db| {
            ops::export_journal(db, &user, journal_id, password.as_ref().map(|p| p.as_str()))
        })
        .await
    }

    pub async fn export_range(&self, range: DateRange) -> AppResult<Vec<ExportJournal>> {
        let user = self.require_user("export_range").await?;
        self.run("export_range", move |db| ops::export_range(db, &user, range))
            .await
    }
}

fn log_failure(op: &str, err: &AppError) {
    if err.is_recoverable() {
        warn!(operation = op, kind = ?err.kind(), "{}", err);
    } else {
        error!(operation = op, kind = ?err.kind(), "{}", err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::db::test_support::test_db;
    use crate::errors::ErrorKind;

    #[tokio::test]
    async fn test_operations_require_login() {
        let (_dir, db) = test_db();
        let app = EntryIt::with_database(db, Arc::new(FixedClock::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())));

        let err = app.save_journal(SaveJournalRequest::default()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AuthenticationRequired);
        let err = app.delete_today_journal().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AuthenticationRequired);
        let err = app.refresh_user().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AuthenticationRequired);

        // Catalog reads are open.
        assert!(!app.get_moods().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_login_publishes_and_logout_clears() {
        let (_dir, db) = test_db();
        let app = EntryIt::with_database(db, Arc::new(SystemClock));
        let mut events = app.subscribe();

        let user_id = app.sign_up(ops::auth::alice_request()).await.unwrap();
        assert_eq!(events.recv().await.unwrap(), ChangeEvent::SignedUp { user_id });

        app.login("alice@x.com", "alicepw1!").await.unwrap();
        assert_eq!(events.recv().await.unwrap(), ChangeEvent::LoggedIn { user_id });
        assert_eq!(app.current_user().await.unwrap().id, user_id);

        app.logout().await;
        assert_eq!(events.recv().await.unwrap(), ChangeEvent::LoggedOut { user_id });
        assert!(app.current_user().await.is_none());
    }
}
