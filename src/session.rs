//! Session cache and change notification.

use crate::models::{CurrentUser, StreakCounters};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

/// Capacity of the change-event channel. Slow receivers that fall this far
/// behind see `RecvError::Lagged`.
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

/// State-affecting events published after a successful operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ChangeEvent {
    SignedUp { user_id: Uuid },
    LoggedIn { user_id: Uuid },
    LoggedOut { user_id: Uuid },
    JournalSaved { journal_id: Uuid, current_streak: u32 },
    JournalDeleted { journal_id: Option<Uuid>, current_streak: u32 },
    TagAdded { tag_id: Uuid },
}

/// The logged-in user, shared across clones of the facade.
///
/// The cached counters can go stale when another handle writes to the same
/// store; [`Session::apply_counters`] and a fresh read from storage are the
/// only ways they change.
#[derive(Debug, Clone, Default)]
pub struct Session {
    user: Arc<RwLock<Option<CurrentUser>>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn current(&self) -> Option<CurrentUser> {
        self.user.read().await.clone()
    }

    pub async fn set(&self, user: CurrentUser) {
        *self.user.write().await = Some(user);
    }

    /// Clears the session, returning who was logged in.
    pub async fn clear(&self) -> Option<CurrentUser> {
        self.user.write().await.take()
    }

    /// Writes returned streak counters into the cached user.
    pub async fn apply_counters(&self, counters: StreakCounters) {
        if let Some(user) = self.user.write().await.as_mut() {
            user.current_streak = counters.current_streak;
            user.longest_streak = counters.longest_streak;
        }
    }

    /// Updates only the current streak, raising the longest if needed.
    pub async fn apply_current_streak(&self, current: u32) {
        if let Some(user) = self.user.write().await.as_mut() {
            user.current_streak = current;
            user.longest_streak = user.longest_streak.max(current);
        }
    }
}

/// Sending half of the change channel.
#[derive(Debug, Clone)]
pub struct ChangeNotifier {
    sender: broadcast::Sender<ChangeEvent>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }

    /// Publishes an event. Having no subscribers is not an error.
    pub fn notify(&self, event: ChangeEvent) {
        let _ = self.sender.send(event);
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}
