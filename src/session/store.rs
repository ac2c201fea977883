//! Session registry
//!
//! Each browser tab gets its own `ConversationManager`, looked up by id.
//! Sessions that sit idle past the configured TTL are discarded.

use super::ConversationManager;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard, RwLock};
use uuid::Uuid;

pub type SessionId = Uuid;

/// One editing session
///
/// The manager sits behind an async mutex so a session's
/// upload, prompt, response and render steps never interleave.
#[derive(Debug)]
pub struct Session {
    manager: Mutex<ConversationManager>,
    /// Unix millis of the last lock
    last_active: AtomicI64,
}

impl Session {
    fn new() -> Self {
        Self {
            manager: Mutex::new(ConversationManager::new()),
            last_active: AtomicI64::new(Utc::now().timestamp_millis()),
        }
    }

    /// Lock the manager and mark the session as used
    pub async fn lock(&self) -> MutexGuard<'_, ConversationManager> {
        self.touch();
        self.manager.lock().await
    }

    /// Mark the session as used without locking it
    pub fn touch(&self) {
        self.last_active
            .store(Utc::now().timestamp_millis(), Ordering::Relaxed);
    }

    fn is_busy(&self) -> bool {
        self.manager.try_lock().is_err()
    }

    fn idle_for(&self, now_millis: i64) -> Duration {
        let idle = now_millis - self.last_active.load(Ordering::Relaxed);
        Duration::from_millis(u64::try_from(idle).unwrap_or(0))
    }
}

#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<SessionId, Arc<Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self) -> SessionId {
        let id = Uuid::new_v4();
        let mut sessions = self.sessions.write().await;
        sessions.insert(id, Arc::new(Session::new()));
        tracing::info!(session = %id, open_sessions = sessions.len(), "Session created");
        id
    }

    pub async fn get(&self, id: &SessionId) -> Option<Arc<Session>> {
        self.sessions.read().await.get(id).cloned()
    }

    pub async fn remove(&self, id: &SessionId) -> bool {
        let removed = self.sessions.write().await.remove(id).is_some();
        if removed {
            tracing::info!(session = %id, "Session discarded");
        }
        removed
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drop sessions idle for longer than `max_idle`, returning how many went.
    ///
    /// A session whose manager is locked has a turn in flight and is kept
    /// regardless of its last activity.
    pub async fn prune_idle(&self, max_idle: Duration) -> usize {
        let now = Utc::now().timestamp_millis();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| session.is_busy() || session.idle_for(now) <= max_idle);
        let pruned = before - sessions.len();
        if pruned > 0 {
            tracing::info!(pruned, remaining = sessions.len(), "Pruned idle sessions");
        }
        pruned
    }

    /// Prune idle sessions in the background for the life of the process
    pub fn spawn_pruner(self: Arc<Self>, ttl: Duration) -> tokio::task::JoinHandle<()> {
        let period = (ttl / 4).max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                self.prune_idle(ttl).await;
            }
        })
    }
}
