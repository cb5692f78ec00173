//! Per-user learner sessions.
//!
//! A session owns the in-memory [`WordStore`] for one user. The manager
//! builds sessions on first touch by loading content and merging whatever
//! state the [`StateStore`] holds, then hands out cheap clones.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Mutex, MutexGuard};
use vocab_core::{MergeReport, WordStore};

use crate::db::StateStore;
use crate::error::Result;
use crate::services::content::ContentSource;
use crate::services::gateway::{FlushOutcome, PersistenceGateway};

/// Current wall-clock time in epoch milliseconds
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Mutable session state, guarded by the session mutex.
pub struct SessionState {
    pub store: WordStore,
    /// When the last successful flush finished, epoch ms.
    pub last_flush_ms: i64,
}

struct SessionInner {
    user_id: String,
    state: Mutex<SessionState>,
}

/// Handle to one user's live session. Clones share the same state.
#[derive(Clone)]
pub struct LearnerSession {
    inner: Arc<SessionInner>,
}

impl LearnerSession {
    pub fn new(user_id: &str, store: WordStore, now_ms: i64) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                user_id: user_id.to_string(),
                state: Mutex::new(SessionState {
                    store,
                    last_flush_ms: now_ms,
                }),
            }),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.inner.user_id
    }

    pub async fn state(&self) -> MutexGuard<'_, SessionState> {
        self.inner.state.lock().await
    }
}

/// Creates, caches, and tears down learner sessions.
pub struct SessionManager {
    sessions: Mutex<HashMap<String, LearnerSession>>,
    content: Arc<dyn ContentSource>,
    store: Arc<dyn StateStore>,
    gateway: PersistenceGateway,
}

impl SessionManager {
    pub fn new(
        content: Arc<dyn ContentSource>,
        store: Arc<dyn StateStore>,
        gateway: PersistenceGateway,
    ) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            content,
            store,
            gateway,
        }
    }

    pub fn gateway(&self) -> &PersistenceGateway {
        &self.gateway
    }

    /// Get the session for a user, creating it on first touch. Creation
    /// loads the word list, merges persisted state over it, and caches the
    /// session. A failed content load caches nothing, so the next call
    /// retries the fetch.
    pub async fn session(&self, user_id: &str) -> Result<LearnerSession> {
        if let Some(existing) = self.sessions.lock().await.get(user_id) {
            return Ok(existing.clone());
        }

        // Built outside the map lock; if two requests race, the first
        // registered session wins and the other copy is dropped.
        let content = self.content.load_words().await?;
        let persisted = self.store.load_word_states(user_id).await?;

        let mut word_store = WordStore::new();
        let loaded = word_store.load(content);
        let now = now_ms();
        let report = word_store.merge_persisted(&persisted, now);
        tracing::info!(
            user_id = %user_id,
            words = loaded,
            applied = report.applied,
            skipped = report.skipped,
            overdue = report.overdue,
            "session ready"
        );

        let session = LearnerSession::new(user_id, word_store, now);
        let mut sessions = self.sessions.lock().await;
        let entry = sessions
            .entry(user_id.to_string())
            .or_insert(session);
        Ok(entry.clone())
    }

    /// Re-merge the persisted state into the live session, picking up
    /// writes made elsewhere since the session was created.
    pub async fn refresh(&self, user_id: &str) -> Result<MergeReport> {
        let session = self.session(user_id).await?;
        let persisted = self.store.load_word_states(user_id).await?;

        let mut state = session.state().await;
        let report = state.store.merge_persisted(&persisted, now_ms());
        tracing::debug!(user_id = %user_id, applied = report.applied, "session refreshed");
        Ok(report)
    }

    /// Force-flush and drop a session. The force means a failed write is
    /// not retried; the session is gone either way.
    pub async fn end(&self, user_id: &str) -> FlushOutcome {
        let session = self.sessions.lock().await.remove(user_id);
        match session {
            Some(session) => self.gateway.flush_now(&session, true).await,
            None => FlushOutcome::Skipped {
                reason: "no active session".to_string(),
            },
        }
    }

    /// Flush every live session, used on shutdown.
    pub async fn flush_all(&self) {
        let sessions: Vec<LearnerSession> =
            self.sessions.lock().await.values().cloned().collect();
        for session in sessions {
            let outcome = self.gateway.flush_now(&session, true).await;
            if let FlushOutcome::Failed { error } = outcome {
                tracing::warn!(user_id = %session.user_id(), error = %error, "shutdown flush failed");
            }
        }
    }
}
