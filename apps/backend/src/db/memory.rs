//! In-memory state store

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::db::StateStore;
use crate::error::{ApiError, Result};
use crate::models::PersistedWordState;

/// [`StateStore`] backed by a process-local map, used when no database is
/// configured and by the test suite. Writes can be made to fail on demand
/// so retry paths are testable.
#[derive(Default)]
pub struct MemoryStateStore {
    states: Mutex<HashMap<String, HashMap<String, PersistedWordState>>>,
    fail_writes: AtomicBool,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail until reset
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of stored documents for a user
    pub async fn count(&self, user_id: &str) -> usize {
        self.states
            .lock()
            .await
            .get(user_id)
            .map_or(0, HashMap::len)
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn load_word_states(&self, user_id: &str) -> Result<Vec<PersistedWordState>> {
        let states = self.states.lock().await;
        let mut docs: Vec<PersistedWordState> = states
            .get(user_id)
            .map(|user| user.values().cloned().collect())
            .unwrap_or_default();
        docs.sort_by(|a, b| a.word.cmp(&b.word));
        Ok(docs)
    }

    async fn upsert_word_states(
        &self,
        user_id: &str,
        states: &[PersistedWordState],
    ) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ApiError::Internal("state store write refused".to_string()));
        }

        let mut map = self.states.lock().await;
        let user = map.entry(user_id.to_string()).or_default();
        for state in states {
            user.insert(state.word.clone(), state.clone());
        }
        Ok(())
    }
}
