//! Write-behind persistence for learner sessions.
//!
//! Review updates mutate the in-memory store immediately; durable writes
//! are batched and pushed through a single worker task, so flushes for a
//! session complete in the order they were requested. The pending set is
//! drained at the start of a flush and restored if the write fails, which
//! keeps two invariants: a mutation is never lost (it either rides this
//! flush or returns to the pending set) and never written twice for the
//! same flush.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{mpsc, oneshot};

use crate::db::StateStore;
use crate::models::PersistedWordState;
use crate::services::session::{now_ms, LearnerSession};

/// Queue depth for flush jobs. Jobs are tiny; the bound only guards
/// against a stalled worker.
const FLUSH_QUEUE_DEPTH: usize = 64;

/// When a background flush becomes due.
#[derive(Debug, Clone, Copy)]
pub struct FlushPolicy {
    /// Pending words must exceed this count.
    pub min_pending: usize,
    /// Time since the last successful flush must exceed this.
    pub min_elapsed_ms: i64,
}

impl Default for FlushPolicy {
    fn default() -> Self {
        Self {
            min_pending: 2,
            min_elapsed_ms: 120_000,
        }
    }
}

impl FlushPolicy {
    /// Both thresholds must be exceeded before a background flush is due.
    pub fn should_flush(&self, pending: usize, elapsed_ms: i64) -> bool {
        pending > self.min_pending && elapsed_ms > self.min_elapsed_ms
    }
}

/// Terminal state of one flush attempt.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FlushOutcome {
    /// The batch was written durably.
    Flushed { words: usize },
    /// There was nothing to write.
    Skipped { reason: String },
    /// The write failed. Unless the flush was forced, the batch is back
    /// in the pending set.
    Failed { error: String },
}

struct FlushJob {
    session: LearnerSession,
    force: bool,
    ack: Option<oneshot::Sender<FlushOutcome>>,
}

/// Serializes flush jobs through one worker task.
#[derive(Clone)]
pub struct PersistenceGateway {
    policy: FlushPolicy,
    tx: mpsc::Sender<FlushJob>,
}

impl PersistenceGateway {
    /// Spawn the flush worker over the given store. Requires a running
    /// tokio runtime.
    pub fn new(store: Arc<dyn StateStore>, policy: FlushPolicy) -> Self {
        let (tx, mut rx) = mpsc::channel::<FlushJob>(FLUSH_QUEUE_DEPTH);

        tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                let outcome = run_flush(store.as_ref(), &job.session, job.force).await;
                if let Some(ack) = job.ack {
                    let _ = ack.send(outcome);
                }
            }
        });

        Self { policy, tx }
    }

    pub fn policy(&self) -> FlushPolicy {
        self.policy
    }

    /// Enqueue a background flush if the policy says one is due.
    pub async fn schedule_if_due(&self, session: &LearnerSession) {
        let due = {
            let state = session.state().await;
            self.policy
                .should_flush(state.store.pending_len(), now_ms() - state.last_flush_ms)
        };
        if due {
            self.schedule(session.clone());
        }
    }

    /// Enqueue a background flush unconditionally, without waiting for
    /// the outcome.
    pub fn schedule(&self, session: LearnerSession) {
        let job = FlushJob {
            session,
            force: false,
            ack: None,
        };
        if self.tx.try_send(job).is_err() {
            tracing::warn!("flush queue full, dropping request; pending set is untouched");
        }
    }

    /// Flush a session and wait for the outcome. With `force`, a failed
    /// write is not retried: the batch is discarded instead of being
    /// restored to the pending set.
    pub async fn flush_now(&self, session: &LearnerSession, force: bool) -> FlushOutcome {
        let (ack_tx, ack_rx) = oneshot::channel();
        let job = FlushJob {
            session: session.clone(),
            force,
            ack: Some(ack_tx),
        };

        if self.tx.send(job).await.is_err() {
            return FlushOutcome::Failed {
                error: "flush worker stopped".to_string(),
            };
        }
        ack_rx.await.unwrap_or(FlushOutcome::Failed {
            error: "flush worker dropped the job".to_string(),
        })
    }
}

async fn run_flush(
    store: &dyn StateStore,
    session: &LearnerSession,
    force: bool,
) -> FlushOutcome {
    // Snapshot under the session lock, then write without holding it so
    // the learner keeps answering during the write.
    let (batch, drained) = {
        let mut state = session.state().await;
        let drained = state.store.take_pending();
        if drained.is_empty() {
            return FlushOutcome::Skipped {
                reason: "nothing pending".to_string(),
            };
        }

        let snapshot_at = now_ms();
        let batch: Vec<PersistedWordState> = drained
            .iter()
            .filter_map(|word| state.store.persisted_state(word, snapshot_at))
            .collect();
        (batch, drained)
    };

    let user_id = session.user_id();
    match store.upsert_word_states(user_id, &batch).await {
        Ok(()) => {
            session.state().await.last_flush_ms = now_ms();
            tracing::info!(user_id = %user_id, words = batch.len(), "flushed word states");
            FlushOutcome::Flushed { words: batch.len() }
        }
        Err(err) => {
            if force {
                tracing::warn!(user_id = %user_id, error = %err, "forced flush failed, batch discarded");
            } else {
                session.state().await.store.restore_pending(drained);
                tracing::warn!(user_id = %user_id, error = %err, "flush failed, batch kept for retry");
            }
            FlushOutcome::Failed {
                error: err.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStateStore;
    use vocab_core::{AnswerEvent, WordContent, WordStore};

    fn word(name: &str) -> WordContent {
        WordContent {
            word: name.to_string(),
            definition: format!("definition of {name}"),
            example_sentence: None,
            category: None,
            synonyms: Vec::new(),
        }
    }

    fn session_with_answers(words: &[&str], answered: &[&str], now: i64) -> LearnerSession {
        let mut store = WordStore::new();
        store.load(words.iter().map(|w| word(w)).collect());
        for key in answered {
            store
                .record_answer(
                    key,
                    &AnswerEvent {
                        correct: true,
                        response_time_ms: 1_000,
                        used_hint: false,
                    },
                    now,
                )
                .unwrap();
        }
        LearnerSession::new("u1", store, now)
    }

    // === Policy tests ===

    #[test]
    fn policy_requires_both_thresholds() {
        let policy = FlushPolicy::default();
        assert!(!policy.should_flush(0, 300_000));
        assert!(!policy.should_flush(2, 300_000));
        assert!(!policy.should_flush(3, 120_000));
        assert!(!policy.should_flush(10, 5_000));
        assert!(policy.should_flush(3, 120_001));
        assert!(policy.should_flush(50, 600_000));
    }

    // === Flush tests ===

    #[tokio::test]
    async fn empty_pending_set_is_skipped() {
        let store = Arc::new(MemoryStateStore::new());
        let gateway = PersistenceGateway::new(store.clone(), FlushPolicy::default());
        let session = session_with_answers(&["a"], &[], now_ms());

        let outcome = gateway.flush_now(&session, false).await;
        assert!(matches!(outcome, FlushOutcome::Skipped { .. }));
        assert_eq!(store.count("u1").await, 0);
    }

    #[tokio::test]
    async fn successful_flush_writes_batch_and_clears_pending() {
        let store = Arc::new(MemoryStateStore::new());
        let gateway = PersistenceGateway::new(store.clone(), FlushPolicy::default());
        let session = session_with_answers(&["a", "b"], &["a", "b"], now_ms());

        let outcome = gateway.flush_now(&session, false).await;
        assert!(matches!(outcome, FlushOutcome::Flushed { words: 2 }));
        assert_eq!(store.count("u1").await, 2);
        assert_eq!(session.state().await.store.pending_len(), 0);

        let docs = store.load_word_states("u1").await.unwrap();
        assert!(docs.iter().all(|d| d.times_reviewed == Some(1)));
    }

    #[tokio::test]
    async fn flushing_twice_skips_the_second_time() {
        let store = Arc::new(MemoryStateStore::new());
        let gateway = PersistenceGateway::new(store.clone(), FlushPolicy::default());
        let session = session_with_answers(&["a"], &["a"], now_ms());

        assert!(matches!(
            gateway.flush_now(&session, false).await,
            FlushOutcome::Flushed { words: 1 }
        ));
        assert!(matches!(
            gateway.flush_now(&session, false).await,
            FlushOutcome::Skipped { .. }
        ));
    }

    #[tokio::test]
    async fn failed_flush_keeps_pending_for_retry() {
        let store = Arc::new(MemoryStateStore::new());
        let gateway = PersistenceGateway::new(store.clone(), FlushPolicy::default());
        let session = session_with_answers(&["a", "b"], &["a", "b"], now_ms());

        store.fail_writes(true);
        let outcome = gateway.flush_now(&session, false).await;
        assert!(matches!(outcome, FlushOutcome::Failed { .. }));
        assert_eq!(store.count("u1").await, 0);
        assert_eq!(session.state().await.store.pending_len(), 2);

        // Retry after the store recovers; nothing was lost.
        store.fail_writes(false);
        let outcome = gateway.flush_now(&session, false).await;
        assert!(matches!(outcome, FlushOutcome::Flushed { words: 2 }));
        assert_eq!(store.count("u1").await, 2);
    }

    #[tokio::test]
    async fn forced_flush_failure_discards_the_batch() {
        let store = Arc::new(MemoryStateStore::new());
        let gateway = PersistenceGateway::new(store.clone(), FlushPolicy::default());
        let session = session_with_answers(&["a"], &["a"], now_ms());

        store.fail_writes(true);
        let outcome = gateway.flush_now(&session, true).await;
        assert!(matches!(outcome, FlushOutcome::Failed { .. }));
        assert_eq!(session.state().await.store.pending_len(), 0);
    }

    #[tokio::test]
    async fn mutations_after_a_failed_flush_ride_the_retry() {
        let store = Arc::new(MemoryStateStore::new());
        let gateway = PersistenceGateway::new(store.clone(), FlushPolicy::default());
        let session = session_with_answers(&["a", "b"], &["a"], now_ms());

        store.fail_writes(true);
        gateway.flush_now(&session, false).await;

        session
            .state()
            .await
            .store
            .record_answer(
                "b",
                &AnswerEvent {
                    correct: true,
                    response_time_ms: 1_000,
                    used_hint: false,
                },
                now_ms(),
            )
            .unwrap();

        store.fail_writes(false);
        let outcome = gateway.flush_now(&session, false).await;
        assert!(matches!(outcome, FlushOutcome::Flushed { words: 2 }));
        assert_eq!(store.count("u1").await, 2);
    }

    #[tokio::test]
    async fn successful_flush_resets_the_policy_clock() {
        let store = Arc::new(MemoryStateStore::new());
        let gateway = PersistenceGateway::new(store.clone(), FlushPolicy::default());
        // Session created ten minutes in the past.
        let session = session_with_answers(&["a"], &["a"], now_ms() - 600_000);

        let before = session.state().await.last_flush_ms;
        gateway.flush_now(&session, false).await;
        let after = session.state().await.last_flush_ms;
        assert!(after > before);
    }

    #[tokio::test]
    async fn scheduled_flushes_complete_in_order() {
        let store = Arc::new(MemoryStateStore::new());
        let gateway = PersistenceGateway::new(store.clone(), FlushPolicy::default());
        // Old session with three pending words makes the policy fire.
        let session = session_with_answers(&["a", "b", "c"], &["a", "b", "c"], now_ms() - 600_000);

        gateway.schedule_if_due(&session).await;
        // The awaited flush queues behind the scheduled one, so its
        // outcome proves the scheduled flush already ran.
        let outcome = gateway.flush_now(&session, false).await;
        assert!(matches!(outcome, FlushOutcome::Skipped { .. }));
        assert_eq!(store.count("u1").await, 3);
    }

    #[tokio::test]
    async fn schedule_if_due_respects_the_policy() {
        let store = Arc::new(MemoryStateStore::new());
        let gateway = PersistenceGateway::new(store.clone(), FlushPolicy::default());
        // Plenty pending but the session is fresh, so nothing is due.
        let session = session_with_answers(&["a", "b", "c"], &["a", "b", "c"], now_ms());

        gateway.schedule_if_due(&session).await;
        let outcome = gateway.flush_now(&session, false).await;
        assert!(matches!(outcome, FlushOutcome::Flushed { words: 3 }));
    }
}
