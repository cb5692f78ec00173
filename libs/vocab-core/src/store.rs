//! The word store: the canonical in-memory pool for one learner session.
//!
//! Owns the records, the SM-2 parameters, and the set of words mutated
//! since the last successful flush. Construct one store per session and
//! pass it by handle; there is no module-level state.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{EngineError, Result};
use crate::quality::{quality_score, PASS_THRESHOLD};
use crate::scheduler;
use crate::sm2::Sm2;
use crate::stats;
use crate::types::{
    AnswerEvent, PersistedWordState, ReviewOutcome, UserStats, WordContent, WordRecord, DAY_MS,
    MAX_SYNONYM_SLOTS,
};

/// Counts from merging persisted state over loaded content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    /// Persisted entries applied to a loaded record.
    pub applied: usize,
    /// Persisted entries whose word is absent from the loaded pool.
    pub skipped: usize,
    /// Records overdue across the whole pool after the merge.
    pub overdue: usize,
}

/// In-memory word pool with pending-change tracking.
pub struct WordStore {
    words: Vec<WordRecord>,
    index: HashMap<String, usize>,
    pending: HashSet<String>,
    loaded: bool,
    sm2: Sm2,
}

impl Default for WordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl WordStore {
    /// Empty store with default SM-2 parameters.
    pub fn new() -> Self {
        Self::with_params(Sm2::default())
    }

    pub fn with_params(sm2: Sm2) -> Self {
        Self {
            words: Vec::new(),
            index: HashMap::new(),
            pending: HashSet::new(),
            loaded: false,
            sm2,
        }
    }

    /// Load content into the store, creating records with default learning
    /// state. Idempotent: once loaded, further calls leave the pool
    /// untouched and return its size. Duplicate words keep the first entry;
    /// synonym slots beyond [`MAX_SYNONYM_SLOTS`] are dropped.
    pub fn load(&mut self, content: Vec<WordContent>) -> usize {
        if self.loaded {
            return self.words.len();
        }

        for mut entry in content {
            if self.index.contains_key(&entry.word) {
                continue;
            }
            entry.synonyms.truncate(MAX_SYNONYM_SLOTS);
            self.index.insert(entry.word.clone(), self.words.len());
            self.words.push(WordRecord::new(entry));
        }
        self.loaded = true;
        self.words.len()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn words(&self) -> &[WordRecord] {
        &self.words
    }

    pub fn get(&self, key: &str) -> Option<&WordRecord> {
        self.index.get(key).map(|&idx| &self.words[idx])
    }

    /// Bookmarked records.
    pub fn saved_words(&self) -> Vec<&WordRecord> {
        self.words
            .iter()
            .filter(|record| record.state.bookmarked)
            .collect()
    }

    /// Overlay persisted learning state onto loaded records, field by field:
    /// a present persisted field wins, a missing one keeps the loaded value.
    /// Entries for words not in the pool are skipped; stale persisted data
    /// must not fail a session. A zero or missing `next_review_date` is
    /// recovered as `last_reviewed + interval` in days when both are known.
    /// Merging the same input twice yields the same state as merging once.
    pub fn merge_persisted(
        &mut self,
        states: &[PersistedWordState],
        now_ms: i64,
    ) -> MergeReport {
        let mut report = MergeReport::default();

        for persisted in states {
            let Some(&idx) = self.index.get(&persisted.word) else {
                report.skipped += 1;
                continue;
            };
            let state = &mut self.words[idx].state;

            if let Some(value) = persisted.ease_factor {
                state.ease_factor = value;
            }
            if let Some(value) = persisted.interval {
                state.interval = value;
            }
            if let Some(value) = persisted.repetition_count {
                state.repetition_count = value;
            }
            if let Some(value) = persisted.times_reviewed {
                state.times_reviewed = value;
            }
            if let Some(value) = persisted.times_correct {
                state.times_correct = value;
            }
            if let Some(value) = persisted.last_reviewed {
                if value > 0 {
                    state.last_reviewed = value;
                }
            }
            match persisted.next_review_date {
                Some(value) if value > 0 => state.next_review_date = value,
                // Recovery: older documents carry a zeroed schedule even
                // though the word has been reviewed.
                _ => {
                    if state.last_reviewed > 0 && state.interval > 0.0 {
                        state.next_review_date =
                            state.last_reviewed + (state.interval * DAY_MS as f64) as i64;
                    }
                }
            }
            if let Some(value) = persisted.is_bookmarked {
                state.bookmarked = value;
            }

            report.applied += 1;
        }

        report.overdue = self
            .words
            .iter()
            .filter(|record| record.state.is_overdue(now_ms))
            .count();
        report
    }

    /// Flip a word's bookmark and track it as pending. Returns the new flag,
    /// or `None` for an unknown word.
    pub fn toggle_bookmark(&mut self, key: &str) -> Option<bool> {
        let &idx = self.index.get(key)?;
        let record = &mut self.words[idx];
        record.state.bookmarked = !record.state.bookmarked;
        self.pending.insert(record.content.word.clone());
        Some(record.state.bookmarked)
    }

    /// Record one answer for a word: quality score, counter updates, SM-2
    /// state update, and pending registration, in that order.
    pub fn record_answer(
        &mut self,
        key: &str,
        event: &AnswerEvent,
        now_ms: i64,
    ) -> Result<ReviewOutcome> {
        let idx = *self
            .index
            .get(key)
            .ok_or_else(|| EngineError::UnknownWord {
                key: key.to_string(),
            })?;
        let record = &mut self.words[idx];

        // Quality scoring sees the streak as it was before this answer.
        let quality = quality_score(event, record.state.repetition_count);

        record.state.times_reviewed += 1;
        record.state.last_reviewed = now_ms;
        if event.correct {
            record.state.times_correct += 1;
        }

        let applied = self.sm2.review(&record.state, quality, now_ms);
        record.state = applied.state;
        self.pending.insert(record.content.word.clone());

        Ok(ReviewOutcome {
            quality,
            passed: quality >= PASS_THRESHOLD,
            interval_bonus: applied.interval_bonus,
            state: record.state.clone(),
        })
    }

    /// Scheduler selection over the pool. Empty before `load`.
    pub fn select_for_review(&self, count: usize, now_ms: i64) -> Vec<&WordRecord> {
        if !self.loaded {
            return Vec::new();
        }
        scheduler::select_for_review(&self.words, count, now_ms)
    }

    pub fn stats(&self, now: DateTime<Utc>) -> UserStats {
        stats::user_stats(&self.words, now)
    }

    /// Mark a known word pending without mutating it (used when externally
    /// supplied state is merged in and must be written back). Returns
    /// whether the word exists.
    pub fn mark_pending(&mut self, key: &str) -> bool {
        if self.index.contains_key(key) {
            self.pending.insert(key.to_string());
            true
        } else {
            false
        }
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn pending(&self) -> impl Iterator<Item = &str> {
        self.pending.iter().map(String::as_str)
    }

    /// Drain the pending set for a flush, sorted for stable batches.
    /// Mutations after the drain accumulate separately and ride the next
    /// flush; a failed flush puts the drained keys back via
    /// [`WordStore::restore_pending`].
    pub fn take_pending(&mut self) -> Vec<String> {
        let mut keys: Vec<String> = self.pending.drain().collect();
        keys.sort_unstable();
        keys
    }

    /// Re-register drained keys after a failed flush.
    pub fn restore_pending<I>(&mut self, keys: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.pending.extend(keys);
    }

    /// Durable-document snapshot of one word's state.
    pub fn persisted_state(&self, key: &str, updated_at: i64) -> Option<PersistedWordState> {
        self.get(key)
            .map(|record| PersistedWordState::from_state(key, &record.state, updated_at))
    }
}
