//! Core types for the vocabulary learning engine.

use serde::{Deserialize, Serialize};

/// Milliseconds in one day.
pub const DAY_MS: i64 = 86_400_000;

/// Maximum number of synonym slots a word can carry.
pub const MAX_SYNONYM_SLOTS: usize = 3;

/// One synonym attached to a word, with its own definition and example.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynonymSlot {
    pub word: String,
    pub definition: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example_sentence: Option<String>,
}

/// Content fields of a vocabulary entry. Owned by the content source and
/// read-only to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordContent {
    pub word: String,
    pub definition: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example_sentence: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Up to [`MAX_SYNONYM_SLOTS`] slots, indexed numerically.
    #[serde(default)]
    pub synonyms: Vec<SynonymSlot>,
}

impl WordContent {
    /// Synonym slot by index, if present.
    pub fn synonym(&self, index: usize) -> Option<&SynonymSlot> {
        self.synonyms.get(index)
    }
}

/// Mutable spaced-repetition state of a word. Timestamps are milliseconds
/// since the Unix epoch; `0` means never reviewed / not yet scheduled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningState {
    pub ease_factor: f64,
    /// Days until the next review.
    pub interval: f64,
    /// Consecutive successful reviews.
    pub repetition_count: u32,
    pub last_reviewed: i64,
    pub next_review_date: i64,
    pub times_reviewed: u32,
    pub times_correct: u32,
    pub bookmarked: bool,
}

impl Default for LearningState {
    fn default() -> Self {
        Self {
            ease_factor: 2.5,
            interval: 0.0,
            repetition_count: 0,
            last_reviewed: 0,
            next_review_date: 0,
            times_reviewed: 0,
            times_correct: 0,
            bookmarked: false,
        }
    }
}

impl LearningState {
    /// A word is overdue once its scheduled review time has passed.
    pub fn is_overdue(&self, now_ms: i64) -> bool {
        self.next_review_date > 0 && self.next_review_date <= now_ms
    }

    /// A word is unseen until its first recorded answer.
    pub fn is_unseen(&self) -> bool {
        self.times_reviewed == 0
    }
}

/// A vocabulary entry with its learning state, keyed by `content.word`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordRecord {
    pub content: WordContent,
    pub state: LearningState,
}

impl WordRecord {
    /// Create a record with default learning state.
    pub fn new(content: WordContent) -> Self {
        Self {
            content,
            state: LearningState::default(),
        }
    }

    pub fn key(&self) -> &str {
        &self.content.word
    }
}

/// A single answer event as captured by the caller.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AnswerEvent {
    pub correct: bool,
    pub response_time_ms: i64,
    pub used_hint: bool,
}

/// Result of recording an answer.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewOutcome {
    /// Quality score in `0..=5`.
    pub quality: u8,
    /// Whether the answer passed (`quality >= 3`).
    pub passed: bool,
    /// Overdue bonus applied to the interval multiplier; `1.0` when none.
    pub interval_bonus: f64,
    pub state: LearningState,
}

/// Aggregate learner statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct UserStats {
    pub words_learned: usize,
    pub day_streak: usize,
    pub saved_words_count: usize,
}

/// Per-word learning state in durable-document form.
///
/// This is the wire dialect of the per-user document store: camelCase field
/// names, every state field optional so partial documents merge
/// field-by-field. Deserialization also accepts the legacy names
/// `correctCount` and `lastReviewDate`; serialization always emits the
/// canonical ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedWordState {
    pub word: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ease_factor: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repetition_count: Option<u32>,
    #[serde(alias = "lastReviewDate", skip_serializing_if = "Option::is_none")]
    pub last_reviewed: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_review_date: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub times_reviewed: Option<u32>,
    #[serde(alias = "correctCount", skip_serializing_if = "Option::is_none")]
    pub times_correct: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_bookmarked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

impl PersistedWordState {
    /// Snapshot a record's learning state for a flush.
    pub fn from_state(word: &str, state: &LearningState, updated_at: i64) -> Self {
        Self {
            word: word.to_string(),
            ease_factor: Some(state.ease_factor),
            interval: Some(state.interval),
            repetition_count: Some(state.repetition_count),
            last_reviewed: Some(state.last_reviewed),
            next_review_date: Some(state.next_review_date),
            times_reviewed: Some(state.times_reviewed),
            times_correct: Some(state.times_correct),
            is_bookmarked: Some(state.bookmarked),
            updated_at: Some(updated_at),
        }
    }
}
