//! Database models and API types

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// Re-export shared types from vocab-core
pub use vocab_core::{
    AnswerEvent, LearningState, MergeReport, PersistedWordState, ReviewOutcome, SynonymSlot,
    UserStats, WordContent, WordRecord,
};

// === Database Entity Types ===

/// Per-word learning state stored in PostgreSQL, keyed by (user_id, word)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbWordState {
    pub id: Uuid,
    pub user_id: String,
    pub word: String,
    pub ease_factor: f64,
    pub interval_days: f64,
    pub repetition_count: i32,
    pub last_reviewed_ms: i64,
    pub next_review_ms: i64,
    pub times_reviewed: i32,
    pub times_correct: i32,
    pub bookmarked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DbWordState {
    /// Create a row from a persisted-state document. Missing document
    /// fields fall back to the defaults of a never-reviewed word.
    pub fn from_persisted(user_id: &str, state: &PersistedWordState) -> Self {
        let updated_at = state
            .updated_at
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
            .unwrap_or_else(Utc::now);

        Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            word: state.word.clone(),
            ease_factor: state.ease_factor.unwrap_or(2.5),
            interval_days: state.interval.unwrap_or(0.0),
            repetition_count: state.repetition_count.unwrap_or(0) as i32,
            last_reviewed_ms: state.last_reviewed.unwrap_or(0),
            next_review_ms: state.next_review_date.unwrap_or(0),
            times_reviewed: state.times_reviewed.unwrap_or(0) as i32,
            times_correct: state.times_correct.unwrap_or(0) as i32,
            bookmarked: state.is_bookmarked.unwrap_or(false),
            created_at: Utc::now(),
            updated_at,
        }
    }

    /// Convert to the persisted-state document form
    pub fn to_persisted(&self) -> PersistedWordState {
        PersistedWordState {
            word: self.word.clone(),
            ease_factor: Some(self.ease_factor),
            interval: Some(self.interval_days),
            repetition_count: Some(self.repetition_count.max(0) as u32),
            last_reviewed: Some(self.last_reviewed_ms),
            next_review_date: Some(self.next_review_ms),
            times_reviewed: Some(self.times_reviewed.max(0) as u32),
            times_correct: Some(self.times_correct.max(0) as u32),
            is_bookmarked: Some(self.bookmarked),
            updated_at: Some(self.updated_at.timestamp_millis()),
        }
    }
}

// === API Request/Response Types ===

// Study types
#[derive(Debug, Serialize, Deserialize)]
pub struct StudyQueueQuery {
    pub count: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StudyQueueResponse {
    pub words: Vec<WordRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnswerRequest {
    pub word: String,
    pub correct: bool,
    pub response_time_ms: i64,
    #[serde(default)]
    pub used_hint: bool,
}

impl AnswerRequest {
    pub fn event(&self) -> AnswerEvent {
        AnswerEvent {
            correct: self.correct,
            response_time_ms: self.response_time_ms,
            used_hint: self.used_hint,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AnswerResponse {
    pub word: String,
    #[serde(flatten)]
    pub outcome: ReviewOutcome,
}

// Word types
#[derive(Debug, Serialize)]
pub struct WordListResponse {
    pub words: Vec<WordRecord>,
    pub total: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BookmarkResponse {
    pub word: String,
    pub bookmarked: bool,
}

// State types
#[derive(Debug, Serialize)]
pub struct StateResponse {
    pub user_id: String,
    pub states: Vec<PersistedWordState>,
}

#[derive(Debug, Deserialize)]
pub struct ImportStateRequest {
    pub states: Vec<PersistedWordState>,
}

// Session types
#[derive(Debug, Serialize)]
pub struct SessionRefreshResponse {
    pub user_id: String,
    #[serde(flatten)]
    pub merge: MergeReport,
}
