//! Core vocabulary-learning engine shared by the backend service.
//!
//! Provides:
//! - Word store with pending-change tracking and persisted-state merging
//! - Three-tier review scheduler (overdue, unseen, upcoming)
//! - SM-2 derived review updater with overdue bonus
//! - Quality scoring from answer events
//! - Learner statistics (day streak, words learned)

pub mod error;
pub mod quality;
pub mod scheduler;
pub mod sm2;
pub mod stats;
pub mod store;
pub mod types;

pub use error::{EngineError, Result};
pub use quality::{quality_score, PASS_THRESHOLD};
pub use scheduler::{select_for_review, OVERDUE_BATCH};
pub use sm2::{Sm2, Sm2Outcome};
pub use stats::user_stats;
pub use store::{MergeReport, WordStore};
pub use types::{
    AnswerEvent, LearningState, PersistedWordState, ReviewOutcome, SynonymSlot, UserStats,
    WordContent, WordRecord, DAY_MS, MAX_SYNONYM_SLOTS,
};
