//! Test fixtures and factory functions for creating test data.

use serde_json::json;
use uuid::Uuid;

use vocabboost_backend::models::{SynonymSlot, WordContent};

/// Milliseconds in one day, matching the engine's schedule arithmetic.
pub const DAY_MS: i64 = 86_400_000;

/// The word list every in-memory test context serves.
pub fn word_set() -> Vec<WordContent> {
    vec![
        word_with_synonyms(
            "ephemeral",
            "lasting for a very short time",
            &["fleeting", "transient"],
        ),
        word_with_synonyms("laconic", "using very few words", &["terse"]),
        word_with_synonyms(
            "ubiquitous",
            "present or appearing everywhere",
            &["omnipresent", "pervasive"],
        ),
        word_with_synonyms(
            "obdurate",
            "stubbornly refusing to change one's opinion",
            &[],
        ),
        word_with_synonyms("alacrity", "brisk and cheerful readiness", &["eagerness"]),
    ]
}

/// Build one word entry with the given synonym slots.
pub fn word_with_synonyms(word: &str, definition: &str, synonyms: &[&str]) -> WordContent {
    WordContent {
        word: word.to_string(),
        definition: definition.to_string(),
        example_sentence: Some(format!("An example sentence using {word}.")),
        category: Some("adjective".to_string()),
        synonyms: synonyms
            .iter()
            .map(|s| SynonymSlot {
                word: s.to_string(),
                definition: format!("close in meaning to {word}"),
                example_sentence: None,
            })
            .collect(),
    }
}

/// Generate a unique user id to keep tests from colliding.
pub fn unique_user(prefix: &str) -> String {
    format!("{}_{}", prefix, &Uuid::new_v4().to_string()[..8])
}

/// Create a study answer request body.
pub fn answer_request(word: &str, correct: bool, response_time_ms: i64) -> serde_json::Value {
    json!({
        "word": word,
        "correct": correct,
        "response_time_ms": response_time_ms,
        "used_hint": false
    })
}

/// Create a study answer request body with the hint flag set.
pub fn answer_with_hint(word: &str, correct: bool) -> serde_json::Value {
    json!({
        "word": word,
        "correct": correct,
        "response_time_ms": 2_000,
        "used_hint": true
    })
}

/// Create a state import request body.
pub fn import_request(states: Vec<serde_json::Value>) -> serde_json::Value {
    json!({ "states": states })
}

/// Create a persisted-state document for a word reviewed in the past and
/// now overdue by `days_overdue`.
pub fn overdue_doc(word: &str, now_ms: i64, interval: f64, days_overdue: f64) -> serde_json::Value {
    let next_review = now_ms - (days_overdue * DAY_MS as f64) as i64;
    let last_reviewed = next_review - (interval * DAY_MS as f64) as i64;
    json!({
        "word": word,
        "easeFactor": 2.5,
        "interval": interval,
        "repetitionCount": 2,
        "lastReviewed": last_reviewed,
        "nextReviewDate": next_review,
        "timesReviewed": 3,
        "timesCorrect": 2
    })
}
