//! Answer quality scoring.
//!
//! Maps a single answer event (correctness, response time, hint usage) to
//! the 0-5 quality score that drives the ease-factor adjustment.

use crate::types::AnswerEvent;

/// Answers faster than this are considered instant recall.
pub const FAST_MS: i64 = 3_000;

/// Answers faster than this (but not fast) are considered solid recall.
pub const MEDIUM_MS: i64 = 5_000;

/// Response times are capped here; beyond it the learner was likely
/// distracted rather than struggling.
pub const SLOW_CAP_MS: i64 = 30_000;

/// Quality threshold at and above which an answer counts as a pass.
pub const PASS_THRESHOLD: u8 = 3;

/// Compute the quality score for an answer.
///
/// `repetition_count` is the word's streak before this answer; a wrong
/// answer on a word that had prior successes scores higher than a wrong
/// answer on a word never recalled at all.
pub fn quality_score(event: &AnswerEvent, repetition_count: u32) -> u8 {
    // Negative times are clock skew from the caller; treat as instant.
    let response_ms = event.response_time_ms.clamp(0, SLOW_CAP_MS);

    if event.used_hint {
        return if event.correct { 2 } else { 0 };
    }

    if event.correct {
        if response_ms < FAST_MS {
            5
        } else if response_ms < MEDIUM_MS {
            4
        } else {
            3
        }
    } else if repetition_count > 0 {
        // Learned it once, forgot it.
        2
    } else {
        1
    }
}
