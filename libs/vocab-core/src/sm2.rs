//! SM-2 derived scheduling update.
//!
//! Based on SuperMemo 2 with a 0-5 quality scale and an interval bonus for
//! correctly answering overdue words.

use crate::quality::PASS_THRESHOLD;
use crate::types::{LearningState, DAY_MS};

/// SM-2 update with configurable parameters.
#[derive(Debug, Clone)]
pub struct Sm2 {
    pub initial_ease: f64,
    pub minimum_ease: f64,
    /// Interval after the first successful answer (and after a reset).
    pub first_interval: f64,
    /// Interval after the second consecutive successful answer.
    pub second_interval: f64,
    /// Overdue ratio above which a correct answer earns an interval bonus.
    pub overdue_threshold: f64,
    /// Upper bound on the overdue bonus multiplier.
    pub overdue_bonus_cap: f64,
}

impl Default for Sm2 {
    fn default() -> Self {
        Self {
            initial_ease: 2.5,
            minimum_ease: 1.3,
            first_interval: 1.0,
            second_interval: 3.0,
            overdue_threshold: 0.25,
            overdue_bonus_cap: 1.5,
        }
    }
}

/// Result of applying a quality score to a learning state.
#[derive(Debug, Clone)]
pub struct Sm2Outcome {
    pub state: LearningState,
    /// Bonus applied to the interval multiplier; `1.0` when none.
    pub interval_bonus: f64,
}

impl Sm2 {
    /// Apply a quality score to a word's state at `now_ms`.
    ///
    /// Updates ease factor, interval, repetition count, and the next review
    /// timestamp. Review counters (`times_reviewed`, `times_correct`,
    /// `last_reviewed`) are the store's responsibility: the quality score
    /// must be computed against the pre-answer repetition count, so the
    /// store bumps counters around this call.
    pub fn review(&self, state: &LearningState, quality: u8, now_ms: i64) -> Sm2Outcome {
        let mut next = state.clone();
        let quality = quality.min(5);

        // Ease adjustment first; the interval step uses the updated value.
        let miss = f64::from(5 - quality);
        let adjustment = 0.1 - miss * (0.08 + miss * 0.02);
        next.ease_factor = (state.ease_factor + adjustment).max(self.minimum_ease);

        let mut interval_bonus = 1.0;
        if quality >= PASS_THRESHOLD {
            let mut multiplier = next.ease_factor;

            // Bonus for correctly recalling a word past its due date,
            // capped at 50% extra growth.
            if state.next_review_date > 0 && state.next_review_date < now_ms {
                let days_overdue = (now_ms - state.next_review_date) as f64 / DAY_MS as f64;
                let overdue_ratio = days_overdue / state.interval.max(1.0);
                if overdue_ratio > self.overdue_threshold {
                    interval_bonus = (1.0 + overdue_ratio * 0.5).min(self.overdue_bonus_cap);
                    multiplier *= interval_bonus;
                }
            }

            next.interval = match state.repetition_count {
                0 => self.first_interval,
                1 => self.second_interval,
                _ => state.interval * multiplier,
            };
            next.repetition_count = state.repetition_count + 1;
        } else {
            next.interval = self.first_interval;
            next.repetition_count = 0;
        }

        next.next_review_date = now_ms + (next.interval * DAY_MS as f64) as i64;

        Sm2Outcome {
            state: next,
            interval_bonus,
        }
    }
}
