//! Review selection.
//!
//! Picks the next words to quiz in three mutually exclusive tiers: overdue
//! words first, then unseen words, then the words closest to coming due.
//! The first non-empty tier fully determines the result; overdue and unseen
//! words are never mixed in one batch.

use std::cmp::Ordering;

use rand::{rng, seq::SliceRandom};

use crate::types::{LearningState, WordRecord, DAY_MS};

/// Due ratio assigned to words that have never been scheduled; sorts below
/// every real ratio.
const UNSCHEDULED_DUE_RATIO: f64 = -100.0;

/// Overdue tier size at and above which selection tightens to exactly this
/// many words, ignoring the requested count.
pub const OVERDUE_BATCH: usize = 3;

/// How far past due a word is, normalized by its own interval length.
/// Negative while the word is not yet due.
fn due_ratio(state: &LearningState, now_ms: i64) -> f64 {
    (now_ms - state.next_review_date) as f64 / (state.interval.max(1.0) * DAY_MS as f64)
}

/// Due ratio with the unscheduled sentinel applied.
fn ranked_due_ratio(state: &LearningState, now_ms: i64) -> f64 {
    if state.next_review_date > 0 {
        due_ratio(state, now_ms)
    } else {
        UNSCHEDULED_DUE_RATIO
    }
}

/// Descending by ratio, ties broken by the earlier due date.
fn compare_ratios(a: (f64, i64), b: (f64, i64)) -> Ordering {
    b.0.partial_cmp(&a.0)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.1.cmp(&b.1))
}

/// Select up to `count` words for review from `pool` at `now_ms`.
///
/// Tier rules:
/// 1. Overdue words, most overdue first (highest ratio, then longest
///    overdue). A backlog of three or more is clipped to a batch of exactly
///    [`OVERDUE_BATCH`] so one session is not flooded, even when the caller
///    asked for more.
/// 2. Unseen words: a uniform random sample of `min(count, tier size)`.
/// 3. All words scheduled in the future: the `count` words with the
///    least-negative due ratio. Scheduled-less words rank last.
///
/// `count == 0` and an empty pool both return an empty list.
pub fn select_for_review(pool: &[WordRecord], count: usize, now_ms: i64) -> Vec<&WordRecord> {
    if count == 0 || pool.is_empty() {
        return Vec::new();
    }

    let mut overdue: Vec<&WordRecord> = pool
        .iter()
        .filter(|record| record.state.is_overdue(now_ms))
        .collect();
    if !overdue.is_empty() {
        overdue.sort_by(|a, b| {
            compare_ratios(
                (due_ratio(&a.state, now_ms), a.state.next_review_date),
                (due_ratio(&b.state, now_ms), b.state.next_review_date),
            )
        });
        let take = if overdue.len() >= OVERDUE_BATCH {
            OVERDUE_BATCH
        } else {
            count
        };
        overdue.truncate(take);
        return overdue;
    }

    let unseen: Vec<&WordRecord> = pool
        .iter()
        .filter(|record| record.state.is_unseen())
        .collect();
    if !unseen.is_empty() {
        return sample(unseen, count);
    }

    let mut ranked: Vec<&WordRecord> = pool.iter().collect();
    ranked.sort_by(|a, b| {
        compare_ratios(
            (ranked_due_ratio(&a.state, now_ms), a.state.next_review_date),
            (ranked_due_ratio(&b.state, now_ms), b.state.next_review_date),
        )
    });
    ranked.truncate(count);
    ranked
}

/// Uniform sample without replacement via Fisher-Yates shuffle.
fn sample(mut candidates: Vec<&WordRecord>, count: usize) -> Vec<&WordRecord> {
    if candidates.len() > count {
        let mut rng = rng();
        candidates.shuffle(&mut rng);
        candidates.truncate(count);
    }
    candidates
}
