//! Learner statistics.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

use crate::types::{UserStats, WordRecord};

/// Compute aggregate statistics over the word pool.
///
/// `words_learned` counts words reviewed at least once and
/// `saved_words_count` the bookmarked ones. The day streak is the run of
/// consecutive UTC calendar days with at least one review, ending today or
/// yesterday: a streak survives until the current day is over, not just
/// until midnight of the last review.
pub fn user_stats(words: &[WordRecord], now: DateTime<Utc>) -> UserStats {
    if words.is_empty() {
        return UserStats::default();
    }

    let words_learned = words
        .iter()
        .filter(|record| record.state.times_reviewed > 0)
        .count();
    let saved_words_count = words
        .iter()
        .filter(|record| record.state.bookmarked)
        .count();

    // Only the latest review per word is tracked, so the streak is built
    // from last_reviewed timestamps collapsed to calendar days.
    let mut review_days: Vec<NaiveDate> = words
        .iter()
        .filter(|record| record.state.last_reviewed > 0)
        .filter_map(|record| {
            Utc.timestamp_millis_opt(record.state.last_reviewed)
                .single()
                .map(|dt| dt.date_naive())
        })
        .collect();
    review_days.sort_unstable();
    review_days.dedup();
    review_days.reverse();

    UserStats {
        words_learned,
        day_streak: streak_length(&review_days, now.date_naive()),
        saved_words_count,
    }
}

/// Length of the consecutive-day run ending today or yesterday, given
/// distinct review days sorted newest first.
fn streak_length(days_newest_first: &[NaiveDate], today: NaiveDate) -> usize {
    let newest = match days_newest_first.first() {
        Some(day) => *day,
        None => return 0,
    };
    if newest != today && newest != today - Duration::days(1) {
        return 0;
    }

    let mut streak = 1;
    for pair in days_newest_first.windows(2) {
        if pair[1] == pair[0] - Duration::days(1) {
            streak += 1;
        } else {
            break;
        }
    }
    streak
}
