use chrono::{DateTime, Duration, Utc};

use crate::model::Word;

/// Longest interval a word can be scheduled out, reached at SRS level 6.
pub const MAX_INTERVAL_DAYS: i64 = 60;

//
// ─── REVIEW OUTCOME ────────────────────────────────────────────────────────────
//

/// New SRS stage and due time produced by a single rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewOutcome {
    pub level: u32,
    pub next_review: DateTime<Utc>,
}

//
// ─── INTERVALS ─────────────────────────────────────────────────────────────────
//

/// Days until the next review for a word that just reached `level`.
///
/// | level | days |
/// |-------|------|
/// | 0     | 0    |
/// | 1     | 1    |
/// | 2     | 3    |
/// | 3     | 7    |
/// | 4     | 14   |
/// | 5     | 30   |
/// | ≥ 6   | 60   |
#[must_use]
pub fn interval_days(level: u32) -> i64 {
    match level {
        0 => 0,
        1 => 1,
        2 => 3,
        3 => 7,
        4 => 14,
        5 => 30,
        _ => MAX_INTERVAL_DAYS,
    }
}

/// Compute the review state that follows a rating.
///
/// A miss resets the word to level 0 and makes it due at `now`. A hit moves
/// it one level up and schedules it `interval_days(level)` after `now`.
///
/// ```
/// # use vocab_core::scheduler::next_review_state;
/// # use vocab_core::time::fixed_now;
/// let now = fixed_now();
/// let outcome = next_review_state(2, true, now);
/// assert_eq!(outcome.level, 3);
/// assert_eq!(outcome.next_review, now + chrono::Duration::days(7));
/// ```
#[must_use]
pub fn next_review_state(current_level: u32, is_correct: bool, now: DateTime<Utc>) -> ReviewOutcome {
    if !is_correct {
        return ReviewOutcome {
            level: 0,
            next_review: now,
        };
    }

    let level = current_level.saturating_add(1);
    ReviewOutcome {
        level,
        next_review: now + Duration::days(interval_days(level)),
    }
}

/// Rate a word at `now` and store the outcome on it.
pub fn apply_rating(word: &mut Word, is_correct: bool, now: DateTime<Utc>) -> ReviewOutcome {
    let outcome = next_review_state(word.level(), is_correct, now);
    word.set_review_state(outcome.level, outcome.next_review);
    outcome
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
