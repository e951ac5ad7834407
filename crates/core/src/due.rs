//! Due-set selection over word collections.

use chrono::{DateTime, Utc};

use crate::model::Word;

/// Words whose review time has arrived at `now`, in input order.
///
/// A word is due when it was never scheduled or `next_review <= now`.
#[must_use]
pub fn due_words(words: &[Word], now: DateTime<Utc>) -> Vec<&Word> {
    words.iter().filter(|w| w.is_due(now)).collect()
}

/// Split words into `(due, not_due)`, both keeping input order.
#[must_use]
pub fn partition_due(words: &[Word], now: DateTime<Utc>) -> (Vec<&Word>, Vec<&Word>) {
    words.iter().partition(|w| w.is_due(now))
}

/// Number of words with at least one successful review.
#[must_use]
pub fn learned_count(words: &[Word]) -> usize {
    words.iter().filter(|w| w.is_learned()).count()
}
