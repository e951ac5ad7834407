use serde::{Deserialize, Serialize};

use crate::model::Word;

/// Share of mastered words required to pass a session.
pub const PASS_THRESHOLD: f64 = 0.7;

/// How a session was practised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StudyMode {
    Study,
    Quiz,
}

/// Result of one finished study or quiz run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReport {
    score: usize,
    total: usize,
    mastered_words: Vec<Word>,
    troublesome_words: Vec<Word>,
    #[serde(rename = "timeSpent")]
    time_spent_secs: u64,
    mode: StudyMode,
}

impl SessionReport {
    /// Every answered word lands in exactly one of the two lists, so the
    /// score is the mastered count and the total is both lists together.
    #[must_use]
    pub fn new(
        mode: StudyMode,
        mastered_words: Vec<Word>,
        troublesome_words: Vec<Word>,
        time_spent_secs: u64,
    ) -> Self {
        Self {
            score: mastered_words.len(),
            total: mastered_words.len() + troublesome_words.len(),
            mastered_words,
            troublesome_words,
            time_spent_secs,
            mode,
        }
    }

    #[must_use]
    pub fn score(&self) -> usize {
        self.score
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    #[must_use]
    pub fn mastered_words(&self) -> &[Word] {
        &self.mastered_words
    }

    #[must_use]
    pub fn troublesome_words(&self) -> &[Word] {
        &self.troublesome_words
    }

    #[must_use]
    pub fn time_spent_secs(&self) -> u64 {
        self.time_spent_secs
    }

    #[must_use]
    pub fn mode(&self) -> StudyMode {
        self.mode
    }

    /// Mastered share in `0.0..=1.0`; an empty report scores `0.0`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn mastery_ratio(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.score as f64 / self.total as f64
    }

    /// Score as a whole percentage.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn percentage(&self) -> u32 {
        (self.mastery_ratio() * 100.0).round() as u32
    }

    #[must_use]
    pub fn passed(&self) -> bool {
        self.total > 0 && self.mastery_ratio() >= PASS_THRESHOLD
    }
}
