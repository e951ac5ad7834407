use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::model::ids::WordId;

//
// ─── DIFFICULTY ────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("difficulty must be between 1 and 100, got {0}")]
pub struct DifficultyError(pub i64);

/// Word difficulty on a 1–100 scale.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Difficulty(u8);

impl Difficulty {
    pub const MIN: Difficulty = Difficulty(1);
    pub const MAX: Difficulty = Difficulty(100);

    /// # Errors
    ///
    /// Returns `DifficultyError` if `value` is outside `1..=100`.
    pub fn new(value: u8) -> Result<Self, DifficultyError> {
        if (Self::MIN.0..=Self::MAX.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(DifficultyError(i64::from(value)))
        }
    }

    /// Clamps any integer into `1..=100`.
    #[must_use]
    pub fn clamped(value: i64) -> Self {
        let clamped = value.clamp(i64::from(Self::MIN.0), i64::from(Self::MAX.0));
        // clamp guarantees the value fits
        Self(u8::try_from(clamped).unwrap_or(Self::MAX.0))
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Difficulty {
    type Error = DifficultyError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Difficulty> for u8 {
    fn from(value: Difficulty) -> Self {
        value.0
    }
}

impl fmt::Debug for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Difficulty({})", self.0)
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

//
// ─── WORD TEMPLATE ─────────────────────────────────────────────────────────────
//

/// Word content without identity or review state.
///
/// Seed vocabulary and generated entries both arrive in this shape before a
/// `Word` instance is minted from them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordTemplate {
    pub word: String,
    pub definition: String,
    pub example: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
}

impl WordTemplate {
    #[must_use]
    pub fn new(
        word: impl Into<String>,
        definition: impl Into<String>,
        example: impl Into<String>,
    ) -> Self {
        Self {
            word: word.into(),
            definition: definition.into(),
            example: example.into(),
            difficulty: None,
        }
    }

    #[must_use]
    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = Some(difficulty);
        self
    }
}

//
// ─── WORD ──────────────────────────────────────────────────────────────────────
//

/// A vocabulary item with its spaced-repetition state.
///
/// `level == 0` together with `next_review == None` means the word was never
/// reviewed and is due immediately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Word {
    id: WordId,
    word: String,
    definition: String,
    example: String,
    difficulty: Difficulty,
    level: u32,
    next_review: Option<DateTime<Utc>>,
}

impl Word {
    /// Mint an unreviewed word from template content.
    #[must_use]
    pub fn fresh(id: WordId, template: &WordTemplate, difficulty: Difficulty) -> Self {
        Self {
            id,
            word: template.word.clone(),
            definition: template.definition.clone(),
            example: template.example.clone(),
            difficulty,
            level: 0,
            next_review: None,
        }
    }

    /// Rebuild a word with review state, e.g. from an external snapshot.
    #[must_use]
    pub fn from_parts(
        id: WordId,
        template: &WordTemplate,
        difficulty: Difficulty,
        level: u32,
        next_review: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            level,
            next_review,
            ..Self::fresh(id, template, difficulty)
        }
    }

    #[must_use]
    pub fn id(&self) -> &WordId {
        &self.id
    }

    #[must_use]
    pub fn word(&self) -> &str {
        &self.word
    }

    #[must_use]
    pub fn definition(&self) -> &str {
        &self.definition
    }

    #[must_use]
    pub fn example(&self) -> &str {
        &self.example
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Current SRS stage.
    #[must_use]
    pub fn level(&self) -> u32 {
        self.level
    }

    #[must_use]
    pub fn next_review(&self) -> Option<DateTime<Utc>> {
        self.next_review
    }

    /// True when the word was never scheduled or its review time has arrived.
    #[must_use]
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review.is_none_or(|at| at <= now)
    }

    /// True once the word has at least one successful review on record.
    #[must_use]
    pub fn is_learned(&self) -> bool {
        self.level > 0
    }

    pub(crate) fn set_review_state(&mut self, level: u32, next_review: DateTime<Utc>) {
        self.level = level;
        self.next_review = Some(next_review);
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
