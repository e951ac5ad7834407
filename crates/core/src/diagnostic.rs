use thiserror::Error;

use crate::model::{Difficulty, LevelId, Word};
use crate::progression::Curriculum;

/// Number of words in a diagnostic run.
pub const DIAGNOSTIC_WORD_COUNT: usize = 20;

/// Difficulty gap between consecutive diagnostic words (5, 10, ..., 100).
pub const DIAGNOSTIC_STEP: u8 = 5;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DiagnosticError {
    #[error("diagnostic run has no words")]
    Empty,

    #[error("diagnostic run is already finished")]
    Finished,
}

//
// ─── ANSWERS & SCORING ─────────────────────────────────────────────────────────
//

/// One diagnostic word and whether the learner said they know it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticAnswer {
    pub word: Word,
    pub known: bool,
}

impl DiagnosticAnswer {
    #[must_use]
    pub fn new(word: Word, known: bool) -> Self {
        Self { word, known }
    }
}

/// Difficulty of the last known answer in scan order, or 0 if none is known.
///
/// Unknown answers never lower a previously recorded value.
#[must_use]
pub fn max_known_difficulty(answers: &[DiagnosticAnswer]) -> u8 {
    answers
        .iter()
        .rev()
        .find(|a| a.known)
        .map_or(0, |a| a.word.difficulty().value())
}

/// Recommended starting level: `max(1, ceil(max_known_difficulty / 2))`.
///
/// Answers are expected in ascending difficulty order. A learner who knows a
/// hard word anchors on it even when easier words in between were missed.
#[must_use]
pub fn recommend_level(answers: &[DiagnosticAnswer]) -> LevelId {
    let max = u32::from(max_known_difficulty(answers));
    LevelId::new(max.div_ceil(2).max(1))
}

/// The difficulties a diagnostic word set should cover.
pub fn diagnostic_difficulties() -> impl Iterator<Item = Difficulty> {
    (DIAGNOSTIC_STEP..=Difficulty::MAX.value())
        .step_by(usize::from(DIAGNOSTIC_STEP))
        .map(|value| Difficulty::clamped(i64::from(value)))
}

/// Coarse label shown next to a diagnostic word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DifficultyBand {
    Beginner,
    Intermediate,
    Advanced,
}

impl DifficultyBand {
    #[must_use]
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        match difficulty.value() {
            0..=30 => Self::Beginner,
            31..=70 => Self::Intermediate,
            _ => Self::Advanced,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Beginner => "Beginner",
            Self::Intermediate => "Intermediate",
            Self::Advanced => "Advanced",
        }
    }
}

//
// ─── RUN ───────────────────────────────────────────────────────────────────────
//

/// Step-by-step state of a diagnostic test.
#[derive(Debug, Clone)]
pub struct DiagnosticRun {
    words: Vec<Word>,
    answers: Vec<DiagnosticAnswer>,
}

impl DiagnosticRun {
    /// Start a run. Words are put in ascending difficulty order, keeping the
    /// given order among equal difficulties.
    ///
    /// # Errors
    ///
    /// Returns `DiagnosticError::Empty` if `words` is empty.
    pub fn new(mut words: Vec<Word>) -> Result<Self, DiagnosticError> {
        if words.is_empty() {
            return Err(DiagnosticError::Empty);
        }
        words.sort_by_key(Word::difficulty);
        Ok(Self {
            answers: Vec::with_capacity(words.len()),
            words,
        })
    }

    /// The word awaiting an answer, `None` once every word has been answered.
    #[must_use]
    pub fn current(&self) -> Option<&Word> {
        self.words.get(self.answers.len())
    }

    /// 1-based position of the current word.
    #[must_use]
    pub fn step(&self) -> usize {
        (self.answers.len() + 1).min(self.words.len())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Progress including the word currently shown, rounded to a percentage.
    #[must_use]
    pub fn progress_percent(&self) -> u32 {
        let total = self.words.len();
        if total == 0 {
            return 100;
        }
        let shown = self.step();
        u32::try_from((shown * 200 + total) / (total * 2)).unwrap_or(100)
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.answers.len() >= self.words.len()
    }

    #[must_use]
    pub fn answers(&self) -> &[DiagnosticAnswer] {
        &self.answers
    }

    /// Answer the current word. Returns the recommendation once the last
    /// word has been answered.
    ///
    /// # Errors
    ///
    /// Returns `DiagnosticError::Finished` if every word was already answered.
    pub fn answer(&mut self, known: bool) -> Result<Option<LevelId>, DiagnosticError> {
        let word = self.current().cloned().ok_or(DiagnosticError::Finished)?;
        self.answers.push(DiagnosticAnswer::new(word, known));
        Ok(self.is_finished().then(|| self.recommendation()))
    }

    /// Recommendation from the answers given so far.
    #[must_use]
    pub fn recommendation(&self) -> LevelId {
        recommend_level(&self.answers)
    }
}

/// Diagnostic words drawn from the curriculum itself, for when no generated set is
/// available.
///
/// For each diagnostic difficulty this picks the first curriculum word whose
/// difficulty is closest to it. Returns an empty list for an empty curriculum.
#[must_use]
pub fn static_diagnostic_words(curriculum: &Curriculum) -> Vec<Word> {
    diagnostic_difficulties()
        .filter_map(|target| {
            curriculum
                .all_words()
                .min_by_key(|w| w.difficulty().value().abs_diff(target.value()))
                .cloned()
        })
        .collect()
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
