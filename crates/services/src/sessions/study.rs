use chrono::{DateTime, Utc};
use vocab_core::model::{SessionReport, StudyMode, Word, WordId};
use vocab_core::progression::SessionRef;
use vocab_core::scheduler::{ReviewOutcome, apply_rating};
use vocab_core::time::rounded_secs_between;

use super::progress::SessionProgress;
use crate::error::StudyError;

/// Outcome of rating one flashcard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudyRating {
    pub word_id: WordId,
    pub outcome: ReviewOutcome,
    pub is_complete: bool,
}

//
// ─── STUDY RUN ─────────────────────────────────────────────────────────────────
//

/// Flashcard pass over a session's words.
///
/// Each rating goes through the review scheduler and sorts the word into the
/// mastered or troublesome list. Words keep their rated state in the report.
#[derive(Debug, Clone)]
pub struct StudyRun {
    session: SessionRef,
    words: Vec<Word>,
    current: usize,
    mastered: Vec<Word>,
    troublesome: Vec<Word>,
    started_at: DateTime<Utc>,
}

impl StudyRun {
    /// # Errors
    ///
    /// Returns `StudyError::Empty` if there are no words to study.
    pub fn new(
        session: SessionRef,
        words: Vec<Word>,
        started_at: DateTime<Utc>,
    ) -> Result<Self, StudyError> {
        if words.is_empty() {
            return Err(StudyError::Empty);
        }
        Ok(Self {
            session,
            words,
            current: 0,
            mastered: Vec::new(),
            troublesome: Vec::new(),
            started_at,
        })
    }

    #[must_use]
    pub fn session(&self) -> SessionRef {
        self.session
    }

    #[must_use]
    pub fn current(&self) -> Option<&Word> {
        self.words.get(self.current)
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.current >= self.words.len()
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress::new(self.words.len(), self.current)
    }

    /// Rate the current word and move to the next one.
    ///
    /// # Errors
    ///
    /// Returns `StudyError::Completed` once every word has been rated.
    pub fn rate(&mut self, is_correct: bool, now: DateTime<Utc>) -> Result<StudyRating, StudyError> {
        let word = self
            .words
            .get_mut(self.current)
            .ok_or(StudyError::Completed)?;
        let outcome = apply_rating(word, is_correct, now);
        let rated = word.clone();
        let word_id = rated.id().clone();

        if is_correct {
            self.mastered.push(rated);
        } else {
            self.troublesome.push(rated);
        }
        self.current += 1;

        Ok(StudyRating {
            word_id,
            outcome,
            is_complete: self.is_complete(),
        })
    }

    /// Close the run and build its report.
    ///
    /// # Errors
    ///
    /// Returns `StudyError::Unfinished` if some words were not rated.
    pub fn finish(self, ended_at: DateTime<Utc>) -> Result<SessionReport, StudyError> {
        if !self.is_complete() {
            return Err(StudyError::Unfinished);
        }
        Ok(SessionReport::new(
            StudyMode::Study,
            self.mastered,
            self.troublesome,
            rounded_secs_between(self.started_at, ended_at),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use vocab_core::model::{Difficulty, LevelId, WordTemplate};
    use vocab_core::time::fixed_now;

    fn words(n: usize) -> Vec<Word> {
        (0..n)
            .map(|i| {
                Word::fresh(
                    WordId::new(format!("w{i}")),
                    &WordTemplate::new(format!("word{i}"), "d", "e"),
                    Difficulty::MIN,
                )
            })
            .collect()
    }

    fn run(n: usize) -> StudyRun {
        StudyRun::new(SessionRef::new(LevelId::FIRST, 0), words(n), fixed_now()).unwrap()
    }

    #[test]
    fn rates_every_word_and_reports() {
        let mut run = run(10);
        let now = fixed_now();
        for i in 0..10 {
            let rating = run.rate(i < 7, now).unwrap();
            assert_eq!(rating.word_id.as_str(), format!("w{i}"));
            assert_eq!(rating.is_complete, i == 9);
        }
        assert!(run.is_complete());
        assert!(run.current().is_none());

        let report = run
            .finish(now + Duration::milliseconds(61_600))
            .unwrap();
        assert_eq!(report.mode(), StudyMode::Study);
        assert_eq!(report.score(), 7);
        assert_eq!(report.total(), 10);
        assert_eq!(report.time_spent_secs(), 62);
        assert!(report.passed());
        assert_eq!(report.mastered_words()[0].level(), 1);
        assert_eq!(report.troublesome_words()[0].level(), 0);
    }

    #[test]
    fn below_threshold_does_not_pass() {
        let mut run = run(10);
        for i in 0..10 {
            run.rate(i < 6, fixed_now()).unwrap();
        }
        let report = run.finish(fixed_now()).unwrap();
        assert_eq!(report.percentage(), 60);
        assert!(!report.passed());
    }

    #[test]
    fn rating_applies_scheduler() {
        let mut run = run(2);
        let rating = run.rate(true, fixed_now()).unwrap();
        assert_eq!(rating.outcome.level, 1);
        assert_eq!(rating.outcome.next_review, fixed_now() + Duration::days(1));

        let rating = run.rate(false, fixed_now()).unwrap();
        assert_eq!(rating.outcome.level, 0);
        assert_eq!(rating.outcome.next_review, fixed_now());
    }

    #[test]
    fn guards_empty_finished_and_unfinished_runs() {
        assert!(matches!(
            StudyRun::new(SessionRef::new(LevelId::FIRST, 0), Vec::new(), fixed_now()),
            Err(StudyError::Empty)
        ));

        let mut partial = run(2);
        partial.rate(true, fixed_now()).unwrap();
        assert_eq!(partial.progress(), SessionProgress::new(2, 1));
        assert!(matches!(
            partial.clone().finish(fixed_now()),
            Err(StudyError::Unfinished)
        ));

        partial.rate(true, fixed_now()).unwrap();
        assert!(matches!(
            partial.rate(true, fixed_now()),
            Err(StudyError::Completed)
        ));
    }
}
