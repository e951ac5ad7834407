use chrono::{DateTime, Utc};
use rand::Rng;
use vocab_core::model::{SessionReport, StudyMode, Word, WordId};
use vocab_core::quiz::{ensure_quizzable, options_for};
use vocab_core::time::rounded_secs_between;

use super::progress::SessionProgress;
use crate::error::StudyError;

/// One multiple-choice question: pick the definition of `word`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizQuestion<'a> {
    pub word: &'a Word,
    pub options: Vec<&'a Word>,
}

/// Outcome of answering one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizAnswer {
    pub correct: bool,
    pub expected: WordId,
    pub is_complete: bool,
}

/// Multiple-choice pass over a session's words.
///
/// Quizzes measure recall only. Word review state is left untouched.
#[derive(Debug, Clone)]
pub struct QuizRun {
    words: Vec<Word>,
    current: usize,
    mastered: Vec<Word>,
    troublesome: Vec<Word>,
    started_at: DateTime<Utc>,
}

impl QuizRun {
    /// # Errors
    ///
    /// Returns `StudyError::Quiz` if there are too few words for four options.
    pub fn new(words: Vec<Word>, started_at: DateTime<Utc>) -> Result<Self, StudyError> {
        ensure_quizzable(&words)?;
        Ok(Self {
            words,
            current: 0,
            mastered: Vec::new(),
            troublesome: Vec::new(),
            started_at,
        })
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.current >= self.words.len()
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress::new(self.words.len(), self.current)
    }

    #[must_use]
    pub fn score(&self) -> usize {
        self.mastered.len()
    }

    /// The current question with freshly shuffled options, `None` when done.
    ///
    /// # Errors
    ///
    /// Returns `StudyError::Quiz` if options cannot be built.
    pub fn question<R: Rng>(&self, rng: &mut R) -> Result<Option<QuizQuestion<'_>>, StudyError> {
        if self.is_complete() {
            return Ok(None);
        }
        let options = options_for(&self.words, self.current, rng)?;
        Ok(Some(QuizQuestion {
            word: &self.words[self.current],
            options,
        }))
    }

    /// Answer the current question with the chosen option.
    ///
    /// # Errors
    ///
    /// Returns `StudyError::Completed` once every question has been answered.
    pub fn answer(&mut self, chosen: &WordId) -> Result<QuizAnswer, StudyError> {
        let word = self
            .words
            .get(self.current)
            .cloned()
            .ok_or(StudyError::Completed)?;
        let correct = word.id() == chosen;
        let expected = word.id().clone();

        if correct {
            self.mastered.push(word);
        } else {
            self.troublesome.push(word);
        }
        self.current += 1;

        Ok(QuizAnswer {
            correct,
            expected,
            is_complete: self.is_complete(),
        })
    }

    /// # Errors
    ///
    /// Returns `StudyError::Unfinished` if some questions were not answered.
    pub fn finish(self, ended_at: DateTime<Utc>) -> Result<SessionReport, StudyError> {
        if !self.is_complete() {
            return Err(StudyError::Unfinished);
        }
        Ok(SessionReport::new(
            StudyMode::Quiz,
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
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use vocab_core::model::{Difficulty, WordTemplate};
    use vocab_core::quiz::{OPTION_COUNT, QuizError};
    use vocab_core::time::fixed_now;

    fn words(n: usize) -> Vec<Word> {
        (0..n)
            .map(|i| {
                Word::fresh(
                    WordId::new(format!("w{i}")),
                    &WordTemplate::new(format!("word{i}"), format!("def{i}"), "e"),
                    Difficulty::MIN,
                )
            })
            .collect()
    }

    #[test]
    fn quiz_tallies_answers_without_touching_review_state() {
        let mut rng = StdRng::seed_from_u64(21);
        let mut run = QuizRun::new(words(5), fixed_now()).unwrap();

        let mut answered = 0;
        while let Some(question) = run.question(&mut rng).unwrap() {
            assert_eq!(question.options.len(), OPTION_COUNT);
            let pick = if answered % 2 == 0 {
                question.word.id().clone()
            } else {
                question
                    .options
                    .iter()
                    .find(|w| w.id() != question.word.id())
                    .map(|w| w.id().clone())
                    .unwrap()
            };
            let result = run.answer(&pick).unwrap();
            assert_eq!(result.correct, answered % 2 == 0);
            answered += 1;
        }

        assert_eq!(answered, 5);
        assert_eq!(run.score(), 3);
        let report = run.finish(fixed_now() + Duration::seconds(30)).unwrap();
        assert_eq!(report.mode(), StudyMode::Quiz);
        assert_eq!((report.score(), report.total()), (3, 5));
        assert_eq!(report.time_spent_secs(), 30);
        assert!(!report.passed());
        assert!(report.mastered_words().iter().all(|w| w.level() == 0));
    }

    #[test]
    fn quiz_needs_four_words() {
        let err = QuizRun::new(words(3), fixed_now()).unwrap_err();
        assert!(matches!(
            err,
            StudyError::Quiz(QuizError::NotEnoughWords { available: 3, .. })
        ));
    }

    #[test]
    fn finished_quiz_rejects_more_answers() {
        let mut run = QuizRun::new(words(4), fixed_now()).unwrap();
        for i in 0..4 {
            run.answer(&WordId::new(format!("w{i}"))).unwrap();
        }
        assert!(run.question(&mut StdRng::seed_from_u64(1)).unwrap().is_none());
        assert!(matches!(
            run.answer(&WordId::new("w0")),
            Err(StudyError::Completed)
        ));
        let report = run.finish(fixed_now()).unwrap();
        assert_eq!(report.percentage(), 100);
    }
}
