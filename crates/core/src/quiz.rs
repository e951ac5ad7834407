use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use thiserror::Error;

use crate::model::Word;

/// Fewest words a quiz can run with.
pub const MIN_QUIZ_WORDS: usize = 4;

/// Answer choices per question, including the correct one.
pub const OPTION_COUNT: usize = 4;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("a quiz needs at least {needed} words, got {available}")]
    NotEnoughWords { needed: usize, available: usize },

    #[error("question index {index} is out of range for {len} words")]
    OutOfRange { index: usize, len: usize },
}

/// Check that `words` can back a quiz.
///
/// # Errors
///
/// Returns `QuizError::NotEnoughWords` below [`MIN_QUIZ_WORDS`].
pub fn ensure_quizzable(words: &[Word]) -> Result<(), QuizError> {
    if words.len() < MIN_QUIZ_WORDS {
        return Err(QuizError::NotEnoughWords {
            needed: MIN_QUIZ_WORDS,
            available: words.len(),
        });
    }
    Ok(())
}

/// Shuffled answer choices for the question about `words[index]`.
///
/// The correct word is always present. Distractors are distinct words from
/// the same pool, compared by id.
///
/// # Errors
///
/// - `QuizError::NotEnoughWords` if the pool is smaller than [`MIN_QUIZ_WORDS`]
/// - `QuizError::OutOfRange` if `index` does not address a word
pub fn options_for<'a, R: Rng>(
    words: &'a [Word],
    index: usize,
    rng: &mut R,
) -> Result<Vec<&'a Word>, QuizError> {
    ensure_quizzable(words)?;
    let correct = words.get(index).ok_or(QuizError::OutOfRange {
        index,
        len: words.len(),
    })?;

    let others: Vec<&Word> = words.iter().filter(|w| w.id() != correct.id()).collect();
    let mut options: Vec<&Word> = Vec::with_capacity(OPTION_COUNT);
    options.push(correct);
    options.extend(
        others
            .choose_multiple(rng, OPTION_COUNT - 1)
            .copied(),
    );
    options.shuffle(rng);
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Difficulty, WordId, WordTemplate};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    fn pool(n: usize) -> Vec<Word> {
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
    fn options_contain_answer_and_distinct_distractors() {
        let words = pool(20);
        let mut rng = StdRng::seed_from_u64(5);
        for index in 0..words.len() {
            let options = options_for(&words, index, &mut rng).unwrap();
            assert_eq!(options.len(), OPTION_COUNT);
            assert!(options.iter().any(|w| w.id() == words[index].id()));
            let ids: HashSet<_> = options.iter().map(|w| w.id().clone()).collect();
            assert_eq!(ids.len(), OPTION_COUNT);
        }
    }

    #[test]
    fn minimum_pool_uses_every_word() {
        let words = pool(MIN_QUIZ_WORDS);
        let options = options_for(&words, 2, &mut StdRng::seed_from_u64(1)).unwrap();
        let ids: HashSet<_> = options.iter().map(|w| w.id().as_str()).collect();
        assert_eq!(ids, HashSet::from(["w0", "w1", "w2", "w3"]));
    }

    #[test]
    fn small_pool_and_bad_index_are_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            options_for(&pool(3), 0, &mut rng).unwrap_err(),
            QuizError::NotEnoughWords {
                needed: 4,
                available: 3
            }
        );
        assert_eq!(
            options_for(&pool(4), 4, &mut rng).unwrap_err(),
            QuizError::OutOfRange { index: 4, len: 4 }
        );
    }

    #[test]
    fn answer_position_varies() {
        let words = pool(8);
        let mut rng = StdRng::seed_from_u64(99);
        let positions: HashSet<usize> = (0..40)
            .filter_map(|_| {
                options_for(&words, 0, &mut rng)
                    .unwrap()
                    .iter()
                    .position(|w| w.id() == words[0].id())
            })
            .collect();
        assert!(positions.len() > 1);
    }
}
