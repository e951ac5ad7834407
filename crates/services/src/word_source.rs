use std::sync::Arc;

use tracing::{info, warn};
use vocab_core::diagnostic::{DIAGNOSTIC_STEP, DIAGNOSTIC_WORD_COUNT, static_diagnostic_words};
use vocab_core::model::{Difficulty, Session, UsedWords, Word, WordId, WordTemplate};
use vocab_core::{Clock, Curriculum};

use storage::snapshot::SnapshotRepository;

use crate::error::GenerationError;
use crate::generation::{TextGenerator, diagnostic_prompt, parse_word_list, session_prompt};

/// Where a batch of words came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordOrigin {
    Generated,
    Static,
}

/// Words for one run, tagged with their origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionWords {
    pub words: Vec<Word>,
    pub origin: WordOrigin,
}

impl SessionWords {
    #[must_use]
    pub fn is_generated(&self) -> bool {
        self.origin == WordOrigin::Generated
    }
}

/// Supplies word batches from the generator, falling back to static words.
#[derive(Clone)]
pub struct WordSource {
    clock: Clock,
    generator: Arc<dyn TextGenerator>,
    snapshots: SnapshotRepository,
}

impl WordSource {
    #[must_use]
    pub fn new(
        clock: Clock,
        generator: Arc<dyn TextGenerator>,
        snapshots: SnapshotRepository,
    ) -> Self {
        Self {
            clock,
            generator,
            snapshots,
        }
    }

    /// Generate `count` fresh words around `difficulty`.
    ///
    /// Previously generated words are excluded in the prompt, and the new
    /// words are appended to that history.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError` if the call fails or the reply cannot be parsed.
    pub async fn generate_words(
        &self,
        difficulty: Difficulty,
        count: usize,
    ) -> Result<Vec<Word>, GenerationError> {
        let mut used = match self.snapshots.load_used_words().await {
            Ok(used) => used,
            Err(err) => {
                warn!(error = %err, "could not read used-word history");
                UsedWords::new()
            }
        };

        let text = self
            .generator
            .generate(&session_prompt(difficulty, count, &used))
            .await?;
        let templates = parse_word_list(&text)?;

        let added = used.extend(templates.iter().map(|t| t.word.as_str()));
        if let Err(err) = self.snapshots.save_used_words(&used).await {
            warn!(error = %err, "could not store used-word history");
        }
        info!(
            generated = templates.len(),
            new = added,
            total_used = used.len(),
            "generated session words"
        );

        Ok(self.mint("ai", &templates, |_| difficulty))
    }

    /// Generate the diagnostic words, at most one per diagnostic difficulty.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError` if the call fails or the reply cannot be parsed.
    pub async fn generate_diagnostic_words(&self) -> Result<Vec<Word>, GenerationError> {
        let text = self.generator.generate(&diagnostic_prompt()).await?;
        let mut templates = parse_word_list(&text)?;
        templates.truncate(DIAGNOSTIC_WORD_COUNT);
        info!(generated = templates.len(), "generated diagnostic words");
        Ok(self.mint("diagnostic", &templates, diagnostic_difficulty))
    }

    /// Words for a study or quiz run of `session`.
    ///
    /// Asks the generator for as many words as the session holds, at the
    /// session's rounded mean difficulty. Falls back to the session's own
    /// words on any failure.
    pub async fn session_words(&self, session: &Session) -> SessionWords {
        let fallback = || SessionWords {
            words: session.words().to_vec(),
            origin: WordOrigin::Static,
        };
        let Some(difficulty) = session
            .average_difficulty()
            .and_then(|d| Difficulty::new(d).ok())
        else {
            return fallback();
        };

        match self
            .generate_words(difficulty, session.words().len())
            .await
        {
            Ok(words) => SessionWords {
                words,
                origin: WordOrigin::Generated,
            },
            Err(err) => {
                warn!(session = %session.id(), error = %err, "word generation failed; using static words");
                fallback()
            }
        }
    }

    /// Words for a diagnostic run, falling back to curriculum words.
    pub async fn diagnostic_words(&self, curriculum: &Curriculum) -> SessionWords {
        match self.generate_diagnostic_words().await {
            Ok(words) => SessionWords {
                words,
                origin: WordOrigin::Generated,
            },
            Err(err) => {
                warn!(error = %err, "diagnostic generation failed; using curriculum words");
                SessionWords {
                    words: static_diagnostic_words(curriculum),
                    origin: WordOrigin::Static,
                }
            }
        }
    }

    fn mint(
        &self,
        prefix: &str,
        templates: &[WordTemplate],
        fallback: impl Fn(usize) -> Difficulty,
    ) -> Vec<Word> {
        let millis = self.clock.now().timestamp_millis();
        templates
            .iter()
            .enumerate()
            .map(|(index, template)| {
                let difficulty = template.difficulty.unwrap_or_else(|| fallback(index));
                Word::fresh(
                    WordId::new(format!("{prefix}_{millis}_{index}")),
                    template,
                    difficulty,
                )
            })
            .collect()
    }
}

/// Difficulty assumed for the diagnostic word at `index` when the generator omits it.
fn diagnostic_difficulty(index: usize) -> Difficulty {
    let step = i64::from(DIAGNOSTIC_STEP);
    let position = i64::try_from(index).map_or(i64::MAX, |i| i.saturating_add(1));
    Difficulty::clamped(position.saturating_mul(step))
}
