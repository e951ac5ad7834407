use serde::{Deserialize, Serialize};

/// Lowercased words already produced by the generator.
///
/// Kept in first-seen order so prompts list them stably. This only biases
/// generation away from repeats; it does not guarantee uniqueness.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UsedWords(Vec<String>);

impl UsedWords {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add words, lowercasing and skipping ones already present.
    ///
    /// Returns how many new entries were added.
    pub fn extend<I, S>(&mut self, words: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let before = self.0.len();
        for word in words {
            let normalized = word.as_ref().trim().to_lowercase();
            if normalized.is_empty() || self.contains(&normalized) {
                continue;
            }
            self.0.push(normalized);
        }
        self.0.len() - before
    }

    #[must_use]
    pub fn contains(&self, word: &str) -> bool {
        let needle = word.to_lowercase();
        self.0.iter().any(|w| *w == needle)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
