use serde::{Deserialize, Serialize};

use crate::model::{SessionId, UnlockStatus, Word, WordId};

/// A fixed batch of words studied together inside a level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    id: SessionId,
    title: String,
    words: Vec<Word>,
    status: UnlockStatus,
}

impl Session {
    #[must_use]
    pub fn new(
        id: SessionId,
        title: impl Into<String>,
        words: Vec<Word>,
        status: UnlockStatus,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            words,
            status,
        }
    }

    #[must_use]
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn words(&self) -> &[Word] {
        &self.words
    }

    #[must_use]
    pub fn status(&self) -> UnlockStatus {
        self.status
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.status.is_locked()
    }

    /// Rounded mean difficulty of the session's words, `None` when empty.
    #[must_use]
    pub fn average_difficulty(&self) -> Option<u8> {
        if self.words.is_empty() {
            return None;
        }
        let sum: u32 = self
            .words
            .iter()
            .map(|w| u32::from(w.difficulty().value()))
            .sum();
        let len = u32::try_from(self.words.len()).unwrap_or(u32::MAX);
        let rounded = (sum * 2 + len) / (len * 2);
        u8::try_from(rounded).ok()
    }

    pub(crate) fn advance(&mut self, target: UnlockStatus) -> bool {
        self.status.advance_to(target)
    }

    pub(crate) fn word_mut(&mut self, id: &WordId) -> Option<&mut Word> {
        self.words.iter_mut().find(|w| w.id() == id)
    }
}
