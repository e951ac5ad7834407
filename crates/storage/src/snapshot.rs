use std::sync::Arc;

use tracing::debug;
use vocab_core::Curriculum;
use vocab_core::model::UsedWords;

use crate::repository::{LEVELS_KEY, SnapshotStore, StorageError, USED_WORDS_KEY};

/// Typed access to the curriculum and used-word snapshots.
///
/// Values are stored as JSON strings. Parse failures surface as
/// `StorageError::Serialization` so callers can decide whether to rebuild.
#[derive(Clone)]
pub struct SnapshotRepository {
    store: Arc<dyn SnapshotStore>,
}

impl SnapshotRepository {
    #[must_use]
    pub fn new(store: Arc<dyn SnapshotStore>) -> Self {
        Self { store }
    }

    /// Load the saved curriculum, `None` if nothing was saved yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the stored value is not a
    /// valid curriculum, or a backend error.
    pub async fn load_curriculum(&self) -> Result<Option<Curriculum>, StorageError> {
        let Some(raw) = self.store.get(LEVELS_KEY).await? else {
            return Ok(None);
        };
        let curriculum: Curriculum = serde_json::from_str(&raw)
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        debug!(levels = curriculum.levels().len(), "loaded curriculum snapshot");
        Ok(Some(curriculum))
    }

    /// # Errors
    ///
    /// Returns `StorageError` if encoding or writing fails.
    pub async fn save_curriculum(&self, curriculum: &Curriculum) -> Result<(), StorageError> {
        let raw = serde_json::to_string(curriculum)
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        self.store.set(LEVELS_KEY, &raw).await
    }

    /// Load the used-word history. Missing or unreadable history is empty.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only for backend failures.
    pub async fn load_used_words(&self) -> Result<UsedWords, StorageError> {
        let Some(raw) = self.store.get(USED_WORDS_KEY).await? else {
            return Ok(UsedWords::new());
        };
        match serde_json::from_str(&raw) {
            Ok(used) => Ok(used),
            Err(err) => {
                debug!(error = %err, "discarding unreadable used-word history");
                Ok(UsedWords::new())
            }
        }
    }

    /// # Errors
    ///
    /// Returns `StorageError` if encoding or writing fails.
    pub async fn save_used_words(&self, used: &UsedWords) -> Result<(), StorageError> {
        let raw = serde_json::to_string(used)
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        self.store.set(USED_WORDS_KEY, &raw).await
    }

    /// Remove both snapshots.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    pub async fn clear(&self) -> Result<(), StorageError> {
        self.store.remove(LEVELS_KEY).await?;
        self.store.remove(USED_WORDS_KEY).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryStore;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use vocab_core::curriculum::{CurriculumBuilder, CurriculumShape};
    use vocab_core::model::WordTemplate;

    fn curriculum() -> Curriculum {
        let seeds = vec![WordTemplate::new("word", "definition", "example")];
        CurriculumBuilder::new(&seeds)
            .unwrap()
            .with_shape(CurriculumShape::new(2, 2, 3).unwrap())
            .build(&mut StdRng::seed_from_u64(4))
    }

    fn repo() -> (InMemoryStore, SnapshotRepository) {
        let store = InMemoryStore::new();
        let repo = SnapshotRepository::new(Arc::new(store.clone()));
        (store, repo)
    }

    #[tokio::test]
    async fn curriculum_round_trips() {
        let (_, repo) = repo();
        assert!(repo.load_curriculum().await.unwrap().is_none());

        let saved = curriculum();
        repo.save_curriculum(&saved).await.unwrap();
        assert_eq!(repo.load_curriculum().await.unwrap(), Some(saved));
    }

    #[tokio::test]
    async fn corrupt_curriculum_is_a_serialization_error() {
        let (store, repo) = repo();
        store.set(LEVELS_KEY, "{not json").await.unwrap();
        let err = repo.load_curriculum().await.unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }

    #[tokio::test]
    async fn used_words_default_to_empty() {
        let (store, repo) = repo();
        assert!(repo.load_used_words().await.unwrap().is_empty());

        store.set(USED_WORDS_KEY, "42").await.unwrap();
        assert!(repo.load_used_words().await.unwrap().is_empty());

        let mut used = UsedWords::new();
        used.extend(["Alpha", "beta"]);
        repo.save_used_words(&used).await.unwrap();
        assert_eq!(
            store.get(USED_WORDS_KEY).await.unwrap().as_deref(),
            Some(r#"["alpha","beta"]"#)
        );
        assert_eq!(repo.load_used_words().await.unwrap(), used);
    }

    #[tokio::test]
    async fn clear_removes_both_keys() {
        let (store, repo) = repo();
        repo.save_curriculum(&curriculum()).await.unwrap();
        repo.save_used_words(&UsedWords::new()).await.unwrap();

        repo.clear().await.unwrap();
        assert_eq!(store.get(LEVELS_KEY).await.unwrap(), None);
        assert_eq!(store.get(USED_WORDS_KEY).await.unwrap(), None);
    }
}
