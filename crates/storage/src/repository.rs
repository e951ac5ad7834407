use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{debug, warn};

/// Key under which the curriculum snapshot is stored.
pub const LEVELS_KEY: &str = "vocaFlowLevels_v2";

/// Key under which the generated-word history is stored.
pub const USED_WORDS_KEY: &str = "vocaflow_used_words";

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// String key/value store holding serialized snapshots.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Missing keys are not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Simple in-memory store for tests and as a fallback.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(key);
        Ok(())
    }
}

/// Wraps a primary store and serves from memory whenever the primary fails.
///
/// Failures are logged and never surfaced to the caller. Values written to
/// memory after a failed write are only visible while reads also fail.
///
/// A key whose primary read failed is detached: writes to it stay in memory
/// until a later primary read of that key succeeds. Whatever a caller derived
/// from the failed read never overwrites the primary copy.
#[derive(Clone)]
pub struct FallbackStore {
    primary: Arc<dyn SnapshotStore>,
    memory: InMemoryStore,
    detached: Arc<Mutex<HashSet<String>>>,
}

impl FallbackStore {
    #[must_use]
    pub fn new(primary: Arc<dyn SnapshotStore>) -> Self {
        Self {
            primary,
            memory: InMemoryStore::new(),
            detached: Arc::default(),
        }
    }

    fn detached(&self) -> Result<std::sync::MutexGuard<'_, HashSet<String>>, StorageError> {
        self.detached
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }

    fn is_detached(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.detached()?.contains(key))
    }
}

#[async_trait]
impl SnapshotStore for FallbackStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self.primary.get(key).await {
            Ok(value) => {
                self.detached()?.remove(key);
                Ok(value)
            }
            Err(err) => {
                warn!(key, error = %err, "primary store read failed; using memory");
                self.detached()?.insert(key.to_owned());
                self.memory.get(key).await
            }
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.is_detached(key)? {
            debug!(key, "primary copy was not readable; keeping value in memory");
            return self.memory.set(key, value).await;
        }
        if let Err(err) = self.primary.set(key, value).await {
            warn!(key, error = %err, "primary store write failed; keeping value in memory");
            self.memory.set(key, value).await?;
        }
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        match self.primary.remove(key).await {
            Ok(()) => {
                self.detached()?.remove(key);
                self.memory.remove(key).await
            }
            Err(err) => {
                warn!(key, error = %err, "primary store remove failed; clearing memory");
                self.memory.remove(key).await
            }
        }
    }
}

/// Aggregates storage backends behind trait objects.
#[derive(Clone)]
pub struct Storage {
    pub snapshots: Arc<dyn SnapshotStore>,
}

impl Storage {
    /// Wrap an arbitrary store with the memory fallback.
    #[must_use]
    pub fn with_fallback(primary: Arc<dyn SnapshotStore>) -> Self {
        let snapshots: Arc<dyn SnapshotStore> = Arc::new(FallbackStore::new(primary));
        Self { snapshots }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Store that fails every call while `broken` is set, and only reads
    /// while `reads_broken` is set.
    #[derive(Default)]
    struct FlakyStore {
        broken: AtomicBool,
        reads_broken: AtomicBool,
        inner: InMemoryStore,
    }

    impl FlakyStore {
        fn check(&self) -> Result<(), StorageError> {
            if self.broken.load(Ordering::SeqCst) {
                Err(StorageError::Connection("quota exceeded".into()))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl SnapshotStore for FlakyStore {
        async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.check()?;
            if self.reads_broken.load(Ordering::SeqCst) {
                return Err(StorageError::Connection("database is locked".into()));
            }
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            self.check()?;
            self.inner.set(key, value).await
        }

        async fn remove(&self, key: &str) -> Result<(), StorageError> {
            self.check()?;
            self.inner.remove(key).await
        }
    }

    #[tokio::test]
    async fn in_memory_set_get_remove() {
        let store = InMemoryStore::new();
        assert_eq!(store.get(LEVELS_KEY).await.unwrap(), None);

        store.set(LEVELS_KEY, "[]").await.unwrap();
        store.set(LEVELS_KEY, "[1]").await.unwrap();
        assert_eq!(store.get(LEVELS_KEY).await.unwrap().as_deref(), Some("[1]"));

        store.remove(LEVELS_KEY).await.unwrap();
        store.remove(LEVELS_KEY).await.unwrap();
        assert_eq!(store.get(LEVELS_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn fallback_passes_through_healthy_primary() {
        let primary = Arc::new(FlakyStore::default());
        let store = FallbackStore::new(primary.clone());

        store.set(USED_WORDS_KEY, r#"["a"]"#).await.unwrap();
        assert_eq!(
            primary.inner.get(USED_WORDS_KEY).await.unwrap().as_deref(),
            Some(r#"["a"]"#)
        );
        assert_eq!(
            store.get(USED_WORDS_KEY).await.unwrap().as_deref(),
            Some(r#"["a"]"#)
        );
    }

    #[tokio::test]
    async fn fallback_serves_memory_when_primary_fails() {
        let primary = Arc::new(FlakyStore::default());
        primary.broken.store(true, Ordering::SeqCst);
        let store = FallbackStore::new(primary.clone());

        assert_eq!(store.get(LEVELS_KEY).await.unwrap(), None);
        store.set(LEVELS_KEY, "[]").await.unwrap();
        assert_eq!(store.get(LEVELS_KEY).await.unwrap().as_deref(), Some("[]"));

        store.remove(LEVELS_KEY).await.unwrap();
        assert_eq!(store.get(LEVELS_KEY).await.unwrap(), None);

        primary.broken.store(false, Ordering::SeqCst);
        assert_eq!(primary.inner.get(LEVELS_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn failed_read_keeps_later_writes_off_the_primary() {
        let primary = Arc::new(FlakyStore::default());
        primary.inner.set(LEVELS_KEY, "[\"progress\"]").await.unwrap();
        let store = FallbackStore::new(primary.clone());

        primary.reads_broken.store(true, Ordering::SeqCst);
        assert_eq!(store.get(LEVELS_KEY).await.unwrap(), None);
        store.set(LEVELS_KEY, "[\"fresh\"]").await.unwrap();
        assert_eq!(
            primary.inner.get(LEVELS_KEY).await.unwrap().as_deref(),
            Some("[\"progress\"]")
        );

        primary.reads_broken.store(false, Ordering::SeqCst);
        assert_eq!(
            store.get(LEVELS_KEY).await.unwrap().as_deref(),
            Some("[\"progress\"]")
        );
        store.set(LEVELS_KEY, "[\"next\"]").await.unwrap();
        assert_eq!(
            primary.inner.get(LEVELS_KEY).await.unwrap().as_deref(),
            Some("[\"next\"]")
        );
    }

    #[tokio::test]
    async fn remove_reattaches_key() {
        let primary = Arc::new(FlakyStore::default());
        let store = FallbackStore::new(primary.clone());

        primary.reads_broken.store(true, Ordering::SeqCst);
        assert_eq!(store.get(USED_WORDS_KEY).await.unwrap(), None);
        store.remove(USED_WORDS_KEY).await.unwrap();
        store.set(USED_WORDS_KEY, "[]").await.unwrap();
        assert_eq!(
            primary.inner.get(USED_WORDS_KEY).await.unwrap().as_deref(),
            Some("[]")
        );
    }
}
