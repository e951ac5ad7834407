#![forbid(unsafe_code)]

pub mod repository;
pub mod snapshot;
pub mod sqlite;

pub use repository::{
    FallbackStore, InMemoryStore, LEVELS_KEY, SnapshotStore, Storage, StorageError, USED_WORDS_KEY,
};
pub use snapshot::SnapshotRepository;
