use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};
use vocab_core::curriculum::{CurriculumBuilder, CurriculumShape};
use vocab_core::model::{LevelId, SessionReport, WordId, WordTemplate};
use vocab_core::progression::{ProgressionError, SessionCompletion, SessionRef};
use vocab_core::scheduler::ReviewOutcome;
use vocab_core::{Clock, Curriculum};

use storage::repository::{SnapshotStore, StorageError};
use storage::snapshot::SnapshotRepository;

use crate::error::CurriculumServiceError;

/// Loads, saves and advances the learner's curriculum.
///
/// Every state change is written back to the snapshot store right away.
#[derive(Clone)]
pub struct CurriculumService {
    clock: Clock,
    snapshots: SnapshotRepository,
    seeds: Arc<[WordTemplate]>,
    shape: CurriculumShape,
    seed: Option<u64>,
}

impl CurriculumService {
    /// # Errors
    ///
    /// Returns `CurriculumServiceError::Curriculum` if `seeds` is empty.
    pub fn new(
        clock: Clock,
        store: Arc<dyn SnapshotStore>,
        seeds: Vec<WordTemplate>,
    ) -> Result<Self, CurriculumServiceError> {
        CurriculumBuilder::new(&seeds)?;
        Ok(Self {
            clock,
            snapshots: SnapshotRepository::new(store),
            seeds: seeds.into(),
            shape: CurriculumShape::default(),
            seed: None,
        })
    }

    /// Fix the RNG seed used when a fresh curriculum is built.
    #[must_use]
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn with_shape(mut self, shape: CurriculumShape) -> Self {
        self.shape = shape;
        self
    }

    /// Build a new curriculum without touching storage.
    ///
    /// # Errors
    ///
    /// Returns `CurriculumServiceError::Curriculum` if the seeds are unusable.
    pub fn build_fresh(&self) -> Result<Curriculum, CurriculumServiceError> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let curriculum = CurriculumBuilder::new(&self.seeds)?
            .with_shape(self.shape)
            .build(&mut rng);
        Ok(curriculum)
    }

    /// Load the saved curriculum.
    ///
    /// A missing or unreadable snapshot is replaced by a freshly built
    /// curriculum, which is saved before returning.
    ///
    /// # Errors
    ///
    /// Returns `CurriculumServiceError` if storage fails for another reason.
    pub async fn load(&self) -> Result<Curriculum, CurriculumServiceError> {
        match self.snapshots.load_curriculum().await {
            Ok(Some(curriculum)) if !curriculum.is_empty() => return Ok(curriculum),
            Ok(_) => debug!("no saved curriculum; building a new one"),
            Err(StorageError::Serialization(reason)) => {
                warn!(%reason, "saved curriculum is unreadable; rebuilding");
            }
            Err(err) => return Err(err.into()),
        }

        let curriculum = self.build_fresh()?;
        self.save(&curriculum).await?;
        Ok(curriculum)
    }

    /// # Errors
    ///
    /// Returns `CurriculumServiceError::Storage` if the snapshot cannot be written.
    pub async fn save(&self, curriculum: &Curriculum) -> Result<(), CurriculumServiceError> {
        self.snapshots.save_curriculum(curriculum).await?;
        Ok(())
    }

    /// Apply a finished study report to the curriculum and persist the result.
    ///
    /// # Errors
    ///
    /// Returns `CurriculumServiceError::Progression` for an invalid or locked
    /// session, leaving `curriculum` unchanged.
    pub async fn complete_session(
        &self,
        curriculum: &mut Curriculum,
        at: SessionRef,
        report: &SessionReport,
    ) -> Result<SessionCompletion, CurriculumServiceError> {
        let (next, completion) = curriculum.complete_session(at, report.passed())?;
        if !completion.changed_anything() {
            return Ok(completion);
        }

        self.save(&next).await?;
        *curriculum = next;

        if let Some(session) = completion.unlocked_session {
            info!(level = %session.level, session = session.index + 1, "session unlocked");
        }
        if let Some(level) = completion.unlocked_level {
            info!(%level, "level unlocked");
        }
        Ok(completion)
    }

    /// Open every level up to `recommended` and persist the result.
    ///
    /// # Errors
    ///
    /// Returns `CurriculumServiceError::Storage` if the snapshot cannot be written.
    pub async fn apply_diagnostic(
        &self,
        curriculum: &mut Curriculum,
        recommended: LevelId,
    ) -> Result<Vec<LevelId>, CurriculumServiceError> {
        let next = curriculum.unlock_through_level(recommended);
        let changed: Vec<LevelId> = next
            .levels()
            .iter()
            .zip(curriculum.levels())
            .filter(|(after, before)| after != before)
            .map(|(after, _)| after.id())
            .collect();

        if !changed.is_empty() {
            self.save(&next).await?;
            *curriculum = next;
        }
        info!(%recommended, unlocked = changed.len(), "applied diagnostic result");
        Ok(changed)
    }

    /// Store a rating on a curriculum word.
    ///
    /// Returns `Ok(None)` when the word is not part of the session, which is
    /// the case for generated words.
    ///
    /// # Errors
    ///
    /// Returns `CurriculumServiceError` for an unknown session or a failed save,
    /// leaving `curriculum` unchanged.
    pub async fn record_rating(
        &self,
        curriculum: &mut Curriculum,
        at: SessionRef,
        word_id: &WordId,
        is_correct: bool,
    ) -> Result<Option<ReviewOutcome>, CurriculumServiceError> {
        let mut next = curriculum.clone();
        match next.record_rating(at, word_id, is_correct, self.clock.now()) {
            Ok(outcome) => {
                self.save(&next).await?;
                *curriculum = next;
                Ok(Some(outcome))
            }
            Err(ProgressionError::UnknownWord { .. }) => {
                debug!(word = %word_id, "rating not stored for word outside the curriculum");
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Drop all saved progress and start over with a new curriculum.
    ///
    /// # Errors
    ///
    /// Returns `CurriculumServiceError` if storage or building fails.
    pub async fn reset(&self) -> Result<Curriculum, CurriculumServiceError> {
        self.snapshots.clear().await?;
        let curriculum = self.build_fresh()?;
        self.save(&curriculum).await?;
        info!("progress reset");
        Ok(curriculum)
    }
}
