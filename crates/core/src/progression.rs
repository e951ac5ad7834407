use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{Level, LevelId, Session, UnlockStatus, Word, WordId};
use crate::scheduler::{self, ReviewOutcome};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Precondition violations raised by progression operations.
///
/// These come from callers addressing levels, sessions or words that are not
/// in the curriculum. The curriculum is never modified when one is returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProgressionError {
    #[error("level {0} does not exist")]
    UnknownLevel(LevelId),

    #[error("level {level} has no session at index {index}")]
    UnknownSession { level: LevelId, index: usize },

    #[error("level {level} session {index} is still locked")]
    SessionLocked { level: LevelId, index: usize },

    #[error("word {word} is not part of level {level} session {index}")]
    UnknownWord {
        level: LevelId,
        index: usize,
        word: WordId,
    },
}

//
// ─── POSITIONS & TRANSITIONS ───────────────────────────────────────────────────
//

/// Address of a session inside the curriculum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionRef {
    pub level: LevelId,
    pub index: usize,
}

impl SessionRef {
    #[must_use]
    pub fn new(level: LevelId, index: usize) -> Self {
        Self { level, index }
    }
}

/// What a call to `complete_session` changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionCompletion {
    /// The session moved to `completed` (false for a failed attempt or a repeat).
    pub session_completed: bool,
    /// The next session in the same level that was unlocked.
    pub unlocked_session: Option<SessionRef>,
    /// The level that moved to `completed`.
    pub completed_level: Option<LevelId>,
    /// The following level that was unlocked.
    pub unlocked_level: Option<LevelId>,
}

impl SessionCompletion {
    #[must_use]
    pub fn changed_anything(&self) -> bool {
        self.session_completed
            || self.unlocked_session.is_some()
            || self.completed_level.is_some()
            || self.unlocked_level.is_some()
    }
}

//
// ─── CURRICULUM ────────────────────────────────────────────────────────────────
//

/// The full level collection and the lock-state machine over it.
///
/// Statuses only ever move forward (`locked → unlocked → completed`). Every
/// transition validates its inputs before touching anything, so a failed call
/// leaves the curriculum as it was.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Curriculum {
    levels: Vec<Level>,
}

impl Curriculum {
    #[must_use]
    pub fn from_levels(levels: Vec<Level>) -> Self {
        Self { levels }
    }

    #[must_use]
    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    #[must_use]
    pub fn level(&self, id: LevelId) -> Option<&Level> {
        self.levels.iter().find(|l| l.id() == id)
    }

    /// # Errors
    ///
    /// Returns `UnknownLevel` / `UnknownSession` if the address is invalid.
    pub fn session(&self, at: SessionRef) -> Result<&Session, ProgressionError> {
        let level = self
            .level(at.level)
            .ok_or(ProgressionError::UnknownLevel(at.level))?;
        level.session(at.index).ok_or(ProgressionError::UnknownSession {
            level: at.level,
            index: at.index,
        })
    }

    /// True when the session exists and is not locked.
    #[must_use]
    pub fn can_start(&self, at: SessionRef) -> bool {
        self.session(at).is_ok_and(|s| !s.is_locked())
    }

    /// Every word in lattice order.
    pub fn all_words(&self) -> impl Iterator<Item = &Word> {
        self.levels
            .iter()
            .flat_map(|l| l.sessions())
            .flat_map(|s| s.words())
    }

    /// Due words across the whole curriculum, in lattice order.
    #[must_use]
    pub fn due_words(&self, now: DateTime<Utc>) -> Vec<&Word> {
        self.all_words().filter(|w| w.is_due(now)).collect()
    }

    /// The current entry point: the furthest unlocked, not yet completed session.
    ///
    /// Returns `None` when every session is either locked or completed.
    #[must_use]
    pub fn entry_point(&self) -> Option<SessionRef> {
        self.levels
            .iter()
            .flat_map(|level| {
                level
                    .sessions()
                    .iter()
                    .enumerate()
                    .filter(|(_, s)| s.status() == UnlockStatus::Unlocked)
                    .map(move |(index, _)| SessionRef::new(level.id(), index))
            })
            .last()
    }

    fn level_position(&self, id: LevelId) -> Result<usize, ProgressionError> {
        self.levels
            .iter()
            .position(|l| l.id() == id)
            .ok_or(ProgressionError::UnknownLevel(id))
    }

    //
    // ─── TRANSITIONS ───────────────────────────────────────────────────────────
    //

    /// Snapshot-in, snapshot-out form of [`Curriculum::apply_completion`].
    ///
    /// # Errors
    ///
    /// See [`Curriculum::apply_completion`].
    pub fn complete_session(
        &self,
        at: SessionRef,
        passed: bool,
    ) -> Result<(Self, SessionCompletion), ProgressionError> {
        let mut next = self.clone();
        let completion = next.apply_completion(at, passed)?;
        Ok((next, completion))
    }

    /// Record the end of a session attempt.
    ///
    /// A failed attempt changes nothing. A passed attempt completes the
    /// session and unlocks the next one in the level. Passing the last
    /// session completes the level and unlocks the following level together
    /// with its first session, if that level exists.
    ///
    /// # Errors
    ///
    /// - `UnknownLevel` / `UnknownSession` if `at` does not address a session
    /// - `SessionLocked` if the addressed session has not been unlocked yet
    pub fn apply_completion(
        &mut self,
        at: SessionRef,
        passed: bool,
    ) -> Result<SessionCompletion, ProgressionError> {
        let position = self.level_position(at.level)?;
        let session = self.session(at)?;
        if session.is_locked() {
            return Err(ProgressionError::SessionLocked {
                level: at.level,
                index: at.index,
            });
        }

        let mut completion = SessionCompletion::default();
        if !passed {
            return Ok(completion);
        }

        let level = &mut self.levels[position];
        let is_last = level.is_last_session(at.index);
        if let Some(session) = level.session_mut(at.index) {
            completion.session_completed = session.advance(UnlockStatus::Completed);
        }

        if !is_last {
            if let Some(next) = level.session_mut(at.index + 1) {
                if next.advance(UnlockStatus::Unlocked) {
                    completion.unlocked_session = Some(SessionRef::new(at.level, at.index + 1));
                }
            }
            return Ok(completion);
        }

        if level.advance(UnlockStatus::Completed) {
            completion.completed_level = Some(at.level);
        }

        let next_id = at.level.next();
        if next_id != at.level {
            if let Some(next_level) = self.levels.iter_mut().find(|l| l.id() == next_id) {
                if unlock_level(next_level) {
                    completion.unlocked_level = Some(next_id);
                }
            }
        }

        Ok(completion)
    }

    /// Snapshot-in, snapshot-out form of [`Curriculum::apply_unlock_through`].
    #[must_use]
    pub fn unlock_through_level(&self, target: LevelId) -> Self {
        let mut next = self.clone();
        next.apply_unlock_through(target);
        next
    }

    /// Open every level with `id <= target` together with its first session.
    ///
    /// Levels already unlocked or completed keep their status. Returns the
    /// ids whose level or first-session status changed. Reapplying with the
    /// same or a smaller target changes nothing.
    pub fn apply_unlock_through(&mut self, target: LevelId) -> Vec<LevelId> {
        self.levels
            .iter_mut()
            .filter(|l| l.id() <= target)
            .filter_map(|l| unlock_level(l).then_some(l.id()))
            .collect()
    }

    /// Apply a rating to a stored word and return the new review state.
    ///
    /// # Errors
    ///
    /// Returns `UnknownLevel`, `UnknownSession` or `UnknownWord` if the word
    /// cannot be found at the given address.
    pub fn record_rating(
        &mut self,
        at: SessionRef,
        word_id: &WordId,
        is_correct: bool,
        now: DateTime<Utc>,
    ) -> Result<ReviewOutcome, ProgressionError> {
        let position = self.level_position(at.level)?;
        let session = self.levels[position].session_mut(at.index).ok_or(
            ProgressionError::UnknownSession {
                level: at.level,
                index: at.index,
            },
        )?;
        let word = session
            .word_mut(word_id)
            .ok_or_else(|| ProgressionError::UnknownWord {
                level: at.level,
                index: at.index,
                word: word_id.clone(),
            })?;
        Ok(scheduler::apply_rating(word, is_correct, now))
    }
}

/// Unlock a level and its first session. Returns `true` if either changed.
fn unlock_level(level: &mut Level) -> bool {
    let level_changed = level.advance(UnlockStatus::Unlocked);
    let session_changed = level
        .session_mut(0)
        .is_some_and(|s| s.advance(UnlockStatus::Unlocked));
    level_changed || session_changed
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
