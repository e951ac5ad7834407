use serde::{Deserialize, Serialize};

use crate::model::{LevelId, Session, UnlockStatus};

/// Broad difficulty band used to describe a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelTier {
    Beginner,
    Intermediate,
    Advanced,
}

impl LevelTier {
    /// Levels 1–10 are beginner, 11–30 intermediate, everything above advanced.
    #[must_use]
    pub fn for_level(id: LevelId) -> Self {
        match id.value() {
            0..=10 => Self::Beginner,
            11..=30 => Self::Intermediate,
            _ => Self::Advanced,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Beginner => "Beginner",
            Self::Intermediate => "Intermediate",
            Self::Advanced => "Advanced",
        }
    }
}

/// An ordered group of sessions covering one difficulty band.
///
/// A level is `unlocked` exactly when its first session is not `locked`, and
/// `completed` once its last session has been completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    id: LevelId,
    title: String,
    description: String,
    status: UnlockStatus,
    sessions: Vec<Session>,
}

impl Level {
    #[must_use]
    pub fn new(
        id: LevelId,
        title: impl Into<String>,
        description: impl Into<String>,
        status: UnlockStatus,
        sessions: Vec<Session>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            description: description.into(),
            status,
            sessions,
        }
    }

    #[must_use]
    pub fn id(&self) -> LevelId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn status(&self) -> UnlockStatus {
        self.status
    }

    #[must_use]
    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    #[must_use]
    pub fn session(&self, index: usize) -> Option<&Session> {
        self.sessions.get(index)
    }

    #[must_use]
    pub fn is_last_session(&self, index: usize) -> bool {
        index + 1 == self.sessions.len()
    }

    /// Number of sessions already completed in this level.
    #[must_use]
    pub fn completed_sessions(&self) -> usize {
        self.sessions
            .iter()
            .filter(|s| s.status().is_completed())
            .count()
    }

    pub(crate) fn advance(&mut self, target: UnlockStatus) -> bool {
        self.status.advance_to(target)
    }

    pub(crate) fn session_mut(&mut self, index: usize) -> Option<&mut Session> {
        self.sessions.get_mut(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_boundaries() {
        assert_eq!(LevelTier::for_level(LevelId::new(1)), LevelTier::Beginner);
        assert_eq!(LevelTier::for_level(LevelId::new(10)), LevelTier::Beginner);
        assert_eq!(LevelTier::for_level(LevelId::new(11)), LevelTier::Intermediate);
        assert_eq!(LevelTier::for_level(LevelId::new(30)), LevelTier::Intermediate);
        assert_eq!(LevelTier::for_level(LevelId::new(31)), LevelTier::Advanced);
    }
}
