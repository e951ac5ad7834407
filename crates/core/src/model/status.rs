use serde::{Deserialize, Serialize};

/// Lock state shared by sessions and levels.
///
/// Variants are ordered `Locked < Unlocked < Completed`; transitions only move
/// up that order.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum UnlockStatus {
    #[default]
    Locked,
    Unlocked,
    Completed,
}

impl UnlockStatus {
    #[must_use]
    pub fn is_locked(self) -> bool {
        self == Self::Locked
    }

    #[must_use]
    pub fn is_completed(self) -> bool {
        self == Self::Completed
    }

    /// Raise the status to `target` if that is a forward move.
    ///
    /// Returns `true` when the status changed.
    pub fn advance_to(&mut self, target: Self) -> bool {
        if target > *self {
            *self = target;
            true
        } else {
            false
        }
    }
}
