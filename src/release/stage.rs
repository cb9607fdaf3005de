//! Release stage machine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stage of a release run
///
/// Stages only ever advance one step at a time:
/// `NotStarted → ArtifactsCollected → DraftCreated → AssetsAttached → Published`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ReleaseStage {
    /// Nothing done yet
    NotStarted,
    /// Every platform artifact downloaded and verified
    ArtifactsCollected,
    /// Draft release exists on the host
    DraftCreated,
    /// Every platform binary attached to the draft
    AssetsAttached,
    /// Draft flag cleared; terminal
    Published,
}

impl ReleaseStage {
    /// The stage that follows this one
    pub fn next(self) -> Option<ReleaseStage> {
        match self {
            ReleaseStage::NotStarted => Some(ReleaseStage::ArtifactsCollected),
            ReleaseStage::ArtifactsCollected => Some(ReleaseStage::DraftCreated),
            ReleaseStage::DraftCreated => Some(ReleaseStage::AssetsAttached),
            ReleaseStage::AssetsAttached => Some(ReleaseStage::Published),
            ReleaseStage::Published => None,
        }
    }

    /// Whether moving to `to` is a legal transition
    pub fn can_advance_to(self, to: ReleaseStage) -> bool {
        self.next() == Some(to)
    }

    /// Whether no further transitions exist
    pub fn is_terminal(self) -> bool {
        self.next().is_none()
    }
}

impl fmt::Display for ReleaseStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReleaseStage::NotStarted => write!(f, "Not Started"),
            ReleaseStage::ArtifactsCollected => write!(f, "Artifacts Collected"),
            ReleaseStage::DraftCreated => write!(f, "Draft Created"),
            ReleaseStage::AssetsAttached => write!(f, "Assets Attached"),
            ReleaseStage::Published => write!(f, "Published"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitions_are_strictly_sequential() {
        assert!(ReleaseStage::NotStarted.can_advance_to(ReleaseStage::ArtifactsCollected));
        assert!(!ReleaseStage::NotStarted.can_advance_to(ReleaseStage::DraftCreated));
        assert!(!ReleaseStage::DraftCreated.can_advance_to(ReleaseStage::Published));
        assert!(!ReleaseStage::Published.can_advance_to(ReleaseStage::NotStarted));
        assert!(ReleaseStage::Published.is_terminal());
    }
}
