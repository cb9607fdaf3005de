//! Release state tracking and serialization.

use serde::{Deserialize, Serialize};

use crate::error::{Result, StateError};
use crate::github::HostedRelease;
use crate::release::ReleaseStage;

/// Current version of the state format
pub const STATE_FORMAT_VERSION: u32 = 1;

/// Persisted progress of one release run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseState {
    /// Version of the state format
    pub format_version: u32,
    /// Save operation version (incremented on every save)
    pub save_version: u64,
    /// Unique ID for this run
    pub run_id: String,
    /// Release tag
    pub tag: String,
    /// Release title
    pub title: String,
    /// Timestamp when the run started
    pub started_at: chrono::DateTime<chrono::Utc>,
    /// Timestamp when the state last changed
    pub updated_at: chrono::DateTime<chrono::Utc>,
    /// Stage reached
    pub stage: ReleaseStage,
    /// Host release id, once the draft exists
    pub release_id: Option<u64>,
    /// Release web page, once the draft exists
    pub html_url: Option<String>,
    /// Draft flag last reported by the host
    pub draft: Option<bool>,
    /// Names of assets attached so far
    pub uploaded_assets: Vec<String>,
    /// Checkpoints passed during the run
    pub checkpoints: Vec<ReleaseCheckpoint>,
    /// Error that stopped the run, if any
    pub errors: Vec<StateErrorRecord>,
}

/// A stage transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseCheckpoint {
    /// Stage entered
    pub stage: ReleaseStage,
    /// When it was entered
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error recorded against the stage it happened in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateErrorRecord {
    /// Error message
    pub message: String,
    /// Stage the run was in
    pub stage: ReleaseStage,
    /// When it happened
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl ReleaseState {
    /// Fresh state for a run publishing `tag`
    pub fn new(tag: &str, title: &str) -> Self {
        let now = chrono::Utc::now();
        Self {
            format_version: STATE_FORMAT_VERSION,
            save_version: 0,
            run_id: format!("release-{}-{}", tag, now.timestamp()),
            tag: tag.to_string(),
            title: title.to_string(),
            started_at: now,
            updated_at: now,
            stage: ReleaseStage::NotStarted,
            release_id: None,
            html_url: None,
            draft: None,
            uploaded_assets: Vec::new(),
            checkpoints: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Record entering `stage`
    pub fn enter(&mut self, stage: ReleaseStage) {
        let now = chrono::Utc::now();
        self.stage = stage;
        self.checkpoints.push(ReleaseCheckpoint {
            stage,
            timestamp: now,
        });
        self.updated_at = now;
    }

    /// Record the host's view of the release
    pub fn set_release(&mut self, release: &HostedRelease) {
        self.release_id = Some(release.id);
        self.html_url = Some(release.html_url.clone()).filter(|u| !u.is_empty());
        self.draft = Some(release.draft);
        self.updated_at = chrono::Utc::now();
    }

    /// Record an attached asset
    pub fn add_asset(&mut self, name: &str) {
        self.uploaded_assets.push(name.to_string());
        self.updated_at = chrono::Utc::now();
    }

    /// Record the error that stopped the run
    pub fn add_error(&mut self, message: String) {
        let now = chrono::Utc::now();
        self.errors.push(StateErrorRecord {
            message,
            stage: self.stage,
            timestamp: now,
        });
        self.updated_at = now;
    }

    /// Whether a draft was created but never published
    pub fn has_orphaned_draft(&self) -> bool {
        self.release_id.is_some() && self.stage != ReleaseStage::Published
    }

    /// Validate state consistency
    pub fn validate(&self) -> Result<()> {
        if self.format_version != STATE_FORMAT_VERSION {
            return Err(StateError::VersionMismatch {
                expected: STATE_FORMAT_VERSION.to_string(),
                found: self.format_version.to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Elapsed time of the run
    pub fn elapsed_time(&self) -> chrono::Duration {
        self.updated_at - self.started_at
    }

    /// One-line summary
    pub fn summary(&self) -> String {
        format!(
            "Release {} ({}) - {} asset(s) attached - {} elapsed",
            self.tag,
            self.stage,
            self.uploaded_assets.len(),
            format_duration(self.elapsed_time())
        )
    }
}

fn format_duration(duration: chrono::Duration) -> String {
    let total_seconds = duration.num_seconds();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orphaned_draft_detection() {
        let mut state = ReleaseState::new("v1.2.4", "title");
        assert!(!state.has_orphaned_draft());

        state.release_id = Some(1);
        state.enter(ReleaseStage::DraftCreated);
        assert!(state.has_orphaned_draft());

        state.enter(ReleaseStage::Published);
        assert!(!state.has_orphaned_draft());
    }

    #[test]
    fn test_error_records_current_stage() {
        let mut state = ReleaseState::new("v1.2.4", "title");
        state.enter(ReleaseStage::ArtifactsCollected);
        state.add_error("boom".to_string());
        assert_eq!(state.errors[0].stage, ReleaseStage::ArtifactsCollected);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(chrono::Duration::seconds(5)), "5s");
        assert_eq!(format_duration(chrono::Duration::seconds(65)), "1m 5s");
        assert_eq!(format_duration(chrono::Duration::seconds(3725)), "1h 2m 5s");
    }
}
