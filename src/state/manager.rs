//! State persistence for release runs.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::error::{Result, StateError};
use crate::state::ReleaseState;

/// State manager for persistent release state
#[derive(Debug, Clone)]
pub struct StateManager {
    /// Path to state file
    state_file_path: PathBuf,
}

/// Result of state saving operation
#[derive(Debug)]
pub struct SaveStateResult {
    /// Size of saved state file in bytes
    pub file_size_bytes: u64,
    /// Duration of save operation
    pub save_duration: Duration,
}

impl StateManager {
    /// Create a new state manager
    pub fn new<P: AsRef<Path>>(state_file_path: P) -> Self {
        Self {
            state_file_path: state_file_path.as_ref().to_path_buf(),
        }
    }

    /// Path of the state file
    pub fn path(&self) -> &Path {
        &self.state_file_path
    }

    /// Save release state, bumping its save version
    ///
    /// Writes to a temporary file and renames it over the old state, so a
    /// crash never leaves a truncated file behind.
    pub async fn save_state(&self, state: &mut ReleaseState) -> Result<SaveStateResult> {
        let start = Instant::now();
        state.validate()?;
        state.save_version += 1;

        let serialized = serde_json::to_string_pretty(state).map_err(|e| StateError::SaveFailed {
            reason: format!("Failed to serialize state: {}", e),
        })?;

        if let Some(parent) = self.state_file_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let temp_file_path = self.state_file_path.with_extension("tmp");
        tokio::fs::write(&temp_file_path, serialized.as_bytes())
            .await
            .map_err(|e| StateError::SaveFailed {
                reason: format!("Failed to write state: {}", e),
            })?;
        tokio::fs::rename(&temp_file_path, &self.state_file_path)
            .await
            .map_err(|e| StateError::SaveFailed {
                reason: format!("Failed to rename temp file: {}", e),
            })?;

        Ok(SaveStateResult {
            file_size_bytes: serialized.len() as u64,
            save_duration: start.elapsed(),
        })
    }

    /// Load release state
    pub async fn load_state(&self) -> Result<ReleaseState> {
        let contents = match tokio::fs::read_to_string(&self.state_file_path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StateError::NotFound.into());
            }
            Err(e) => return Err(e.into()),
        };

        let state: ReleaseState =
            serde_json::from_str(&contents).map_err(|e| StateError::Corrupted {
                reason: e.to_string(),
            })?;
        state.validate()?;
        Ok(state)
    }

    /// Remove the state file if present
    pub async fn cleanup_state(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.state_file_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
