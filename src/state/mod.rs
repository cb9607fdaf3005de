//! State tracking for release runs.
//!
//! The release stage never rolls back. After every transition it writes
//! what it has done so far (stage, release id, attached assets) next to the
//! artifact store, so a half-finished draft can be inspected and cleaned up
//! by hand.

mod manager;
mod release_state;

pub use manager::{SaveStateResult, StateManager};
pub use release_state::{ReleaseCheckpoint, ReleaseState, STATE_FORMAT_VERSION, StateErrorRecord};

use std::path::{Path, PathBuf};

use crate::error::Result;

/// File name of the persisted release state
pub const STATE_FILE_NAME: &str = ".release_state.json";

/// State file location for a store directory
pub fn state_file_path(store_dir: &Path) -> PathBuf {
    store_dir.join(STATE_FILE_NAME)
}

/// Create a state manager for the state file in the given store directory
pub fn create_state_manager(store_dir: &Path) -> StateManager {
    StateManager::new(state_file_path(store_dir))
}

/// Quick check if release state exists in the given store directory
pub fn has_release_state(store_dir: &Path) -> bool {
    state_file_path(store_dir).exists()
}

/// Load release state from the given store directory
pub async fn load_release_state(store_dir: &Path) -> Result<ReleaseState> {
    create_state_manager(store_dir).load_state().await
}
