//! Status command implementation.
//!
//! Displays how far the last release run got.

use super::helpers::artifact_store;
use crate::cli::{Args, Command, RuntimeConfig};
use crate::config::PipelineConfig;
use crate::error::{ReleaseError, Result};
use crate::state::{create_state_manager, has_release_state, load_release_state};

/// Execute status command
pub(super) async fn execute_status(
    args: &Args,
    config: &PipelineConfig,
    runtime: &RuntimeConfig,
) -> Result<i32> {
    let Command::Status { store, json, clear } = &args.command else {
        unreachable!("execute_status called with non-Status command");
    };

    let store = artifact_store(&args.workspace, config, store.as_ref());
    if !has_release_state(store.root()) {
        if *json {
            println!("{{\"status\": \"no_release\"}}");
        } else {
            let _ = runtime.output().info("No release has run from this store");
        }
        return Ok(0);
    }

    if *clear {
        create_state_manager(store.root()).cleanup_state().await?;
        runtime.success_println("Release state cleared");
        return Ok(0);
    }

    let state = load_release_state(store.root()).await?;

    if *json {
        let json_output = serde_json::to_string_pretty(&state).map_err(ReleaseError::Json)?;
        println!("{}", json_output);
        return Ok(0);
    }

    runtime.println(&state.summary());
    runtime.println(&format!("Run: {}", state.run_id));
    if let Some(id) = state.release_id {
        runtime.println(&format!(
            "Release id: {} (draft: {})",
            id,
            state.draft.map_or("unknown".to_string(), |d| d.to_string())
        ));
    }
    if let Some(url) = &state.html_url {
        runtime.println(&format!("URL: {}", url));
    }

    if !state.checkpoints.is_empty() {
        runtime.println("\nStages:");
        for checkpoint in &state.checkpoints {
            runtime.indent(&format!("✓ {} at {}", checkpoint.stage, checkpoint.timestamp));
        }
    }
    if !state.uploaded_assets.is_empty() {
        runtime.println("\nAssets:");
        for asset in &state.uploaded_assets {
            runtime.indent(asset);
        }
    }
    if !state.errors.is_empty() {
        runtime.println("\nErrors:");
        for error in &state.errors {
            runtime.indent(&format!("✗ [{}] {}", error.stage, error.message));
        }
    }
    if state.has_orphaned_draft() {
        runtime.warning_println(
            "The draft release was never published. Delete it on GitHub, then run `status --clear`",
        );
    }

    Ok(0)
}
