//! Release command implementation.
//!
//! Collects the three platform artifacts and publishes the release.

use super::helpers::{artifact_store, github_client, in_workspace};
use crate::cli::{Args, Command, RuntimeConfig};
use crate::config::{EnvConfig, PipelineConfig};
use crate::error::Result;
use crate::github::{MemoryReleaseHost, ReleaseHost};
use crate::platform::Platform;
use crate::release::{ReleaseOrchestrator, ReleaseOutcome, ReleaseSettings};
use crate::state::create_state_manager;

/// Execute release command
pub(super) async fn execute_release(
    args: &Args,
    config: &PipelineConfig,
    env: &EnvConfig,
    runtime: &RuntimeConfig,
) -> Result<i32> {
    let Command::Release {
        store,
        repo,
        token,
        dry_run,
    } = &args.command
    else {
        unreachable!("execute_release called with non-Release command");
    };

    let store = artifact_store(&args.workspace, config, store.as_ref());
    let work_dir = in_workspace(&args.workspace, &config.artifact_dir).join("release");

    let host: Box<dyn ReleaseHost> = if *dry_run {
        runtime.warning_println("Dry run: publishing to an in-memory release host");
        Box::new(MemoryReleaseHost::new())
    } else {
        Box::new(github_client(config, env, repo.as_ref(), token.as_ref())?)
    };

    let outcome = ReleaseOrchestrator::new(
        host.as_ref(),
        &store,
        ReleaseSettings::from(config),
        work_dir,
        runtime,
    )
    .with_state_manager(create_state_manager(store.root()))
    .run(&Platform::ALL)
    .await?;

    report_outcome(&outcome, runtime);
    Ok(0)
}

/// Print the published release and its assets
pub(super) fn report_outcome(outcome: &ReleaseOutcome, runtime: &RuntimeConfig) {
    runtime.success_println(&format!(
        "Published {} with {} asset(s)",
        outcome.release.tag_name,
        outcome.assets.len()
    ));
    if !outcome.release.html_url.is_empty() {
        runtime.indent(&outcome.release.html_url);
    }
    for asset in &outcome.assets {
        runtime.indent(&format!("{} ({})", asset.name, asset.content_type));
    }
}
