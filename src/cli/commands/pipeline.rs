//! Pipeline command implementation.

use std::sync::Arc;

use super::helpers::{artifact_store, github_client, in_workspace};
use super::release::report_outcome;
use crate::cli::{Args, Command, RuntimeConfig};
use crate::config::{EnvConfig, PipelineConfig};
use crate::error::Result;
use crate::github::{MemoryReleaseHost, ReleaseHost};
use crate::pipeline::{PipelinePaths, run_pipeline};
use crate::platform::Platform;

/// Execute pipeline command
pub(super) async fn execute_pipeline(
    args: &Args,
    config: PipelineConfig,
    env: &EnvConfig,
    runtime: &RuntimeConfig,
) -> Result<i32> {
    let Command::Pipeline {
        platforms,
        dry_run,
    } = &args.command
    else {
        unreachable!("execute_pipeline called with non-Pipeline command");
    };

    let platforms = if platforms.is_empty() {
        Platform::ALL.to_vec()
    } else {
        platforms.clone()
    };

    // Resolve the host before building so a missing token fails fast.
    let host: Box<dyn ReleaseHost> = if *dry_run {
        Box::new(MemoryReleaseHost::new())
    } else {
        Box::new(github_client(&config, env, None, None)?)
    };

    let paths = PipelinePaths {
        workspace: args.workspace.clone(),
        artifact_root: in_workspace(&args.workspace, &config.artifact_dir),
        store: artifact_store(&args.workspace, &config, None),
    };

    let report = run_pipeline(Arc::new(config), &paths, &platforms, host.as_ref(), runtime).await;

    runtime.section("Summary");
    for build in &report.builds {
        match &build.result {
            Ok(output) => runtime.indent(&format!(
                "✓ {} ({})",
                build.platform, output.artifact.identifier
            )),
            Err(e) => runtime.indent(&format!("✗ {}: {}", build.platform, e)),
        }
    }

    match report.release {
        Ok(outcome) => {
            report_outcome(&outcome, runtime);
            Ok(if report.builds.iter().all(|b| b.result.is_ok()) { 0 } else { 1 })
        }
        Err(e) => Err(e),
    }
}
