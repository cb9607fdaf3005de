//! Build command implementation.
//!
//! Runs a single platform's build job, the way one CI runner does.

use super::helpers::{artifact_store, in_workspace};
use crate::build::BuildJob;
use crate::cli::{Args, Command, RuntimeConfig};
use crate::config::PipelineConfig;
use crate::error::{CliError, Result};
use crate::platform::Platform;

/// Execute build command
pub(super) async fn execute_build(
    args: &Args,
    config: &PipelineConfig,
    runtime: &RuntimeConfig,
) -> Result<i32> {
    let Command::Build {
        platform,
        out,
        store,
        binary,
    } = &args.command
    else {
        unreachable!("execute_build called with non-Build command");
    };

    let platform = match platform {
        Some(platform) => *platform,
        None => Platform::host().ok_or_else(|| CliError::InvalidArguments {
            reason: format!(
                "host OS '{}' is not a release platform; pass --platform",
                std::env::consts::OS
            ),
        })?,
    };

    let artifact_root = in_workspace(
        &args.workspace,
        out.as_ref().unwrap_or(&config.artifact_dir),
    );
    let store = artifact_store(&args.workspace, config, store.as_ref());

    let mut job = BuildJob::new(platform, args.workspace.clone(), &artifact_root);
    if let Some(binary) = binary {
        job = job.with_prebuilt_binary(binary.clone());
    }

    let output = job.run(config, &store, runtime).await?;
    runtime.println(&format!(
        "Artifact '{}' stored at {}",
        platform.artifact_name(),
        output.stored_at.display()
    ));
    Ok(0)
}
