//! Per-platform build job.
//!
//! A build job turns a source checkout into one uploaded artifact:
//!
//! 1. probe required system libraries
//! 2. compile in the optimized profile (or take a prebuilt binary)
//! 3. ask the binary for its target identifier
//! 4. embed the icon resource (Windows only)
//! 5. package the binary and identifier into a fresh directory
//! 6. verify and upload the directory as a named artifact
//!
//! Jobs share nothing, so a failure in one never affects another.

mod compile;
mod icon;
mod identify;
mod package;

pub use compile::{binary_path, check_system_dependencies, compile, profile_dir, require_tool};
pub use icon::{IconEmbedder, download, verify_sha256};
pub use identify::{TargetIdentifier, derive_target_identifier};
pub use package::package;

use std::path::PathBuf;

use crate::artifact::{Artifact, ArtifactStore, verify_artifact_dir};
use crate::cli::RuntimeConfig;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::platform::Platform;

/// One platform's build job
#[derive(Debug, Clone)]
pub struct BuildJob {
    /// Platform being built
    pub platform: Platform,
    /// Cargo workspace of the application
    pub workspace: PathBuf,
    /// Directory the artifact is assembled in
    pub artifact_dir: PathBuf,
    /// Already compiled binary; skips compilation when set
    pub prebuilt_binary: Option<PathBuf>,
}

/// What a successful build job produced
#[derive(Debug, Clone)]
pub struct BuildOutput {
    /// Packaged artifact
    pub artifact: Artifact,
    /// Where the artifact was uploaded in the store
    pub stored_at: PathBuf,
}

impl BuildJob {
    /// Job for `platform` assembling into `<artifact_root>/<artifact name>`
    pub fn new(platform: Platform, workspace: PathBuf, artifact_root: &std::path::Path) -> Self {
        Self {
            platform,
            workspace,
            artifact_dir: artifact_root.join(platform.artifact_name()),
            prebuilt_binary: None,
        }
    }

    /// Use an already compiled binary
    pub fn with_prebuilt_binary(mut self, binary: PathBuf) -> Self {
        self.prebuilt_binary = Some(binary);
        self
    }

    /// Run every step and upload the artifact to `store`
    pub async fn run(
        &self,
        config: &PipelineConfig,
        store: &ArtifactStore,
        runtime: &RuntimeConfig,
    ) -> Result<BuildOutput> {
        let platform = self.platform;
        runtime.section(&format!("Build {}", platform));

        let binary = match &self.prebuilt_binary {
            Some(binary) => {
                runtime.indent(&format!("Using prebuilt {}", binary.display()));
                binary.clone()
            }
            None => {
                check_system_dependencies(platform, config.system_libraries(platform)).await?;
                runtime.indent(&format!("Compiling {} ({})", config.binary_name, config.profile));
                compile(
                    &self.workspace,
                    &config.binary_name,
                    &config.profile,
                    &config.cargo_args,
                    platform,
                )
                .await?
            }
        };

        let identifier = derive_target_identifier(&binary).await?;
        runtime.indent(&format!("Target identifier: {}", identifier));

        if platform.embeds_icon() {
            let icon = self.workspace.join(&config.windows.icon);
            IconEmbedder::from_settings(&config.windows, config.retry.downloads)
                .embed(&binary, &icon, runtime)
                .await?;
            runtime.indent(&format!("Embedded icon {}", icon.display()));
        }

        package(&binary, &config.binary_name, &identifier, &self.artifact_dir).await?;
        verify_artifact_dir(&self.artifact_dir, &config.binary_name).await?;
        let artifact = Artifact::load(platform, &self.artifact_dir, &config.binary_name).await?;

        let stored_at = store.upload(platform.artifact_name(), &self.artifact_dir).await?;
        runtime.success_println(&format!(
            "{} artifact uploaded ({})",
            platform,
            artifact.asset_name(&config.binary_name)
        ));

        Ok(BuildOutput {
            artifact,
            stored_at,
        })
    }
}
