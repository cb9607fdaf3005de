//! Whole-pipeline runner.
//!
//! Every build job is spawned as its own task. A failing job never cancels
//! the others. Once all of them have finished, successfully or not, the
//! release stage runs sequentially.
//!
//! Each job first drops its platform's previous artifact from the store, so
//! the release only ever sees artifacts produced by this run.

use std::path::PathBuf;
use std::sync::Arc;

use crate::artifact::ArtifactStore;
use crate::build::{BuildJob, BuildOutput};
use crate::cli::RuntimeConfig;
use crate::config::PipelineConfig;
use crate::error::{BuildError, Result};
use crate::github::ReleaseHost;
use crate::platform::Platform;
use crate::release::{ReleaseOrchestrator, ReleaseOutcome, ReleaseSettings};
use crate::state::create_state_manager;

/// Outcome of one platform's build job
#[derive(Debug)]
pub struct BuildReport {
    /// Platform built
    pub platform: Platform,
    /// Job result
    pub result: Result<BuildOutput>,
}

/// Outcome of a full pipeline run
#[derive(Debug)]
pub struct PipelineReport {
    /// One report per requested platform, in release order
    pub builds: Vec<BuildReport>,
    /// Release stage result
    pub release: Result<ReleaseOutcome>,
}

impl PipelineReport {
    /// Whether every build and the release succeeded
    pub fn is_success(&self) -> bool {
        self.builds.iter().all(|b| b.result.is_ok()) && self.release.is_ok()
    }

    /// Platforms whose build job failed
    pub fn failed_platforms(&self) -> Vec<Platform> {
        self.builds
            .iter()
            .filter(|b| b.result.is_err())
            .map(|b| b.platform)
            .collect()
    }
}

/// Paths shared by every job of a run
#[derive(Debug, Clone)]
pub struct PipelinePaths {
    /// Cargo workspace of the application
    pub workspace: PathBuf,
    /// Root under which each job assembles its artifact
    pub artifact_root: PathBuf,
    /// Artifact store connecting the stages
    pub store: ArtifactStore,
}

/// Run the build jobs for `platforms` concurrently and wait for all of them
pub async fn run_builds(
    config: Arc<PipelineConfig>,
    paths: &PipelinePaths,
    platforms: &[Platform],
    runtime: &RuntimeConfig,
) -> Vec<BuildReport> {
    let mut handles = Vec::new();
    for platform in Platform::normalize(platforms) {
        let job = BuildJob::new(platform, paths.workspace.clone(), &paths.artifact_root);
        let config = Arc::clone(&config);
        let store = paths.store.clone();
        let runtime = runtime.clone();
        let handle = tokio::spawn(async move {
            if let Err(e) = store.remove(platform.artifact_name()).await {
                return Err(e);
            }
            job.run(&config, &store, &runtime).await
        });
        handles.push((platform, handle));
    }

    let mut reports = Vec::with_capacity(handles.len());
    for (platform, handle) in handles {
        let result = match handle.await {
            Ok(result) => result,
            Err(e) => Err(BuildError::TaskAborted {
                platform: platform.to_string(),
                reason: e.to_string(),
            }
            .into()),
        };
        match &result {
            Ok(output) => log::info!("{} build produced {}", platform, output.artifact.identifier),
            Err(e) => {
                runtime.error_println(&format!("{} build failed: {}", platform, e));
            }
        }
        reports.push(BuildReport { platform, result });
    }
    reports
}

/// Run the build stage, then the release stage against `host`
pub async fn run_pipeline<H: ReleaseHost + ?Sized>(
    config: Arc<PipelineConfig>,
    paths: &PipelinePaths,
    platforms: &[Platform],
    host: &H,
    runtime: &RuntimeConfig,
) -> PipelineReport {
    let builds = run_builds(Arc::clone(&config), paths, platforms, runtime).await;

    let work_dir = paths.artifact_root.join("release");
    let release = ReleaseOrchestrator::new(
        host,
        &paths.store,
        ReleaseSettings::from(config.as_ref()),
        work_dir,
        runtime,
    )
    .with_state_manager(create_state_manager(paths.store.root()))
    .run(platforms)
    .await;

    PipelineReport { builds, release }
}
