//! Release orchestration.
//!
//! Drives one release run through its stages, strictly in order:
//!
//! 1. collect every platform artifact from the store
//! 2. create a draft release
//! 3. attach one binary per platform, named by its target identifier
//! 4. publish the draft
//!
//! The first failure stops the run. Nothing is rolled back: a draft created
//! before the failure stays on the host, and the state file records how far
//! the run got.

mod retry;
mod stage;

pub use retry::retry_with_backoff;
pub use stage::ReleaseStage;

use bytes::Bytes;
use std::collections::HashSet;
use std::path::PathBuf;

use crate::artifact::{Artifact, ArtifactStore, verify_artifact_dir};
use crate::cli::RuntimeConfig;
use crate::config::{PipelineConfig, RetryConfig};
use crate::error::{ArtifactError, GitHubError, ReleaseError, Result, StateError};
use crate::github::{AssetUpload, HostedAsset, HostedRelease, NewRelease, ReleaseHost};
use crate::platform::Platform;
use crate::state::{ReleaseState, StateManager};

/// Settings of the release being published
#[derive(Debug, Clone)]
pub struct ReleaseSettings {
    /// Release tag
    pub tag: String,
    /// Release title
    pub title: String,
    /// Release body
    pub body: Option<String>,
    /// Prerelease flag
    pub prerelease: bool,
    /// Content-type label for every asset
    pub content_type: String,
    /// Cargo binary name, used as the asset name prefix
    pub binary_name: String,
    /// Retry budgets
    pub retry: RetryConfig,
}

impl From<&PipelineConfig> for ReleaseSettings {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            tag: config.tag.clone(),
            title: config.title.clone(),
            body: config.body.clone(),
            prerelease: config.prerelease,
            content_type: config.content_type.clone(),
            binary_name: config.binary_name.clone(),
            retry: config.retry.clone(),
        }
    }
}

/// Result of a published release
#[derive(Debug, Clone)]
pub struct ReleaseOutcome {
    /// Release as reported after publishing
    pub release: HostedRelease,
    /// Attached assets, in attachment order
    pub assets: Vec<HostedAsset>,
}

/// Runs the release stage against a [`ReleaseHost`]
pub struct ReleaseOrchestrator<'a, H: ReleaseHost + ?Sized> {
    host: &'a H,
    store: &'a ArtifactStore,
    settings: ReleaseSettings,
    work_dir: PathBuf,
    runtime: &'a RuntimeConfig,
    state: ReleaseState,
    state_manager: Option<StateManager>,
    artifacts: Vec<Artifact>,
    release: Option<HostedRelease>,
    assets: Vec<HostedAsset>,
}

impl<'a, H: ReleaseHost + ?Sized> ReleaseOrchestrator<'a, H> {
    /// Orchestrator downloading artifacts into `work_dir`
    pub fn new(
        host: &'a H,
        store: &'a ArtifactStore,
        settings: ReleaseSettings,
        work_dir: PathBuf,
        runtime: &'a RuntimeConfig,
    ) -> Self {
        let state = ReleaseState::new(&settings.tag, &settings.title);
        Self {
            host,
            store,
            settings,
            work_dir,
            runtime,
            state,
            state_manager: None,
            artifacts: Vec::new(),
            release: None,
            assets: Vec::new(),
        }
    }

    /// Persist progress through `manager` after every transition
    pub fn with_state_manager(mut self, manager: StateManager) -> Self {
        self.state_manager = Some(manager);
        self
    }

    /// Current stage
    pub fn stage(&self) -> ReleaseStage {
        self.state.stage
    }

    /// Progress recorded so far
    pub fn state(&self) -> &ReleaseState {
        &self.state
    }

    /// Collected artifacts in release order
    pub fn artifacts(&self) -> &[Artifact] {
        &self.artifacts
    }

    /// Release created by this run, if any
    pub fn release(&self) -> Option<&HostedRelease> {
        self.release.as_ref()
    }

    async fn advance(&mut self, to: ReleaseStage) -> Result<()> {
        let from = self.state.stage;
        if !from.can_advance_to(to) {
            return Err(ReleaseError::InvalidTransition { from, to });
        }
        self.state.enter(to);
        log::info!("Release stage: {} -> {}", from, to);
        self.persist().await;
        Ok(())
    }

    fn ensure_stage(&self, expected: ReleaseStage, to: ReleaseStage) -> Result<()> {
        if self.state.stage == expected {
            Ok(())
        } else {
            Err(ReleaseError::InvalidTransition {
                from: self.state.stage,
                to,
            })
        }
    }

    async fn persist(&mut self) {
        let Some(manager) = &self.state_manager else {
            return;
        };
        match manager.save_state(&mut self.state).await {
            Ok(saved) => log::debug!(
                "Saved release state v{} ({} bytes in {:?})",
                self.state.save_version,
                saved.file_size_bytes,
                saved.save_duration
            ),
            Err(e) => log::warn!("Could not save release state: {}", e),
        }
    }

    /// Refuse to start over a previous run's unpublished draft
    ///
    /// The state file is the only local record of that draft's id, so it
    /// must not be overwritten until the draft has been dealt with.
    async fn check_previous_run(&self) -> Result<()> {
        let Some(manager) = &self.state_manager else {
            return Ok(());
        };
        let previous = match manager.load_state().await {
            Ok(previous) => previous,
            Err(ReleaseError::State(StateError::NotFound)) => return Ok(()),
            Err(e) => {
                log::warn!("Ignoring unreadable release state: {}", e);
                return Ok(());
            }
        };

        if let Some(release_id) = previous.release_id
            && previous.has_orphaned_draft()
        {
            return Err(StateError::OrphanedDraft {
                tag: previous.tag,
                release_id,
                stage: previous.stage,
            }
            .into());
        }
        Ok(())
    }

    /// `NotStarted → ArtifactsCollected`
    ///
    /// Downloads and verifies every platform's artifact. Fails on the first
    /// missing one, and when two platforms would produce the same asset name.
    pub async fn collect_artifacts(&mut self, platforms: &[Platform]) -> Result<()> {
        self.ensure_stage(ReleaseStage::NotStarted, ReleaseStage::ArtifactsCollected)?;
        self.runtime.section("Collect artifacts");

        let mut artifacts = Vec::new();
        for platform in Platform::normalize(platforms) {
            let name = platform.artifact_name();
            let dir = self
                .store
                .download(name, &self.work_dir.join(name))
                .await?;
            verify_artifact_dir(&dir, &self.settings.binary_name).await?;
            let artifact = Artifact::load(platform, &dir, &self.settings.binary_name).await?;
            self.runtime
                .indent(&format!("{}: {}", platform, artifact.identifier));
            artifacts.push(artifact);
        }

        let mut seen = HashSet::new();
        for artifact in &artifacts {
            let asset_name = artifact.asset_name(&self.settings.binary_name);
            if !seen.insert(asset_name.clone()) {
                return Err(ArtifactError::DuplicateAssetName { name: asset_name }.into());
            }
        }

        self.artifacts = artifacts;
        self.advance(ReleaseStage::ArtifactsCollected).await
    }

    /// `ArtifactsCollected → DraftCreated`
    ///
    /// A tag that already has a release fails with a conflict before
    /// anything is created.
    pub async fn create_draft(&mut self) -> Result<&HostedRelease> {
        self.ensure_stage(ReleaseStage::ArtifactsCollected, ReleaseStage::DraftCreated)?;
        self.runtime.section("Create draft release");

        let new_release = NewRelease {
            tag_name: self.settings.tag.clone(),
            name: self.settings.title.clone(),
            body: self.settings.body.clone(),
            draft: true,
            prerelease: self.settings.prerelease,
        };

        let host = self.host;
        if let Some(existing) = host.release_by_tag(&new_release.tag_name).await? {
            log::warn!("Tag {} already has release {}", existing.tag_name, existing.id);
            return Err(GitHubError::ReleaseConflict {
                tag: existing.tag_name,
            }
            .into());
        }

        let release = retry_with_backoff(
            || host.create_release(&new_release),
            self.settings.retry.github_api,
            "create release",
            self.runtime,
        )
        .await?;

        self.runtime
            .indent(&format!("Draft {} (id {})", release.tag_name, release.id));
        self.state.set_release(&release);
        self.release = Some(release);
        self.advance(ReleaseStage::DraftCreated).await?;

        self.release
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("draft release missing after creation").into())
    }

    /// `DraftCreated → AssetsAttached`
    ///
    /// Platforms are attached in the fixed order Linux, macOS, Windows.
    pub async fn attach_assets(&mut self) -> Result<&[HostedAsset]> {
        self.ensure_stage(ReleaseStage::DraftCreated, ReleaseStage::AssetsAttached)?;
        self.runtime.section("Attach assets");

        let release = self
            .release
            .clone()
            .ok_or_else(|| anyhow::anyhow!("no draft release to attach assets to"))?;

        let host = self.host;
        for artifact in self.artifacts.clone() {
            let name = artifact.asset_name(&self.settings.binary_name);
            let content = tokio::fs::read(&artifact.binary).await?;
            let upload = AssetUpload {
                name: name.clone(),
                content_type: self.settings.content_type.clone(),
                label: Some(asset_label(&self.settings.binary_name, &artifact)),
                content: Bytes::from(content),
            };

            let asset = retry_with_backoff(
                || host.upload_asset(&release, &upload),
                self.settings.retry.file_uploads,
                "upload asset",
                self.runtime,
            )
            .await?;

            self.runtime
                .indent(&format!("Uploaded {} ({} bytes)", asset.name, asset.size));
            self.state.add_asset(&asset.name);
            self.assets.push(asset);
            self.persist().await;
        }

        self.advance(ReleaseStage::AssetsAttached).await?;
        Ok(&self.assets)
    }

    /// `AssetsAttached → Published`
    pub async fn publish(&mut self) -> Result<&HostedRelease> {
        self.ensure_stage(ReleaseStage::AssetsAttached, ReleaseStage::Published)?;
        self.runtime.section("Publish release");

        let release_id = self
            .release
            .as_ref()
            .map(|r| r.id)
            .ok_or_else(|| anyhow::anyhow!("no draft release to publish"))?;

        let host = self.host;
        let published = retry_with_backoff(
            || host.publish_release(release_id),
            self.settings.retry.github_api,
            "publish release",
            self.runtime,
        )
        .await?;

        self.state.set_release(&published);
        self.release = Some(published);
        self.advance(ReleaseStage::Published).await?;

        self.release
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("release missing after publish").into())
    }

    /// Run every remaining stage
    ///
    /// On failure the error is recorded in the state file before returning.
    /// A state file holding an unpublished draft from an earlier run stops
    /// the run before anything is overwritten.
    pub async fn run(mut self, platforms: &[Platform]) -> Result<ReleaseOutcome> {
        self.check_previous_run().await?;

        match self.run_stages(platforms).await {
            Ok(()) => {
                let release = self
                    .release
                    .take()
                    .ok_or_else(|| anyhow::anyhow!("release missing after publish"))?;
                Ok(ReleaseOutcome {
                    release,
                    assets: self.assets,
                })
            }
            Err(e) => {
                self.state.add_error(e.to_string());
                self.persist().await;
                if self.state.has_orphaned_draft() {
                    self.runtime.warning_println(&format!(
                        "Draft release {} was left unpublished with {} asset(s)",
                        self.settings.tag,
                        self.state.uploaded_assets.len()
                    ));
                }
                Err(e)
            }
        }
    }

    async fn run_stages(&mut self, platforms: &[Platform]) -> Result<()> {
        self.collect_artifacts(platforms).await?;
        self.create_draft().await?;
        self.attach_assets().await?;
        self.publish().await?;
        Ok(())
    }
}

/// Display label for an uploaded asset
fn asset_label(binary_name: &str, artifact: &Artifact) -> String {
    let platform = match artifact.platform {
        Platform::Linux => "Linux",
        Platform::MacOs => "macOS",
        Platform::Windows => "Windows",
    };
    format!("{} {} ({})", binary_name, platform, artifact.identifier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::MemoryReleaseHost;

    #[tokio::test]
    async fn test_stages_cannot_be_skipped() {
        let dir = tempfile::tempdir().expect("tempdir");
        let host = MemoryReleaseHost::new();
        let store = ArtifactStore::new(dir.path().join("store"));
        let runtime = RuntimeConfig::quiet();
        let mut orchestrator = ReleaseOrchestrator::new(
            &host,
            &store,
            ReleaseSettings::from(&PipelineConfig::default()),
            dir.path().join("work"),
            &runtime,
        );

        let err = orchestrator.create_draft().await.expect_err("not collected");
        assert!(matches!(err, ReleaseError::InvalidTransition { .. }));
        assert!(host.releases().is_empty());

        let err = orchestrator.publish().await.expect_err("nothing attached");
        assert!(matches!(err, ReleaseError::InvalidTransition { .. }));
        assert_eq!(orchestrator.stage(), ReleaseStage::NotStarted);
    }
}
