//! In-process release host used for dry runs.

use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard};

use super::host::{AssetUpload, HostedAsset, HostedRelease, NewRelease, ReleaseHost};
use crate::error::{GitHubError, Result};

/// Operation recorded by [`MemoryReleaseHost`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// A release was created
    Created {
        /// Release id
        release_id: u64,
        /// Tag
        tag: String,
        /// Draft flag at creation
        draft: bool,
    },
    /// An asset was attached
    Uploaded {
        /// Release id
        release_id: u64,
        /// Asset name
        name: String,
    },
    /// A release was published
    Published {
        /// Release id
        release_id: u64,
    },
}

#[derive(Debug, Default)]
struct MemoryState {
    next_id: u64,
    releases: Vec<HostedRelease>,
    events: Vec<HostEvent>,
}

/// Release host that keeps everything in memory
///
/// Mirrors GitHub's constraints: one release per tag, unique asset names
/// within a release.
#[derive(Debug, Default)]
pub struct MemoryReleaseHost {
    state: Mutex<MemoryState>,
}

impl MemoryReleaseHost {
    /// Empty host
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        // A panic while holding the lock leaves the data consistent enough
        // for inspection, so poisoning is ignored.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Snapshot of every release
    pub fn releases(&self) -> Vec<HostedRelease> {
        self.lock().releases.clone()
    }

    /// Operations performed so far, in order
    pub fn events(&self) -> Vec<HostEvent> {
        self.lock().events.clone()
    }
}

#[async_trait]
impl ReleaseHost for MemoryReleaseHost {
    async fn create_release(&self, release: &NewRelease) -> Result<HostedRelease> {
        let mut state = self.lock();
        if state.releases.iter().any(|r| r.tag_name == release.tag_name) {
            return Err(GitHubError::ReleaseConflict {
                tag: release.tag_name.clone(),
            }
            .into());
        }

        state.next_id += 1;
        let id = state.next_id;
        let hosted = HostedRelease {
            id,
            tag_name: release.tag_name.clone(),
            name: Some(release.name.clone()),
            draft: release.draft,
            prerelease: release.prerelease,
            html_url: format!("memory://releases/{}", id),
            upload_url: format!("memory://releases/{}/assets{{?name,label}}", id),
            assets: Vec::new(),
        };
        state.releases.push(hosted.clone());
        state.events.push(HostEvent::Created {
            release_id: id,
            tag: release.tag_name.clone(),
            draft: release.draft,
        });
        Ok(hosted)
    }

    async fn upload_asset(
        &self,
        release: &HostedRelease,
        asset: &AssetUpload,
    ) -> Result<HostedAsset> {
        let mut state = self.lock();
        let asset_id = state.next_id * 1000
            + state
                .releases
                .iter()
                .map(|r| r.assets.len() as u64)
                .sum::<u64>()
            + 1;

        let hosted = state
            .releases
            .iter_mut()
            .find(|r| r.id == release.id)
            .ok_or(GitHubError::ReleaseNotFound {
                release_id: release.id,
            })?;

        if hosted.assets.iter().any(|a| a.name == asset.name) {
            return Err(GitHubError::AssetConflict {
                release_id: release.id,
                name: asset.name.clone(),
            }
            .into());
        }

        let uploaded = HostedAsset {
            id: asset_id,
            name: asset.name.clone(),
            size: asset.content.len() as u64,
            content_type: asset.content_type.clone(),
            browser_download_url: format!("{}/{}", hosted.html_url, asset.name),
        };
        hosted.assets.push(uploaded.clone());
        state.events.push(HostEvent::Uploaded {
            release_id: release.id,
            name: asset.name.clone(),
        });
        Ok(uploaded)
    }

    async fn publish_release(&self, release_id: u64) -> Result<HostedRelease> {
        let mut state = self.lock();
        let hosted = state
            .releases
            .iter_mut()
            .find(|r| r.id == release_id)
            .ok_or(GitHubError::ReleaseNotFound { release_id })?;
        hosted.draft = false;
        let published = hosted.clone();
        state.events.push(HostEvent::Published { release_id });
        Ok(published)
    }

    async fn release_by_tag(&self, tag: &str) -> Result<Option<HostedRelease>> {
        Ok(self
            .lock()
            .releases
            .iter()
            .find(|r| r.tag_name == tag)
            .cloned())
    }
}
