//! Release host abstraction and the data it exchanges.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Parameters of a release to create
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRelease {
    /// Git tag
    pub tag_name: String,
    /// Release title
    pub name: String,
    /// Release body
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Hidden from the public until published
    pub draft: bool,
    /// Marked as a prerelease
    pub prerelease: bool,
}

/// A release as the host reports it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostedRelease {
    /// Host-assigned id
    pub id: u64,
    /// Git tag
    pub tag_name: String,
    /// Release title
    #[serde(default)]
    pub name: Option<String>,
    /// Draft flag
    pub draft: bool,
    /// Prerelease flag
    pub prerelease: bool,
    /// Web page of the release
    #[serde(default)]
    pub html_url: String,
    /// Asset upload endpoint (RFC 6570 template on GitHub)
    #[serde(default)]
    pub upload_url: String,
    /// Attached assets
    #[serde(default)]
    pub assets: Vec<HostedAsset>,
}

/// An asset attached to a release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostedAsset {
    /// Host-assigned id
    pub id: u64,
    /// File name
    pub name: String,
    /// Size in bytes
    pub size: u64,
    /// Content type recorded by the host
    pub content_type: String,
    /// Public download URL
    #[serde(default)]
    pub browser_download_url: String,
}

/// Asset to upload
#[derive(Debug, Clone)]
pub struct AssetUpload {
    /// File name on the release
    pub name: String,
    /// Content-type label
    pub content_type: String,
    /// Optional display label
    pub label: Option<String>,
    /// File contents
    pub content: Bytes,
}

/// Operations the release stage needs from a hosting platform
#[async_trait]
pub trait ReleaseHost: Send + Sync {
    /// Create a release; fails with a conflict if the tag already has one
    async fn create_release(&self, release: &NewRelease) -> Result<HostedRelease>;

    /// Attach an asset to a release
    async fn upload_asset(&self, release: &HostedRelease, asset: &AssetUpload)
    -> Result<HostedAsset>;

    /// Clear the draft flag of a release
    async fn publish_release(&self, release_id: u64) -> Result<HostedRelease>;

    /// Look up a release by tag
    async fn release_by_tag(&self, tag: &str) -> Result<Option<HostedRelease>>;
}
