//! Release hosting.
//!
//! [`ReleaseHost`] is the seam the release orchestrator talks through.
//! [`GitHubClient`] implements it against the GitHub REST API and
//! [`MemoryReleaseHost`] implements it in-process for dry runs.

mod client;
mod host;
mod memory;

pub use client::GitHubClient;
pub use host::{AssetUpload, HostedAsset, HostedRelease, NewRelease, ReleaseHost};
pub use memory::{HostEvent, MemoryReleaseHost};
