//! # Initiative Release
//!
//! Cross-platform build and release pipeline for `initiative_manager`.
//!
//! Each platform job compiles the application, asks the fresh binary for its
//! own target identifier, packages it into an artifact and uploads that to a
//! shared store. The release stage then collects every artifact and publishes
//! one GitHub release with one binary per platform.
//!
//! ## Features
//!
//! - **Self-describing binaries**: asset names come from the binary's own `TARGET` answer
//! - **Platform-local failures**: one failing build never cancels the others
//! - **Draft first**: assets are attached to a draft that is published last
//! - **Persistent progress**: the release state file records how far a run got
//!
//! ## Usage
//!
//! ```bash
//! initiative_release build --platform linux   # one CI runner
//! initiative_release release                  # after all three builds
//! initiative_release pipeline --dry-run       # everything, in-memory host
//! initiative_release status                   # how far the last run got
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

// Core modules
pub mod artifact;
pub mod build;
pub mod cli;
pub mod config;
pub mod error;
pub mod github;
pub mod pipeline;
pub mod platform;
pub mod release;
pub mod state;
pub mod target;

// Re-export main types for public API
pub use artifact::{Artifact, ArtifactStore};
pub use build::{BuildJob, BuildOutput, TargetIdentifier};
pub use cli::Args;
pub use config::{EnvConfig, PipelineConfig, RetryConfig};
pub use error::{CliError, ReleaseError, Result};
pub use github::{GitHubClient, MemoryReleaseHost, ReleaseHost};
pub use pipeline::{PipelinePaths, PipelineReport, run_builds, run_pipeline};
pub use platform::Platform;
pub use release::{ReleaseOrchestrator, ReleaseOutcome, ReleaseSettings, ReleaseStage};
pub use state::{ReleaseState, StateManager};
