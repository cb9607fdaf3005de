//! Error types for initiative_release operations.
//!
//! Every failure of the pipeline maps to one variant here, grouped by the
//! stage that raises it, with actionable recovery suggestions.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for initiative_release operations
pub type Result<T> = std::result::Result<T, ReleaseError>;

/// Main error type for all initiative_release operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    /// Build job errors (platform-local)
    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    /// Artifact packaging and storage errors
    #[error("Artifact error: {0}")]
    Artifact(#[from] ArtifactError),

    /// GitHub release API errors
    #[error("GitHub error: {0}")]
    GitHub(#[from] GitHubError),

    /// State management errors
    #[error("State error: {0}")]
    State(#[from] StateError),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// Release stage machine was driven out of order
    #[error("Invalid release transition: {from} -> {to}")]
    InvalidTransition {
        /// Stage the orchestrator was in
        from: crate::release::ReleaseStage,
        /// Stage that was requested
        to: crate::release::ReleaseStage,
    },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors from anyhow
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Errors raised while building one platform's binary
#[derive(Error, Debug)]
pub enum BuildError {
    /// `cargo build` exited unsuccessfully
    #[error("Compilation failed for {platform}: {reason}")]
    CompileFailed {
        /// Platform being built
        platform: String,
        /// Reason for the error
        reason: String,
    },

    /// A required tool was not found on PATH
    #[error("Required tool '{tool}' not found on PATH")]
    ToolNotFound {
        /// Tool name
        tool: String,
    },

    /// A required system library is not installed
    #[error("Missing system dependency '{library}' for {platform}")]
    MissingSystemDependency {
        /// Platform being built
        platform: String,
        /// Library probed with pkg-config
        library: String,
    },

    /// Compiled binary was not produced at the expected path
    #[error("Compiled binary not found at {path}")]
    BinaryNotFound {
        /// Expected binary path
        path: PathBuf,
    },

    /// Binary did not run, or exited unsuccessfully, for the TARGET query
    #[error("Failed to query target identifier from {binary}: {reason}")]
    IdentifierCommandFailed {
        /// Binary that was invoked
        binary: PathBuf,
        /// Reason for the error
        reason: String,
    },

    /// Binary printed nothing for the TARGET query
    #[error("Binary {binary} printed an empty target identifier")]
    EmptyIdentifier {
        /// Binary that was invoked
        binary: PathBuf,
    },

    /// Binary printed something that is not a single-line target identifier
    #[error("Invalid target identifier '{identifier}': {reason}")]
    InvalidIdentifier {
        /// Output captured from the binary
        identifier: String,
        /// Reason for the error
        reason: String,
    },

    /// Resource editing tool could not be downloaded
    #[error("Failed to download {url}: {reason}")]
    ToolDownloadFailed {
        /// Download URL
        url: String,
        /// Reason for the error
        reason: String,
    },

    /// Downloaded tool did not match the pinned checksum
    #[error("Checksum mismatch for {url}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// Download URL
        url: String,
        /// Expected SHA-256
        expected: String,
        /// Actual SHA-256
        actual: String,
    },

    /// Icon could not be embedded into the executable
    #[error("Failed to embed icon {icon} into {binary}: {reason}")]
    IconEmbedFailed {
        /// Executable being edited
        binary: PathBuf,
        /// Icon file
        icon: PathBuf,
        /// Reason for the error
        reason: String,
    },

    /// The background task running the job panicked or was cancelled
    #[error("Build task for {platform} aborted: {reason}")]
    TaskAborted {
        /// Platform being built
        platform: String,
        /// Reason for the error
        reason: String,
    },
}

/// Artifact packaging and storage errors
#[derive(Error, Debug)]
pub enum ArtifactError {
    /// Artifact directory holds no files at all
    #[error("No files found in artifact directory {path}")]
    Empty {
        /// Artifact directory
        path: PathBuf,
    },

    /// Artifact directory is missing a required file or has extra ones
    #[error("Artifact {path} is incomplete: {reason}")]
    Incomplete {
        /// Artifact directory
        path: PathBuf,
        /// Reason for the error
        reason: String,
    },

    /// Named artifact was never uploaded
    #[error("Artifact '{name}' not found in store {store}")]
    Missing {
        /// Artifact name
        name: String,
        /// Store root
        store: PathBuf,
    },

    /// Two platforms would publish assets with the same name
    #[error("Asset name '{name}' is produced by more than one platform")]
    DuplicateAssetName {
        /// Colliding asset name
        name: String,
    },
}

/// GitHub release API errors
#[derive(Error, Debug)]
pub enum GitHubError {
    /// No token available
    #[error(
        "GitHub token not provided. Set GITHUB_TOKEN or GH_TOKEN, or pass --token"
    )]
    MissingToken,

    /// Repository slug could not be parsed
    #[error("Invalid repository '{repo}': expected owner/repo")]
    InvalidRepository {
        /// Input that failed to parse
        repo: String,
    },

    /// A release with this tag already exists
    #[error("Release for tag '{tag}' already exists")]
    ReleaseConflict {
        /// Conflicting tag
        tag: String,
    },

    /// An asset with this name already exists on the release
    #[error("Asset '{name}' already exists on release {release_id}")]
    AssetConflict {
        /// Release id
        release_id: u64,
        /// Asset name
        name: String,
    },

    /// Release id is unknown to the host
    #[error("Release {release_id} not found")]
    ReleaseNotFound {
        /// Release id
        release_id: u64,
    },

    /// API returned a non-success status
    #[error("{operation} failed with HTTP {status}: {message}")]
    Api {
        /// Operation being performed
        operation: String,
        /// HTTP status code
        status: u16,
        /// Response body or message
        message: String,
    },

    /// Transport-level failure
    #[error("Network error during {operation}: {reason}")]
    Network {
        /// Operation being performed
        operation: String,
        /// Reason for the error
        reason: String,
    },
}

/// State management errors
#[derive(Error, Debug)]
pub enum StateError {
    /// State file corrupted
    #[error("State file corrupted: {reason}")]
    Corrupted {
        /// Reason for the error
        reason: String,
    },

    /// State file not found
    #[error("State file not found. No release has run from this store.")]
    NotFound,

    /// State version mismatch
    #[error("State file version mismatch: expected {expected}, found {found}")]
    VersionMismatch {
        /// Expected version
        expected: String,
        /// Found version
        found: String,
    },

    /// Failed to save state
    #[error("Failed to save state: {reason}")]
    SaveFailed {
        /// Reason for the error
        reason: String,
    },

    /// A previous run left an unpublished draft behind
    #[error("Release {release_id} ({tag}) from a previous run was left as a draft at stage {stage}")]
    OrphanedDraft {
        /// Tag of the abandoned release
        tag: String,
        /// Host id of the draft
        release_id: u64,
        /// Stage the previous run stopped at
        stage: crate::release::ReleaseStage,
    },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read config {path}: {source}")]
    ReadFailed {
        /// Config path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for this schema
    #[error("Failed to parse config {path}: {source}")]
    ParseFailed {
        /// Config path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: toml::de::Error,
    },

    /// A field holds an unusable value
    #[error("Invalid config value for '{field}': {reason}")]
    InvalidValue {
        /// Field name
        field: String,
        /// Reason for the error
        reason: String,
    },
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },
}

impl ReleaseError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            ReleaseError::Build(BuildError::MissingSystemDependency { library, .. }) => vec![
                format!("Install the development package for '{}'", library),
                "On Debian/Ubuntu: sudo apt-get install libxkbcommon-dev".to_string(),
            ],
            ReleaseError::Build(BuildError::ToolNotFound { tool }) => {
                vec![format!("Install '{}' and make sure it is on PATH", tool)]
            }
            ReleaseError::Build(
                BuildError::EmptyIdentifier { .. } | BuildError::InvalidIdentifier { .. },
            ) => vec![
                "The binary must print its target triple when run with the single argument TARGET"
                    .to_string(),
                "Call initiative_release::target::describe_if_requested() at the top of main"
                    .to_string(),
            ],
            ReleaseError::Build(BuildError::ToolDownloadFailed { .. }) => vec![
                "Check network access to the rcedit download host".to_string(),
                "Set windows.rcedit_path in release.toml to use a local copy".to_string(),
            ],
            ReleaseError::Artifact(ArtifactError::Missing { name, .. }) => vec![
                format!("Check the build log of the '{}' job", name),
                "The release stage needs all three platform artifacts".to_string(),
            ],
            ReleaseError::GitHub(GitHubError::MissingToken) => vec![
                "Export GITHUB_TOKEN with contents:write permission".to_string(),
            ],
            ReleaseError::GitHub(GitHubError::ReleaseConflict { tag }) => vec![
                format!("Delete the existing release and tag '{}' by hand", tag),
                "Or bump `tag` in release.toml before re-running".to_string(),
            ],
            ReleaseError::State(StateError::OrphanedDraft { tag, release_id, .. }) => vec![
                format!("Delete draft release {} ({}) on GitHub", release_id, tag),
                "Then run `initiative_release status --clear` and re-run the release".to_string(),
            ],
            ReleaseError::GitHub(_) => vec![
                "A draft release may have been left behind; inspect it on GitHub".to_string(),
                "Run `initiative_release status` to see how far the release got".to_string(),
            ],
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }

    /// Check if this error is worth retrying
    pub fn is_recoverable(&self) -> bool {
        match self {
            ReleaseError::GitHub(GitHubError::Network { .. }) => true,
            ReleaseError::GitHub(GitHubError::Api { status, .. }) => *status >= 500,
            ReleaseError::Build(BuildError::ToolDownloadFailed { .. }) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_errors_are_recoverable() {
        let err = ReleaseError::from(GitHubError::Network {
            operation: "upload".to_string(),
            reason: "connection reset".to_string(),
        });
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_client_errors_are_not_recoverable() {
        let err = ReleaseError::from(GitHubError::Api {
            operation: "create release".to_string(),
            status: 401,
            message: "Bad credentials".to_string(),
        });
        assert!(!err.is_recoverable());

        let conflict = ReleaseError::from(GitHubError::ReleaseConflict {
            tag: "v1.2.4".to_string(),
        });
        assert!(!conflict.is_recoverable());
    }

    #[test]
    fn test_orphaned_draft_suggests_clearing_state() {
        let err = ReleaseError::from(StateError::OrphanedDraft {
            tag: "v1.2.4".to_string(),
            release_id: 42,
            stage: crate::release::ReleaseStage::DraftCreated,
        });
        let suggestions = err.recovery_suggestions();
        assert!(suggestions.iter().any(|s| s.contains("42")));
        assert!(suggestions.iter().any(|s| s.contains("status --clear")));
    }

    #[test]
    fn test_missing_artifact_suggests_build_log() {
        let err = ReleaseError::from(ArtifactError::Missing {
            name: "windows".to_string(),
            store: PathBuf::from("/tmp/store"),
        });
        let suggestions = err.recovery_suggestions();
        assert!(suggestions.iter().any(|s| s.contains("windows")));
    }
}
