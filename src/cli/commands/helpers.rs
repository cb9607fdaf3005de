//! Shared helpers for command implementations.

use std::path::{Path, PathBuf};

use crate::artifact::ArtifactStore;
use crate::config::{EnvConfig, PipelineConfig};
use crate::error::{GitHubError, Result};
use crate::github::GitHubClient;

/// Resolve a path relative to the workspace unless it is absolute
pub(super) fn in_workspace(workspace: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        workspace.join(path)
    }
}

/// Artifact store from a CLI override or the configured directory
pub(super) fn artifact_store(
    workspace: &Path,
    config: &PipelineConfig,
    store: Option<&PathBuf>,
) -> ArtifactStore {
    let root = store.cloned().unwrap_or_else(|| config.store_dir.clone());
    ArtifactStore::new(in_workspace(workspace, &root))
}

/// GitHub client from CLI overrides, config and environment
pub(super) fn github_client(
    config: &PipelineConfig,
    env: &EnvConfig,
    repo: Option<&String>,
    token: Option<&String>,
) -> Result<GitHubClient> {
    let (owner, name) = match repo {
        Some(slug) => crate::config::parse_repository(slug)?,
        None => config.resolve_repository(env)?,
    };
    let token = token
        .cloned()
        .or_else(|| env.github_token())
        .ok_or(GitHubError::MissingToken)?;
    GitHubClient::new(&config.api_url, &owner, &name, token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_workspace_keeps_absolute_paths() {
        let workspace = Path::new("/ws");
        let absolute = std::env::temp_dir();
        assert_eq!(in_workspace(workspace, &absolute), absolute);
        assert_eq!(
            in_workspace(workspace, Path::new("artifacts")),
            workspace.join("artifacts")
        );
    }

    #[test]
    fn test_github_client_requires_token() {
        let env = EnvConfig::from_pairs([("GITHUB_REPOSITORY", "o/r")]);
        let err = github_client(&PipelineConfig::default(), &env, None, None)
            .expect_err("no token");
        assert!(matches!(
            err,
            crate::error::ReleaseError::GitHub(GitHubError::MissingToken)
        ));
    }
}
