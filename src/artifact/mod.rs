//! Artifacts and the store that connects the build and release stages.
//!
//! An artifact is a directory with exactly two files: the packaged binary
//! (named after the cargo binary, no extension) and `target.txt` holding the
//! target identifier. The store keeps one directory per artifact name.

use std::path::{Path, PathBuf};

use crate::build::TargetIdentifier;
use crate::error::{ArtifactError, BuildError, Result};
use crate::platform::Platform;

/// File inside an artifact that holds the target identifier
pub const TARGET_FILE_NAME: &str = "target.txt";

/// A packaged platform build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Platform the binary was built for
    pub platform: Platform,
    /// Artifact directory
    pub dir: PathBuf,
    /// Packaged binary inside `dir`
    pub binary: PathBuf,
    /// Identifier read back from `target.txt`
    pub identifier: TargetIdentifier,
}

impl Artifact {
    /// Load an artifact directory, reading back its identifier
    pub async fn load(platform: Platform, dir: &Path, binary_name: &str) -> Result<Self> {
        let binary = dir.join(binary_name);
        if !binary.is_file() {
            return Err(ArtifactError::Incomplete {
                path: dir.to_path_buf(),
                reason: format!("missing binary '{}'", binary_name),
            }
            .into());
        }

        let identifier = read_identifier(dir).await?;
        Ok(Self {
            platform,
            dir: dir.to_path_buf(),
            binary,
            identifier,
        })
    }

    /// Release asset name: `<binary>-<identifier>` plus the platform suffix
    pub fn asset_name(&self, binary_name: &str) -> String {
        format!(
            "{}-{}{}",
            binary_name,
            self.identifier,
            self.platform.executable_suffix()
        )
    }
}

/// Read and validate `target.txt` from an artifact directory
pub async fn read_identifier(dir: &Path) -> Result<TargetIdentifier> {
    let path = dir.join(TARGET_FILE_NAME);
    let raw = tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| ArtifactError::Incomplete {
            path: dir.to_path_buf(),
            reason: format!("cannot read {}: {}", TARGET_FILE_NAME, e),
        })?;
    TargetIdentifier::parse(&raw).map_err(|e| match e {
        BuildError::InvalidIdentifier { reason, .. } => ArtifactError::Incomplete {
            path: dir.to_path_buf(),
            reason: format!("{}: {}", TARGET_FILE_NAME, reason),
        }
        .into(),
        other => other.into(),
    })
}

/// Check an artifact directory holds exactly one binary and one identifier
pub async fn verify_artifact_dir(dir: &Path, binary_name: &str) -> Result<()> {
    let files = list_files(dir)?;
    if files.is_empty() {
        return Err(ArtifactError::Empty {
            path: dir.to_path_buf(),
        }
        .into());
    }

    let mut names: Vec<String> = files
        .iter()
        .filter_map(|f| f.strip_prefix(dir).ok())
        .map(|rel| rel.to_string_lossy().replace('\\', "/"))
        .collect();
    names.sort();

    let mut expected = vec![binary_name.to_string(), TARGET_FILE_NAME.to_string()];
    expected.sort();

    if names != expected {
        return Err(ArtifactError::Incomplete {
            path: dir.to_path_buf(),
            reason: format!("expected files {:?}, found {:?}", expected, names),
        }
        .into());
    }

    read_identifier(dir).await?;
    Ok(())
}

/// All regular files below `dir`
fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(dir).min_depth(1) {
        let entry = entry.map_err(|e| std::io::Error::other(e.to_string()))?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Copy a directory tree, replacing the destination
async fn copy_dir(from: PathBuf, to: PathBuf) -> Result<usize> {
    tokio::task::spawn_blocking(move || -> Result<usize> {
        if to.exists() {
            std::fs::remove_dir_all(&to)?;
        }
        std::fs::create_dir_all(&to)?;

        let mut copied = 0;
        for entry in walkdir::WalkDir::new(&from).min_depth(1) {
            let entry = entry.map_err(|e| std::io::Error::other(e.to_string()))?;
            let rel = entry
                .path()
                .strip_prefix(&from)
                .map_err(|e| std::io::Error::other(e.to_string()))?;
            let dest = to.join(rel);
            if entry.file_type().is_dir() {
                std::fs::create_dir_all(&dest)?;
            } else {
                if let Some(parent) = dest.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::copy(entry.path(), &dest)?;
                copied += 1;
            }
        }
        Ok(copied)
    })
    .await
    .map_err(|e| std::io::Error::other(format!("copy task failed: {}", e)))?
}

/// Filesystem-backed artifact storage shared by both stages
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    /// Store rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether an artifact with this name has been uploaded
    pub fn contains(&self, name: &str) -> bool {
        self.root.join(name).is_dir()
    }

    /// Delete artifact `name`; absent artifacts are fine
    pub async fn remove(&self, name: &str) -> Result<bool> {
        match tokio::fs::remove_dir_all(self.root.join(name)).await {
            Ok(()) => {
                log::info!("Removed stale artifact '{}'", name);
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Upload `dir` as artifact `name`, replacing a previous upload
    ///
    /// Fails without touching the store when `dir` holds no files.
    pub async fn upload(&self, name: &str, dir: &Path) -> Result<PathBuf> {
        if list_files(dir)?.is_empty() {
            return Err(ArtifactError::Empty {
                path: dir.to_path_buf(),
            }
            .into());
        }

        let dest = self.root.join(name);
        let copied = copy_dir(dir.to_path_buf(), dest.clone()).await?;
        log::info!("Uploaded artifact '{}' ({} files)", name, copied);
        Ok(dest)
    }

    /// Download artifact `name` into `dest`
    pub async fn download(&self, name: &str, dest: &Path) -> Result<PathBuf> {
        if !self.contains(name) {
            return Err(ArtifactError::Missing {
                name: name.to_string(),
                store: self.root.clone(),
            }
            .into());
        }

        let copied = copy_dir(self.root.join(name), dest.to_path_buf()).await?;
        log::info!("Downloaded artifact '{}' ({} files)", name, copied);
        Ok(dest.to_path_buf())
    }
}
