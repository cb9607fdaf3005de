//! Artifact directory assembly.

use std::path::{Path, PathBuf};

use super::identify::TargetIdentifier;
use crate::artifact::TARGET_FILE_NAME;
use crate::error::{BuildError, Result};

/// Assemble a fresh artifact directory from a compiled binary
///
/// Any previous contents of `artifact_dir` are removed. The identifier is
/// written to `target.txt` and the binary is moved in as `<binary_name>`,
/// without the platform's executable suffix, so every platform's artifact
/// has the same layout. Returns the packaged binary path.
pub async fn package(
    binary: &Path,
    binary_name: &str,
    identifier: &TargetIdentifier,
    artifact_dir: &Path,
) -> Result<PathBuf> {
    if !binary.is_file() {
        return Err(BuildError::BinaryNotFound {
            path: binary.to_path_buf(),
        }
        .into());
    }

    if tokio::fs::try_exists(artifact_dir).await? {
        tokio::fs::remove_dir_all(artifact_dir).await?;
    }
    tokio::fs::create_dir_all(artifact_dir).await?;

    tokio::fs::write(artifact_dir.join(TARGET_FILE_NAME), identifier.as_str()).await?;

    let packaged = artifact_dir.join(binary_name);
    move_file(binary, &packaged).await?;

    log::info!(
        "Packaged {} ({}) into {}",
        binary_name,
        identifier,
        artifact_dir.display()
    );
    Ok(packaged)
}

/// Rename, falling back to copy + remove across filesystems
async fn move_file(from: &Path, to: &Path) -> Result<()> {
    if tokio::fs::rename(from, to).await.is_ok() {
        return Ok(());
    }
    tokio::fs::copy(from, to).await?;
    tokio::fs::remove_file(from).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_package_moves_binary_and_writes_identifier() {
        let dir = tempfile::tempdir().expect("tempdir");
        let binary = dir.path().join("initiative_manager.exe");
        std::fs::write(&binary, b"MZ fake").expect("write binary");

        let artifact_dir = dir.path().join("windows");
        let identifier = TargetIdentifier::parse("x86_64-pc-windows-msvc").expect("valid");

        let packaged = package(&binary, "initiative_manager", &identifier, &artifact_dir)
            .await
            .expect("package");

        assert_eq!(packaged, artifact_dir.join("initiative_manager"));
        assert!(!binary.exists(), "binary is moved, not copied");
        assert_eq!(
            std::fs::read_to_string(artifact_dir.join(TARGET_FILE_NAME)).expect("target file"),
            "x86_64-pc-windows-msvc"
        );
    }

    #[tokio::test]
    async fn test_package_clears_stale_contents() {
        let dir = tempfile::tempdir().expect("tempdir");
        let artifact_dir = dir.path().join("linux");
        std::fs::create_dir_all(&artifact_dir).expect("mkdir");
        std::fs::write(artifact_dir.join("stale.txt"), "old").expect("write stale");

        let binary = dir.path().join("initiative_manager");
        std::fs::write(&binary, b"\x7fELF").expect("write binary");
        let identifier = TargetIdentifier::parse("x86_64-unknown-linux-gnu").expect("valid");

        package(&binary, "initiative_manager", &identifier, &artifact_dir)
            .await
            .expect("package");

        assert!(!artifact_dir.join("stale.txt").exists());
    }

    #[tokio::test]
    async fn test_package_missing_binary_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        let identifier = TargetIdentifier::parse("x86_64-apple-darwin").expect("valid");
        let result = package(
            &dir.path().join("nope"),
            "initiative_manager",
            &identifier,
            &dir.path().join("macos"),
        )
        .await;
        assert!(result.is_err());
        assert!(!dir.path().join("macos").exists());
    }
}
