//! Optimized compilation of the application binary.

use std::path::{Path, PathBuf};
use tokio::process::Command;

use crate::error::{BuildError, Result};
use crate::platform::Platform;

/// Locate a required tool on PATH
pub fn require_tool(tool: &str) -> Result<PathBuf> {
    which::which(tool).map_err(|_| {
        BuildError::ToolNotFound {
            tool: tool.to_string(),
        }
        .into()
    })
}

/// Probe every required system library with `pkg-config --exists`
pub async fn check_system_dependencies(platform: Platform, libraries: &[String]) -> Result<()> {
    if libraries.is_empty() {
        return Ok(());
    }

    let pkg_config = require_tool("pkg-config")?;
    for library in libraries {
        let status = Command::new(&pkg_config)
            .args(["--exists", library])
            .status()
            .await?;

        if !status.success() {
            return Err(BuildError::MissingSystemDependency {
                platform: platform.to_string(),
                library: library.clone(),
            }
            .into());
        }
        log::debug!("Found system library {}", library);
    }
    Ok(())
}

/// Cargo output directory for a profile (`dev` builds land in `debug`)
pub fn profile_dir(profile: &str) -> &str {
    match profile {
        "dev" | "test" => "debug",
        "bench" => "release",
        other => other,
    }
}

/// Path cargo writes the binary to for `profile` on `platform`
pub fn binary_path(
    workspace: &Path,
    binary_name: &str,
    profile: &str,
    platform: Platform,
) -> PathBuf {
    let target_dir = std::env::var_os("CARGO_TARGET_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| workspace.join("target"));
    target_dir
        .join(profile_dir(profile))
        .join(format!("{}{}", binary_name, platform.executable_suffix()))
}

/// Compile `binary_name` with `cargo build --profile <profile>`
///
/// Only the host platform can be compiled; cross builds run on their own
/// runner, so asking for another platform fails that platform's job.
pub async fn compile(
    workspace: &Path,
    binary_name: &str,
    profile: &str,
    cargo_args: &[String],
    platform: Platform,
) -> Result<PathBuf> {
    if Platform::host() != Some(platform) {
        return Err(BuildError::CompileFailed {
            platform: platform.to_string(),
            reason: format!(
                "cannot build {} binaries on a {} host",
                platform,
                std::env::consts::OS
            ),
        }
        .into());
    }

    let cargo = require_tool("cargo")?;
    log::info!(
        "Compiling {} ({} profile) in {}",
        binary_name,
        profile,
        workspace.display()
    );

    let output = Command::new(cargo)
        .current_dir(workspace)
        .args(["build", "--profile", profile, "--bin", binary_name])
        .args(cargo_args)
        .output()
        .await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let tail: Vec<&str> = stderr.lines().rev().take(20).collect();
        return Err(BuildError::CompileFailed {
            platform: platform.to_string(),
            reason: tail.into_iter().rev().collect::<Vec<_>>().join("\n"),
        }
        .into());
    }

    let path = binary_path(workspace, binary_name, profile, platform);
    if !path.is_file() {
        return Err(BuildError::BinaryNotFound { path }.into());
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_dir_mapping() {
        assert_eq!(profile_dir("release"), "release");
        assert_eq!(profile_dir("dev"), "debug");
        assert_eq!(profile_dir("dist"), "dist");
    }

    #[test]
    fn test_windows_binary_path_has_exe() {
        let path = binary_path(
            Path::new("/ws"),
            "initiative_manager",
            "release",
            Platform::Windows,
        );
        assert!(path.ends_with("release/initiative_manager.exe"));
    }

    #[tokio::test]
    async fn test_no_libraries_is_ok() {
        assert!(check_system_dependencies(Platform::MacOs, &[]).await.is_ok());
    }

    #[tokio::test]
    async fn test_foreign_platform_cannot_compile() {
        let foreign = Platform::ALL
            .into_iter()
            .find(|p| Platform::host() != Some(*p))
            .expect("at least two platforms are foreign");
        let err = compile(Path::new("."), "app", "release", &[], foreign)
            .await
            .expect_err("foreign platform");
        assert!(matches!(
            err,
            crate::error::ReleaseError::Build(BuildError::CompileFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_unknown_library_is_a_missing_dependency() {
        if which::which("pkg-config").is_err() {
            eprintln!("pkg-config not installed, skipping");
            return;
        }
        let libraries = vec!["initiative-release-no-such-library".to_string()];
        let err = check_system_dependencies(Platform::Linux, &libraries)
            .await
            .expect_err("library cannot exist");
        assert!(matches!(
            err,
            crate::error::ReleaseError::Build(BuildError::MissingSystemDependency { ref library, .. })
                if library == "initiative-release-no-such-library"
        ));
    }
}
