//! Windows icon embedding.
//!
//! The icon resource is written into the finished executable with rcedit,
//! which is fetched from its release page on first use and cached.

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

use crate::cli::RuntimeConfig;
use crate::config::WindowsSettings;
use crate::error::{BuildError, Result};
use crate::release::retry_with_backoff;

/// Embeds an icon resource into Windows executables
#[derive(Debug, Clone)]
pub struct IconEmbedder {
    url: String,
    sha256: Option<String>,
    local_tool: Option<PathBuf>,
    cache_dir: PathBuf,
    retries: u32,
}

impl IconEmbedder {
    /// Create an embedder from the Windows settings
    pub fn from_settings(settings: &WindowsSettings, retries: u32) -> Self {
        let cache_dir = dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("initiative_release")
            .join("tools");

        Self {
            url: settings.rcedit_url.clone(),
            sha256: settings.rcedit_sha256.clone(),
            local_tool: settings.rcedit_path.clone(),
            cache_dir,
            retries,
        }
    }

    /// Use a different cache directory
    pub fn with_cache_dir(mut self, cache_dir: PathBuf) -> Self {
        self.cache_dir = cache_dir;
        self
    }

    /// Cached location of the downloaded tool
    pub fn cached_tool_path(&self) -> PathBuf {
        let file_name = url::Url::parse(&self.url)
            .ok()
            .and_then(|u| {
                u.path_segments()
                    .and_then(|mut s| s.next_back().map(str::to_string))
            })
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "rcedit.exe".to_string());
        self.cache_dir.join(file_name)
    }

    /// Return the tool path, downloading it if it is not cached yet
    pub async fn ensure_tool(&self, runtime: &RuntimeConfig) -> Result<PathBuf> {
        if let Some(local) = &self.local_tool {
            return Ok(local.clone());
        }

        let path = self.cached_tool_path();
        if path.is_file() {
            log::debug!("Using cached {}", path.display());
            return Ok(path);
        }

        runtime.indent(&format!("Downloading {}", self.url));
        let data = retry_with_backoff(
            || download(&self.url),
            self.retries,
            "rcedit download",
            runtime,
        )
        .await?;

        if let Some(expected) = &self.sha256 {
            verify_sha256(&self.url, &data, expected)?;
        }

        tokio::fs::create_dir_all(&self.cache_dir).await?;
        let partial = path.with_extension("part");
        tokio::fs::write(&partial, &data).await?;
        tokio::fs::rename(&partial, &path).await?;
        Ok(path)
    }

    /// Embed `icon` into `executable` in place
    pub async fn embed(&self, executable: &Path, icon: &Path, runtime: &RuntimeConfig) -> Result<()> {
        let failed = |reason: String| BuildError::IconEmbedFailed {
            binary: executable.to_path_buf(),
            icon: icon.to_path_buf(),
            reason,
        };

        if !icon.is_file() {
            return Err(failed("icon file not found".to_string()).into());
        }

        let tool = self.ensure_tool(runtime).await?;
        let output = tokio::process::Command::new(&tool)
            .arg(executable)
            .arg("--set-icon")
            .arg(icon)
            .output()
            .await
            .map_err(|e| failed(format!("could not run {}: {}", tool.display(), e)))?;

        if !output.status.success() {
            return Err(failed(String::from_utf8_lossy(&output.stderr).trim().to_string()).into());
        }

        log::info!("Embedded {} into {}", icon.display(), executable.display());
        Ok(())
    }
}

/// Download a file into memory
pub async fn download(url: &str) -> Result<Vec<u8>> {
    log::info!("Downloading {}", url);

    let failed = |reason: String| BuildError::ToolDownloadFailed {
        url: url.to_string(),
        reason,
    };

    let response = reqwest::get(url)
        .await
        .map_err(|e| failed(e.to_string()))?
        .error_for_status()
        .map_err(|e| failed(e.to_string()))?;

    let bytes = response.bytes().await.map_err(|e| failed(e.to_string()))?;
    Ok(bytes.to_vec())
}

/// Check `data` against a hex SHA-256, case-insensitively
pub fn verify_sha256(url: &str, data: &[u8], expected: &str) -> Result<()> {
    let actual = hex::encode(Sha256::digest(data));
    if actual.eq_ignore_ascii_case(expected.trim()) {
        Ok(())
    } else {
        Err(BuildError::ChecksumMismatch {
            url: url.to_string(),
            expected: expected.to_string(),
            actual,
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_sha256() {
        // sha256("abc")
        let digest = "BA7816BF8F01CFEA414140DE5DAE2223B00361A396177A9CB410FF61F20015AD";
        assert!(verify_sha256("u", b"abc", digest).is_ok());
        assert!(verify_sha256("u", b"abd", digest).is_err());
    }

    #[test]
    fn test_cached_tool_name_comes_from_url() {
        let embedder = IconEmbedder::from_settings(&WindowsSettings::default(), 0)
            .with_cache_dir(PathBuf::from("/cache"));
        assert_eq!(
            embedder.cached_tool_path(),
            PathBuf::from("/cache").join("rcedit-x64.exe")
        );
    }

    #[tokio::test]
    async fn test_local_tool_skips_download() {
        let settings = WindowsSettings {
            rcedit_path: Some(PathBuf::from("/opt/rcedit.exe")),
            rcedit_url: "http://127.0.0.1:9/unreachable".to_string(),
            ..Default::default()
        };
        let embedder = IconEmbedder::from_settings(&settings, 0);
        let tool = embedder
            .ensure_tool(&RuntimeConfig::quiet())
            .await
            .expect("local tool");
        assert_eq!(tool, PathBuf::from("/opt/rcedit.exe"));
    }

    #[tokio::test]
    async fn test_missing_icon_fails_before_download() {
        let dir = tempfile::tempdir().expect("tempdir");
        let settings = WindowsSettings {
            rcedit_url: "http://127.0.0.1:9/rcedit.exe".to_string(),
            ..Default::default()
        };
        let embedder =
            IconEmbedder::from_settings(&settings, 0).with_cache_dir(dir.path().to_path_buf());
        let err = embedder
            .embed(
                &dir.path().join("app.exe"),
                &dir.path().join("missing.ico"),
                &RuntimeConfig::quiet(),
            )
            .await
            .expect_err("icon missing");
        assert!(matches!(
            err,
            crate::error::ReleaseError::Build(BuildError::IconEmbedFailed { .. })
        ));
    }
}
