//! Pipeline configuration.
//!
//! Settings come from an optional `release.toml`, then CLI flags override
//! them. Every field has a default, so the pipeline runs with no config file.

mod retry;

pub use retry::RetryConfig;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, GitHubError, Result};
use crate::platform::Platform;

/// Default config file name looked up in the workspace root
pub const CONFIG_FILE_NAME: &str = "release.toml";

/// Release tag published by the pipeline
pub const DEFAULT_TAG: &str = "v1.2.4";

/// Release title published by the pipeline
pub const DEFAULT_TITLE: &str =
    "v1.2.4 Added concentration display & more discrete hideable stats (WIP)";

/// Content-type label applied to every uploaded asset
pub const DEFAULT_CONTENT_TYPE: &str = "application/zip";

/// rcedit release used to embed the Windows icon
pub const DEFAULT_RCEDIT_URL: &str =
    "https://github.com/electron/rcedit/releases/download/v1.1.1/rcedit-x64.exe";

/// Top-level pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Cargo binary target to build and release
    pub binary_name: String,
    /// Cargo profile used for the optimized build
    pub profile: String,
    /// Extra arguments passed to `cargo build`
    pub cargo_args: Vec<String>,
    /// Release tag
    pub tag: String,
    /// Release title
    pub title: String,
    /// Release body
    pub body: Option<String>,
    /// Mark the release as a prerelease
    pub prerelease: bool,
    /// Content-type label for uploaded assets
    pub content_type: String,
    /// Directory where build jobs assemble their artifact directories
    pub artifact_dir: PathBuf,
    /// Artifact store shared between the build and release stages
    pub store_dir: PathBuf,
    /// GitHub repository as `owner/repo`
    pub repository: Option<String>,
    /// GitHub REST API root
    pub api_url: String,
    /// Linux build settings
    pub linux: PlatformSettings,
    /// macOS build settings
    pub macos: PlatformSettings,
    /// Windows build settings
    pub windows: WindowsSettings,
    /// Retry budgets for network operations
    pub retry: RetryConfig,
}

/// Per-platform build settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformSettings {
    /// System libraries that must be visible to pkg-config before compiling
    pub system_libraries: Vec<String>,
}

/// Windows build settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowsSettings {
    /// System libraries that must be visible to pkg-config before compiling
    pub system_libraries: Vec<String>,
    /// Icon embedded into the executable, relative to the workspace
    pub icon: PathBuf,
    /// Download location of the resource editing tool
    pub rcedit_url: String,
    /// Expected SHA-256 of the downloaded tool
    pub rcedit_sha256: Option<String>,
    /// Use a local copy of the tool instead of downloading it
    pub rcedit_path: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            binary_name: "initiative_manager".to_string(),
            profile: "release".to_string(),
            cargo_args: Vec::new(),
            tag: DEFAULT_TAG.to_string(),
            title: DEFAULT_TITLE.to_string(),
            body: None,
            prerelease: false,
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            artifact_dir: PathBuf::from("artifacts"),
            store_dir: PathBuf::from(".artifact-store"),
            repository: None,
            api_url: "https://api.github.com".to_string(),
            linux: PlatformSettings {
                system_libraries: vec!["xkbcommon".to_string()],
            },
            macos: PlatformSettings::default(),
            windows: WindowsSettings::default(),
            retry: RetryConfig::default(),
        }
    }
}

impl Default for WindowsSettings {
    fn default() -> Self {
        Self {
            system_libraries: Vec::new(),
            icon: PathBuf::from("icon.ico"),
            rcedit_url: DEFAULT_RCEDIT_URL.to_string(),
            rcedit_sha256: None,
            rcedit_path: None,
        }
    }
}

impl PipelineConfig {
    /// Load `release.toml` from `path`, falling back to defaults if absent
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&contents).map_err(|source| ConfigError::ParseFailed {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Parse config from TOML text
    pub fn from_toml(contents: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Validate field values
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.binary_name.trim().is_empty()
            || self.binary_name.contains(['/', '\\'])
        {
            return Err(ConfigError::InvalidValue {
                field: "binary_name".to_string(),
                reason: format!("'{}' is not a valid binary name", self.binary_name),
            });
        }
        if self.tag.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "tag".to_string(),
                reason: "release tag must not be empty".to_string(),
            });
        }
        if !self.content_type.contains('/') {
            return Err(ConfigError::InvalidValue {
                field: "content_type".to_string(),
                reason: format!("'{}' is not a MIME type", self.content_type),
            });
        }
        if url::Url::parse(&self.api_url).is_err() {
            return Err(ConfigError::InvalidValue {
                field: "api_url".to_string(),
                reason: format!("'{}' is not a URL", self.api_url),
            });
        }
        if semver::Version::parse(self.tag.trim_start_matches('v')).is_err() {
            log::warn!("Release tag '{}' is not a semantic version", self.tag);
        }
        self.retry.validate()
    }

    /// System libraries required on `platform`
    pub fn system_libraries(&self, platform: Platform) -> &[String] {
        match platform {
            Platform::Linux => &self.linux.system_libraries,
            Platform::MacOs => &self.macos.system_libraries,
            Platform::Windows => &self.windows.system_libraries,
        }
    }

    /// Resolve the GitHub repository, preferring config over `GITHUB_REPOSITORY`
    pub fn resolve_repository(&self, env: &EnvConfig) -> Result<(String, String)> {
        let slug = self
            .repository
            .clone()
            .or_else(|| env.get("GITHUB_REPOSITORY"))
            .ok_or_else(|| GitHubError::InvalidRepository {
                repo: "<unset>".to_string(),
            })?;
        parse_repository(&slug)
    }
}

/// Split `owner/repo`, also accepting GitHub HTTPS and SSH remote URLs
pub fn parse_repository(input: &str) -> Result<(String, String)> {
    let invalid = || GitHubError::InvalidRepository {
        repo: input.to_string(),
    };

    // SSH SCP-like format: git@github.com:owner/repo.git
    let path = if input.contains('@') && input.contains(':') && !input.contains("://") {
        input.split_once(':').map(|(_, p)| p).ok_or_else(invalid)?
    } else if let Some(start) = input.find("github.com/") {
        &input[start + "github.com/".len()..]
    } else {
        input
    };

    let path = path.trim_end_matches('/').trim_end_matches(".git");
    match path.split('/').collect::<Vec<_>>().as_slice() {
        [owner, repo] if !owner.is_empty() && !repo.is_empty() => {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => Err(invalid().into()),
    }
}

/// Snapshot of the process environment
///
/// Read once at startup so lookups are consistent for the whole run, and so
/// tests can inject values without mutating the real environment.
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    vars: HashMap<String, String>,
}

impl EnvConfig {
    /// Capture the current process environment
    pub fn from_env() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    /// Build from explicit key/value pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Look up a non-empty variable
    pub fn get(&self, key: &str) -> Option<String> {
        self.vars.get(key).filter(|v| !v.is_empty()).cloned()
    }

    /// GitHub token from `GITHUB_TOKEN`, then `GH_TOKEN`
    pub fn github_token(&self) -> Option<String> {
        self.get("GITHUB_TOKEN").or_else(|| self.get("GH_TOKEN"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_published_release() {
        let config = PipelineConfig::default();
        assert_eq!(config.tag, "v1.2.4");
        assert_eq!(
            config.title,
            "v1.2.4 Added concentration display & more discrete hideable stats (WIP)"
        );
        assert!(!config.prerelease);
        assert_eq!(config.binary_name, "initiative_manager");
        assert_eq!(config.system_libraries(Platform::Linux), ["xkbcommon"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = PipelineConfig::from_toml(
            r#"
tag = "v1.3.0"

[windows]
icon = "assets/app.ico"

[retry]
file_uploads = 2
"#,
        )
        .expect("valid toml");

        assert_eq!(config.tag, "v1.3.0");
        assert_eq!(config.title, DEFAULT_TITLE);
        assert_eq!(config.windows.icon, PathBuf::from("assets/app.ico"));
        assert_eq!(config.windows.rcedit_url, DEFAULT_RCEDIT_URL);
        assert_eq!(config.retry.file_uploads, 2);
        assert_eq!(config.retry.github_api, 0);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = PipelineConfig {
            tag: "  ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = PipelineConfig {
            content_type: "zip".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = PipelineConfig {
            binary_name: "bin/app".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = PipelineConfig::load(&dir.path().join(CONFIG_FILE_NAME)).expect("defaults");
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn test_parse_repository_forms() {
        let expected = ("owner".to_string(), "repo".to_string());
        assert_eq!(parse_repository("owner/repo").ok(), Some(expected.clone()));
        assert_eq!(
            parse_repository("https://github.com/owner/repo.git").ok(),
            Some(expected.clone())
        );
        assert_eq!(
            parse_repository("git@github.com:owner/repo.git").ok(),
            Some(expected)
        );
        assert!(parse_repository("owner").is_err());
        assert!(parse_repository("a/b/c").is_err());
    }

    #[test]
    fn test_repository_from_env() {
        let env = EnvConfig::from_pairs([("GITHUB_REPOSITORY", "me/initiative_manager")]);
        let (owner, repo) = PipelineConfig::default()
            .resolve_repository(&env)
            .expect("repo from env");
        assert_eq!(owner, "me");
        assert_eq!(repo, "initiative_manager");
    }

    #[test]
    fn test_token_lookup_order() {
        let env = EnvConfig::from_pairs([("GH_TOKEN", "gh"), ("GITHUB_TOKEN", "github")]);
        assert_eq!(env.github_token().as_deref(), Some("github"));

        let env = EnvConfig::from_pairs([("GH_TOKEN", "gh"), ("GITHUB_TOKEN", "")]);
        assert_eq!(env.github_token().as_deref(), Some("gh"));
    }
}
