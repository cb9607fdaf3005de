//! Retry configuration for network operations.
//!
//! Every count defaults to zero: a transient failure is terminal for the run
//! unless a retry budget is configured explicitly.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Configuration for retry behavior across different operation types
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Max retries for GitHub API calls (create release, publish)
    pub github_api: u32,

    /// Max retries for release asset uploads
    pub file_uploads: u32,

    /// Max retries for external tool downloads
    pub downloads: u32,
}

impl RetryConfig {
    const MAX_GITHUB_API: u32 = 20;
    const MAX_FILE_UPLOADS: u32 = 20;
    const MAX_DOWNLOADS: u32 = 10;

    /// Parse retry count from environment variable with clamping to maximum
    fn parse_retry_env(env: &super::EnvConfig, var_name: &str, current: u32, max: u32) -> u32 {
        env.get(var_name)
            .and_then(|s| s.parse::<u32>().ok())
            .map(|v| v.min(max))
            .unwrap_or(current)
    }

    /// Apply `INITIATIVE_RETRY_*` overrides on top of the configured values
    pub fn with_env_overrides(self, env: &super::EnvConfig) -> Self {
        Self {
            github_api: Self::parse_retry_env(
                env,
                "INITIATIVE_RETRY_GITHUB",
                self.github_api,
                Self::MAX_GITHUB_API,
            ),
            file_uploads: Self::parse_retry_env(
                env,
                "INITIATIVE_RETRY_UPLOADS",
                self.file_uploads,
                Self::MAX_FILE_UPLOADS,
            ),
            downloads: Self::parse_retry_env(
                env,
                "INITIATIVE_RETRY_DOWNLOADS",
                self.downloads,
                Self::MAX_DOWNLOADS,
            ),
        }
    }

    /// Validate retry counts are reasonable
    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            ("retry.github_api", self.github_api, Self::MAX_GITHUB_API),
            ("retry.file_uploads", self.file_uploads, Self::MAX_FILE_UPLOADS),
            ("retry.downloads", self.downloads, Self::MAX_DOWNLOADS),
        ];
        for (field, value, max) in checks {
            if value > max {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: format!("retry count too high: {} (max: {})", value, max),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnvConfig;

    #[test]
    fn test_defaults_never_retry() {
        let retry = RetryConfig::default();
        assert_eq!(retry.github_api, 0);
        assert_eq!(retry.file_uploads, 0);
        assert_eq!(retry.downloads, 0);
    }

    #[test]
    fn test_env_overrides_are_clamped() {
        let env = EnvConfig::from_pairs([
            ("INITIATIVE_RETRY_GITHUB", "3"),
            ("INITIATIVE_RETRY_DOWNLOADS", "500"),
            ("INITIATIVE_RETRY_UPLOADS", "not-a-number"),
        ]);
        let retry = RetryConfig::default().with_env_overrides(&env);
        assert_eq!(retry.github_api, 3);
        assert_eq!(retry.downloads, 10);
        assert_eq!(retry.file_uploads, 0);
    }

    #[test]
    fn test_validate_rejects_excessive_counts() {
        let retry = RetryConfig {
            github_api: 21,
            ..Default::default()
        };
        assert!(retry.validate().is_err());
    }
}
