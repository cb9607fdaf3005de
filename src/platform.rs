//! Supported build platforms.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CliError;

/// One of the three operating systems a release ships binaries for
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Linux (ubuntu runner)
    Linux,
    /// macOS
    #[serde(rename = "macos")]
    MacOs,
    /// Windows
    Windows,
}

impl Platform {
    /// Every supported platform, in the order assets are attached to a release
    pub const ALL: [Platform; 3] = [Platform::Linux, Platform::MacOs, Platform::Windows];

    /// Artifact name used when uploading this platform's build output
    pub fn artifact_name(self) -> &'static str {
        match self {
            Platform::Linux => "linux",
            Platform::MacOs => "macos",
            Platform::Windows => "windows",
        }
    }

    /// Suffix the platform's executables carry on disk
    pub fn executable_suffix(self) -> &'static str {
        match self {
            Platform::Windows => ".exe",
            Platform::Linux | Platform::MacOs => "",
        }
    }

    /// Whether the packaged binary gets an icon resource embedded
    pub fn embeds_icon(self) -> bool {
        matches!(self, Platform::Windows)
    }

    /// Platform this process was compiled for, if supported
    ///
    /// Uses `std::env::consts::OS` so the answer matches the running host.
    pub fn host() -> Option<Platform> {
        match std::env::consts::OS {
            "linux" => Some(Platform::Linux),
            "macos" => Some(Platform::MacOs),
            "windows" => Some(Platform::Windows),
            _ => None,
        }
    }

    /// Collapse a requested platform list to unique entries in release order
    pub fn normalize(requested: &[Platform]) -> Vec<Platform> {
        Platform::ALL
            .iter()
            .copied()
            .filter(|p| requested.contains(p))
            .collect()
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.artifact_name())
    }
}

impl FromStr for Platform {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "linux" | "ubuntu" => Ok(Platform::Linux),
            "macos" | "mac" | "darwin" | "osx" => Ok(Platform::MacOs),
            "windows" | "win" => Ok(Platform::Windows),
            other => Err(CliError::InvalidArguments {
                reason: format!("Unknown platform: {}", other),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_windows_has_exe_suffix() {
        assert_eq!(Platform::Windows.executable_suffix(), ".exe");
        assert_eq!(Platform::Linux.executable_suffix(), "");
        assert_eq!(Platform::MacOs.executable_suffix(), "");
    }

    #[test]
    fn test_only_windows_embeds_icon() {
        assert!(Platform::Windows.embeds_icon());
        assert!(!Platform::Linux.embeds_icon());
        assert!(!Platform::MacOs.embeds_icon());
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!("Darwin".parse::<Platform>().ok(), Some(Platform::MacOs));
        assert_eq!("ubuntu".parse::<Platform>().ok(), Some(Platform::Linux));
        assert!("plan9".parse::<Platform>().is_err());
    }

    #[test]
    fn test_normalize_dedupes_and_orders() {
        let requested = [Platform::Windows, Platform::Linux, Platform::Windows];
        assert_eq!(
            Platform::normalize(&requested),
            vec![Platform::Linux, Platform::Windows]
        );
    }
}
