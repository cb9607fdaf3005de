//! Target identifier derivation.
//!
//! The freshly built binary is asked for its own target triple by running it
//! with the `TARGET` sentinel. Whatever it prints names the release asset.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

use crate::error::{BuildError, Result};
use crate::target::TARGET_SENTINEL;

static IDENTIFIER_PATTERN: OnceLock<Regex> = OnceLock::new();

fn identifier_pattern() -> &'static Regex {
    IDENTIFIER_PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").unwrap_or_else(|e| {
            panic!("identifier pattern is a constant and must compile: {e}")
        })
    })
}

/// A validated, single-line target identifier such as `x86_64-pc-windows-msvc`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TargetIdentifier(String);

impl TargetIdentifier {
    /// Validate captured output
    ///
    /// Surrounding whitespace (including the trailing newline `println!`
    /// leaves) is trimmed. The rest must be a non-empty single token.
    pub fn parse(raw: &str) -> std::result::Result<Self, BuildError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(BuildError::InvalidIdentifier {
                identifier: raw.to_string(),
                reason: "identifier is empty".to_string(),
            });
        }
        if trimmed.lines().count() > 1 {
            return Err(BuildError::InvalidIdentifier {
                identifier: trimmed.to_string(),
                reason: "identifier spans more than one line".to_string(),
            });
        }
        if !identifier_pattern().is_match(trimmed) {
            return Err(BuildError::InvalidIdentifier {
                identifier: trimmed.to_string(),
                reason: "only letters, digits, '.', '_' and '-' are allowed".to_string(),
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Identifier text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for TargetIdentifier {
    type Error = BuildError;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TargetIdentifier> for String {
    fn from(value: TargetIdentifier) -> Self {
        value.0
    }
}

/// Run `binary TARGET` and validate what it prints
pub async fn derive_target_identifier(binary: &Path) -> Result<TargetIdentifier> {
    log::debug!("Querying target identifier from {}", binary.display());

    let output = tokio::process::Command::new(binary)
        .arg(TARGET_SENTINEL)
        .stdin(std::process::Stdio::null())
        .output()
        .await
        .map_err(|e| BuildError::IdentifierCommandFailed {
            binary: binary.to_path_buf(),
            reason: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(BuildError::IdentifierCommandFailed {
            binary: binary.to_path_buf(),
            reason: format!(
                "exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        }
        .into());
    }

    let stdout = String::from_utf8(output.stdout).map_err(|e| BuildError::InvalidIdentifier {
        identifier: String::from_utf8_lossy(e.as_bytes()).into_owned(),
        reason: "output is not UTF-8".to_string(),
    })?;

    if stdout.trim().is_empty() {
        return Err(BuildError::EmptyIdentifier {
            binary: binary.to_path_buf(),
        }
        .into());
    }

    let identifier = TargetIdentifier::parse(&stdout)?;
    log::info!("{} reports target {}", binary.display(), identifier);
    Ok(identifier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_trailing_newline() {
        let id = TargetIdentifier::parse("x86_64-pc-windows-msvc\r\n").expect("valid");
        assert_eq!(id.as_str(), "x86_64-pc-windows-msvc");
    }

    #[test]
    fn test_parse_rejects_empty_and_whitespace() {
        assert!(TargetIdentifier::parse("").is_err());
        assert!(TargetIdentifier::parse("  \n").is_err());
    }

    #[test]
    fn test_parse_rejects_multiline_and_paths() {
        assert!(TargetIdentifier::parse("x86_64-apple-darwin\nwarning: x").is_err());
        assert!(TargetIdentifier::parse("../../etc/passwd").is_err());
        assert!(TargetIdentifier::parse("x86 64").is_err());
    }

    #[test]
    fn test_serde_round_trip_validates() {
        let id: TargetIdentifier =
            serde_json::from_str("\"aarch64-apple-darwin\"").expect("valid identifier");
        assert_eq!(id.as_str(), "aarch64-apple-darwin");
        assert!(serde_json::from_str::<TargetIdentifier>("\"\"").is_err());
    }

    #[tokio::test]
    async fn test_missing_binary_fails_to_run() {
        let err = derive_target_identifier(Path::new("/definitely/not/here"))
            .await
            .expect_err("binary does not exist");
        assert!(matches!(
            err,
            crate::error::ReleaseError::Build(BuildError::IdentifierCommandFailed { .. })
        ));
    }
}
