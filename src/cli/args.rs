//! Command line argument parsing and validation.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::platform::Platform;

/// Build, package and publish initiative_manager for Linux, macOS and Windows
#[derive(Parser, Debug)]
#[command(
    name = "initiative_release",
    version,
    about = "Cross-platform build and GitHub release pipeline",
    long_about = "Build initiative_manager per platform, collect the artifacts and publish a GitHub release.

Usage:
  initiative_release build --platform linux
  initiative_release release
  initiative_release pipeline
  initiative_release TARGET"
)]
pub struct Args {
    /// Path to release.toml (defaults to <workspace>/release.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Cargo workspace holding the application
    #[arg(long, global = true, default_value = ".", value_name = "DIR")]
    pub workspace: PathBuf,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress everything except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Pipeline commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run one platform's build job and upload its artifact
    Build {
        /// Platform to build (defaults to the host platform)
        #[arg(long)]
        platform: Option<Platform>,

        /// Directory to assemble the artifact in
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,

        /// Artifact store to upload into
        #[arg(long, value_name = "DIR")]
        store: Option<PathBuf>,

        /// Use an already built binary instead of compiling
        #[arg(long, value_name = "PATH")]
        binary: Option<PathBuf>,
    },

    /// Collect all platform artifacts and publish the release
    Release {
        /// Artifact store to download from
        #[arg(long, value_name = "DIR")]
        store: Option<PathBuf>,

        /// GitHub repository (owner/repo)
        #[arg(long, env = "GITHUB_REPOSITORY")]
        repo: Option<String>,

        /// GitHub token
        #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
        token: Option<String>,

        /// Run against an in-memory release host instead of GitHub
        #[arg(long)]
        dry_run: bool,
    },

    /// Run every build job concurrently, then the release stage
    Pipeline {
        /// Platforms to build (defaults to all three)
        #[arg(long = "platform")]
        platforms: Vec<Platform>,

        /// Run the release stage against an in-memory host
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the persisted state of the last release run
    Status {
        /// Artifact store holding the state file
        #[arg(long, value_name = "DIR")]
        store: Option<PathBuf>,

        /// Print the raw state as JSON
        #[arg(long)]
        json: bool,

        /// Delete the state file after an abandoned run has been cleaned up
        #[arg(long, conflicts_with = "json")]
        clear: bool,
    },

    /// Print this tool's own target identifier
    Target,
}

impl Command {
    /// Command name for messages
    pub fn name(&self) -> &'static str {
        match self {
            Command::Build { .. } => "build",
            Command::Release { .. } => "release",
            Command::Pipeline { .. } => "pipeline",
            Command::Status { .. } => "status",
            Command::Target => "target",
        }
    }
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        if let Command::Build {
            binary: Some(binary),
            ..
        } = &self.command
            && !binary.is_file()
        {
            return Err(format!("--binary {} is not a file", binary.display()));
        }

        if let Command::Release {
            repo: Some(repo), ..
        } = &self.command
            && crate::config::parse_repository(repo).is_err()
        {
            return Err(format!("--repo '{}' is not owner/repo", repo));
        }

        Ok(())
    }

    /// Config file path, defaulting to `release.toml` in the workspace
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| self.workspace.join(crate::config::CONFIG_FILE_NAME))
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Output manager for colored terminal output
    output: super::OutputManager,
}

impl RuntimeConfig {
    /// Create runtime configuration
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            output: super::OutputManager::new(verbose, quiet),
        }
    }

    /// Runtime configuration that prints nothing but errors
    pub fn quiet() -> Self {
        Self::new(false, true)
    }

    /// Get a reference to the output manager
    pub fn output(&self) -> &super::OutputManager {
        &self.output
    }

    /// Print message
    pub fn println(&self, message: &str) {
        let _ = self.output.println(message);
    }

    /// Print verbose message
    pub fn verbose_println(&self, message: &str) {
        let _ = self.output.verbose(message);
    }

    /// Print error message (always shown)
    pub fn error_println(&self, message: &str) {
        self.output.error(message);
    }

    /// Print warning message
    pub fn warning_println(&self, message: &str) {
        let _ = self.output.warn(message);
    }

    /// Print success message
    pub fn success_println(&self, message: &str) {
        let _ = self.output.success(message);
    }

    /// Print section header
    pub fn section(&self, title: &str) {
        let _ = self.output.section(title);
    }

    /// Print indented text
    pub fn indent(&self, message: &str) {
        let _ = self.output.indent(message);
    }

    /// Check if verbose output is enabled
    pub fn is_verbose(&self) -> bool {
        self.output.is_verbose()
    }

    /// Check if output is suppressed
    pub fn is_quiet(&self) -> bool {
        self.output.is_quiet()
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::new(false, false)
    }
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        Self::new(args.verbose, args.quiet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_build_command() {
        let args = Args::try_parse_from([
            "initiative_release",
            "build",
            "--platform",
            "windows",
            "--out",
            "dist",
        ])
        .expect("valid args");

        match args.command {
            Command::Build { platform, out, .. } => {
                assert_eq!(platform, Some(Platform::Windows));
                assert_eq!(out, Some(PathBuf::from("dist")));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_pipeline_platforms() {
        let args = Args::try_parse_from([
            "initiative_release",
            "pipeline",
            "--platform",
            "linux",
            "--platform",
            "macos",
        ])
        .expect("valid args");

        match args.command {
            Command::Pipeline { platforms, dry_run } => {
                assert_eq!(platforms, vec![Platform::Linux, Platform::MacOs]);
                assert!(!dry_run);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_config_path_defaults_to_workspace() {
        let args = Args::try_parse_from(["initiative_release", "--workspace", "app", "status"])
            .expect("valid args");
        assert_eq!(args.config_path(), PathBuf::from("app").join("release.toml"));
    }

    #[test]
    fn test_validate_rejects_bad_repo() {
        let args = Args::try_parse_from([
            "initiative_release",
            "release",
            "--repo",
            "not-a-slug",
            "--dry-run",
        ])
        .expect("parses");
        assert!(args.validate().is_err());
    }
}
