mod common;

#[cfg(test)]
mod tests {
    use assert_cmd::Command;
    use predicates::prelude::*;

    use super::common;
    use initiative_release::target::build_target;

    fn cli() -> Command {
        let mut cmd = Command::cargo_bin("initiative_release").expect("binary built");
        cmd.env_remove("GITHUB_TOKEN")
            .env_remove("GH_TOKEN")
            .env_remove("GITHUB_REPOSITORY");
        cmd
    }

    #[test]
    fn test_target_sentinel_prints_only_the_triple() {
        cli()
            .arg("TARGET")
            .assert()
            .success()
            .stdout(format!("{}\n", build_target()));
    }

    #[test]
    fn test_target_subcommand() {
        cli()
            .arg("target")
            .assert()
            .success()
            .stdout(predicate::str::contains(build_target()));
    }

    #[test]
    fn test_status_without_state() {
        let dir = tempfile::tempdir().expect("tempdir");
        cli()
            .args(["--workspace"])
            .arg(dir.path())
            .arg("status")
            .assert()
            .success()
            .stdout(predicate::str::contains("No release has run"));
    }

    #[test]
    fn test_dry_run_release_then_status() {
        let dir = tempfile::tempdir().expect("tempdir");
        common::seed_full_store(&dir.path().join(".artifact-store"));

        cli()
            .arg("--workspace")
            .arg(dir.path())
            .args(["release", "--dry-run"])
            .assert()
            .success()
            .stdout(predicate::str::contains(
                "initiative_manager-x86_64-pc-windows-msvc.exe",
            ));

        cli()
            .arg("--workspace")
            .arg(dir.path())
            .args(["status", "--json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"stage\": \"Published\""));

        cli()
            .arg("--workspace")
            .arg(dir.path())
            .args(["status", "--clear"])
            .assert()
            .success();
        assert!(!dir.path().join(".artifact-store/.release_state.json").exists());
    }

    #[test]
    fn test_release_with_missing_artifact_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = dir.path().join(".artifact-store");
        common::seed_store(&store, initiative_release::platform::Platform::Linux);

        cli()
            .arg("--workspace")
            .arg(dir.path())
            .args(["release", "--dry-run"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("macos"));
    }

    #[test]
    fn test_release_without_token_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        common::seed_full_store(&dir.path().join(".artifact-store"));

        cli()
            .arg("--workspace")
            .arg(dir.path())
            .args(["release", "--repo", "owner/initiative_manager"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("token"));
    }

    #[test]
    fn test_verbose_reports_config_source() {
        let dir = tempfile::tempdir().expect("tempdir");
        cli()
            .arg("--workspace")
            .arg(dir.path())
            .args(["--verbose", "status"])
            .assert()
            .success()
            .stdout(predicate::str::contains("(defaults)"));
    }

    #[test]
    fn test_unknown_platform_is_rejected() {
        cli()
            .args(["build", "--platform", "beos"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown platform"));
    }
}
