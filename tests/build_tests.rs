mod common;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::common::{self, BINARY_NAME};
    use initiative_release::artifact::{ArtifactStore, TARGET_FILE_NAME};
    use initiative_release::build::{BuildJob, derive_target_identifier};
    use initiative_release::cli::RuntimeConfig;
    use initiative_release::config::PipelineConfig;
    use initiative_release::error::{ArtifactError, ReleaseError};
    use initiative_release::github::MemoryReleaseHost;
    use initiative_release::pipeline::{PipelinePaths, run_builds, run_pipeline};
    use initiative_release::platform::Platform;
    use initiative_release::target::build_target;

    #[tokio::test]
    async fn test_identifier_comes_from_the_binary() {
        let dir = tempfile::tempdir().expect("tempdir");
        let binary = common::self_describing_binary(dir.path());
        let identifier = derive_target_identifier(&binary).await.expect("identifier");
        assert_eq!(identifier.as_str(), build_target());
    }

    // Windows jobs embed an icon, which needs rcedit.
    #[cfg(not(windows))]
    #[tokio::test]
    async fn test_prebuilt_job_packages_and_uploads() {
        let dir = tempfile::tempdir().expect("tempdir");
        let binary = common::self_describing_binary(&dir.path().join("bin"));
        let platform = Platform::host().expect("supported host");
        let store = ArtifactStore::new(dir.path().join("store"));
        let runtime = RuntimeConfig::quiet();

        let output = BuildJob::new(platform, dir.path().to_path_buf(), &dir.path().join("out"))
            .with_prebuilt_binary(binary.clone())
            .run(&PipelineConfig::default(), &store, &runtime)
            .await
            .expect("build job");

        assert_eq!(output.artifact.identifier.as_str(), build_target());
        assert!(!binary.exists(), "binary is moved into the artifact");
        assert!(store.contains(platform.artifact_name()));

        let stored = output.stored_at;
        assert!(stored.join(BINARY_NAME).is_file());
        assert_eq!(
            std::fs::read_to_string(stored.join(TARGET_FILE_NAME)).expect("target file"),
            build_target()
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_silent_binary_fails_the_job() {
        use initiative_release::error::BuildError;
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().expect("tempdir");
        let binary = dir.path().join("silent");
        std::fs::write(&binary, "#!/bin/sh\nexit 0\n").expect("script");
        std::fs::set_permissions(&binary, std::fs::Permissions::from_mode(0o755))
            .expect("chmod");

        let store = ArtifactStore::new(dir.path().join("store"));
        let runtime = RuntimeConfig::quiet();
        let err = BuildJob::new(Platform::Linux, dir.path().to_path_buf(), &dir.path().join("out"))
            .with_prebuilt_binary(binary)
            .run(&PipelineConfig::default(), &store, &runtime)
            .await
            .expect_err("empty identifier");

        assert!(matches!(
            err,
            ReleaseError::Build(BuildError::EmptyIdentifier { .. })
        ));
        assert!(!store.contains("linux"), "nothing uploaded");
    }

    fn foreign_platform() -> Platform {
        Platform::ALL
            .into_iter()
            .find(|p| Some(*p) != Platform::host())
            .expect("at least one foreign platform")
    }

    #[tokio::test]
    async fn test_failed_build_does_not_stop_other_jobs() {
        let dir = tempfile::tempdir().expect("tempdir");
        let foreign = foreign_platform();
        let paths = PipelinePaths {
            workspace: dir.path().to_path_buf(),
            artifact_root: dir.path().join("out"),
            store: ArtifactStore::new(dir.path().join("store")),
        };
        let runtime = RuntimeConfig::quiet();

        let reports = run_builds(
            Arc::new(PipelineConfig::default()),
            &paths,
            &[foreign, foreign],
            &runtime,
        )
        .await;

        assert_eq!(reports.len(), 1, "duplicate platforms collapse");
        assert_eq!(reports[0].platform, foreign);
        assert!(reports[0].result.is_err());
    }

    #[tokio::test]
    async fn test_pipeline_skips_release_without_artifacts() {
        let dir = tempfile::tempdir().expect("tempdir");
        let foreign = foreign_platform();
        let paths = PipelinePaths {
            workspace: dir.path().to_path_buf(),
            artifact_root: dir.path().join("out"),
            store: ArtifactStore::new(dir.path().join("store")),
        };
        let host = MemoryReleaseHost::new();
        let runtime = RuntimeConfig::quiet();

        let report = run_pipeline(
            Arc::new(PipelineConfig::default()),
            &paths,
            &[foreign],
            &host,
            &runtime,
        )
        .await;

        assert!(!report.is_success());
        assert_eq!(report.failed_platforms(), vec![foreign]);
        assert!(report.release.is_err());
        assert!(host.events().is_empty());
    }

    #[tokio::test]
    async fn test_failed_build_never_releases_a_stale_artifact() {
        let dir = tempfile::tempdir().expect("tempdir");
        let foreign = foreign_platform();
        let store_root = dir.path().join("store");
        common::seed_store(&store_root, foreign);

        let paths = PipelinePaths {
            workspace: dir.path().to_path_buf(),
            artifact_root: dir.path().join("out"),
            store: ArtifactStore::new(&store_root),
        };
        let host = MemoryReleaseHost::new();
        let runtime = RuntimeConfig::quiet();

        let report = run_pipeline(
            Arc::new(PipelineConfig::default()),
            &paths,
            &[foreign],
            &host,
            &runtime,
        )
        .await;

        assert_eq!(report.failed_platforms(), vec![foreign]);
        assert!(matches!(
            report.release,
            Err(ReleaseError::Artifact(ArtifactError::Missing { .. }))
        ));
        assert!(host.events().is_empty(), "no release from an earlier run's binary");
        assert!(!paths.store.contains(foreign.artifact_name()));
    }
}
