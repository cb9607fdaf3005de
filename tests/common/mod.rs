//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use initiative_release::artifact::TARGET_FILE_NAME;
use initiative_release::platform::Platform;

pub const BINARY_NAME: &str = "initiative_manager";

/// Identifier a build of `platform` would report
pub fn identifier_for(platform: Platform) -> &'static str {
    match platform {
        Platform::Linux => "x86_64-unknown-linux-gnu",
        Platform::MacOs => "aarch64-apple-darwin",
        Platform::Windows => "x86_64-pc-windows-msvc",
    }
}

/// Write an uploaded artifact for `platform` directly into a store root
pub fn seed_store(store: &Path, platform: Platform) -> PathBuf {
    let dir = store.join(platform.artifact_name());
    std::fs::create_dir_all(&dir).expect("create artifact dir");
    std::fs::write(
        dir.join(BINARY_NAME),
        format!("{} binary", platform.artifact_name()),
    )
    .expect("write binary");
    std::fs::write(dir.join(TARGET_FILE_NAME), identifier_for(platform)).expect("write target");
    dir
}

/// Store holding all three platform artifacts
pub fn seed_full_store(store: &Path) {
    for platform in Platform::ALL {
        seed_store(store, platform);
    }
}

/// Copy this crate's own binary, which answers `TARGET`, into `dir`
pub fn self_describing_binary(dir: &Path) -> PathBuf {
    std::fs::create_dir_all(dir).expect("create bin dir");
    let dest = dir.join(format!("app{}", std::env::consts::EXE_SUFFIX));
    std::fs::copy(env!("CARGO_BIN_EXE_initiative_release"), &dest).expect("copy binary");
    dest
}
