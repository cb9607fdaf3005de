//! Records the compile target triple so the binary can describe itself.

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let target = std::env::var("TARGET").unwrap_or_else(|_| "unknown".to_string());
    println!("cargo:rustc-env=INITIATIVE_BUILD_TARGET={}", target);
}
