//! Self-description contract for released binaries.
//!
//! A binary that is released by this pipeline must print its target triple
//! and exit when invoked with the single argument [`TARGET_SENTINEL`]. The
//! release stage names each uploaded asset after that output instead of a
//! hard-coded table, so adding a new target needs no pipeline change.
//!
//! ```no_run
//! fn main() {
//!     if initiative_release::target::describe_if_requested(std::env::args()) {
//!         return;
//!     }
//!     // normal startup
//! }
//! ```

/// Argument that switches a binary into self-description mode
pub const TARGET_SENTINEL: &str = "TARGET";

/// Target triple this crate was compiled for
pub fn build_target() -> &'static str {
    env!("INITIATIVE_BUILD_TARGET")
}

/// Whether an argument list (including argv\[0\]) requests self-description
pub fn is_target_query<I, S>(args: I) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut args = args.into_iter().skip(1);
    matches!(
        (args.next(), args.next()),
        (Some(first), None) if first.as_ref() == TARGET_SENTINEL
    )
}

/// Print the build target and return true if `args` is a target query
pub fn describe_if_requested<I, S>(args: I) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    if is_target_query(args) {
        println!("{}", build_target());
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_target_is_a_triple() {
        let target = build_target();
        assert!(!target.is_empty());
        assert!(target.split('-').count() >= 3, "unexpected triple {target}");
    }

    #[test]
    fn test_target_query_requires_exact_single_argument() {
        assert!(is_target_query(["app", "TARGET"]));
        assert!(!is_target_query(["app"]));
        assert!(!is_target_query(["app", "target"]));
        assert!(!is_target_query(["app", "TARGET", "extra"]));
        assert!(!is_target_query(["app", "build", "TARGET"]));
    }
}
