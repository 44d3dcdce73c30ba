//! Integration tests for kql-lens.

pub mod normalize_test;
pub mod pipeline_test;
pub mod rewrite_test;

use std::path::PathBuf;

/// Path to a file under `tests/fixtures`.
pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}
