#![warn(
    clippy::complexity,
    clippy::correctness,
    clippy::perf,
    clippy::style,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::unimplemented,
    clippy::todo,
    clippy::missing_errors_doc
)]

pub mod api;
pub mod error;

use std::path::PathBuf;

use error::EmResult;

/// Directory containing the crate's own `Cargo.toml`, derived from the build-time env var.
pub fn package_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

/// Workspace root, 1 level up from the calling crate's package directory.
pub fn workspace_dir() -> PathBuf {
    package_dir()
        .parent()
        .map(PathBuf::from)
        .unwrap_or_else(package_dir)
}

/// Reads the full contents of a file at `path` into a `String`, wrapping any IO failure in
/// [`error::EmError`].
pub async fn read_file(path: &std::path::Path) -> EmResult<String> {
    let contents = tokio::fs::read_to_string(path).await?;
    Ok(contents)
}
