use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Resolve `path` against the current working directory.
///
/// Absolute paths are returned unchanged.
pub fn resolve_path(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }

    let cwd = std::env::current_dir().context("Could not determine the current directory")?;
    Ok(cwd.join(path))
}
