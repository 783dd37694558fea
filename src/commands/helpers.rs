//! Command helper utilities

use std::path::{Path, PathBuf};

use crate::error::{InstaforkError, Result};

/// Resolve the project root from the optional `--workspace` argument.
///
/// Falls back to the current directory. Relative paths are made absolute so every
/// later stage can compute relative module references from it.
pub fn resolve_workspace_path(workspace: Option<PathBuf>) -> Result<PathBuf> {
    let current_dir = || {
        std::env::current_dir().map_err(|e| InstaforkError::IoError {
            message: format!("Failed to get current directory: {}", e),
        })
    };

    let path = match workspace {
        Some(path) if path.is_absolute() => path,
        Some(path) => current_dir()?.join(path),
        None => current_dir()?,
    };

    if !path.is_dir() {
        return Err(InstaforkError::IoError {
            message: format!("Project directory does not exist: {}", path.display()),
        });
    }
    Ok(crate::path_utils::normalize(&path))
}

/// `path` relative to `root` for display, or `path` itself outside the root
pub fn display_relative(root: &Path, path: &Path) -> String {
    crate::path_utils::to_forward_slashes(path.strip_prefix(root).unwrap_or(path))
}
