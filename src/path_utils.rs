//! Cross-platform path utilities
//!
//! Module references in JavaScript always use forward slashes, so every path that
//! ends up in source text goes through [`to_forward_slashes`].

use std::path::{Component, Path, PathBuf};

use normpath::PathExt;

/// Convert path separators to forward slashes
pub fn to_forward_slashes(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Resolve `.` and `..` components without touching the file system
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !result.pop() {
                    result.push(component);
                }
            }
            other => result.push(other),
        }
    }
    result
}

/// Normalize an existing path (resolving symlinks such as /var -> /private/var on macOS).
/// Falls back to lexical normalization when the path does not exist.
pub fn normalize(path: &Path) -> PathBuf {
    path.normalize()
        .map(|np| np.into_path_buf())
        .unwrap_or_else(|_| normalize_lexically(path))
}

/// Relative path from directory `from` to `to`. Both must be absolute and normalized.
pub fn relative_path(from: &Path, to: &Path) -> PathBuf {
    let from: Vec<Component> = from.components().collect();
    let to: Vec<Component> = to.components().collect();

    let common = from
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut result = PathBuf::new();
    for _ in common..from.len() {
        result.push("..");
    }
    for component in &to[common..] {
        result.push(component);
    }
    result
}

/// Module reference literal from `from_dir` to `target`.
///
/// Uses forward slashes, drops a trailing `.js` extension and always starts with
/// `./` or `../` so it is never mistaken for a bare package name.
pub fn module_reference(from_dir: &Path, target: &Path) -> String {
    let relative = to_forward_slashes(&relative_path(from_dir, target));
    let relative = relative.strip_suffix(".js").unwrap_or(&relative);

    if relative.starts_with("../") {
        relative.to_string()
    } else {
        format!("./{relative}")
    }
}
