//! Test fixtures for building throwaway host projects.
//!
//! ```ignore
//! use crate::test_fixtures::{create_project, install_package};
//!
//! let temp = create_project(r#"{"name": "host", "dependencies": {"libexpress": "^1.0.0"}}"#);
//! install_package(temp.path(), "libexpress", "1.0.0", &[]);
//! ```

use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Create a temp directory in the system temp location.
///
/// # Panics
///
/// Panics if the temp directory cannot be created.
#[must_use]
pub fn create_temp_dir() -> TempDir {
    TempDir::new_in(crate::temp::temp_dir_base()).expect("Failed to create temp directory")
}

/// Write `content` to `base/path`, creating parent directories.
///
/// # Panics
///
/// Panics if the file cannot be written.
pub fn write_file(base: &Path, path: &str, content: &str) -> PathBuf {
    let full_path = base.join(path);
    if let Some(parent) = full_path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create parent directory");
    }
    std::fs::write(&full_path, content).expect("Failed to write test file");
    full_path
}

/// Create a host project whose root `package.json` has the given content.
#[must_use]
pub fn create_project(package_json: &str) -> TempDir {
    let temp = create_temp_dir();
    write_file(temp.path(), "package.json", package_json);
    temp
}

/// Lay out an installed package under `root/node_modules/<name>`.
///
/// `dependencies` is written into the package's own manifest and an `index.js`
/// entry file is created.
pub fn install_package(
    root: &Path,
    name: &str,
    version: &str,
    dependencies: &[(&str, &str)],
) -> PathBuf {
    let deps: serde_json::Map<String, serde_json::Value> = dependencies
        .iter()
        .map(|(dep, range)| ((*dep).to_string(), serde_json::Value::from(*range)))
        .collect();
    let manifest = serde_json::json!({
        "name": name,
        "version": version,
        "dependencies": deps,
    });

    let dir = root.join("node_modules").join(name);
    write_file(&dir, "package.json", &manifest.to_string());
    write_file(&dir, "index.js", "module.exports = {};\n");
    dir
}

/// Write a gzipped npm-style tarball at `dir/file_name`; entries are `(path, content)`.
///
/// # Panics
///
/// Panics if the archive cannot be written.
pub fn write_archive(dir: &Path, file_name: &str, files: &[(&str, &str)]) -> PathBuf {
    let path = dir.join(file_name);
    let file = std::fs::File::create(&path).expect("Failed to create archive");
    let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for (name, content) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, name, content.as_bytes())
            .expect("Failed to append archive entry");
    }
    builder
        .into_inner()
        .and_then(|encoder| encoder.finish())
        .expect("Failed to finish archive");
    path
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_create_project() {
        let temp = create_project(r#"{"name": "host"}"#);
        assert!(temp.path().join("package.json").is_file());
    }

    #[test]
    fn test_install_package() {
        let temp = create_temp_dir();
        let dir = install_package(temp.path(), "@scope/pkg", "2.1.0", &[("dep", "^1.0.0")]);

        assert!(dir.join("index.js").is_file());
        let content = std::fs::read_to_string(dir.join("package.json")).expect("Failed to read");
        assert!(content.contains("\"2.1.0\""));
        assert!(content.contains("\"dep\""));
    }
}
