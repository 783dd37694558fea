//! Common test utilities for instafork integration tests

use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A throwaway host project plus a private temp directory for the child process
pub struct TestWorkspace {
    #[allow(dead_code)]
    pub temp: TempDir,
    /// Project root
    pub path: PathBuf,
    /// TMPDIR handed to the binary, so leftover scratch directories can be checked
    pub tmp: PathBuf,
}

impl TestWorkspace {
    /// Create a new project with the given root `package.json`
    pub fn new(package_json: &str) -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().join("project");
        let tmp = temp.path().join("tmp");
        std::fs::create_dir_all(&path).expect("Failed to create project directory");
        std::fs::create_dir_all(&tmp).expect("Failed to create tmp directory");

        let workspace = Self { temp, path, tmp };
        workspace.write_file("package.json", package_json);
        workspace
    }

    /// Write a file in the project
    pub fn write_file(&self, path: &str, content: &str) {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
    }

    /// Read a file from the project
    pub fn read_file(&self, path: &str) -> String {
        let file_path = self.path.join(path);
        std::fs::read_to_string(&file_path).expect("Failed to read file")
    }

    /// Check if a file exists in the project
    pub fn file_exists(&self, path: &str) -> bool {
        self.path.join(path).exists()
    }

    /// Lay out an installed package under `node_modules/<name>`
    pub fn install_package(&self, name: &str, version: &str, dependencies: &[(&str, &str)]) {
        let deps: serde_json::Map<String, serde_json::Value> = dependencies
            .iter()
            .map(|(dep, range)| ((*dep).to_string(), serde_json::Value::from(*range)))
            .collect();
        let manifest = serde_json::json!({
            "name": name,
            "version": version,
            "dependencies": deps,
        });
        self.write_file(
            &format!("node_modules/{name}/package.json"),
            &manifest.to_string(),
        );
        self.write_file(
            &format!("node_modules/{name}/index.js"),
            "module.exports = {};\n",
        );
    }

    /// Entries left in the child's temp directory
    #[allow(dead_code)]
    pub fn tmp_entries(&self) -> Vec<PathBuf> {
        std::fs::read_dir(&self.tmp)
            .expect("Failed to read tmp directory")
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .collect()
    }

    /// `instafork` command running against this project
    pub fn cmd(&self) -> assert_cmd::Command {
        let mut cmd = instafork_cmd();
        cmd.env("INSTAFORK_WORKSPACE", self.path.as_os_str());
        cmd.env("TMPDIR", self.tmp.as_os_str());
        cmd.current_dir(&self.path);
        cmd
    }
}

/// The real binary with instafork environment variables cleared
#[allow(deprecated)]
pub fn instafork_cmd() -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::cargo_bin("instafork").expect("Failed to find binary");
    cmd.env_remove("INSTAFORK_WORKSPACE");
    cmd.env_remove("INSTAFORK_NPM");
    cmd
}

/// Write a gzipped npm-style tarball; entries are `(path, content)`
#[allow(dead_code)]
pub fn write_archive(path: &Path, files: &[(&str, &str)]) {
    let file = std::fs::File::create(path).expect("Failed to create archive");
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
}

/// Write an executable stand-in for npm.
///
/// `pack` copies `archive` into the working directory; `install --save <name>@<range>`
/// lays out `node_modules/<name>` at version 1.0.0 and logs the spec to `installs.log`.
#[cfg(unix)]
#[allow(dead_code)]
pub fn write_fake_npm(dir: &Path, archive: Option<&Path>) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let pack = match archive {
        Some(archive) => format!("cp '{}' .", archive.display()),
        None => ":".to_string(),
    };
    let script = format!(
        r#"#!/bin/sh
case "$1" in
  pack)
    {pack}
    ;;
  install)
    spec="$3"
    name="${{spec%@*}}"
    [ -z "$name" ] && name="$spec"
    echo "$spec" >> installs.log
    mkdir -p "node_modules/$name"
    printf '{{"name": "%s", "version": "1.0.0"}}' "$name" > "node_modules/$name/package.json"
    echo 'module.exports = {{}};' > "node_modules/$name/index.js"
    ;;
esac
"#
    );

    let path = dir.join("fake-npm");
    std::fs::write(&path, script).expect("Failed to write fake npm");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
        .expect("Failed to make fake npm executable");
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_creation() {
        let workspace = TestWorkspace::new("{}");
        assert!(workspace.path.exists());
        assert!(workspace.file_exists("package.json"));
    }

    #[test]
    fn test_install_package_layout() {
        let workspace = TestWorkspace::new("{}");
        workspace.install_package("left-pad", "1.3.0", &[("dep", "^1.0.0")]);
        assert!(workspace.file_exists("node_modules/left-pad/index.js"));
        assert!(
            workspace
                .read_file("node_modules/left-pad/package.json")
                .contains("1.3.0")
        );
    }
}
