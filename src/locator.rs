//! Module locator
//!
//! Decides whether a module is already resolvable from the host's `node_modules`
//! and computes where the vendored copy will live. No side effects.

use std::path::{Path, PathBuf};

use crate::module::ModuleId;
use crate::module::manifest::{DEFAULT_ENTRY, MANIFEST_FILE, ModuleManifest};

/// Dependency cache directory name
pub const NODE_MODULES: &str = "node_modules";

/// Conventional source directory; vendored modules go inside it when present
pub const SOURCE_DIR: &str = "src";

/// Where the module's source will come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// Already installed at this directory
    Local(PathBuf),
    /// Must be fetched from the registry
    Remote,
}

/// Result of locating a module
#[derive(Debug, Clone)]
pub struct Location {
    pub origin: Origin,
    pub destination: PathBuf,
}

/// Locate `id` relative to the project root
pub fn locate(id: &ModuleId, root: &Path) -> Location {
    let origin = match resolve_module_dir(root, id.package_name()) {
        Some(dir) => Origin::Local(dir),
        None => Origin::Remote,
    };

    Location {
        origin,
        destination: destination_path(id, root),
    }
}

/// `<root>/src/<name>` when `<root>/src` is a directory, else `<root>/<name>`
pub fn destination_path(id: &ModuleId, root: &Path) -> PathBuf {
    let source_dir = root.join(SOURCE_DIR);
    if source_dir.is_dir() {
        source_dir.join(id.dir_name())
    } else {
        root.join(id.dir_name())
    }
}

/// Node-style lookup of `package_name` in `node_modules` directories from `start` upward.
///
/// A candidate directory resolves when its entry file (declared `main` or `index.js`)
/// exists, following Node's extension and directory-index fallbacks.
pub fn resolve_module_dir(start: &Path, package_name: &str) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(NODE_MODULES).join(package_name))
        .find(|candidate| candidate.is_dir() && has_resolvable_entry(candidate))
}

/// Find `node_modules/<package_name>/package.json` from `start` upward
pub fn find_installed_manifest(start: &Path, package_name: &str) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(NODE_MODULES).join(package_name).join(MANIFEST_FILE))
        .find(|candidate| candidate.is_file())
}

fn has_resolvable_entry(module_dir: &Path) -> bool {
    let entry = ModuleManifest::load(module_dir)
        .map(|m| m.entry_file().to_string())
        .unwrap_or_else(|_| DEFAULT_ENTRY.to_string());

    let entry_path = module_dir.join(&entry);
    entry_path.is_file()
        || entry_path.with_extension("js").is_file()
        || entry_path.join(DEFAULT_ENTRY).is_file()
        || module_dir.join(DEFAULT_ENTRY).is_file()
}
