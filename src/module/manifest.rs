//! Typed view of a module's `package.json`

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{InstaforkError, Result, fs};

/// Manifest file name inside every module directory
pub const MANIFEST_FILE: &str = "package.json";

/// Entry file used when the manifest declares no `main`
pub const DEFAULT_ENTRY: &str = "index.js";

/// Parsed module metadata. Read once, never mutated.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModuleManifest {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub version: Option<String>,

    /// Dependency name -> version range
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,

    #[serde(default)]
    pub main: Option<String>,
}

impl ModuleManifest {
    /// Parse manifest JSON
    pub fn from_json(content: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Load `package.json` from a module directory
    pub fn load(module_dir: &Path) -> Result<Self> {
        Self::load_file(&module_dir.join(MANIFEST_FILE))
    }

    /// Load a manifest from an explicit file path
    pub fn load_file(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(InstaforkError::ManifestNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| fs::read_failed(path, e))?;
        Self::from_json(&content).map_err(|e| InstaforkError::ManifestParseFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Declared entry file, or `index.js` when absent or blank
    pub fn entry_file(&self) -> &str {
        match self.main.as_deref().map(str::trim) {
            Some(main) if !main.is_empty() => main,
            _ => DEFAULT_ENTRY,
        }
    }

    /// Absolute path of the entry file once the module lives in `module_dir`
    pub fn entry_path(&self, module_dir: &Path) -> PathBuf {
        crate::path_utils::normalize_lexically(&module_dir.join(self.entry_file()))
    }
}
