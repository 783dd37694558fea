//! Dependency conflict resolution
//!
//! Compares the dependencies a module declares against what the host project has
//! actually installed. The whole check runs before anything is installed:
//!
//! 1. Dependencies the host does not declare are planned for installation.
//! 2. Declared dependencies must be present in `node_modules`; a declared but
//!    uninstalled dependency is a hard error.
//! 3. An installed version outside the module's range is a conflict. The first
//!    conflict found stops resolution and nothing is installed.
//!
//! Only when every shared dependency is satisfied are the planned installs run.

pub mod range;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{Result, deps};
use crate::locator;
use crate::module::ModuleManifest;
use crate::module::manifest::MANIFEST_FILE;

pub use range::satisfies;

/// Installs packages into the host's dependency cache
pub trait PackageInstaller {
    /// Install `name` at `range` (empty range means any version) from `cwd`
    fn install(&self, name: &str, range: &str, cwd: &Path) -> Result<()>;
}

/// Snapshot of the host project's dependencies, taken once per run
#[derive(Debug, Clone)]
pub struct HostDependencies {
    root: PathBuf,
    declared: BTreeMap<String, String>,
}

impl HostDependencies {
    /// Read the nearest `package.json` at or above `root`. A project without one
    /// declares no dependencies.
    pub fn snapshot(root: &Path) -> Result<Self> {
        let declared = match find_host_manifest(root) {
            Some(path) => ModuleManifest::load_file(&path)?.dependencies,
            None => BTreeMap::new(),
        };

        Ok(Self {
            root: root.to_path_buf(),
            declared,
        })
    }

    pub fn declares(&self, name: &str) -> bool {
        self.declared.contains_key(name)
    }

    /// Version recorded in `node_modules/<name>/package.json`, if installed
    pub fn installed_version(&self, name: &str) -> Result<Option<String>> {
        let Some(path) = locator::find_installed_manifest(&self.root, name) else {
            return Ok(None);
        };
        let manifest = ModuleManifest::load_file(&path)?;
        Ok(Some(manifest.version.unwrap_or_default()))
    }
}

fn find_host_manifest(root: &Path) -> Option<PathBuf> {
    root.ancestors()
        .map(|dir| dir.join(MANIFEST_FILE))
        .find(|candidate| candidate.is_file())
}

/// What resolution decided for each module dependency
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionPlan {
    /// Dependencies missing from the host: (name, range)
    pub to_install: Vec<(String, String)>,
    /// Dependencies already installed at a satisfying version: (name, version)
    pub satisfied: Vec<(String, String)>,
}

/// Outcome of a completed resolution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionReport {
    pub installed: Vec<String>,
    pub satisfied: Vec<String>,
}

/// Check every module dependency against the host without side effects.
///
/// Returns the first conflict or missing installation as an error.
pub fn plan(manifest: &ModuleManifest, host: &HostDependencies) -> Result<ResolutionPlan> {
    let mut plan = ResolutionPlan::default();

    for (name, required) in &manifest.dependencies {
        if !host.declares(name) {
            plan.to_install.push((name.clone(), required.clone()));
            continue;
        }

        let installed = host
            .installed_version(name)?
            .ok_or_else(|| deps::missing_installed_manifest(name))?;

        if !satisfies(&installed, required) {
            return Err(deps::conflict(name, installed, required));
        }
        plan.satisfied.push((name.clone(), installed));
    }

    Ok(plan)
}

/// Resolve the module's dependencies, installing the missing ones.
///
/// Completes exactly once: with a report when everything is satisfied (including a
/// module with no dependencies), or with the first error encountered. Installs run
/// one at a time and stop at the first failure.
pub fn resolve(
    manifest: &ModuleManifest,
    host: &HostDependencies,
    installer: &dyn PackageInstaller,
) -> Result<ResolutionReport> {
    let plan = plan(manifest, host)?;

    let mut report = ResolutionReport {
        installed: Vec::with_capacity(plan.to_install.len()),
        satisfied: plan.satisfied.into_iter().map(|(name, _)| name).collect(),
    };

    for (name, range) in &plan.to_install {
        installer.install(name, range, &host.root)?;
        report.installed.push(name.clone());
    }

    Ok(report)
}
