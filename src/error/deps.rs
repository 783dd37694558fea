//! Dependency errors

use super::InstaforkError;

/// Installed version does not satisfy the module's required range
pub fn conflict(
    dependency: impl Into<String>,
    installed: impl Into<String>,
    required: impl Into<String>,
) -> InstaforkError {
    InstaforkError::DependencyConflict {
        dependency: dependency.into(),
        installed: installed.into(),
        required: required.into(),
    }
}

/// Dependency declared by the host but absent from `node_modules`
pub fn missing_installed_manifest(dependency: impl Into<String>) -> InstaforkError {
    InstaforkError::MissingInstalledManifest {
        dependency: dependency.into(),
    }
}

pub fn install_failed(dependency: impl Into<String>, reason: impl Into<String>) -> InstaforkError {
    InstaforkError::InstallFailed {
        dependency: dependency.into(),
        reason: reason.into(),
    }
}
