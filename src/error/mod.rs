//! Error types and handling for instafork
//!
//! Uses `thiserror` for error definitions and `miette` for diagnostic codes and help text.
//!
//! Constructor helpers live in sub-modules by error domain:
//! - [`fetch`]: registry fetch and archive extraction errors
//! - [`deps`]: dependency resolution errors
//! - [`fs`]: file system errors

pub mod deps;
pub mod fetch;
pub mod fs;

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for instafork operations
#[derive(Error, Diagnostic, Debug)]
pub enum InstaforkError {
    // Module errors
    #[error("Invalid module identifier '{input}': {reason}")]
    #[diagnostic(
        code(instafork::module::invalid_id),
        help("Use a package name such as lodash, express@4.17.1 or @scope/name")
    )]
    InvalidModuleId { input: String, reason: String },

    #[error("Destination already exists: {path}")]
    #[diagnostic(
        code(instafork::module::destination_exists),
        help("Remove the directory or pass --force to replace it")
    )]
    DestinationExists { path: String },

    #[error("Module manifest not found: {path}")]
    #[diagnostic(code(instafork::module::manifest_not_found))]
    ManifestNotFound { path: String },

    #[error("Failed to parse manifest {path}: {reason}")]
    #[diagnostic(code(instafork::module::manifest_parse_failed))]
    ManifestParseFailed { path: String, reason: String },

    // Fetch errors
    #[error("Expected exactly one archive matching '{pattern}', found {found}{candidates}")]
    #[diagnostic(
        code(instafork::fetch::ambiguous_archive),
        help("Remove stale archives from the project root and rerun")
    )]
    AmbiguousArchive {
        pattern: String,
        found: usize,
        candidates: String,
    },

    #[error("Failed to fetch '{module}' from registry: {reason}")]
    #[diagnostic(
        code(instafork::fetch::fetch_failed),
        help("Check that the module exists and that npm can reach the registry")
    )]
    FetchFailed { module: String, reason: String },

    #[error("Failed to extract archive {archive}: {reason}")]
    #[diagnostic(code(instafork::fetch::extract_failed))]
    ExtractFailed { archive: String, reason: String },

    // Dependency errors
    #[error(
        "Installed {dependency}@{installed} version conflicts with the required version {required}"
    )]
    #[diagnostic(
        code(instafork::deps::conflict),
        help("Align the installed version with the module's requirement, then rerun")
    )]
    DependencyConflict {
        dependency: String,
        installed: String,
        required: String,
    },

    #[error("Dependency '{dependency}' is declared but not installed")]
    #[diagnostic(
        code(instafork::deps::missing_installed_manifest),
        help("Install all dependencies in your current project before running instafork")
    )]
    MissingInstalledManifest { dependency: String },

    #[error("Failed to install {dependency}: {reason}")]
    #[diagnostic(code(instafork::deps::install_failed))]
    InstallFailed { dependency: String, reason: String },

    // Copy and rewrite errors
    #[error("Failed to copy module files to {path}: {reason}")]
    #[diagnostic(code(instafork::copy::failed))]
    CopyFailed { path: String, reason: String },

    #[error("Failed to rewrite references in {file}: {reason}")]
    #[diagnostic(
        code(instafork::rewrite::failed),
        help(
            "The module files were copied but no references were rewritten. \
             Fix the file and run 'instafork rewrite <MODULE> <ENTRY_FILE>'"
        )
    )]
    RewriteFailed { file: String, reason: String },

    #[error("Failed to clean up {path}: {reason}")]
    #[diagnostic(code(instafork::cleanup::failed), severity(Warning))]
    CleanupFailed { path: String, reason: String },

    #[error("Unknown shell: {shell}")]
    #[diagnostic(code(instafork::cli::unsupported_shell), help("Supported shells: {supported}"))]
    UnsupportedShell { shell: String, supported: String },

    // File system errors
    #[error("Failed to read file: {path}: {reason}")]
    #[diagnostic(code(instafork::fs::read_failed))]
    FileReadFailed { path: String, reason: String },

    #[error("Failed to write file: {path}: {reason}")]
    #[diagnostic(code(instafork::fs::write_failed))]
    FileWriteFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(instafork::fs::io_error))]
    IoError { message: String },
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, InstaforkError>;

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test_error_contains {
        ($test_name:ident, $err:expr, $($contains:expr),+ $(,)?) => {
            #[test]
            fn $test_name() {
                let err = $err;
                let error_string = err.to_string();
                $(
                    assert!(error_string.contains($contains),
                        "Error message should contain '{}', got: {}",
                        $contains,
                        error_string
                    );
                )+
            }
        };
    }

    #[test]
    fn test_conflict_display() {
        let err = deps::conflict("libexpress", "1.0.0", "^2.0.0");
        assert_eq!(
            err.to_string(),
            "Installed libexpress@1.0.0 version conflicts with the required version ^2.0.0"
        );
    }

    #[test]
    fn test_error_code() {
        let err = deps::missing_installed_manifest("left-pad");
        assert_eq!(
            err.code().map(|c| c.to_string()),
            Some("instafork::deps::missing_installed_manifest".to_string())
        );
    }

    #[test]
    fn test_cleanup_is_warning() {
        let err = InstaforkError::CleanupFailed {
            path: "/tmp/x".to_string(),
            reason: "busy".to_string(),
        };
        assert_eq!(err.severity(), Some(miette::Severity::Warning));
    }

    test_error_contains!(
        test_ambiguous_archive_error,
        fetch::ambiguous_archive("lodash*.tgz", &[]),
        "exactly one archive",
        "lodash*.tgz",
        "found 0"
    );

    test_error_contains!(
        test_rewrite_failed_error,
        InstaforkError::RewriteFailed {
            file: "src/app.js".to_string(),
            reason: "unterminated string".to_string(),
        },
        "src/app.js",
        "unterminated string"
    );

    test_error_contains!(
        test_missing_installed_manifest_error,
        deps::missing_installed_manifest("left-pad"),
        "left-pad",
        "not installed"
    );

    #[test]
    fn test_rewrite_failed_has_help() {
        let err = InstaforkError::RewriteFailed {
            file: "a.js".to_string(),
            reason: "x".to_string(),
        };
        let help = err.help().map(|h| h.to_string()).unwrap_or_default();
        assert!(help.contains("instafork rewrite"));
    }
}
