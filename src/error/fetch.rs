//! Registry fetch and archive extraction errors

use std::path::{Path, PathBuf};

use super::InstaforkError;

pub fn fetch_failed(module: impl Into<String>, reason: impl Into<String>) -> InstaforkError {
    InstaforkError::FetchFailed {
        module: module.into(),
        reason: reason.into(),
    }
}

pub fn extract_failed(archive: &Path, reason: impl ToString) -> InstaforkError {
    InstaforkError::ExtractFailed {
        archive: archive.display().to_string(),
        reason: reason.to_string(),
    }
}

/// Zero or several archives matched where exactly one was expected
pub fn ambiguous_archive(pattern: impl Into<String>, matches: &[PathBuf]) -> InstaforkError {
    let candidates = if matches.is_empty() {
        String::new()
    } else {
        let names: Vec<String> = matches
            .iter()
            .map(|p| {
                p.file_name()
                    .map_or_else(|| p.display().to_string(), |n| n.to_string_lossy().into_owned())
            })
            .collect();
        format!(": {}", names.join(", "))
    };

    InstaforkError::AmbiguousArchive {
        pattern: pattern.into(),
        found: matches.len(),
        candidates,
    }
}
