//! File system errors

use std::path::Path;

use super::InstaforkError;

pub fn read_failed(path: &Path, reason: impl ToString) -> InstaforkError {
    InstaforkError::FileReadFailed {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

pub fn write_failed(path: &Path, reason: impl ToString) -> InstaforkError {
    InstaforkError::FileWriteFailed {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

pub fn copy_failed(path: &Path, reason: impl ToString) -> InstaforkError {
    InstaforkError::CopyFailed {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

pub fn cleanup_failed(path: &Path, reason: impl ToString) -> InstaforkError {
    InstaforkError::CleanupFailed {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}
