//! Per-run scratch workspace

use std::path::PathBuf;

use console::style;
use tempfile::TempDir;

use crate::error::{InstaforkError, Result, fs as fs_error};
use crate::temp;

/// Temporary resources owned by one vendoring run.
///
/// Holds the scratch directory (staged or extracted module files) and, for
/// registry fetches, the archives downloaded into the project root.
#[derive(Debug, Default)]
pub struct ScratchWorkspace {
    dir: Option<TempDir>,
    archives: Vec<PathBuf>,
}

impl ScratchWorkspace {
    /// Create the scratch directory, or return it if already created
    pub fn dir(&mut self) -> Result<PathBuf> {
        if let Some(dir) = &self.dir {
            return Ok(dir.path().to_path_buf());
        }

        let dir = temp::scratch_dir()
            .map_err(|e| fs_error::write_failed(&temp::temp_dir_base(), e))?;
        let path = dir.path().to_path_buf();
        self.dir = Some(dir);
        Ok(path)
    }

    /// Take ownership of a downloaded archive so cleanup removes it
    pub fn adopt_archive(&mut self, archive: PathBuf) {
        if !self.archives.contains(&archive) {
            self.archives.push(archive);
        }
    }

    /// Remove the scratch directory, then the archives.
    ///
    /// Failures are printed as warnings and returned; they never replace the
    /// run's own outcome. Safe to call more than once.
    pub fn cleanup(&mut self) -> Vec<InstaforkError> {
        let mut warnings = Vec::new();

        if let Some(dir) = self.dir.take() {
            let path = dir.path().to_path_buf();
            if let Err(e) = dir.close() {
                warnings.push(fs_error::cleanup_failed(&path, e));
            }
        }

        for archive in std::mem::take(&mut self.archives) {
            if archive.exists() {
                if let Err(e) = std::fs::remove_file(&archive) {
                    warnings.push(fs_error::cleanup_failed(&archive, e));
                }
            }
        }

        for warning in &warnings {
            eprintln!("{} {}", style("Warning:").yellow().bold(), warning);
        }
        warnings
    }
}
