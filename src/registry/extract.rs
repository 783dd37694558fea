//! Gzipped tarball extraction (pure Rust: flate2 + tar)

use std::fs::File;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use tar::Archive;

use crate::error::{Result, fetch};

/// Unpack `archive` into `dest` and return the single top-level directory it created.
///
/// npm archives wrap everything in `package/`, but the directory name is not relied on.
pub fn extract_archive(archive: &Path, dest: &Path) -> Result<PathBuf> {
    let file = File::open(archive).map_err(|e| fetch::extract_failed(archive, e))?;
    let mut tarball = Archive::new(GzDecoder::new(file));
    tarball.set_preserve_permissions(false);
    tarball
        .unpack(dest)
        .map_err(|e| fetch::extract_failed(archive, e))?;

    top_level_dir(archive, dest)
}

fn top_level_dir(archive: &Path, dest: &Path) -> Result<PathBuf> {
    let entries = std::fs::read_dir(dest).map_err(|e| fetch::extract_failed(archive, e))?;
    let mut dirs: Vec<PathBuf> = entries
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .map(|entry| entry.path())
        .collect();

    match dirs.len() {
        1 => Ok(dirs.remove(0)),
        0 => Err(fetch::extract_failed(
            archive,
            "archive contains no top-level directory",
        )),
        n => Err(fetch::extract_failed(
            archive,
            format!("archive contains {n} top-level directories, expected one"),
        )),
    }
}
