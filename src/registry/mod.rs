//! Registry fetch and archive extraction
//!
//! The fetch itself is delegated to a [`RegistryFetcher`] (normally `npm pack`),
//! which drops a `.tgz` into the project root. This module finds that archive
//! and unpacks it into the run's scratch directory.

pub mod extract;

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use wax::{CandidatePath, Glob, Pattern};

use crate::error::{Result, fetch, fs};
use crate::module::ModuleId;

pub use extract::extract_archive;

/// Extension of registry archives
pub const ARCHIVE_EXT: &str = "tgz";

/// Downloads a module archive into a directory
pub trait RegistryFetcher {
    /// Fetch `id` so that an archive named `<sanitized-id>*.tgz` appears in `cwd`
    fn fetch(&self, id: &ModuleId, cwd: &Path) -> Result<()>;
}

/// Archives for one module found in a directory, with their modification times
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ArchiveSnapshot(Vec<(PathBuf, Option<SystemTime>)>);

impl ArchiveSnapshot {
    /// Record the archives for `id` currently in `dir`
    pub fn take(id: &ModuleId, dir: &Path) -> Result<Self> {
        let entries = matching_archives(id, dir)?
            .into_iter()
            .map(|path| {
                let modified = std::fs::metadata(&path).and_then(|m| m.modified()).ok();
                (path, modified)
            })
            .collect();
        Ok(Self(entries))
    }

    /// Archives in `dir` that are new or modified since this snapshot
    pub fn fetched_since(&self, id: &ModuleId, dir: &Path) -> Result<Vec<PathBuf>> {
        let now = Self::take(id, dir)?;
        Ok(now
            .0
            .into_iter()
            .filter(|entry| !self.0.contains(entry))
            .map(|(path, _)| path)
            .collect())
    }
}

/// File-name prefix of the archive `npm pack` writes for `id`.
///
/// npm names the tarball after the resolved version, so only an exact version
/// is part of the prefix. Ranges and dist-tags match any version.
fn archive_prefix(id: &ModuleId) -> String {
    match id.version() {
        Some(version) if semver::Version::parse(version).is_ok() => id.sanitized(),
        _ => id.dir_name(),
    }
}

/// Glob pattern an archive for `id` must match
pub fn archive_pattern(id: &ModuleId) -> String {
    format!("{}*.{}", archive_prefix(id), ARCHIVE_EXT)
}

/// Find the single archive for `id` in `dir`.
///
/// Zero or several matches is an error; nothing is guessed.
pub fn find_archive(id: &ModuleId, dir: &Path) -> Result<PathBuf> {
    let mut matches = matching_archives(id, dir)?;
    match matches.len() {
        1 => Ok(matches.remove(0)),
        _ => Err(fetch::ambiguous_archive(archive_pattern(id), &matches)),
    }
}

/// Every file in `dir` matching [`archive_pattern`], sorted
fn matching_archives(id: &ModuleId, dir: &Path) -> Result<Vec<PathBuf>> {
    let prefix = archive_prefix(id);
    let glob_text = format!("{}*.{}", escape_glob_literal(&prefix), ARCHIVE_EXT);
    let glob = Glob::new(&glob_text).ok();

    let entries = std::fs::read_dir(dir).map_err(|e| fs::read_failed(dir, e))?;
    let mut matches: Vec<PathBuf> = entries
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter(|entry| {
            let name = entry.file_name().to_string_lossy().into_owned();
            match &glob {
                Some(glob) => glob.matched(&CandidatePath::from(name.as_str())).is_some(),
                // Fall back to a literal prefix/suffix check when the name cannot be
                // expressed as a glob
                None => name.starts_with(&prefix) && name.ends_with(&format!(".{ARCHIVE_EXT}")),
            }
        })
        .map(|entry| entry.path())
        .collect();

    matches.sort();
    Ok(matches)
}

/// Escape wax metacharacters so `text` matches literally
fn escape_glob_literal(text: &str) -> String {
    const META: &[char] = &[
        '?', '*', '$', ':', '<', '>', '(', ')', '[', ']', '{', '}', ',', '!', '#', '\\',
    ];
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if META.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InstaforkError;
    use crate::test_fixtures::{create_temp_dir, write_file};

    #[test]
    fn test_find_single_archive() {
        let temp = create_temp_dir();
        write_file(temp.path(), "left-pad-1.3.0.tgz", "");
        write_file(temp.path(), "other-2.0.0.tgz", "");

        let id = ModuleId::parse("left-pad").unwrap();
        let archive = find_archive(&id, temp.path()).unwrap();
        assert_eq!(archive, temp.path().join("left-pad-1.3.0.tgz"));
    }

    #[test]
    fn test_find_scoped_archive() {
        let temp = create_temp_dir();
        write_file(temp.path(), "uber-react-anchor-2.0.0.tgz", "");

        let id = ModuleId::parse("@uber/react-anchor").unwrap();
        assert!(find_archive(&id, temp.path()).is_ok());
    }

    #[test]
    fn test_zero_archives_is_ambiguous() {
        let temp = create_temp_dir();
        let id = ModuleId::parse("left-pad").unwrap();

        match find_archive(&id, temp.path()) {
            Err(InstaforkError::AmbiguousArchive { found, pattern, .. }) => {
                assert_eq!(found, 0);
                assert_eq!(pattern, "left-pad*.tgz");
            }
            other => panic!("expected AmbiguousArchive, got {:?}", other),
        }
    }

    #[test]
    fn test_multiple_archives_is_ambiguous() {
        let temp = create_temp_dir();
        write_file(temp.path(), "left-pad-1.3.0.tgz", "");
        write_file(temp.path(), "left-pad-1.2.0.tgz", "");

        let id = ModuleId::parse("left-pad").unwrap();
        let err = find_archive(&id, temp.path()).unwrap_err();
        assert!(matches!(err, InstaforkError::AmbiguousArchive { found: 2, .. }));
        assert!(err.to_string().contains("left-pad-1.2.0.tgz"));
    }

    #[test]
    fn test_directories_are_ignored() {
        let temp = create_temp_dir();
        std::fs::create_dir(temp.path().join("left-pad-dir.tgz")).unwrap();
        write_file(temp.path(), "left-pad-1.3.0.tgz", "");

        let id = ModuleId::parse("left-pad").unwrap();
        assert!(find_archive(&id, temp.path()).is_ok());
    }

    #[test]
    fn test_range_and_tag_match_any_version() {
        let temp = create_temp_dir();
        write_file(temp.path(), "express-4.18.2.tgz", "");

        for input in ["express@^4", "express@latest", "express@4.x"] {
            let id = ModuleId::parse(input).unwrap();
            assert_eq!(archive_pattern(&id), "express*.tgz");
            assert_eq!(
                find_archive(&id, temp.path()).unwrap(),
                temp.path().join("express-4.18.2.tgz")
            );
        }

        let exact = ModuleId::parse("express@4.18.2").unwrap();
        assert_eq!(archive_pattern(&exact), "express-4.18.2*.tgz");
        assert!(find_archive(&exact, temp.path()).is_ok());
    }

    #[test]
    fn test_snapshot_reports_only_new_archives() {
        let temp = create_temp_dir();
        write_file(temp.path(), "m-1.0.0.tgz", "");
        let id = ModuleId::parse("m").unwrap();

        let before = ArchiveSnapshot::take(&id, temp.path()).unwrap();
        write_file(temp.path(), "m-2.0.0.tgz", "");

        assert_eq!(
            before.fetched_since(&id, temp.path()).unwrap(),
            vec![temp.path().join("m-2.0.0.tgz")]
        );
    }

    #[test]
    fn test_escape_glob_literal() {
        assert_eq!(escape_glob_literal("a-b.c"), "a-b.c");
        assert_eq!(escape_glob_literal("m-^1.x*"), "m-^1.x\\*");
    }
}
