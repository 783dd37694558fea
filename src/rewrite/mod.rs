//! Source reference rewriter
//!
//! Points every reference to the old module identifier in the host project at
//! the vendored copy's entry file. Files are tokenized by [`lexer::Lexer`] and a
//! string literal is only replaced when it sits in a module-reference position:
//!
//! - `import x from '<id>'` and `export ... from '<id>'`
//! - side-effect `import '<id>'`
//! - `require('<id>')`
//! - dynamic `import('<id>')`
//!
//! Every file is planned before any is written, so a failure leaves the tree untouched.

pub mod lexer;

use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};
use wax::{CandidatePath, Glob, Pattern};

use crate::error::{InstaforkError, Result};
use crate::locator::NODE_MODULES;
use crate::path_utils;

use lexer::{Lexer, Token, quote_literal};

/// Source files considered for rewriting
pub const SOURCE_GLOB: &str = "**/*.{js,jsx,mjs,cjs,ts,tsx,mts,cts}";

/// Version control metadata directories, never part of the source tree
const VCS_DIRS: &[&str] = &[".git", ".hg", ".svn"];

/// A file whose new content has been computed but not yet written
#[derive(Debug, Clone)]
pub struct PlannedRewrite {
    pub path: PathBuf,
    pub replacements: usize,
    content: String,
}

/// Outcome of a rewrite pass
#[derive(Debug, Clone, Default)]
pub struct RewriteReport {
    pub files_scanned: usize,
    /// Rewritten files (relative to the project root) with their replacement counts
    pub rewritten: Vec<(PathBuf, usize)>,
}

impl RewriteReport {
    pub fn total_replacements(&self) -> usize {
        self.rewritten.iter().map(|(_, count)| count).sum()
    }
}

/// Rewrite references to `old_id` under `root` so they resolve to `entry_path`.
pub fn rewrite_references(root: &Path, old_id: &str, entry_path: &Path) -> Result<RewriteReport> {
    let (root, planned, files_scanned) = plan_rewrites(root, old_id, entry_path)?;

    let mut report = RewriteReport {
        files_scanned,
        rewritten: Vec::with_capacity(planned.len()),
    };
    for plan in planned {
        std::fs::write(&plan.path, &plan.content)
            .map_err(|e| rewrite_failed(&root, &plan.path, e))?;
        report
            .rewritten
            .push((relative_to(&root, &plan.path), plan.replacements));
    }
    Ok(report)
}

/// Compute the new content of every affected file without writing anything.
///
/// Returns the normalized root, the planned rewrites and the number of files scanned.
pub fn plan_rewrites(
    root: &Path,
    old_id: &str,
    entry_path: &Path,
) -> Result<(PathBuf, Vec<PlannedRewrite>, usize)> {
    let normalized_root = path_utils::normalize(root);
    let entry_path = match entry_path.strip_prefix(root) {
        Ok(relative) => path_utils::normalize_lexically(&normalized_root.join(relative)),
        Err(_) => path_utils::normalize(entry_path),
    };

    let files = collect_source_files(&normalized_root)?;
    let mut planned = Vec::new();

    for file in &files {
        let source = std::fs::read_to_string(file)
            .map_err(|e| rewrite_failed(&normalized_root, file, e))?;
        let dir = file.parent().unwrap_or(&normalized_root);
        let replacement = path_utils::module_reference(dir, &entry_path);

        let rewritten = rewrite_source(&source, allows_jsx(file), old_id, &replacement)
            .map_err(|e| rewrite_failed(&normalized_root, file, e))?;
        if let Some((content, replacements)) = rewritten {
            planned.push(PlannedRewrite {
                path: file.clone(),
                replacements,
                content,
            });
        }
    }

    Ok((normalized_root, planned, files.len()))
}

/// Rewrite module references in one source text.
///
/// Returns `None` when nothing matched, so unaffected files stay byte-identical.
pub fn rewrite_source(
    source: &str,
    jsx: bool,
    old_id: &str,
    replacement: &str,
) -> std::result::Result<Option<(String, usize)>, lexer::LexError> {
    let tokens = Lexer::new(source, jsx).tokenize()?;

    let mut edits: Vec<(usize, usize, String)> = tokens
        .iter()
        .enumerate()
        .filter(|(i, token)| {
            token.string_value().as_deref() == Some(old_id) && is_reference_position(&tokens, *i)
        })
        .filter_map(|(_, token)| {
            let quote = token.quote()?;
            Some((token.start, token.end, quote_literal(replacement, quote)))
        })
        .collect();

    if edits.is_empty() {
        return Ok(None);
    }
    edits.sort_by_key(|(start, _, _)| *start);

    let mut output = String::with_capacity(source.len());
    let mut cursor = 0;
    for (start, end, literal) in &edits {
        output.push_str(&source[cursor..*start]);
        output.push_str(literal);
        cursor = *end;
    }
    output.push_str(&source[cursor..]);

    Ok(Some((output, edits.len())))
}

/// Whether the string literal at `index` is a module specifier
fn is_reference_position(tokens: &[Token<'_>], index: usize) -> bool {
    let before = |n: usize| index.checked_sub(n).and_then(|i| tokens.get(i));
    let after = tokens.get(index + 1);
    let not_member = |n: usize| !before(n).is_some_and(|t| t.is_punct("."));

    let Some(prev) = before(1) else {
        return false;
    };

    // import x from 'id' / export { y } from 'id'
    if prev.is_ident("from") {
        return true;
    }

    // import 'id'
    if prev.is_ident("import") && not_member(2) {
        return true;
    }

    // require('id') / import('id')
    if prev.is_punct("(") {
        let closes = after.is_some_and(|t| t.is_punct(")") || t.is_punct(","));
        return closes
            && before(2).is_some_and(|t| t.is_ident("require") || t.is_ident("import"))
            && not_member(3);
    }

    false
}

/// Walk `root` for source files, skipping the dependency cache and VCS metadata
fn collect_source_files(root: &Path) -> Result<Vec<PathBuf>> {
    let glob = Glob::new(SOURCE_GLOB).map_err(|e| InstaforkError::RewriteFailed {
        file: SOURCE_GLOB.to_string(),
        reason: e.to_string(),
    })?;

    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_skipped_dir(e))
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            let relative = path_utils::to_forward_slashes(&relative_to(root, e.path()));
            glob.matched(&CandidatePath::from(relative.as_str())).is_some()
        })
        .map(DirEntry::into_path)
        .collect();

    files.sort();
    Ok(files)
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name == NODE_MODULES || VCS_DIRS.contains(&&*name)
}

/// JSX is only lexed outside plain TypeScript, where `<T>x` is a type assertion
fn allows_jsx(path: &Path) -> bool {
    path.extension()
        .is_none_or(|ext| !matches!(ext.to_str(), Some("ts" | "mts" | "cts")))
}

fn relative_to(root: &Path, path: &Path) -> PathBuf {
    path.strip_prefix(root).unwrap_or(path).to_path_buf()
}

fn rewrite_failed(root: &Path, file: &Path, reason: impl ToString) -> InstaforkError {
    InstaforkError::RewriteFailed {
        file: path_utils::to_forward_slashes(&relative_to(root, file)),
        reason: reason.to_string(),
    }
}
