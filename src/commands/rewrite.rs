//! Rewrite command implementation
//!
//! Re-runs only the reference rewriting stage, e.g. after fixing a source file
//! that stopped a fork with `RewriteFailed`.

use std::path::PathBuf;

use console::style;

use crate::cli::RewriteArgs;
use crate::commands::helpers::resolve_workspace_path;
use crate::error::{Result, fs};
use crate::module::ModuleId;
use crate::rewrite;

pub fn run(workspace: Option<PathBuf>, verbose: bool, args: RewriteArgs) -> Result<()> {
    let root = resolve_workspace_path(workspace)?;
    let module = ModuleId::parse(&args.module)?;

    let entry = if args.entry_file.is_absolute() {
        args.entry_file
    } else {
        root.join(&args.entry_file)
    };
    if !entry.is_file() {
        return Err(fs::read_failed(&entry, "entry file does not exist"));
    }

    let report = rewrite::rewrite_references(&root, module.package_name(), &entry)?;

    if verbose {
        for (file, count) in &report.rewritten {
            println!("  {} ({})", crate::path_utils::to_forward_slashes(file), count);
        }
    }
    println!(
        "{} Rewrote {} reference(s) to {} in {} of {} file(s)",
        style("✓").green().bold(),
        report.total_replacements(),
        style(module.package_name()).cyan(),
        report.rewritten.len(),
        report.files_scanned
    );
    Ok(())
}
