//! Module tree copying with unified error handling

use std::fs;
use std::path::Path;

use crate::error::{Result, fs as fs_error};
use crate::locator::NODE_MODULES;

#[derive(Default, Clone)]
pub struct CopyOptions {
    /// Entry names skipped at every level
    pub exclude: Vec<String>,
    /// Remove an existing destination before copying
    pub replace: bool,
}

impl CopyOptions {
    /// Options for vendoring a module: its own dependency cache and VCS metadata stay behind
    pub fn vendored_module(replace: bool) -> Self {
        Self {
            exclude: vec![NODE_MODULES.to_string(), ".git".to_string()],
            replace,
        }
    }
}

/// Copy the module tree at `src` to `dst`, returning the number of files copied.
///
/// Any failure is reported as `CopyFailed` for the destination.
pub fn copy_module_tree(src: &Path, dst: &Path, options: &CopyOptions) -> Result<usize> {
    if options.replace && dst.exists() {
        fs::remove_dir_all(dst).map_err(|e| fs_error::copy_failed(dst, e))?;
    }

    copy_dir_recursive(src, dst, options).map_err(|e| fs_error::copy_failed(dst, e))
}

fn copy_dir_recursive(src: &Path, dst: &Path, options: &CopyOptions) -> std::io::Result<usize> {
    if !dst.exists() {
        fs::create_dir_all(dst)?;
    }

    let mut copied = 0;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let entry_path = entry.path();
        let file_name = entry.file_name();

        if options
            .exclude
            .iter()
            .any(|excluded| file_name.to_str() == Some(excluded.as_str()))
        {
            continue;
        }

        let dst_path = dst.join(&file_name);

        if entry_path.is_dir() {
            copied += copy_dir_recursive(&entry_path, &dst_path, options)?;
        } else {
            fs::copy(&entry_path, &dst_path)?;
            copied += 1;
        }
    }

    Ok(copied)
}
