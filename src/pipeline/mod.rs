//! Vendoring pipeline
//!
//! Sequences the stages of a fork:
//!
//! ```text
//! Located -> Fetching | LocalCopying -> DependenciesResolving
//!         -> FilesCopying -> ReferencesRewriting -> Done
//! ```
//!
//! Any stage may end the run in `Failed`. Whatever the outcome, the scratch
//! workspace is cleaned up before [`run`] returns.

pub mod scratch;

use std::fmt;
use std::path::{Path, PathBuf};

use console::style;

use crate::common::fs::{CopyOptions, copy_module_tree};
use crate::deps::{self, HostDependencies, PackageInstaller};
use crate::error::{InstaforkError, Result};
use crate::locator::{self, Origin};
use crate::module::{ModuleId, ModuleManifest};
use crate::registry::{self, ArchiveSnapshot, RegistryFetcher};
use crate::rewrite::{self, RewriteReport};

use scratch::ScratchWorkspace;

/// User-selected behavior for one run
#[derive(Debug, Clone, Default)]
pub struct ForkOptions {
    /// Replace an existing destination directory
    pub force: bool,
    /// Check everything, change nothing in the project
    pub dry_run: bool,
    pub verbose: bool,
}

/// Everything one run needs, passed explicitly to each stage
#[derive(Debug, Clone)]
pub struct ForkContext {
    pub root: PathBuf,
    pub module: ModuleId,
    pub options: ForkOptions,
}

impl ForkContext {
    pub fn new(root: impl Into<PathBuf>, module: ModuleId, options: ForkOptions) -> Self {
        Self {
            root: root.into(),
            module,
            options,
        }
    }
}

/// Pipeline states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForkState {
    Located,
    Fetching,
    LocalCopying,
    DependenciesResolving,
    FilesCopying,
    ReferencesRewriting,
    Done,
    Failed,
}

impl fmt::Display for ForkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ForkState::Located => "located",
            ForkState::Fetching => "fetching",
            ForkState::LocalCopying => "local-copying",
            ForkState::DependenciesResolving => "dependencies-resolving",
            ForkState::FilesCopying => "files-copying",
            ForkState::ReferencesRewriting => "references-rewriting",
            ForkState::Done => "done",
            ForkState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Summary of a successful run
#[derive(Debug, Default)]
pub struct ForkReport {
    pub destination: PathBuf,
    /// Manifest version of the vendored module, if declared
    pub version: Option<String>,
    pub states: Vec<ForkState>,
    /// Dependencies installed, or planned for installation on a dry run
    pub installed: Vec<String>,
    pub satisfied: Vec<String>,
    pub files_copied: usize,
    pub rewrite: RewriteReport,
    pub warnings: Vec<InstaforkError>,
}

/// Run the pipeline for `ctx`, using the given collaborators for the registry
/// fetch and dependency installs.
pub fn run(
    ctx: &ForkContext,
    fetcher: &dyn RegistryFetcher,
    installer: &dyn PackageInstaller,
) -> Result<ForkReport> {
    let mut run = Run {
        ctx,
        scratch: ScratchWorkspace::default(),
        report: ForkReport::default(),
    };

    let result = run.execute(fetcher, installer);
    let warnings = run.scratch.cleanup();

    match result {
        Ok(()) => {
            let mut report = run.report;
            report.warnings = warnings;
            Ok(report)
        }
        Err(err) => {
            run.transition(ForkState::Failed);
            Err(err)
        }
    }
}

struct Run<'a> {
    ctx: &'a ForkContext,
    scratch: ScratchWorkspace,
    report: ForkReport,
}

impl Run<'_> {
    fn transition(&mut self, state: ForkState) {
        if self.ctx.options.verbose {
            println!("{} {}", style("→").dim(), style(state).dim());
        }
        self.report.states.push(state);
    }

    fn execute(
        &mut self,
        fetcher: &dyn RegistryFetcher,
        installer: &dyn PackageInstaller,
    ) -> Result<()> {
        let ctx = self.ctx;
        let location = locator::locate(&ctx.module, &ctx.root);
        self.report.destination = location.destination.clone();
        self.transition(ForkState::Located);

        if location.destination.exists() && !ctx.options.force {
            return Err(InstaforkError::DestinationExists {
                path: location.destination.display().to_string(),
            });
        }

        let source_dir = match &location.origin {
            Origin::Local(dir) => {
                self.transition(ForkState::LocalCopying);
                self.stage_local(dir)?
            }
            Origin::Remote => {
                self.transition(ForkState::Fetching);
                self.fetch_remote(fetcher)?
            }
        };
        let manifest = ModuleManifest::load(&source_dir)?;
        self.report.version = manifest.version.clone();

        self.transition(ForkState::DependenciesResolving);
        let host = HostDependencies::snapshot(&ctx.root)?;
        if ctx.options.dry_run {
            return self.dry_run(&manifest, &host, &location.destination);
        }
        let resolution = deps::resolve(&manifest, &host, installer)?;
        self.report.installed = resolution.installed;
        self.report.satisfied = resolution.satisfied;

        self.transition(ForkState::FilesCopying);
        let options = CopyOptions::vendored_module(ctx.options.force);
        self.report.files_copied =
            copy_module_tree(&source_dir, &location.destination, &options)?;

        self.transition(ForkState::ReferencesRewriting);
        let entry = manifest.entry_path(&location.destination);
        self.report.rewrite =
            rewrite::rewrite_references(&ctx.root, ctx.module.package_name(), &entry)?;

        self.transition(ForkState::Done);
        Ok(())
    }

    /// Stage the installed copy in scratch space; installs may prune `node_modules`
    fn stage_local(&mut self, module_dir: &Path) -> Result<PathBuf> {
        let staged = self.scratch.dir()?.join(self.ctx.module.dir_name());
        copy_module_tree(module_dir, &staged, &CopyOptions::vendored_module(false))?;
        Ok(staged)
    }

    /// Fetch and extract; archives that appear during the fetch are removed on
    /// cleanup even when the lookup afterwards is ambiguous
    fn fetch_remote(&mut self, fetcher: &dyn RegistryFetcher) -> Result<PathBuf> {
        let ctx = self.ctx;
        let before = ArchiveSnapshot::take(&ctx.module, &ctx.root)?;
        let fetched = fetcher.fetch(&ctx.module, &ctx.root);
        for archive in before.fetched_since(&ctx.module, &ctx.root)? {
            self.scratch.adopt_archive(archive);
        }
        fetched?;

        let archive = registry::find_archive(&ctx.module, &ctx.root)?;
        self.scratch.adopt_archive(archive.clone());

        let dir = self.scratch.dir()?;
        registry::extract_archive(&archive, &dir)
    }

    /// Resolve without installing and count the references that would change
    fn dry_run(
        &mut self,
        manifest: &ModuleManifest,
        host: &HostDependencies,
        destination: &Path,
    ) -> Result<()> {
        let plan = deps::plan(manifest, host)?;
        self.report.installed = plan.to_install.into_iter().map(|(name, _)| name).collect();
        self.report.satisfied = plan.satisfied.into_iter().map(|(name, _)| name).collect();

        let entry = manifest.entry_path(destination);
        let (root, planned, files_scanned) =
            rewrite::plan_rewrites(&self.ctx.root, self.ctx.module.package_name(), &entry)?;
        self.report.rewrite = RewriteReport {
            files_scanned,
            rewritten: planned
                .into_iter()
                .map(|p| {
                    let relative = p.path.strip_prefix(&root).unwrap_or(&p.path).to_path_buf();
                    (relative, p.replacements)
                })
                .collect(),
        };

        self.transition(ForkState::Done);
        Ok(())
    }
}
