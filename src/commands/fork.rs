//! Fork command implementation

use std::path::PathBuf;

use console::style;

use crate::cli::ForkArgs;
use crate::commands::helpers::{display_relative, resolve_workspace_path};
use crate::error::Result;
use crate::module::ModuleId;
use crate::npm::NpmClient;
use crate::pipeline::{self, ForkContext, ForkOptions, ForkReport};

pub fn run(workspace: Option<PathBuf>, npm: String, verbose: bool, args: ForkArgs) -> Result<()> {
    let root = resolve_workspace_path(workspace)?;
    let module = ModuleId::parse(&args.module)?;
    let options = ForkOptions {
        force: args.force,
        dry_run: args.dry_run,
        verbose,
    };
    let ctx = ForkContext::new(root, module, options);

    println!("Forking {}", style(&ctx.module).cyan().bold());

    let npm = NpmClient::new(npm, verbose);
    let report = pipeline::run(&ctx, &npm, &npm)?;

    if ctx.options.dry_run {
        print_dry_run(&ctx, &report);
    } else {
        print_summary(&ctx, &report);
    }
    Ok(())
}

fn print_summary(ctx: &ForkContext, report: &ForkReport) {
    for name in &report.installed {
        println!("  Installed dependency {}", style(name).cyan());
    }
    if ctx.options.verbose {
        for name in &report.satisfied {
            println!("  {} already satisfied", style(name).dim());
        }
    }

    let destination = display_relative(&ctx.root, &report.destination);
    println!(
        "  Copied {} file(s) to {}",
        report.files_copied,
        style(&destination).bold()
    );

    println!(
        "  Rewrote {} reference(s) in {} file(s)",
        report.rewrite.total_replacements(),
        report.rewrite.rewritten.len()
    );
    if ctx.options.verbose {
        for (file, count) in &report.rewrite.rewritten {
            println!("    {} ({})", crate::path_utils::to_forward_slashes(file), count);
        }
    }

    let version = ctx
        .module
        .version()
        .map(str::to_string)
        .or_else(|| report.version.clone());
    let label = match version {
        Some(version) => format!("{}@{}", ctx.module.package_name(), version),
        None => ctx.module.package_name().to_string(),
    };
    println!(
        "{} Forked {} into {}",
        style("✓").green().bold(),
        style(label).cyan(),
        destination
    );
}

fn print_dry_run(ctx: &ForkContext, report: &ForkReport) {
    println!("{}", style("Dry run: no changes were made.").yellow());

    if report.installed.is_empty() {
        println!("  No dependencies to install");
    } else {
        println!("  Would install: {}", report.installed.join(", "));
    }
    println!(
        "  Would copy to {}",
        display_relative(&ctx.root, &report.destination)
    );
    println!(
        "  Would rewrite {} reference(s) in {} file(s)",
        report.rewrite.total_replacements(),
        report.rewrite.rewritten.len()
    );
    for (file, count) in &report.rewrite.rewritten {
        println!("    {} ({})", crate::path_utils::to_forward_slashes(file), count);
    }
}
