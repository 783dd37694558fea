//! CLI definitions using clap derive API
//!
//! Each command's arguments live in their own submodule:
//! - fork: Fork command arguments
//! - rewrite: Rewrite command arguments
//! - completions: Completions command arguments

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod completions;
pub mod fork;
pub mod rewrite;

pub use completions::CompletionsArgs;
pub use fork::ForkArgs;
pub use rewrite::RewriteArgs;

/// instafork - vendor npm modules into your project
///
/// Copies a module out of node_modules (or the npm registry) into your source tree
/// and points every require/import of it at the local copy.
#[derive(Parser, Debug)]
#[command(
    name = "instafork",
    author,
    version,
    color = clap::ColorChoice::Always,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Vendor an npm module into your project's source tree",
    long_about = "instafork copies an npm module into your project, installs the dependencies \
                  it needs, checks them against the versions you already have, and rewrites \
                  every reference to the module so it resolves to the local copy.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n   \
                  instafork fork left-pad                 \x1b[90m# Vendor left-pad\x1b[0m\n   \
                  instafork fork express@4.17.1           \x1b[90m# Vendor a specific version\x1b[0m\n   \
                  instafork fork @uber/react-map --dry-run \x1b[90m# Check without changing anything\x1b[0m\n   \
                  instafork rewrite left-pad left-pad/index.js \x1b[90m# Re-run reference rewriting\x1b[0m\n\n\
                  "
)]
pub struct Cli {
    /// Project directory (defaults to current directory)
    #[arg(long, short = 'w', global = true, env = "INSTAFORK_WORKSPACE")]
    pub workspace: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// npm executable used to fetch and install packages
    #[arg(long, global = true, env = "INSTAFORK_NPM", default_value = crate::npm::DEFAULT_PROGRAM)]
    pub npm: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Copy a module into the project and rewrite references to it
    Fork(ForkArgs),

    /// Rewrite references to a module so they point at a local entry file
    Rewrite(RewriteArgs),

    /// Show version information
    #[command(hide = true)]
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}
