//! instafork - vendor npm modules into your project
//!
//! Copies a module from `node_modules` or the npm registry into the project's
//! source tree, reconciles its dependencies with the ones already installed and
//! rewrites every reference to the module so it resolves to the local copy.

use clap::Parser;
use console::style;
use miette::Diagnostic;

mod cli;
mod commands;
mod common;
mod deps;
mod error;
mod locator;
mod module;
mod npm;
mod path_utils;
mod pipeline;
mod progress;
mod registry;
mod rewrite;
mod temp;
#[cfg(test)]
mod test_fixtures;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Fork(args) => commands::fork::run(cli.workspace, cli.npm, cli.verbose, args),
        Commands::Rewrite(args) => commands::rewrite::run(cli.workspace, cli.verbose, args),
        Commands::Version => commands::version::run(),
        Commands::Completions(args) => commands::completions::run(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        if let Some(help) = e.help() {
            eprintln!("{} {}", style("help:").cyan(), help);
        }
        std::process::exit(1);
    }
}
