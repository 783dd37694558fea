//! npm command-line client
//!
//! Implements both external collaborators of the pipeline: the registry fetch
//! (`npm pack`) and the package installation (`npm install --save`).

use std::path::Path;
use std::process::{Command, Output};

use console::style;

use crate::deps::PackageInstaller;
use crate::error::{Result, deps, fetch};
use crate::module::ModuleId;
use crate::progress::Spinner;
use crate::registry::RegistryFetcher;

/// Default npm executable
pub const DEFAULT_PROGRAM: &str = "npm";

/// Runs npm as a child process
#[derive(Debug, Clone)]
pub struct NpmClient {
    program: String,
    verbose: bool,
}

impl NpmClient {
    pub fn new(program: impl Into<String>, verbose: bool) -> Self {
        Self {
            program: program.into(),
            verbose,
        }
    }

    fn run(&self, args: &[&str], cwd: &Path, message: String) -> std::io::Result<Output> {
        if self.verbose {
            println!(
                "{} {} {}",
                style("$").dim(),
                self.program,
                args.join(" ")
            );
        }

        let spinner = Spinner::start(message);
        let output = Command::new(&self.program)
            .args(args)
            .current_dir(cwd)
            .output();
        spinner.finish();

        if self.verbose {
            if let Ok(output) = &output {
                echo_lines(&output.stdout);
            }
        }
        output
    }
}

impl RegistryFetcher for NpmClient {
    fn fetch(&self, id: &ModuleId, cwd: &Path) -> Result<()> {
        let output = self
            .run(&["pack", id.raw()], cwd, format!("Downloading {id}"))
            .map_err(|e| fetch::fetch_failed(id.raw(), format!("{}: {e}", self.program)))?;

        if !output.status.success() {
            return Err(fetch::fetch_failed(id.raw(), failure_reason(&output)));
        }
        Ok(())
    }
}

impl PackageInstaller for NpmClient {
    fn install(&self, name: &str, range: &str, cwd: &Path) -> Result<()> {
        let spec = install_spec(name, range);
        let output = self
            .run(
                &["install", "--save", &spec],
                cwd,
                format!("Installing {spec}"),
            )
            .map_err(|e| deps::install_failed(name, format!("{}: {e}", self.program)))?;

        if !output.status.success() {
            return Err(deps::install_failed(name, failure_reason(&output)));
        }
        Ok(())
    }
}

/// `name@range`, or the bare name when no range is given
pub fn install_spec(name: &str, range: &str) -> String {
    let range = range.trim();
    if range.is_empty() {
        name.to_string()
    } else {
        format!("{name}@{range}")
    }
}

fn failure_reason(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    if stderr.is_empty() {
        format!("exited with {}", output.status)
    } else {
        stderr.to_string()
    }
}

fn echo_lines(bytes: &[u8]) {
    for line in String::from_utf8_lossy(bytes).lines() {
        println!("  {}", style(line).dim());
    }
}
