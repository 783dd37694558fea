use clap::Parser;

/// Arguments for the fork command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Vendor an installed module:\n    instafork fork left-pad\n\n\
                  Vendor a version from the registry:\n    instafork fork express@4.17.1\n\n\
                  Vendor a scoped module into src/:\n    instafork fork @uber/react-map\n\n\
                  Preview dependency installs and rewrites:\n    instafork fork left-pad --dry-run")]
pub struct ForkArgs {
    /// Module to vendor: name, name@version, @scope/name or @scope/name@version
    pub module: String,

    /// Replace the destination directory if it already exists
    #[arg(long, short = 'f')]
    pub force: bool,

    /// Check dependencies and list affected files without changing anything
    #[arg(long)]
    pub dry_run: bool,
}
