use clap::Parser;
use std::path::PathBuf;

/// Arguments for the rewrite command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Point references at a vendored copy:\n    instafork rewrite left-pad left-pad/index.js\n\n\
                  Scoped module vendored into src/:\n    instafork rewrite @uber/react-map src/uber-react-map/lib/index.js")]
pub struct RewriteArgs {
    /// Module whose references are rewritten
    pub module: String,

    /// Entry file the references should resolve to (relative to the project)
    pub entry_file: PathBuf,
}
