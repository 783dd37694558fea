//! Version command implementation

use crate::error::Result;
use crate::npm::DEFAULT_PROGRAM;

/// Print version and build details
pub fn run() -> Result<()> {
    for line in build_info() {
        println!("{line}");
    }
    Ok(())
}

fn build_info() -> Vec<String> {
    let profile = if cfg!(debug_assertions) {
        "debug"
    } else {
        "release"
    };

    vec![
        format!("instafork {}", env!("CARGO_PKG_VERSION")),
        String::new(),
        "Build info:".to_string(),
        format!("  Minimum Rust: {}", env!("CARGO_PKG_RUST_VERSION")),
        format!("  Profile: {profile}"),
        format!(
            "  Target: {}-{}",
            std::env::consts::ARCH,
            std::env::consts::OS
        ),
        format!("  Default npm: {DEFAULT_PROGRAM}"),
    ]
}
