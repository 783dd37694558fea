//! Command implementations for the instafork CLI

pub mod completions;
pub mod fork;
pub mod helpers;
pub mod rewrite;
pub mod version;
