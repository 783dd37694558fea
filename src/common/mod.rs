//! Common utility modules shared across the pipeline stages.

pub mod fs;
