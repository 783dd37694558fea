//! Module identifiers and manifests

pub mod id;
pub mod manifest;

pub use id::ModuleId;
pub use manifest::ModuleManifest;
