//! Asset manifests.
//!
//! Two views over the same asset set:
//! - [`Manifest`]: the structured, hash-stamped JSON document handed between projects
//! - [`RuntimeManifest`]: the flat XML list of content roots the dev-time server reads

pub mod runtime;
mod storage;
mod types;

pub use runtime::{ContentRootMapping, RuntimeManifest, RuntimeManifestError};
pub use storage::{ManifestError, PersistOutcome, load_manifest, persist_manifest};
pub use types::*;
