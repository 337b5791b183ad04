//! The asset record and its metadata vocabulary.
//!
//! An [`AssetRecord`] is the normalized form of one static asset. Records are
//! built from task items at the boundary and never carry unvalidated strings
//! afterwards.

pub mod path;
mod record;
pub mod target;
mod types;

pub use record::{AssetError, AssetRecord};
pub use target::{ResolvedTarget, TargetPathError, resolve_target_paths};
pub use types::{AssetKind, AssetMode, CopyOption, SourceType, UnknownValue};
pub(crate) use types::metadata_enum;
