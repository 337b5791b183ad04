//! swa-lib: the static web asset manifest model
//!
//! This crate turns candidate files into normalized, uniquely identified asset
//! records and carries them through a project's build:
//! - `discover` / `define`: build `AssetRecord`s from task items
//! - `aggregate`: merge the manifests of referenced projects
//! - `manifest`: persist the hash-stamped manifest and its runtime form
//! - `copy`: plan copies to the output and publish directories

pub mod aggregate;
pub mod asset;
pub mod consts;
pub mod copy;
pub mod define;
pub mod discover;
pub mod glob;
pub mod item;
pub mod manifest;
pub mod util;
