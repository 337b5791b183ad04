mod copy_plan;
mod define;
mod discover;
mod manifest;
mod merge;

pub use copy_plan::{CopyPlanArgs, cmd_copy_plan};
pub use define::{DefineArgs, cmd_define};
pub use discover::{DiscoverArgs, cmd_discover};
pub use manifest::{ManifestArgs, cmd_manifest};
pub use merge::{MergeArgs, cmd_merge};

use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;

use swa_lib::asset::{AssetKind, AssetRecord};
use swa_lib::item::{TaskItem, read_items, write_items};
use swa_lib::manifest::{ManifestMode, ManifestType};

use crate::output::{OutputFormat, print_json, print_mapping, print_success};

/// Asset kind selector for `--kind`.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KindArg {
  Build,
  Publish,
  All,
}

impl From<KindArg> for AssetKind {
  fn from(kind: KindArg) -> Self {
    match kind {
      KindArg::Build => AssetKind::Build,
      KindArg::Publish => AssetKind::Publish,
      KindArg::All => AssetKind::All,
    }
  }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ModeArg {
  Default,
  Root,
  SelfContained,
}

impl From<ModeArg> for ManifestMode {
  fn from(mode: ModeArg) -> Self {
    match mode {
      ModeArg::Default => ManifestMode::Default,
      ModeArg::Root => ManifestMode::Root,
      ModeArg::SelfContained => ManifestMode::SelfContained,
    }
  }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TypeArg {
  Build,
  Publish,
}

impl From<TypeArg> for ManifestType {
  fn from(manifest_type: TypeArg) -> Self {
    match manifest_type {
      TypeArg::Build => ManifestType::Build,
      TypeArg::Publish => ManifestType::Publish,
    }
  }
}

fn load_items(path: &Path) -> Result<Vec<TaskItem>> {
  read_items(path).with_context(|| format!("Failed to read items: {}", path.display()))
}

fn save_items(path: &Path, items: &[TaskItem]) -> Result<()> {
  write_items(path, items).with_context(|| format!("Failed to write items: {}", path.display()))
}

/// Print assets, or write them as task items when `output` is given.
fn emit_assets(assets: &[AssetRecord], output: Option<&Path>, format: OutputFormat) -> Result<()> {
  if let Some(path) = output {
    let items: Vec<_> = assets.iter().map(AssetRecord::to_item).collect();
    save_items(path, &items)?;
    if !format.is_json() {
      print_success(&format!("Wrote {} asset(s) to {}", assets.len(), path.display()));
    }
    return Ok(());
  }

  if format.is_json() {
    return print_json(&assets);
  }

  for asset in assets {
    print_mapping(&asset.relative_path, &asset.identity, asset.source_type.as_str());
  }
  print_success(&format!("{} asset(s)", assets.len()));
  Ok(())
}
