//! Implementation of the `swa define` command.
//!
//! Defaults come from an optional JSON file; individual flags replace the
//! file's values.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use tracing::debug;

use swa_lib::asset::{AssetKind, AssetMode, CopyOption, SourceType};
use swa_lib::define::{AssetDetails, CopyCandidate, DefineOptions, define_assets};
use swa_lib::glob::PatternMatcher;

use super::{emit_assets, load_items, save_items};
use crate::output::{OutputFormat, print_json, print_mapping, print_stat};

#[derive(Debug, Args)]
pub struct DefineArgs {
  /// JSON file with the candidate task items
  #[arg(long)]
  pub candidates: PathBuf,

  /// JSON file with default values (camelCase field names)
  #[arg(long)]
  pub defaults: Option<PathBuf>,

  #[arg(long)]
  pub source_id: Option<String>,

  /// Discovered, Computed, Project or Package
  #[arg(long)]
  pub source_type: Option<SourceType>,

  #[arg(long)]
  pub content_root: Option<String>,

  #[arg(long)]
  pub base_path: Option<String>,

  /// Build, Publish or All
  #[arg(long)]
  pub asset_kind: Option<AssetKind>,

  /// CurrentProject, Reference or All
  #[arg(long)]
  pub asset_mode: Option<AssetMode>,

  /// Never, PreserveNewest or Always
  #[arg(long)]
  pub copy_to_output_directory: Option<CopyOption>,

  /// Never, PreserveNewest or Always
  #[arg(long)]
  pub copy_to_publish_directory: Option<CopyOption>,

  /// Pattern whose stem becomes the relative path
  #[arg(long)]
  pub pattern: Option<String>,

  /// Pattern the relative path must match
  #[arg(long)]
  pub filter: Option<String>,

  /// Field whose default replaces the candidate's own value (repeatable)
  #[arg(long = "override", value_name = "NAME")]
  pub overrides: Vec<String>,

  /// Write the assets as task items to this file instead of printing them
  #[arg(short, long)]
  pub output: Option<PathBuf>,

  /// Write the copy candidates as task items to this file
  #[arg(long)]
  pub copy_candidates: Option<PathBuf>,

  /// Hash every defined file (implied by --asset-details)
  #[arg(long)]
  pub compute_integrity: bool,

  /// Write file length and integrity per asset as task items to this file
  #[arg(long)]
  pub asset_details: Option<PathBuf>,
}

impl DefineArgs {
  fn options(&self) -> Result<DefineOptions> {
    let mut options = match &self.defaults {
      Some(path) => load_defaults(path)?,
      None => DefineOptions::default(),
    };

    if self.source_id.is_some() {
      options.source_id = self.source_id.clone();
    }
    if self.source_type.is_some() {
      options.source_type = self.source_type;
    }
    if self.content_root.is_some() {
      options.content_root = self.content_root.clone();
    }
    if self.base_path.is_some() {
      options.base_path = self.base_path.clone();
    }
    if self.asset_kind.is_some() {
      options.asset_kind = self.asset_kind;
    }
    if self.asset_mode.is_some() {
      options.asset_mode = self.asset_mode;
    }
    if self.copy_to_output_directory.is_some() {
      options.copy_to_output_directory = self.copy_to_output_directory;
    }
    if self.copy_to_publish_directory.is_some() {
      options.copy_to_publish_directory = self.copy_to_publish_directory;
    }
    if self.pattern.is_some() {
      options.relative_path_pattern = self.pattern.clone();
    }
    if self.filter.is_some() {
      options.relative_path_filter = self.filter.clone();
    }
    options.property_overrides.extend(self.overrides.iter().cloned());
    if self.compute_integrity || self.asset_details.is_some() {
      options.compute_integrity = true;
    }

    Ok(options)
  }
}

fn load_defaults(path: &Path) -> Result<DefineOptions> {
  let content = fs::read_to_string(path).with_context(|| format!("Failed to read defaults: {}", path.display()))?;
  serde_json::from_str(&content).with_context(|| format!("Failed to parse defaults: {}", path.display()))
}

pub fn cmd_define(args: &DefineArgs, format: OutputFormat) -> Result<()> {
  let candidates = load_items(&args.candidates)?;
  let options = args.options()?;
  debug!(?options, "resolved define options");

  let outcome = define_assets(&candidates, &options, &PatternMatcher).context("Failed to define assets")?;

  if let Some(path) = &args.copy_candidates {
    let items: Vec<_> = outcome.copy_candidates.iter().map(CopyCandidate::to_item).collect();
    save_items(path, &items)?;
  }
  if let Some(path) = &args.asset_details {
    let items: Vec<_> = outcome.asset_details.iter().map(AssetDetails::to_item).collect();
    save_items(path, &items)?;
  }

  if format.is_json() && args.output.is_none() {
    return print_json(&serde_json::json!({
      "assets": outcome.assets,
      "copyCandidates": outcome.copy_candidates,
      "assetDetails": outcome.asset_details,
    }));
  }

  emit_assets(&outcome.assets, args.output.as_deref(), format)?;
  if !format.is_json() && args.copy_candidates.is_none() && !outcome.copy_candidates.is_empty() {
    print_stat("Copy candidates", &outcome.copy_candidates.len().to_string());
    for candidate in &outcome.copy_candidates {
      print_mapping(&candidate.source, &candidate.target_path, "copy");
    }
  }
  if !format.is_json() && args.asset_details.is_none() {
    for details in &outcome.asset_details {
      print_mapping(&details.identity, &details.integrity, "integrity");
    }
  }
  Ok(())
}
