//! Implementation of the `swa merge` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use swa_lib::aggregate::aggregate_manifests;

use super::{KindArg, emit_assets};
use crate::output::{OutputFormat, print_json, print_stat, truncate_hash};

#[derive(Debug, Args)]
pub struct MergeArgs {
  /// Manifests of referenced projects, in reference order
  #[arg(required = true, value_name = "MANIFEST")]
  pub manifests: Vec<PathBuf>,

  /// Kind of the build consuming the assets
  #[arg(long, value_enum, default_value = "all")]
  pub kind: KindArg,

  /// Write the merged assets as task items to this file instead of printing them
  #[arg(short, long)]
  pub output: Option<PathBuf>,
}

pub fn cmd_merge(args: &MergeArgs, format: OutputFormat) -> Result<()> {
  let outcome = aggregate_manifests(&args.manifests, args.kind.into()).context("Failed to merge manifests")?;

  if format.is_json() && args.output.is_none() {
    return print_json(&serde_json::json!({
      "assets": outcome.assets,
      "relatedManifests": outcome.related_manifests,
    }));
  }

  if !format.is_json() {
    for related in &outcome.related_manifests {
      print_stat(&related.source, &format!("{} ({})", related.identity, truncate_hash(&related.hash)));
    }
  }
  emit_assets(&outcome.assets, args.output.as_deref(), format)
}
