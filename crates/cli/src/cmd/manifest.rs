//! Implementation of the `swa manifest` command.
//!
//! Writes the project's asset manifest, skipping the write when the stored
//! hash already matches, and optionally the runtime manifest next to it.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use swa_lib::asset::{AssetKind, AssetRecord, resolve_target_paths};
use swa_lib::asset::path::full_path;
use swa_lib::consts::{BUILD_MANIFEST_FILENAME, PUBLISH_MANIFEST_FILENAME};
use swa_lib::manifest::{
  DiscoveryPattern, Manifest, ManifestType, PersistOutcome, RuntimeManifest, load_manifest, persist_manifest,
};

use super::{ModeArg, TypeArg, load_items};
use crate::output::{OutputFormat, print_info, print_json, print_success, truncate_hash};

#[derive(Debug, Args)]
pub struct ManifestArgs {
  /// JSON file with the project's asset task items
  #[arg(long)]
  pub assets: PathBuf,

  /// Source id of the project
  #[arg(long)]
  pub source: String,

  /// Base path of the project
  #[arg(long)]
  pub base_path: String,

  #[arg(long, value_enum, default_value = "default")]
  pub mode: ModeArg,

  #[arg(long = "type", value_enum, default_value = "build")]
  pub manifest_type: TypeArg,

  /// Where to write the manifest (default: the standard file name for the type)
  #[arg(long)]
  pub output: Option<PathBuf>,

  /// Manifests of referenced projects to record
  #[arg(long, value_name = "MANIFEST", num_args = 1..)]
  pub related: Vec<PathBuf>,

  /// Discovery pattern files written by `discover --pattern-output` (repeatable)
  #[arg(long = "discovery-patterns", value_name = "FILE")]
  pub discovery_patterns: Vec<PathBuf>,

  /// Also write the runtime manifest to this file
  #[arg(long)]
  pub runtime: Option<PathBuf>,
}

pub fn cmd_manifest(args: &ManifestArgs, format: OutputFormat) -> Result<()> {
  let assets = load_items(&args.assets)?
    .iter()
    .map(AssetRecord::from_item)
    .collect::<Result<Vec<_>, _>>()
    .with_context(|| format!("Invalid asset in {}", args.assets.display()))?;

  let kind = match ManifestType::from(args.manifest_type) {
    ManifestType::Build => AssetKind::Build,
    ManifestType::Publish => AssetKind::Publish,
  };
  resolve_target_paths(&assets, &args.source, kind).context("Assets collide on a target path")?;

  let mut related = Vec::with_capacity(args.related.len());
  for path in &args.related {
    let manifest = load_manifest(path).with_context(|| format!("Failed to load manifest: {}", path.display()))?;
    related.push(manifest.as_related(full_path(&path.to_string_lossy())));
  }

  let mut discovery_patterns = Vec::new();
  for path in &args.discovery_patterns {
    discovery_patterns.extend(load_discovery_patterns(path)?);
  }

  let manifest = Manifest::new(
    &args.source,
    &args.base_path,
    args.mode.into(),
    args.manifest_type.into(),
    related,
    discovery_patterns,
    assets,
  )
  .context("Failed to compute manifest hash")?;

  let output = args.output.clone().unwrap_or_else(|| default_output(manifest.manifest_type));
  let outcome =
    persist_manifest(&manifest, &output).with_context(|| format!("Failed to write manifest: {}", output.display()))?;

  let runtime_outcome = match &args.runtime {
    Some(path) => Some(
      RuntimeManifest::from_manifest(&manifest)
        .save(path)
        .with_context(|| format!("Failed to write runtime manifest: {}", path.display()))?,
    ),
    None => None,
  };

  if format.is_json() {
    return print_json(&serde_json::json!({
      "manifest": output,
      "hash": manifest.hash,
      "outcome": outcome_name(outcome),
      "runtime": args.runtime,
      "runtimeOutcome": runtime_outcome.map(outcome_name),
    }));
  }

  report(&output.display().to_string(), outcome);
  if let (Some(path), Some(outcome)) = (&args.runtime, runtime_outcome) {
    report(&path.display().to_string(), outcome);
  }
  print_info(&format!("Hash: {}", truncate_hash(&manifest.hash)));
  Ok(())
}

fn load_discovery_patterns(path: &Path) -> Result<Vec<DiscoveryPattern>> {
  let content =
    fs::read_to_string(path).with_context(|| format!("Failed to read discovery patterns: {}", path.display()))?;
  serde_json::from_str(&content).with_context(|| format!("Failed to parse discovery patterns: {}", path.display()))
}

fn default_output(manifest_type: ManifestType) -> PathBuf {
  match manifest_type {
    ManifestType::Build => PathBuf::from(BUILD_MANIFEST_FILENAME),
    ManifestType::Publish => PathBuf::from(PUBLISH_MANIFEST_FILENAME),
  }
}

fn outcome_name(outcome: PersistOutcome) -> &'static str {
  match outcome {
    PersistOutcome::Written => "written",
    PersistOutcome::Unchanged => "unchanged",
  }
}

fn report(path: &str, outcome: PersistOutcome) {
  match outcome {
    PersistOutcome::Written => print_success(&format!("Written: {}", path)),
    PersistOutcome::Unchanged => print_info(&format!("Unchanged: {}", path)),
  }
}
