//! Implementation of the `swa discover` command.
//!
//! Walks a content root inside the project directory and turns every file
//! matching the pattern into a `Discovered` asset.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use swa_lib::discover::{DiscoverOptions, discover_assets, scan_candidates};
use swa_lib::glob::PatternMatcher;

use super::emit_assets;
use crate::output::OutputFormat;

#[derive(Debug, Args)]
pub struct DiscoverArgs {
  /// Pattern matched against project-relative paths (e.g. "wwwroot/**")
  #[arg(long)]
  pub pattern: String,

  /// Source id stamped on every asset
  #[arg(long)]
  pub source_id: String,

  /// Content root, relative to the project directory
  #[arg(long)]
  pub content_root: PathBuf,

  /// Base path the assets are served under
  #[arg(long)]
  pub base_path: String,

  /// Project directory (default: current directory)
  #[arg(long, default_value = ".")]
  pub project_dir: PathBuf,

  /// Write the assets as task items to this file instead of printing them
  #[arg(short, long)]
  pub output: Option<PathBuf>,

  /// Write the discovery pattern as JSON to this file, for `manifest --discovery-patterns`
  #[arg(long)]
  pub pattern_output: Option<PathBuf>,
}

pub fn cmd_discover(args: &DiscoverArgs, format: OutputFormat) -> Result<()> {
  let candidates = scan_candidates(&args.project_dir, &args.content_root)
    .with_context(|| format!("Failed to scan content root: {}", args.content_root.display()))?;

  let options = DiscoverOptions {
    pattern: args.pattern.clone(),
    source_id: args.source_id.clone(),
    content_root: args.project_dir.join(&args.content_root).to_string_lossy().into_owned(),
    base_path: args.base_path.clone(),
  };

  let assets = discover_assets(&candidates, &options, &PatternMatcher).context("Failed to discover assets")?;

  if let Some(path) = &args.pattern_output {
    let content = serde_json::to_string_pretty(&[options.discovery_pattern()])?;
    fs::write(path, content).with_context(|| format!("Failed to write discovery pattern: {}", path.display()))?;
  }
  emit_assets(&assets, args.output.as_deref(), format)
}
