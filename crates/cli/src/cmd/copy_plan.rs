//! Implementation of the `swa copy-plan` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use swa_lib::copy::{CopyInstruction, plan_output_copies, plan_publish_copies};
use swa_lib::manifest::load_manifest;

use super::save_items;
use crate::output::{OutputFormat, print_json, print_mapping, print_success};

#[derive(Debug, Args)]
pub struct CopyPlanArgs {
  /// Manifest whose assets are copied
  #[arg(long)]
  pub manifest: PathBuf,

  /// Directory the files are copied into
  #[arg(long)]
  pub output_dir: PathBuf,

  /// Plan publish copies instead of build output copies
  #[arg(long)]
  pub publish: bool,

  /// Path prefix for published assets (e.g. "wwwroot")
  #[arg(long, default_value = "")]
  pub prefix: String,

  /// Write the instructions as task items to this file instead of printing them
  #[arg(short, long)]
  pub output: Option<PathBuf>,
}

pub fn cmd_copy_plan(args: &CopyPlanArgs, format: OutputFormat) -> Result<()> {
  let manifest = load_manifest(&args.manifest)
    .with_context(|| format!("Failed to load manifest: {}", args.manifest.display()))?;

  let plan = if args.publish {
    plan_publish_copies(&manifest.assets, &args.output_dir, &args.prefix)
  } else {
    plan_output_copies(&manifest.assets, &args.output_dir)
  };

  if let Some(path) = &args.output {
    let items: Vec<_> = plan.iter().map(CopyInstruction::to_item).collect();
    save_items(path, &items)?;
    if !format.is_json() {
      print_success(&format!("Wrote {} copy instruction(s) to {}", plan.len(), path.display()));
    }
    return Ok(());
  }

  if format.is_json() {
    return print_json(&plan);
  }

  for instruction in &plan {
    print_mapping(&instruction.source, &instruction.target_path, instruction.policy.as_str());
  }
  print_success(&format!("{} file(s) to copy", plan.len()));
  Ok(())
}
