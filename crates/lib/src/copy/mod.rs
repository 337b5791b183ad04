//! Planning physical copies of assets.
//!
//! The planner never touches the file system. It decides which assets must be
//! copied where and hands the engine one instruction per file, carrying the
//! copy policy so the engine can pick "always" or "only if newer".

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::asset::path::join_logical;
use crate::asset::{AssetRecord, CopyOption};
use crate::consts::TARGET_PATH_METADATA;
use crate::item::TaskItem;

/// Which directory an instruction copies into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CopyDestination {
  Output,
  Publish,
}

impl CopyDestination {
  /// Metadata name the policy travels under.
  fn policy_metadata(self) -> &'static str {
    match self {
      Self::Output => "CopyToOutputDirectory",
      Self::Publish => "CopyToPublishDirectory",
    }
  }
}

/// Copy `source` to `target_path` according to `policy`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyInstruction {
  pub source: String,
  pub target_path: String,
  pub policy: CopyOption,
  pub destination: CopyDestination,
}

impl CopyInstruction {
  pub fn to_item(&self) -> TaskItem {
    TaskItem::new(&self.source)
      .with_metadata(TARGET_PATH_METADATA, &self.target_path)
      .with_metadata(self.destination.policy_metadata(), self.policy.as_str())
  }
}

/// Plan copies of the current project's assets into `output_dir`.
///
/// Only Discovered and Computed assets qualify; referenced assets are copied
/// by the project that owns them. Reference-only assets and assets that never
/// copy to the output are skipped. Targets are `output_dir/RelativePath`.
pub fn plan_output_copies(assets: &[AssetRecord], output_dir: &Path) -> Vec<CopyInstruction> {
  let output_dir = output_dir.to_string_lossy();
  let mut instructions = Vec::new();

  for asset in assets {
    if !asset.is_local() {
      debug!(identity = %asset.identity, source_type = %asset.source_type, "skipping referenced asset");
      continue;
    }
    if asset.is_for_reference_only() {
      info!(identity = %asset.identity, "skipping asset defined only for referencing projects");
      continue;
    }
    if !asset.should_copy_to_output() {
      continue;
    }

    instructions.push(CopyInstruction {
      source: asset.identity.clone(),
      target_path: join_logical(&output_dir, &asset.relative_path),
      policy: asset.copy_to_output_directory,
      destination: CopyDestination::Output,
    });
  }

  instructions
}

/// Plan copies of every publishable asset into `publish_dir`.
///
/// Referenced assets are included and re-based under `prefix` by
/// [`AssetRecord::compute_target_path`].
pub fn plan_publish_copies(assets: &[AssetRecord], publish_dir: &Path, prefix: &str) -> Vec<CopyInstruction> {
  let publish_dir = publish_dir.to_string_lossy();
  let mut instructions = Vec::new();

  for asset in assets {
    if asset.is_build_only() {
      debug!(identity = %asset.identity, "skipping build-only asset");
      continue;
    }
    if asset.is_for_reference_only() {
      info!(identity = %asset.identity, "skipping asset defined only for referencing projects");
      continue;
    }
    if !asset.should_copy_to_publish() {
      continue;
    }

    instructions.push(CopyInstruction {
      source: asset.identity.clone(),
      target_path: join_logical(&publish_dir, &asset.compute_target_path(prefix, '/')),
      policy: asset.copy_to_publish_directory,
      destination: CopyDestination::Publish,
    });
  }

  instructions
}
