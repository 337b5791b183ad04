//! Discovering assets under a content root.
//!
//! Discovery turns files that match one glob pattern into `Discovered` assets.
//! The relative path is the pattern's stem and the asset kind follows from the
//! copy policy the build engine attached to each file.

use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::asset::path::{full_path, normalize_content_root, normalize_logical_path};
use crate::asset::{AssetError, AssetKind, AssetMode, AssetRecord, CopyOption, SourceType};
use crate::consts::FULL_PATH_METADATA;
use crate::glob::GlobMatcher;
use crate::item::TaskItem;
use crate::manifest::DiscoveryPattern;

/// Where discovered assets come from and how they are exposed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoverOptions {
  pub pattern: String,
  pub source_id: String,
  pub content_root: String,
  pub base_path: String,
}

impl DiscoverOptions {
  /// The manifest entry recording this discovery, named `<source id>\<content root dir>`.
  pub fn discovery_pattern(&self) -> DiscoveryPattern {
    let content_root = normalize_content_root(&self.content_root);
    let dir = Path::new(&content_root)
      .file_name()
      .map(|name| name.to_string_lossy().into_owned())
      .unwrap_or_default();
    DiscoveryPattern {
      name: format!("{}\\{}", self.source_id, dir),
      content_root,
      base_path: normalize_logical_path(&self.base_path),
      pattern: self.pattern.clone(),
    }
  }
}

#[derive(Debug, Error)]
pub enum DiscoverError {
  /// A discovered file produced an invalid record.
  #[error("invalid discovered asset '{item}': {source}")]
  InvalidAsset {
    item: String,
    #[source]
    source: AssetError,
  },

  /// Two files map to the same relative path and are not a build/publish pair.
  #[error("conflicting discovered assets for relative path '{relative_path}': '{first}' and '{second}'")]
  ConflictingRelativePath {
    relative_path: String,
    first: String,
    second: String,
  },

  /// At most a build and a publish variant may share a relative path.
  #[error("more than two discovered assets for relative path '{relative_path}': '{first}', '{second}' and '{third}'")]
  TooManyForRelativePath {
    relative_path: String,
    first: String,
    second: String,
    third: String,
  },

  #[error("failed to walk content root {path}: {message}")]
  WalkDir { path: String, message: String },
}

/// Discover assets among `candidates`.
///
/// Candidates are matched by item spec. Output order is input order.
pub fn discover_assets(
  candidates: &[TaskItem],
  options: &DiscoverOptions,
  matcher: &dyn GlobMatcher,
) -> Result<Vec<AssetRecord>, DiscoverError> {
  let mut assets: Vec<AssetRecord> = Vec::new();
  let mut by_relative_path: HashMap<String, Vec<usize>> = HashMap::new();

  for candidate in candidates {
    let matched = matcher.match_path(&options.pattern, &candidate.item_spec);
    if !matched.has_match {
      debug!(item = %candidate.item_spec, pattern = %options.pattern, "candidate does not match discovery pattern");
      continue;
    }

    let copy_to_output_directory = copy_option(candidate, "CopyToOutputDirectory");
    let copy_to_publish_directory = copy_option(candidate, "CopyToPublishDirectory");
    let asset_kind = if copy_to_publish_directory == CopyOption::Never {
      AssetKind::Build
    } else if copy_to_output_directory == CopyOption::Never {
      AssetKind::Publish
    } else {
      AssetKind::All
    };

    let mut asset = AssetRecord {
      identity: candidate.full_path(),
      source_id: options.source_id.clone(),
      source_type: SourceType::Discovered,
      content_root: options.content_root.clone(),
      base_path: options.base_path.clone(),
      relative_path: normalize_logical_path(&matched.stem),
      asset_kind,
      asset_mode: AssetMode::All,
      copy_to_output_directory,
      copy_to_publish_directory,
    }
    .normalized()
    .map_err(|source| DiscoverError::InvalidAsset {
      item: candidate.item_spec.clone(),
      source,
    })?;

    let positions = by_relative_path.entry(asset.relative_path.clone()).or_default();
    match positions[..] {
      [] => {}
      [position] => pair_build_and_publish(&mut assets[position], &mut asset)?,
      _ => {
        return Err(DiscoverError::TooManyForRelativePath {
          relative_path: asset.relative_path,
          first: assets[positions[0]].identity.clone(),
          second: assets[positions[1]].identity.clone(),
          third: asset.identity,
        });
      }
    }
    positions.push(assets.len());

    debug!(
      identity = %asset.identity,
      relative_path = %asset.relative_path,
      kind = %asset.asset_kind,
      "discovered asset"
    );
    assets.push(asset);
  }

  Ok(assets)
}

/// Two files on one relative path: the one never published is the build-time
/// variant, the other the publish-time variant.
fn pair_build_and_publish(existing: &mut AssetRecord, asset: &mut AssetRecord) -> Result<(), DiscoverError> {
  let existing_is_build = existing.copy_to_publish_directory == CopyOption::Never;
  let asset_is_build = asset.copy_to_publish_directory == CopyOption::Never;
  if existing_is_build == asset_is_build {
    return Err(DiscoverError::ConflictingRelativePath {
      relative_path: asset.relative_path.clone(),
      first: existing.identity.clone(),
      second: asset.identity.clone(),
    });
  }

  let (build, publish) = if asset_is_build { (asset, existing) } else { (existing, asset) };
  build.asset_kind = AssetKind::Build;
  publish.asset_kind = AssetKind::Publish;
  debug!(
    relative_path = %build.relative_path,
    build = %build.identity,
    publish = %publish.identity,
    "paired build and publish variants"
  );
  Ok(())
}

fn copy_option(candidate: &TaskItem, field: &str) -> CopyOption {
  let value = candidate.get_metadata(field);
  let option = CopyOption::parse_lenient(value);
  if option == CopyOption::Never && !value.is_empty() && value != "Never" {
    warn!(item = %candidate.item_spec, field, value, "unrecognized copy option, treating as Never");
  }
  option
}

/// List the files under `content_root` as discovery candidates.
///
/// Item specs are relative to `project_dir` with `/` separators, in file name
/// order; each candidate carries its absolute path as `FullPath` metadata.
pub fn scan_candidates(project_dir: &Path, content_root: &Path) -> Result<Vec<TaskItem>, DiscoverError> {
  let project_dir = dunce::simplified(project_dir);
  let root = project_dir.join(content_root);
  let mut candidates = Vec::new();

  if !root.is_dir() {
    debug!(path = %root.display(), "content root does not exist, nothing to discover");
    return Ok(candidates);
  }

  for entry in WalkDir::new(&root).sort_by_file_name() {
    let entry = entry.map_err(|e| DiscoverError::WalkDir {
      path: root.display().to_string(),
      message: e.to_string(),
    })?;
    if !entry.file_type().is_file() {
      continue;
    }

    let entry_path = entry.path();
    let item_spec = entry_path
      .strip_prefix(project_dir)
      .unwrap_or(entry_path)
      .to_string_lossy()
      .replace('\\', "/");

    candidates.push(
      TaskItem::new(item_spec).with_metadata(FULL_PATH_METADATA, &full_path(&entry_path.to_string_lossy())),
    );
  }

  Ok(candidates)
}
