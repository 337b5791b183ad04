//! Defining assets from candidate items.
//!
//! A candidate may already carry every asset field as metadata, some of them,
//! or none. Missing values come from [`DefineOptions`]; property overrides
//! force the option value even when the candidate has its own.
//!
//! # Flow
//!
//! For each candidate, in input order:
//! 1. Pick the match path: `TargetPath`, `RelativePath` or `Link` metadata,
//!    else the full path relative to the content root, else the item spec
//! 2. Replace the match path with the rewrite pattern's stem when it matches
//! 3. Skip the candidate when a filter pattern is set and does not match
//! 4. Resolve each field from overrides, candidate metadata and defaults
//! 5. Derive `AssetKind` from the copy options when still unset
//! 6. Compute the identity, possibly a synthetic one under the content root
//! 7. Normalize and validate the record
//!
//! Missing fields are collected across the whole batch and reported together.
//! With [`DefineOptions::compute_integrity`] set, each defined asset also gets
//! an [`AssetDetails`] entry describing the physical file behind it.

use std::fmt;
use std::fs;
use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::asset::path::{is_under, join_logical, normalize_content_root, normalize_logical_path};
use crate::asset::{AssetError, AssetKind, AssetMode, AssetRecord, CopyOption, SourceType, UnknownValue};
use crate::consts::{INTEGRITY_METADATA, TARGET_PATH_METADATA};
use crate::glob::GlobMatcher;
use crate::item::TaskItem;
use crate::util::hash::hash_bytes;

/// Defaults and patterns for the define step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DefineOptions {
  pub source_id: Option<String>,
  pub source_type: Option<SourceType>,
  pub content_root: Option<String>,
  pub base_path: Option<String>,
  pub asset_kind: Option<AssetKind>,
  pub asset_mode: Option<AssetMode>,
  pub copy_to_output_directory: Option<CopyOption>,
  pub copy_to_publish_directory: Option<CopyOption>,
  /// Field names whose option value replaces the candidate's own value.
  pub property_overrides: Vec<String>,
  /// Pattern whose stem replaces the match path.
  pub relative_path_pattern: Option<String>,
  /// Pattern the (rewritten) match path must satisfy.
  pub relative_path_filter: Option<String>,
  /// Read every defined file and report its integrity in [`DefineOutcome::asset_details`].
  pub compute_integrity: bool,
}

impl Default for DefineOptions {
  fn default() -> Self {
    Self {
      source_id: None,
      source_type: None,
      content_root: None,
      base_path: None,
      asset_kind: None,
      asset_mode: Some(AssetMode::All),
      copy_to_output_directory: Some(CopyOption::Never),
      copy_to_publish_directory: Some(CopyOption::PreserveNewest),
      property_overrides: Vec::new(),
      relative_path_pattern: None,
      relative_path_filter: None,
      compute_integrity: false,
    }
  }
}

impl DefineOptions {
  /// Field names accepted as property overrides.
  pub const OVERRIDABLE: [&'static str; 8] = [
    "SourceId",
    "SourceType",
    "ContentRoot",
    "BasePath",
    "AssetKind",
    "AssetMode",
    "CopyToOutputDirectory",
    "CopyToPublishDirectory",
  ];

  fn is_overridden(&self, field: &str) -> bool {
    self.property_overrides.iter().any(|name| name.eq_ignore_ascii_case(field))
  }

  fn default_for(&self, field: &str) -> Option<String> {
    match field {
      "SourceId" => self.source_id.clone(),
      "SourceType" => self.source_type.map(|v| v.to_string()),
      "ContentRoot" => self.content_root.clone(),
      "BasePath" => self.base_path.clone(),
      "AssetKind" => self.asset_kind.map(|v| v.to_string()),
      "AssetMode" => self.asset_mode.map(|v| v.to_string()),
      "CopyToOutputDirectory" => self.copy_to_output_directory.map(|v| v.to_string()),
      "CopyToPublishDirectory" => self.copy_to_publish_directory.map(|v| v.to_string()),
      _ => None,
    }
  }

  /// Resolve one field: override, then candidate metadata, then default.
  fn resolve(&self, candidate: &TaskItem, field: &str) -> Option<String> {
    if self.is_overridden(field) {
      return self.default_for(field);
    }
    match candidate.get_metadata(field) {
      "" => self.default_for(field),
      value => Some(value.to_string()),
    }
  }
}

/// A file whose asset identity differs from its physical location.
///
/// The host copies `source` to `target_path` before the asset is used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyCandidate {
  pub source: String,
  pub target_path: String,
}

impl CopyCandidate {
  pub fn to_item(&self) -> TaskItem {
    TaskItem::new(&self.source).with_metadata(TARGET_PATH_METADATA, &self.target_path)
  }
}

/// The physical file behind a defined asset.
///
/// `integrity` is the standard base64 SHA-256 of the file content, unless the
/// candidate already carried an `Integrity` value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetDetails {
  pub identity: String,
  pub file: String,
  pub file_length: u64,
  pub integrity: String,
}

impl AssetDetails {
  pub fn to_item(&self) -> TaskItem {
    TaskItem::new(&self.file)
      .with_metadata("Identity", &self.identity)
      .with_metadata("FileLength", &self.file_length.to_string())
      .with_metadata(INTEGRITY_METADATA, &self.integrity)
  }
}

/// Result of the define step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DefineOutcome {
  pub assets: Vec<AssetRecord>,
  pub copy_candidates: Vec<CopyCandidate>,
  /// Empty unless integrity was requested.
  pub asset_details: Vec<AssetDetails>,
}

/// A required field that had neither a value nor a default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingMetadata {
  pub field: &'static str,
  pub item: String,
}

impl fmt::Display for MissingMetadata {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "no metadata '{}' was present for item '{}' and no default value was provided",
      self.field, self.item
    )
  }
}

#[derive(Debug, Error)]
pub enum DefineError {
  /// One or more candidates lack required fields.
  #[error("{}", join_missing(.0))]
  MissingMetadata(Vec<MissingMetadata>),

  /// A resolved record failed validation.
  #[error("invalid asset for item '{item}': {source}")]
  InvalidAsset {
    item: String,
    #[source]
    source: AssetError,
  },

  #[error("failed to read '{path}' for item '{item}': {source}")]
  ReadFile {
    item: String,
    path: String,
    #[source]
    source: io::Error,
  },
}

fn join_missing(missing: &[MissingMetadata]) -> String {
  missing.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

/// Field values resolved for one candidate, still as metadata strings.
struct ResolvedFields {
  source_id: String,
  source_type: String,
  content_root: String,
  base_path: String,
  asset_mode: String,
  copy_to_output_directory: String,
  copy_to_publish_directory: String,
}

impl ResolvedFields {
  /// Resolve every required field, recording each one that has no value.
  fn resolve(candidate: &TaskItem, options: &DefineOptions, missing: &mut Vec<MissingMetadata>) -> Option<Self> {
    let mut field = |name: &'static str| {
      let value = options.resolve(candidate, name);
      if value.is_none() {
        missing.push(MissingMetadata {
          field: name,
          item: candidate.item_spec.clone(),
        });
      }
      value
    };

    let source_id = field("SourceId");
    let source_type = field("SourceType");
    let content_root = field("ContentRoot");
    let base_path = field("BasePath");
    let asset_mode = field("AssetMode");
    let copy_to_output_directory = field("CopyToOutputDirectory");
    let copy_to_publish_directory = field("CopyToPublishDirectory");

    Some(Self {
      source_id: source_id?,
      source_type: source_type?,
      content_root: content_root?,
      base_path: base_path?,
      asset_mode: asset_mode?,
      copy_to_output_directory: copy_to_output_directory?,
      copy_to_publish_directory: copy_to_publish_directory?,
    })
  }
}

/// Define assets from candidate items.
///
/// # Errors
///
/// - [`DefineError::MissingMetadata`] listing every unresolvable field of every candidate
/// - [`DefineError::InvalidAsset`] for the first record that fails validation
pub fn define_assets(
  candidates: &[TaskItem],
  options: &DefineOptions,
  matcher: &dyn GlobMatcher,
) -> Result<DefineOutcome, DefineError> {
  for name in &options.property_overrides {
    if !DefineOptions::OVERRIDABLE.iter().any(|known| known.eq_ignore_ascii_case(name)) {
      warn!(property = %name, "ignoring unknown property override");
    }
  }

  let mut outcome = DefineOutcome::default();
  let mut missing = Vec::new();

  for candidate in candidates {
    let content_root = options.resolve(candidate, "ContentRoot");
    let mut match_path = candidate_match_path(candidate, content_root.as_deref());

    if let Some(pattern) = &options.relative_path_pattern {
      let matched = matcher.match_path(pattern, &match_path);
      if matched.has_match {
        debug!(path = %match_path, pattern = %pattern, stem = %matched.stem, "relative path rewritten by pattern");
        match_path = normalize_logical_path(&matched.stem);
      }
    }

    if let Some(filter) = &options.relative_path_filter {
      if !matcher.match_path(filter, &match_path).has_match {
        debug!(
          item = %candidate.item_spec,
          path = %match_path,
          filter = %filter,
          "skipping candidate not matching filter"
        );
        continue;
      }
    }

    let Some(fields) = ResolvedFields::resolve(candidate, options, &mut missing) else {
      continue;
    };

    // The batch already failed; only keep collecting missing fields.
    if !missing.is_empty() {
      continue;
    }

    let (asset, copy_candidate) = build_asset(candidate, options, fields, match_path, matcher)?;
    if options.compute_integrity {
      outcome.asset_details.push(asset_details(candidate, &asset)?);
    }
    outcome.assets.push(asset);
    outcome.copy_candidates.extend(copy_candidate);
  }

  if !missing.is_empty() {
    return Err(DefineError::MissingMetadata(missing));
  }

  Ok(outcome)
}

fn build_asset(
  candidate: &TaskItem,
  options: &DefineOptions,
  fields: ResolvedFields,
  relative_path: String,
  matcher: &dyn GlobMatcher,
) -> Result<(AssetRecord, Option<CopyCandidate>), DefineError> {
  let invalid = |source: AssetError| DefineError::InvalidAsset {
    item: candidate.item_spec.clone(),
    source,
  };
  let unknown = |source: UnknownValue| {
    invalid(AssetError::UnknownValue {
      identity: candidate.item_spec.clone(),
      source,
    })
  };

  let copy_to_output_directory: CopyOption = fields.copy_to_output_directory.parse().map_err(unknown)?;
  let copy_to_publish_directory: CopyOption = fields.copy_to_publish_directory.parse().map_err(unknown)?;
  let asset_kind = match options.resolve(candidate, "AssetKind") {
    Some(kind) => kind.parse().map_err(unknown)?,
    None => AssetKind::from_copy_options(copy_to_output_directory, copy_to_publish_directory),
  };

  let (identity, computed) = compute_identity(
    candidate,
    &fields.content_root,
    options.relative_path_pattern.as_deref(),
    matcher,
  );
  let copy_candidate = computed.then(|| CopyCandidate {
    source: candidate.item_spec.clone(),
    target_path: identity.clone(),
  });

  let record = AssetRecord {
    identity,
    source_id: fields.source_id,
    source_type: fields.source_type.parse().map_err(unknown)?,
    content_root: fields.content_root,
    base_path: fields.base_path,
    relative_path,
    asset_kind,
    asset_mode: fields.asset_mode.parse().map_err(unknown)?,
    copy_to_output_directory,
    copy_to_publish_directory,
  }
  .normalized()
  .map_err(invalid)?;

  debug!(identity = %record.identity, relative_path = %record.relative_path, "defined asset");
  Ok((record, copy_candidate))
}

/// Read the candidate's physical file for its length and integrity.
fn asset_details(candidate: &TaskItem, asset: &AssetRecord) -> Result<AssetDetails, DefineError> {
  let file = candidate.full_path();
  let content = fs::read(&file).map_err(|source| DefineError::ReadFile {
    item: candidate.item_spec.clone(),
    path: file.clone(),
    source,
  })?;

  let integrity = match candidate.get_metadata(INTEGRITY_METADATA) {
    "" => hash_bytes(&content).0,
    preset => preset.to_string(),
  };
  debug!(identity = %asset.identity, file = %file, "computed asset integrity");

  Ok(AssetDetails {
    identity: asset.identity.clone(),
    file,
    file_length: content.len() as u64,
    integrity,
  })
}

/// The logical path a candidate is matched and filtered with.
fn candidate_match_path(candidate: &TaskItem, content_root: Option<&str>) -> String {
  for field in [TARGET_PATH_METADATA, "RelativePath", "Link"] {
    let value = candidate.get_metadata(field);
    if !value.is_empty() {
      return normalize_logical_path(value);
    }
  }

  if let Some(content_root) = content_root {
    let full_path = candidate.full_path();
    let content_root = normalize_content_root(content_root);
    if let Some(relative) = full_path.strip_prefix(&content_root) {
      return normalize_logical_path(relative);
    }
  }

  normalize_logical_path(&candidate.item_spec)
}

/// Identity of a candidate, and whether it was synthesized under the content root.
fn compute_identity(
  candidate: &TaskItem,
  content_root: &str,
  pattern: Option<&str>,
  matcher: &dyn GlobMatcher,
) -> (String, bool) {
  let full_path = candidate.full_path();
  let content_root = normalize_content_root(content_root);
  if is_under(&full_path, &content_root) {
    return (full_path, false);
  }

  if let Some(pattern) = pattern {
    let matched = matcher.match_path(pattern, &candidate.item_spec);
    if matched.has_match {
      let identity = join_logical(&content_root, &normalize_logical_path(&matched.stem));
      debug!(item = %candidate.item_spec, identity = %identity, "computed identity under content root");
      return (identity, true);
    }
  }

  (full_path, false)
}
