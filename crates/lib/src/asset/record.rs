use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::path::{combine_normalized_paths, normalize_base_path, normalize_content_root, normalize_logical_path};
use super::types::{AssetKind, AssetMode, CopyOption, SourceType, UnknownValue};
use crate::item::TaskItem;

/// One static asset, normalized.
///
/// Field order is the serialization order and therefore part of the manifest
/// hash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AssetRecord {
  pub identity: String,
  pub source_id: String,
  pub source_type: SourceType,
  pub content_root: String,
  pub base_path: String,
  pub relative_path: String,
  pub asset_kind: AssetKind,
  pub asset_mode: AssetMode,
  pub copy_to_output_directory: CopyOption,
  pub copy_to_publish_directory: CopyOption,
}

/// Errors validating or converting an asset record.
#[derive(Debug, Error, PartialEq)]
pub enum AssetError {
  #[error("the '{field}' for the asset must be defined for '{identity}'")]
  MissingField { field: &'static str, identity: String },

  #[error("{source} for '{identity}'")]
  UnknownValue {
    identity: String,
    #[source]
    source: UnknownValue,
  },
}

impl AssetRecord {
  /// Normalize the path fields in place, then validate.
  pub fn normalized(mut self) -> Result<Self, AssetError> {
    if !self.content_root.is_empty() {
      self.content_root = normalize_content_root(&self.content_root);
    }
    self.base_path = normalize_base_path(&self.base_path);
    self.relative_path = normalize_logical_path(&self.relative_path);
    self.validate()?;
    Ok(self)
  }

  /// Check that every required string field is set.
  pub fn validate(&self) -> Result<(), AssetError> {
    let required = [
      ("Identity", &self.identity),
      ("SourceId", &self.source_id),
      ("ContentRoot", &self.content_root),
      ("BasePath", &self.base_path),
      ("RelativePath", &self.relative_path),
    ];

    for (field, value) in required {
      if value.is_empty() {
        return Err(AssetError::MissingField {
          field,
          identity: self.identity.clone(),
        });
      }
    }
    Ok(())
  }

  /// Build a normalized record from an item carrying all ten metadata values.
  ///
  /// The identity is the item's full path. Enum values are parsed strictly.
  pub fn from_item(item: &TaskItem) -> Result<Self, AssetError> {
    let identity = item.full_path();

    let required = |field: &'static str| -> Result<String, AssetError> {
      match item.get_metadata(field) {
        "" => Err(AssetError::MissingField {
          field,
          identity: identity.clone(),
        }),
        value => Ok(value.to_string()),
      }
    };

    let record = Self {
      source_id: required("SourceId")?,
      source_type: parse_field(required("SourceType")?, &identity)?,
      content_root: required("ContentRoot")?,
      base_path: required("BasePath")?,
      relative_path: required("RelativePath")?,
      asset_kind: parse_field(required("AssetKind")?, &identity)?,
      asset_mode: parse_field(required("AssetMode")?, &identity)?,
      copy_to_output_directory: parse_field(required("CopyToOutputDirectory")?, &identity)?,
      copy_to_publish_directory: parse_field(required("CopyToPublishDirectory")?, &identity)?,
      identity,
    };

    record.normalized()
  }

  /// Convert back to a task item keyed by identity.
  pub fn to_item(&self) -> TaskItem {
    TaskItem::new(&self.identity)
      .with_metadata("SourceId", &self.source_id)
      .with_metadata("SourceType", self.source_type.as_str())
      .with_metadata("ContentRoot", &self.content_root)
      .with_metadata("BasePath", &self.base_path)
      .with_metadata("RelativePath", &self.relative_path)
      .with_metadata("AssetKind", self.asset_kind.as_str())
      .with_metadata("AssetMode", self.asset_mode.as_str())
      .with_metadata("CopyToOutputDirectory", self.copy_to_output_directory.as_str())
      .with_metadata("CopyToPublishDirectory", self.copy_to_publish_directory.as_str())
  }

  pub fn is_discovered(&self) -> bool {
    self.source_type == SourceType::Discovered
  }

  pub fn is_computed(&self) -> bool {
    self.source_type == SourceType::Computed
  }

  /// Owned by the current project.
  pub fn is_local(&self) -> bool {
    self.is_discovered() || self.is_computed()
  }

  pub fn is_build_only(&self) -> bool {
    self.asset_kind == AssetKind::Build
  }

  pub fn is_publish_only(&self) -> bool {
    self.asset_kind == AssetKind::Publish
  }

  pub fn is_build_and_publish(&self) -> bool {
    self.asset_kind == AssetKind::All
  }

  pub fn is_for_reference_only(&self) -> bool {
    self.asset_mode == AssetMode::Reference
  }

  pub fn is_for_current_project_only(&self) -> bool {
    self.asset_mode == AssetMode::CurrentProject
  }

  pub fn should_copy_to_output(&self) -> bool {
    self.copy_to_output_directory != CopyOption::Never
  }

  pub fn should_copy_to_publish(&self) -> bool {
    self.copy_to_publish_directory != CopyOption::Never
  }

  pub fn has_content_root(&self) -> bool {
    !self.content_root.is_empty()
  }

  /// Path of the asset once laid out under `prefix`.
  ///
  /// The current project's own assets are already rooted at its base path, so
  /// they land at `prefix/RelativePath`. Referenced assets are re-based as
  /// `prefix/BasePath/RelativePath`.
  pub fn compute_target_path(&self, prefix: &str, separator: char) -> String {
    let base_path = if self.is_local() { "" } else { &self.base_path };
    combine_normalized_paths(prefix, base_path, &self.relative_path, separator)
  }

  /// The same asset as seen by a consuming project.
  pub fn as_referenced(mut self) -> Self {
    if self.is_local() {
      debug!(identity = %self.identity, from = %self.source_type, "retagging asset as project");
      self.source_type = SourceType::Project;
    }
    self
  }
}

fn parse_field<T>(value: String, identity: &str) -> Result<T, AssetError>
where
  T: std::str::FromStr<Err = UnknownValue>,
{
  value.parse().map_err(|source| AssetError::UnknownValue {
    identity: identity.to_string(),
    source,
  })
}
