//! The persisted asset manifest.
//!
//! A manifest is the complete, ordered record of one project's assets plus the
//! information consumers need to find more of them: the manifests it was built
//! from and the patterns it discovered assets with.
//!
//! # Format
//!
//! ```json
//! {
//!   "Version": 1,
//!   "Hash": "uU0nuZNNPgilLlLX2n2r+sSE7+N6U4DukIj3rOLvzek=",
//!   "Source": "Lib",
//!   "BasePath": "_content/Lib",
//!   "Mode": "Default",
//!   "ManifestType": "Build",
//!   "RelatedManifests": [],
//!   "DiscoveryPatterns": [
//!     { "Name": "Lib\\wwwroot", "ContentRoot": "/proj/wwwroot/", "BasePath": "_content/Lib", "Pattern": "**" }
//!   ],
//!   "Assets": [ { "Identity": "/proj/wwwroot/site.css", "SourceId": "Lib", ... } ]
//! }
//! ```
//!
//! # Hashing
//!
//! The hash covers every field except `Version` and `Hash`, serialized in
//! declaration order with lists in construction order. Two manifests built from
//! the same inputs in the same order always hash the same.

use serde::{Deserialize, Serialize};

use crate::asset::{AssetRecord, metadata_enum};
use crate::consts::MANIFEST_VERSION;
use crate::util::hash::{ContentHash, HashError, Hashable};

metadata_enum! {
  /// How the manifest's project is hosted.
  ManifestMode => "Mode" {
    Default,
    Root,
    SelfContained,
  }
}

metadata_enum! {
  /// Lifecycle the manifest describes.
  ManifestType => "ManifestType" {
    Build,
    Publish,
  }
}

/// A manifest this one was built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RelatedManifest {
  /// Full path of the related manifest file.
  pub identity: String,
  pub source: String,
  #[serde(rename = "Type")]
  pub manifest_type: ManifestType,
  pub hash: String,
}

/// A pattern a project discovers assets with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DiscoveryPattern {
  pub name: String,
  pub content_root: String,
  pub base_path: String,
  pub pattern: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Manifest {
  pub version: u32,
  pub hash: String,
  pub source: String,
  pub base_path: String,
  pub mode: ManifestMode,
  pub manifest_type: ManifestType,
  pub related_manifests: Vec<RelatedManifest>,
  pub discovery_patterns: Vec<DiscoveryPattern>,
  pub assets: Vec<AssetRecord>,
}

/// The hashed part of a manifest, borrowed.
#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct HashedContent<'a> {
  source: &'a str,
  base_path: &'a str,
  mode: ManifestMode,
  manifest_type: ManifestType,
  related_manifests: &'a [RelatedManifest],
  discovery_patterns: &'a [DiscoveryPattern],
  assets: &'a [AssetRecord],
}

impl Hashable for HashedContent<'_> {}

impl Manifest {
  /// Build a manifest and stamp it with its hash.
  pub fn new(
    source: impl Into<String>,
    base_path: impl Into<String>,
    mode: ManifestMode,
    manifest_type: ManifestType,
    related_manifests: Vec<RelatedManifest>,
    discovery_patterns: Vec<DiscoveryPattern>,
    assets: Vec<AssetRecord>,
  ) -> Result<Self, HashError> {
    let mut manifest = Self {
      version: MANIFEST_VERSION,
      hash: String::new(),
      source: source.into(),
      base_path: base_path.into(),
      mode,
      manifest_type,
      related_manifests,
      discovery_patterns,
      assets,
    };
    manifest.hash = manifest.compute_hash()?.0;
    Ok(manifest)
  }

  /// Hash of the current field values, independent of the stored `hash`.
  pub fn compute_hash(&self) -> Result<ContentHash, HashError> {
    HashedContent {
      source: &self.source,
      base_path: &self.base_path,
      mode: self.mode,
      manifest_type: self.manifest_type,
      related_manifests: &self.related_manifests,
      discovery_patterns: &self.discovery_patterns,
      assets: &self.assets,
    }
    .compute_hash()
  }

  /// Whether the stored hash matches the content.
  pub fn is_hash_current(&self) -> bool {
    self.compute_hash().is_ok_and(|hash| hash.0 == self.hash)
  }

  /// A reference to this manifest as stored at `identity`.
  pub fn as_related(&self, identity: impl Into<String>) -> RelatedManifest {
    RelatedManifest {
      identity: identity.into(),
      source: self.source.clone(),
      manifest_type: self.manifest_type,
      hash: self.hash.clone(),
    }
  }
}
