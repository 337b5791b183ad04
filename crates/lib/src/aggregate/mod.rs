//! Merging assets from referenced projects' manifests.
//!
//! Every asset a dependency defined for itself becomes a `Project` asset for
//! the consumer. Identities stay unique across the merge: two manifests may
//! repeat an identical asset, but never disagree about one.

use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;
use tracing::debug;

use crate::asset::path::full_path;
use crate::asset::{AssetKind, AssetRecord};
use crate::manifest::{ManifestError, RelatedManifest, load_manifest};

/// Merged assets plus references to the manifests they came from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateOutcome {
  pub assets: Vec<AssetRecord>,
  pub related_manifests: Vec<RelatedManifest>,
}

#[derive(Debug, Error)]
pub enum AggregateError {
  #[error("referenced manifest not found: {0}")]
  MissingManifest(String),

  #[error("failed to load referenced manifest {path}: {source}")]
  Load {
    path: String,
    #[source]
    source: ManifestError,
  },

  /// Two manifests define the same identity differently.
  #[error("conflicting definitions for asset '{identity}' in '{first}' and '{second}'")]
  Conflict {
    identity: String,
    first: String,
    second: String,
  },
}

/// Merge the assets of the manifests at `paths`, in order.
///
/// Assets of the opposite kind of `target_kind` and assets visible only to
/// their own project are not merged. Output order is first-seen.
///
/// # Errors
///
/// - [`AggregateError::MissingManifest`] for the first path that does not exist
/// - [`AggregateError::Conflict`] when an identity is defined twice with different values
pub fn aggregate_manifests<P: AsRef<Path>>(
  paths: &[P],
  target_kind: AssetKind,
) -> Result<AggregateOutcome, AggregateError> {
  let mut outcome = AggregateOutcome::default();
  // identity -> (index into outcome.assets, manifest it came from)
  let mut seen: HashMap<String, (usize, String)> = HashMap::new();

  for path in paths {
    let path = path.as_ref();
    let identity = full_path(&path.to_string_lossy());
    let manifest = load_manifest(path).map_err(|source| match source {
      ManifestError::NotFound(_) => AggregateError::MissingManifest(identity.clone()),
      source => AggregateError::Load {
        path: identity.clone(),
        source,
      },
    })?;
    debug!(manifest = %identity, source = %manifest.source, assets = manifest.assets.len(), "merging manifest");

    outcome.related_manifests.push(manifest.as_related(&identity));

    for asset in manifest.assets {
      if asset.asset_kind.is_opposite_of(target_kind) {
        debug!(identity = %asset.identity, kind = %asset.asset_kind, "skipping asset of opposite kind");
        continue;
      }
      if asset.is_for_current_project_only() {
        debug!(identity = %asset.identity, "skipping asset not visible to references");
        continue;
      }

      let asset = asset.as_referenced();
      match seen.get(&asset.identity) {
        Some((index, _)) if outcome.assets[*index] == asset => {
          debug!(identity = %asset.identity, manifest = %identity, "skipping identical duplicate asset");
          continue;
        }
        Some((_, first)) => {
          return Err(AggregateError::Conflict {
            identity: asset.identity,
            first: first.clone(),
            second: identity,
          });
        }
        None => {
          seen.insert(asset.identity.clone(), (outcome.assets.len(), identity.clone()));
          outcome.assets.push(asset);
        }
      }
    }
  }

  Ok(outcome)
}
