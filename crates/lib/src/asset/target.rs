//! Grouping a project's assets by the path they occupy once laid out.
//!
//! Two assets of one project may share a target path only when one is the
//! Build flavor and the other the Publish flavor of the same file. An `All`
//! asset for a path yields to a more specific asset for that path.

use std::collections::HashMap;

use thiserror::Error;
use tracing::debug;

use super::record::AssetRecord;
use super::types::AssetKind;

/// An asset together with the path it occupies.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTarget<'a> {
  pub target_path: String,
  pub asset: &'a AssetRecord,
}

#[derive(Debug, Error, PartialEq)]
pub enum TargetPathError {
  #[error("conflicting assets with the same target path '{path}': '{first}' and '{second}' are both {kind} assets")]
  Conflict {
    path: String,
    kind: AssetKind,
    first: String,
    second: String,
  },
}

/// Resolve the target path of every asset of `source_id` applicable to `kind`.
///
/// Output order is the order in which each target path was first seen.
pub fn resolve_target_paths<'a>(
  assets: &'a [AssetRecord],
  source_id: &str,
  kind: AssetKind,
) -> Result<Vec<ResolvedTarget<'a>>, TargetPathError> {
  let mut resolved: Vec<ResolvedTarget<'a>> = Vec::new();
  let mut index: HashMap<String, usize> = HashMap::new();

  for asset in assets {
    if asset.source_id != source_id || asset.asset_kind.is_opposite_of(kind) {
      continue;
    }

    let target_path = asset.compute_target_path("", '/');
    let Some(position) = index.get(&target_path).copied() else {
      index.insert(target_path.clone(), resolved.len());
      resolved.push(ResolvedTarget { target_path, asset });
      continue;
    };

    let existing = resolved[position].asset;
    if existing.asset_kind == asset.asset_kind {
      return Err(TargetPathError::Conflict {
        path: target_path,
        kind: asset.asset_kind,
        first: existing.identity.clone(),
        second: asset.identity.clone(),
      });
    }

    if existing.asset_kind == AssetKind::All {
      debug!(path = %target_path, identity = %asset.identity, "specific asset replaces shared asset");
      resolved[position].asset = asset;
    }
  }

  Ok(resolved)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::asset::SourceType;
  use crate::util::testutil::{abs, asset};

  fn with_kind(relative_path: &str, identity: &str, kind: AssetKind) -> AssetRecord {
    let mut record = asset(relative_path, SourceType::Discovered);
    record.identity = abs(identity);
    record.asset_kind = kind;
    record
  }

  #[test]
  fn distinct_paths_keep_input_order() {
    let assets = vec![
      asset("b.js", SourceType::Discovered),
      asset("a.js", SourceType::Discovered),
    ];
    let resolved = resolve_target_paths(&assets, "Lib", AssetKind::All).unwrap();
    let paths: Vec<_> = resolved.iter().map(|r| r.target_path.as_str()).collect();
    assert_eq!(paths, vec!["b.js", "a.js"]);
  }

  #[test]
  fn other_sources_are_ignored() {
    let mut other = asset("a.js", SourceType::Project);
    other.source_id = "Other".to_string();
    let assets = vec![other];
    assert!(resolve_target_paths(&assets, "Lib", AssetKind::All).unwrap().is_empty());
  }

  #[test]
  fn opposite_kind_is_skipped() {
    let assets = vec![with_kind("a.js", "obj/a.js", AssetKind::Publish)];
    assert!(resolve_target_paths(&assets, "Lib", AssetKind::Build).unwrap().is_empty());
  }

  #[test]
  fn build_replaces_all_for_same_path() {
    let assets = vec![
      with_kind("a.js", "wwwroot/a.js", AssetKind::All),
      with_kind("a.js", "obj/a.js", AssetKind::Build),
    ];
    let resolved = resolve_target_paths(&assets, "Lib", AssetKind::Build).unwrap();
    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].asset.identity, abs("obj/a.js"));
  }

  #[test]
  fn all_does_not_replace_specific_asset() {
    let assets = vec![
      with_kind("a.js", "obj/a.js", AssetKind::Publish),
      with_kind("a.js", "wwwroot/a.js", AssetKind::All),
    ];
    let resolved = resolve_target_paths(&assets, "Lib", AssetKind::Publish).unwrap();
    assert_eq!(resolved[0].asset.identity, abs("obj/a.js"));
  }

  #[test]
  fn same_kind_for_same_path_conflicts() {
    let assets = vec![
      with_kind("a.js", "wwwroot/a.js", AssetKind::All),
      with_kind("a.js", "obj/a.js", AssetKind::All),
    ];
    let err = resolve_target_paths(&assets, "Lib", AssetKind::All).unwrap_err();
    assert_eq!(
      err,
      TargetPathError::Conflict {
        path: "a.js".to_string(),
        kind: AssetKind::All,
        first: abs("wwwroot/a.js"),
        second: abs("obj/a.js"),
      }
    );
  }
}
