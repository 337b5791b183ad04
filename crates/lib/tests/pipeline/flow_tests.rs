//! Discover, persist, reference and copy in one pass.

use std::path::Path;

use swa_lib::aggregate::aggregate_manifests;
use swa_lib::asset::path::{full_path, normalize_content_root};
use swa_lib::asset::{AssetKind, AssetRecord, CopyOption, SourceType};
use swa_lib::consts::{BUILD_MANIFEST_FILENAME, RUNTIME_MANIFEST_FILENAME};
use swa_lib::copy::{CopyDestination, plan_output_copies, plan_publish_copies};
use swa_lib::define::{DefineOptions, define_assets};
use swa_lib::discover::{DiscoverOptions, discover_assets, scan_candidates};
use swa_lib::glob::PatternMatcher;
use swa_lib::manifest::{
  Manifest, ManifestMode, ManifestType, PersistOutcome, RuntimeManifest, load_manifest, persist_manifest,
};
use tempfile::TempDir;

use crate::common::{path_string, project, with_copy_policy};

fn discover(project_dir: &Path, policy: &str) -> Vec<AssetRecord> {
  let candidates = scan_candidates(project_dir, Path::new("wwwroot")).unwrap();
  let options = DiscoverOptions {
    pattern: "wwwroot/**".to_string(),
    source_id: "Lib".to_string(),
    content_root: path_string(&project_dir.join("wwwroot")),
    base_path: "_content/Lib".to_string(),
  };
  discover_assets(&with_copy_policy(candidates, policy), &options, &PatternMatcher).unwrap()
}

fn build_manifest(assets: Vec<AssetRecord>) -> Manifest {
  Manifest::new(
    "Lib",
    "_content/Lib",
    ManifestMode::Default,
    ManifestType::Build,
    Vec::new(),
    Vec::new(),
    assets,
  )
  .unwrap()
}

mod producing_project {
  use super::*;

  #[test]
  fn discovered_assets_are_normalized() {
    let temp = project();
    let assets = discover(temp.path(), "PreserveNewest");

    let paths: Vec<_> = assets.iter().map(|a| a.relative_path.as_str()).collect();
    assert_eq!(paths, vec!["css/site.css", "js/app.js"]);

    let root = normalize_content_root(&path_string(&temp.path().join("wwwroot")));
    for asset in &assets {
      assert_eq!(asset.source_type, SourceType::Discovered);
      assert_eq!(asset.asset_kind, AssetKind::All);
      assert_eq!(asset.content_root, root);
      assert!(asset.identity.starts_with(&root));
    }
  }

  #[test]
  fn manifest_round_trips_and_skips_identical_writes() {
    let temp = project();
    let manifest = build_manifest(discover(temp.path(), "PreserveNewest"));
    let path = temp.path().join("obj").join(BUILD_MANIFEST_FILENAME);

    assert_eq!(persist_manifest(&manifest, &path).unwrap(), PersistOutcome::Written);
    assert_eq!(persist_manifest(&manifest, &path).unwrap(), PersistOutcome::Unchanged);

    let loaded = load_manifest(&path).unwrap();
    assert_eq!(loaded, manifest);
    assert!(loaded.is_hash_current());
  }

  #[test]
  fn runtime_manifest_agrees_with_manifest() {
    let temp = project();
    let manifest = build_manifest(discover(temp.path(), "PreserveNewest"));
    let path = temp.path().join("obj").join(RUNTIME_MANIFEST_FILENAME);

    let runtime = RuntimeManifest::from_manifest(&manifest);
    assert_eq!(runtime.content_roots.len(), 1);
    assert_eq!(runtime.save(&path).unwrap(), PersistOutcome::Written);
    assert_eq!(runtime.save(&path).unwrap(), PersistOutcome::Unchanged);

    let loaded = RuntimeManifest::load(&path).unwrap();
    assert_eq!(loaded, runtime);
    loaded.verify_consistent(&manifest).unwrap();
  }

  #[test]
  fn output_plan_copies_each_local_asset() {
    let temp = project();
    let assets = discover(temp.path(), "Always");
    let bin = temp.path().join("bin");

    let plan = plan_output_copies(&assets, &bin);
    assert_eq!(plan.len(), 2);
    assert_eq!(plan[0].target_path, full_path(&path_string(&bin.join("css/site.css"))));
    assert_eq!(plan[0].policy, CopyOption::Always);
    assert_eq!(plan[0].destination, CopyDestination::Output);
  }

  #[test]
  fn define_filters_on_content_root_relative_path() {
    let temp = project();
    let candidates = scan_candidates(temp.path(), Path::new("wwwroot")).unwrap();
    let options = DefineOptions {
      source_id: Some("Lib".to_string()),
      source_type: Some(SourceType::Computed),
      content_root: Some(path_string(&temp.path().join("wwwroot"))),
      base_path: Some("_content/Lib".to_string()),
      relative_path_filter: Some("**/*.js".to_string()),
      ..DefineOptions::default()
    };

    let outcome = define_assets(&candidates, &options, &PatternMatcher).unwrap();
    assert_eq!(outcome.assets.len(), 1);
    assert_eq!(outcome.assets[0].relative_path, "js/app.js");
    assert_eq!(outcome.assets[0].source_type, SourceType::Computed);
    assert_eq!(outcome.assets[0].asset_kind, AssetKind::Publish);
    assert!(outcome.copy_candidates.is_empty());
  }
}

mod consuming_project {
  use super::*;

  fn produce(temp: &TempDir) -> std::path::PathBuf {
    let manifest = build_manifest(discover(temp.path(), "PreserveNewest"));
    let path = temp.path().join("obj").join(BUILD_MANIFEST_FILENAME);
    persist_manifest(&manifest, &path).unwrap();
    path
  }

  #[test]
  fn referenced_assets_become_project_assets() {
    let temp = project();
    let path = produce(&temp);

    let outcome = aggregate_manifests(&[&path], AssetKind::Build).unwrap();
    assert_eq!(outcome.assets.len(), 2);
    assert!(outcome.assets.iter().all(|a| a.source_type == SourceType::Project));
    assert_eq!(outcome.related_manifests.len(), 1);
    assert_eq!(outcome.related_manifests[0].source, "Lib");
  }

  #[test]
  fn referenced_assets_publish_under_base_path() {
    let temp = project();
    let path = produce(&temp);
    let outcome = aggregate_manifests(&[&path], AssetKind::Publish).unwrap();
    let publish = temp.path().join("publish");

    assert!(plan_output_copies(&outcome.assets, &temp.path().join("bin")).is_empty());

    let plan = plan_publish_copies(&outcome.assets, &publish, "wwwroot");
    let targets: Vec<_> = plan.iter().map(|i| i.target_path.clone()).collect();
    assert_eq!(
      targets,
      vec![
        full_path(&path_string(&publish.join("wwwroot/_content/Lib/css/site.css"))),
        full_path(&path_string(&publish.join("wwwroot/_content/Lib/js/app.js"))),
      ]
    );
  }
}
