//! Shared fixtures for pipeline tests.

use std::fs;
use std::path::Path;

use swa_lib::item::TaskItem;
use tempfile::TempDir;

/// A project directory with a small `wwwroot` tree.
pub fn project() -> TempDir {
  let temp = TempDir::new().unwrap();
  let wwwroot = temp.path().join("wwwroot");
  fs::create_dir_all(wwwroot.join("css")).unwrap();
  fs::create_dir_all(wwwroot.join("js")).unwrap();
  fs::write(wwwroot.join("css/site.css"), "body {}").unwrap();
  fs::write(wwwroot.join("js/app.js"), "console.log(1);").unwrap();
  temp
}

/// Attach the same copy policy for output and publish to every candidate.
pub fn with_copy_policy(candidates: Vec<TaskItem>, policy: &str) -> Vec<TaskItem> {
  candidates
    .into_iter()
    .map(|c| {
      c.with_metadata("CopyToOutputDirectory", policy)
        .with_metadata("CopyToPublishDirectory", policy)
    })
    .collect()
}

pub fn path_string(path: &Path) -> String {
  path.to_string_lossy().into_owned()
}
