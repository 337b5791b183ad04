//! Test utilities for swa-lib.
//!
//! Helpers for building candidates and records with platform-correct absolute
//! paths, so assertions read the same on Unix and Windows.

use std::path::MAIN_SEPARATOR;

use crate::asset::{AssetKind, AssetMode, AssetRecord, CopyOption, SourceType};
use crate::item::TaskItem;

/// A rooted path for the fake project tree, using native separators.
#[cfg(unix)]
pub fn abs(relative: &str) -> String {
  format!("/proj/{}", relative.replace('\\', "/"))
}

#[cfg(windows)]
pub fn abs(relative: &str) -> String {
  format!("C:\\proj\\{}", relative.replace('/', "\\"))
}

/// The normalized content root for a directory under the fake project.
pub fn root(relative: &str) -> String {
  format!("{}{}", abs(relative.trim_end_matches('/')), MAIN_SEPARATOR)
}

/// A candidate whose item spec is relative and whose full path lives under the fake project.
pub fn candidate(item_spec: &str, metadata: &[(&str, &str)]) -> TaskItem {
  let mut item = TaskItem::new(item_spec).with_metadata("FullPath", &abs(item_spec));
  for (key, value) in metadata {
    item = item.with_metadata(key, value);
  }
  item
}

/// A valid, normalized record with `All` everywhere and no copying to the output.
pub fn asset(relative_path: &str, source_type: SourceType) -> AssetRecord {
  AssetRecord {
    identity: abs(&format!("wwwroot/{}", relative_path)),
    source_id: "Lib".to_string(),
    source_type,
    content_root: root("wwwroot"),
    base_path: "_content/Lib".to_string(),
    relative_path: relative_path.to_string(),
    asset_kind: AssetKind::All,
    asset_mode: AssetMode::All,
    copy_to_output_directory: CopyOption::Never,
    copy_to_publish_directory: CopyOption::PreserveNewest,
  }
}
