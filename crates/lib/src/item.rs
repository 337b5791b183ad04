//! Task items exchanged with the build engine.
//!
//! A task item is an item spec plus a string-keyed metadata bag. It is the only
//! shape the crate accepts from, and hands back to, the outside world; every
//! operation converts items to typed records as soon as it receives them.
//!
//! # Format
//!
//! ```json
//! [
//!   {
//!     "itemSpec": "wwwroot/css/site.css",
//!     "metadata": { "CopyToPublishDirectory": "PreserveNewest" }
//!   }
//! ]
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::asset::path::full_path;
use crate::consts::FULL_PATH_METADATA;

/// An item spec with its metadata.
///
/// Metadata is kept in a [`BTreeMap`] so serialized items are byte-stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskItem {
  pub item_spec: String,
  #[serde(default)]
  pub metadata: BTreeMap<String, String>,
}

/// Errors reading or writing item list files.
#[derive(Debug, Error)]
pub enum ItemError {
  #[error("failed to read item file {path}: {source}")]
  Read {
    path: String,
    #[source]
    source: io::Error,
  },

  #[error("failed to write item file {path}: {source}")]
  Write {
    path: String,
    #[source]
    source: io::Error,
  },

  #[error("failed to parse item file {path}: {source}")]
  Parse {
    path: String,
    #[source]
    source: serde_json::Error,
  },

  #[error("failed to serialize items: {0}")]
  Serialize(#[source] serde_json::Error),
}

impl TaskItem {
  pub fn new(item_spec: impl Into<String>) -> Self {
    Self {
      item_spec: item_spec.into(),
      metadata: BTreeMap::new(),
    }
  }

  pub fn with_metadata(mut self, name: &str, value: &str) -> Self {
    self.set_metadata(name, value);
    self
  }

  /// Returns the metadata value, or `""` when it is not set.
  pub fn get_metadata(&self, name: &str) -> &str {
    self.metadata.get(name).map(String::as_str).unwrap_or("")
  }

  pub fn set_metadata(&mut self, name: &str, value: &str) {
    self.metadata.insert(name.to_string(), value.to_string());
  }

  /// Absolute, lexically normalized path of the item.
  ///
  /// An explicit `FullPath` metadata value wins over the item spec.
  pub fn full_path(&self) -> String {
    match self.get_metadata(FULL_PATH_METADATA) {
      "" => full_path(&self.item_spec),
      explicit => full_path(explicit),
    }
  }
}

/// Read a JSON array of items.
pub fn read_items(path: &Path) -> Result<Vec<TaskItem>, ItemError> {
  let content = fs::read_to_string(path).map_err(|source| ItemError::Read {
    path: path.display().to_string(),
    source,
  })?;

  serde_json::from_str(&content).map_err(|source| ItemError::Parse {
    path: path.display().to_string(),
    source,
  })
}

/// Write a JSON array of items, pretty-printed.
pub fn write_items(path: &Path, items: &[TaskItem]) -> Result<(), ItemError> {
  let content = serde_json::to_string_pretty(items).map_err(ItemError::Serialize)?;
  fs::write(path, content).map_err(|source| ItemError::Write {
    path: path.display().to_string(),
    source,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::util::testutil::abs;
  use tempfile::TempDir;

  #[test]
  fn unset_metadata_is_empty() {
    let item = TaskItem::new("wwwroot/site.css");
    assert_eq!(item.get_metadata("RelativePath"), "");
  }

  #[test]
  fn explicit_full_path_wins() {
    let item = TaskItem::new("site.css").with_metadata("FullPath", &abs("wwwroot/site.css"));
    assert_eq!(item.full_path(), abs("wwwroot/site.css"));
  }

  #[test]
  fn full_path_of_relative_spec_is_absolute() {
    let item = TaskItem::new("wwwroot/site.css");
    assert!(Path::new(&item.full_path()).is_absolute());
    assert!(item.full_path().ends_with("site.css"));
  }

  #[test]
  fn json_shape_uses_camel_case() {
    let item = TaskItem::new("a.js").with_metadata("SourceId", "Lib");
    let json = serde_json::to_string(&item).unwrap();
    assert_eq!(json, r#"{"itemSpec":"a.js","metadata":{"SourceId":"Lib"}}"#);
  }

  #[test]
  fn metadata_defaults_to_empty_when_missing() {
    let item: TaskItem = serde_json::from_str(r#"{"itemSpec":"a.js"}"#).unwrap();
    assert!(item.metadata.is_empty());
  }

  #[test]
  fn write_then_read_items() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("items.json");
    let items = vec![
      TaskItem::new("a.js").with_metadata("RelativePath", "a.js"),
      TaskItem::new("b.css"),
    ];

    write_items(&path, &items).unwrap();
    assert_eq!(read_items(&path).unwrap(), items);
  }

  #[test]
  fn read_invalid_items_is_parse_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("items.json");
    fs::write(&path, "{ not a list").unwrap();

    assert!(matches!(read_items(&path), Err(ItemError::Parse { .. })));
  }
}
