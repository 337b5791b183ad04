//! Reading and writing manifest files.
//!
//! Writes are content-addressed: a manifest whose hash equals the hash already
//! on disk is not written at all, so the file's timestamp only moves when its
//! content does. Files are replaced atomically (write to temp, then rename).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::types::Manifest;
use crate::asset::AssetError;
use crate::consts::MANIFEST_VERSION;

/// Whether persisting touched the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistOutcome {
  Written,
  Unchanged,
}

#[derive(Debug, Error)]
pub enum ManifestError {
  #[error("manifest not found: {0}")]
  NotFound(String),

  #[error("failed to read manifest {path}: {source}")]
  Read {
    path: String,
    #[source]
    source: io::Error,
  },

  #[error("failed to write manifest {path}: {source}")]
  Write {
    path: String,
    #[source]
    source: io::Error,
  },

  #[error("failed to parse manifest {path}: {source}")]
  Parse {
    path: String,
    #[source]
    source: serde_json::Error,
  },

  #[error("failed to serialize manifest: {0}")]
  Serialize(#[source] serde_json::Error),

  #[error("unsupported manifest version {version} in {path}, expected {}", MANIFEST_VERSION)]
  UnsupportedVersion { path: String, version: u32 },

  #[error("invalid asset in manifest {path}: {source}")]
  InvalidAsset {
    path: String,
    #[source]
    source: AssetError,
  },
}

/// Just the hash of a stored manifest.
#[derive(Deserialize)]
struct StoredHash {
  #[serde(rename = "Hash", default)]
  hash: String,
}

/// Persist `manifest` at `path` unless the stored manifest has the same hash.
///
/// A stored file that cannot be read or parsed is replaced.
pub fn persist_manifest(manifest: &Manifest, path: &Path) -> Result<PersistOutcome, ManifestError> {
  match stored_hash(path) {
    Ok(Some(hash)) if hash == manifest.hash => {
      debug!(path = %path.display(), hash = %hash, "manifest unchanged, skipping write");
      return Ok(PersistOutcome::Unchanged);
    }
    Ok(_) => {}
    Err(message) => {
      warn!(path = %path.display(), error = %message, "existing manifest is unreadable, overwriting");
    }
  }

  let content = serde_json::to_string_pretty(manifest).map_err(ManifestError::Serialize)?;
  write_atomic(path, content.as_bytes()).map_err(|source| ManifestError::Write {
    path: path.display().to_string(),
    source,
  })?;

  info!(path = %path.display(), hash = %manifest.hash, assets = manifest.assets.len(), "wrote manifest");
  Ok(PersistOutcome::Written)
}

/// Hash of the manifest stored at `path`, `None` when there is no file.
fn stored_hash(path: &Path) -> Result<Option<String>, String> {
  let content = match fs::read_to_string(path) {
    Ok(content) => content,
    Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
    Err(e) => return Err(e.to_string()),
  };

  let stored: StoredHash = serde_json::from_str(&content).map_err(|e| e.to_string())?;
  Ok(Some(stored.hash))
}

/// Replace `path` with `content`: write a sibling temp file, then rename over.
pub(crate) fn write_atomic(path: &Path, content: &[u8]) -> io::Result<()> {
  if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
    fs::create_dir_all(parent)?;
  }

  let temp_path = temp_sibling(path);
  fs::write(&temp_path, content)?;
  fs::rename(&temp_path, path)
}

fn temp_sibling(path: &Path) -> PathBuf {
  let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
  name.push(".tmp");
  path.with_file_name(name)
}

/// Load and validate the manifest at `path`.
pub fn load_manifest(path: &Path) -> Result<Manifest, ManifestError> {
  let display = || path.display().to_string();

  let content = match fs::read_to_string(path) {
    Ok(content) => content,
    Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(ManifestError::NotFound(display())),
    Err(source) => return Err(ManifestError::Read { path: display(), source }),
  };

  let manifest: Manifest = serde_json::from_str(&content).map_err(|source| ManifestError::Parse {
    path: display(),
    source,
  })?;

  if manifest.version != MANIFEST_VERSION {
    return Err(ManifestError::UnsupportedVersion {
      path: display(),
      version: manifest.version,
    });
  }

  for asset in &manifest.assets {
    asset
      .validate()
      .map_err(|source| ManifestError::InvalidAsset { path: display(), source })?;
  }

  debug!(path = %path.display(), assets = manifest.assets.len(), "loaded manifest");
  Ok(manifest)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::asset::SourceType;
  use crate::manifest::{ManifestMode, ManifestType};
  use crate::util::testutil::asset;
  use std::time::Duration;
  use tempfile::TempDir;

  fn manifest(relative_paths: &[&str]) -> Manifest {
    Manifest::new(
      "Lib",
      "_content/Lib",
      ManifestMode::Default,
      ManifestType::Build,
      Vec::new(),
      Vec::new(),
      relative_paths
        .iter()
        .map(|p| asset(p, SourceType::Discovered))
        .collect(),
    )
    .unwrap()
  }

  mod persist {
    use super::*;

    #[test]
    fn writes_when_missing() {
      let temp = TempDir::new().unwrap();
      let path = temp.path().join("obj/staticwebassets.build.json");

      let outcome = persist_manifest(&manifest(&["a.js"]), &path).unwrap();
      assert_eq!(outcome, PersistOutcome::Written);
      assert!(path.exists());
      assert!(!temp_sibling(&path).exists());
    }

    #[test]
    fn same_hash_leaves_file_untouched() {
      let temp = TempDir::new().unwrap();
      let path = temp.path().join("staticwebassets.build.json");
      persist_manifest(&manifest(&["a.js"]), &path).unwrap();

      let before_content = fs::read(&path).unwrap();
      let before_modified = fs::metadata(&path).unwrap().modified().unwrap();
      std::thread::sleep(Duration::from_millis(20));

      let outcome = persist_manifest(&manifest(&["a.js"]), &path).unwrap();
      assert_eq!(outcome, PersistOutcome::Unchanged);
      assert_eq!(fs::read(&path).unwrap(), before_content);
      assert_eq!(fs::metadata(&path).unwrap().modified().unwrap(), before_modified);
    }

    #[test]
    fn different_hash_rewrites() {
      let temp = TempDir::new().unwrap();
      let path = temp.path().join("staticwebassets.build.json");
      persist_manifest(&manifest(&["a.js"]), &path).unwrap();

      let outcome = persist_manifest(&manifest(&["a.js", "b.js"]), &path).unwrap();
      assert_eq!(outcome, PersistOutcome::Written);
      assert_eq!(load_manifest(&path).unwrap().assets.len(), 2);
    }

    #[test]
    fn only_the_stored_hash_is_compared() {
      let temp = TempDir::new().unwrap();
      let path = temp.path().join("staticwebassets.build.json");
      let m = manifest(&["a.js"]);
      fs::write(&path, format!(r#"{{"Hash":"{}"}}"#, m.hash)).unwrap();

      assert_eq!(persist_manifest(&m, &path).unwrap(), PersistOutcome::Unchanged);
    }

    #[test]
    fn unparsable_file_is_overwritten() {
      let temp = TempDir::new().unwrap();
      let path = temp.path().join("staticwebassets.build.json");
      fs::write(&path, "{ not json").unwrap();

      assert_eq!(persist_manifest(&manifest(&["a.js"]), &path).unwrap(), PersistOutcome::Written);
      assert!(load_manifest(&path).is_ok());
    }
  }

  mod load {
    use super::*;

    #[test]
    fn missing_file_is_not_found() {
      let temp = TempDir::new().unwrap();
      let err = load_manifest(&temp.path().join("nope.json")).unwrap_err();
      assert!(matches!(err, ManifestError::NotFound(_)));
    }

    #[test]
    fn round_trips_content() {
      let temp = TempDir::new().unwrap();
      let path = temp.path().join("m.json");
      let m = manifest(&["a.js", "css/site.css"]);
      persist_manifest(&m, &path).unwrap();
      assert_eq!(load_manifest(&path).unwrap(), m);
    }

    #[test]
    fn unsupported_version_is_fatal() {
      let temp = TempDir::new().unwrap();
      let path = temp.path().join("m.json");
      let mut m = manifest(&["a.js"]);
      m.version = 2;
      fs::write(&path, serde_json::to_string(&m).unwrap()).unwrap();

      let err = load_manifest(&path).unwrap_err();
      assert!(matches!(err, ManifestError::UnsupportedVersion { version: 2, .. }));
    }

    #[test]
    fn unknown_enum_value_is_parse_error() {
      let temp = TempDir::new().unwrap();
      let path = temp.path().join("m.json");
      let m = manifest(&["a.js"]);
      let json = serde_json::to_string(&m).unwrap().replace("\"Discovered\"", "\"Downloaded\"");
      fs::write(&path, json).unwrap();

      assert!(matches!(load_manifest(&path), Err(ManifestError::Parse { .. })));
    }

    #[test]
    fn empty_required_field_is_invalid() {
      let temp = TempDir::new().unwrap();
      let path = temp.path().join("m.json");
      let mut m = manifest(&["a.js"]);
      m.assets[0].source_id = String::new();
      fs::write(&path, serde_json::to_string(&m).unwrap()).unwrap();

      assert!(matches!(load_manifest(&path), Err(ManifestError::InvalidAsset { .. })));
    }
  }
}
