//! The flat runtime manifest.
//!
//! The runtime only needs to know which base path maps to which physical
//! content root, so this form lists unique `(BasePath, ContentRoot)` pairs and
//! nothing per asset:
//!
//! ```xml
//! <StaticWebAssets Version="1.0">
//!   <ContentRoot BasePath="_content/Lib" Path="/proj/wwwroot/"/>
//! </StaticWebAssets>
//! ```
//!
//! Publish-only assets never exist at development time and are left out.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesEnd, BytesStart, Event};
use thiserror::Error;
use tracing::{debug, info};

use super::storage::{PersistOutcome, write_atomic};
use super::types::Manifest;
use crate::asset::AssetRecord;
use crate::consts::RUNTIME_MANIFEST_VERSION;

/// One base path served from one content root.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ContentRootMapping {
  pub base_path: String,
  pub path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeManifest {
  pub content_roots: Vec<ContentRootMapping>,
}

#[derive(Debug, Error)]
pub enum RuntimeManifestError {
  #[error("runtime manifest not found: {0}")]
  NotFound(String),

  #[error("failed to read runtime manifest {path}: {source}")]
  Read {
    path: String,
    #[source]
    source: io::Error,
  },

  #[error("failed to write runtime manifest {path}: {source}")]
  Write {
    path: String,
    #[source]
    source: io::Error,
  },

  #[error("malformed runtime manifest: {0}")]
  Xml(String),

  #[error("unsupported runtime manifest version '{}', expected '{}'", .0, RUNTIME_MANIFEST_VERSION)]
  UnsupportedVersion(String),

  /// The two manifest forms disagree about the content roots.
  #[error("runtime manifest is inconsistent with manifest: {0}")]
  Inconsistent(String),
}

impl RuntimeManifest {
  /// Unique mappings of the assets that exist at development time, in first-seen order.
  pub fn from_assets(assets: &[AssetRecord]) -> Self {
    let mut seen = BTreeSet::new();
    let mut content_roots = Vec::new();

    for asset in assets.iter().filter(|a| !a.is_publish_only()) {
      let mapping = ContentRootMapping {
        base_path: asset.base_path.clone(),
        path: asset.content_root.clone(),
      };
      if seen.insert(mapping.clone()) {
        content_roots.push(mapping);
      }
    }

    Self { content_roots }
  }

  pub fn from_manifest(manifest: &Manifest) -> Self {
    Self::from_assets(&manifest.assets)
  }

  pub fn to_xml(&self) -> Result<String, RuntimeManifestError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    let mut root = BytesStart::new("StaticWebAssets");
    root.push_attribute(("Version", RUNTIME_MANIFEST_VERSION));
    writer.write_event(Event::Start(root)).map_err(xml_error)?;

    for mapping in &self.content_roots {
      let mut element = BytesStart::new("ContentRoot");
      element.push_attribute(("BasePath", mapping.base_path.as_str()));
      element.push_attribute(("Path", mapping.path.as_str()));
      writer.write_event(Event::Empty(element)).map_err(xml_error)?;
    }

    writer
      .write_event(Event::End(BytesEnd::new("StaticWebAssets")))
      .map_err(xml_error)?;

    String::from_utf8(writer.into_inner()).map_err(xml_error)
  }

  pub fn from_xml(xml: &str) -> Result<Self, RuntimeManifestError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut saw_root = false;
    let mut content_roots = Vec::new();

    loop {
      match reader.read_event().map_err(xml_error)? {
        Event::Start(element) | Event::Empty(element) => match element.name().as_ref() {
          b"StaticWebAssets" => {
            let version = attribute(&element, "Version")?.unwrap_or_default();
            if version != RUNTIME_MANIFEST_VERSION {
              return Err(RuntimeManifestError::UnsupportedVersion(version));
            }
            saw_root = true;
          }
          b"ContentRoot" => {
            let base_path = attribute(&element, "BasePath")?;
            let path = attribute(&element, "Path")?;
            let (Some(base_path), Some(path)) = (base_path, path) else {
              return Err(RuntimeManifestError::Xml(
                "ContentRoot requires 'BasePath' and 'Path'".to_string(),
              ));
            };
            content_roots.push(ContentRootMapping { base_path, path });
          }
          other => {
            debug!(element = %String::from_utf8_lossy(other), "ignoring unknown runtime manifest element");
          }
        },
        Event::Eof => break,
        _ => {}
      }
    }

    if !saw_root {
      return Err(RuntimeManifestError::Xml("missing StaticWebAssets element".to_string()));
    }

    Ok(Self { content_roots })
  }

  /// Write the manifest unless the file already holds exactly these bytes.
  pub fn save(&self, path: &Path) -> Result<PersistOutcome, RuntimeManifestError> {
    let xml = self.to_xml()?;
    if fs::read(path).is_ok_and(|existing| existing == xml.as_bytes()) {
      debug!(path = %path.display(), "runtime manifest unchanged, skipping write");
      return Ok(PersistOutcome::Unchanged);
    }

    write_atomic(path, xml.as_bytes()).map_err(|source| RuntimeManifestError::Write {
      path: path.display().to_string(),
      source,
    })?;

    info!(path = %path.display(), content_roots = self.content_roots.len(), "wrote runtime manifest");
    Ok(PersistOutcome::Written)
  }

  pub fn load(path: &Path) -> Result<Self, RuntimeManifestError> {
    let xml = match fs::read_to_string(path) {
      Ok(xml) => xml,
      Err(e) if e.kind() == io::ErrorKind::NotFound => {
        return Err(RuntimeManifestError::NotFound(path.display().to_string()));
      }
      Err(source) => {
        return Err(RuntimeManifestError::Read {
          path: path.display().to_string(),
          source,
        });
      }
    };
    Self::from_xml(&xml)
  }

  /// Check that both forms describe the same content roots.
  pub fn verify_consistent(&self, manifest: &Manifest) -> Result<(), RuntimeManifestError> {
    let expected: BTreeSet<_> = Self::from_manifest(manifest).content_roots.into_iter().collect();
    let actual: BTreeSet<_> = self.content_roots.iter().cloned().collect();

    if let Some(missing) = expected.difference(&actual).next() {
      return Err(RuntimeManifestError::Inconsistent(format!(
        "content root '{}' for base path '{}' is missing",
        missing.path, missing.base_path
      )));
    }
    if let Some(extra) = actual.difference(&expected).next() {
      return Err(RuntimeManifestError::Inconsistent(format!(
        "content root '{}' for base path '{}' has no assets",
        extra.path, extra.base_path
      )));
    }
    Ok(())
  }
}

fn attribute(element: &BytesStart<'_>, name: &str) -> Result<Option<String>, RuntimeManifestError> {
  for attr in element.attributes() {
    let attr = attr.map_err(xml_error)?;
    if attr.key.as_ref() == name.as_bytes() {
      let raw = std::str::from_utf8(&attr.value).map_err(xml_error)?;
      let value = unescape(raw).map_err(xml_error)?;
      return Ok(Some(value.into_owned()));
    }
  }
  Ok(None)
}

fn xml_error(e: impl std::fmt::Display) -> RuntimeManifestError {
  RuntimeManifestError::Xml(e.to_string())
}
