//! Path normalization for asset records.
//!
//! Two kinds of paths flow through the model:
//! - physical paths (identities, content roots), normalized to absolute,
//!   lexically resolved paths using the platform separator
//! - logical paths (base paths, relative paths), normalized to forward slashes
//!   with no leading or trailing slash
//!
//! Every function here is idempotent.

use std::path::{Component, MAIN_SEPARATOR, PathBuf};

/// Rewrite both `/` and `\` to the platform separator.
fn unify_separators(path: &str) -> String {
  if MAIN_SEPARATOR == '/' {
    path.replace('\\', "/")
  } else {
    path.replace('/', "\\")
  }
}

/// Absolute, lexically normalized form of `path` without a trailing separator.
///
/// Relative paths are resolved against the current directory. `.` and `..`
/// components are collapsed without touching the file system, so the path does
/// not need to exist.
pub fn full_path(path: &str) -> String {
  let candidate = PathBuf::from(unify_separators(path));
  let absolute = if candidate.is_absolute() {
    candidate
  } else {
    match std::env::current_dir() {
      Ok(cwd) => cwd.join(candidate),
      Err(_) => candidate,
    }
  };

  let mut normalized = PathBuf::new();
  for component in absolute.components() {
    match component {
      Component::Prefix(_) | Component::RootDir => normalized.push(component.as_os_str()),
      Component::CurDir => {}
      Component::ParentDir => {
        normalized.pop();
      }
      Component::Normal(part) => normalized.push(part),
    }
  }

  dunce::simplified(&normalized).to_string_lossy().into_owned()
}

/// Normalize a content root: absolute, with exactly one trailing separator.
pub fn normalize_content_root(path: &str) -> String {
  let full = full_path(path);
  if full.ends_with(MAIN_SEPARATOR) {
    full
  } else {
    format!("{}{}", full, MAIN_SEPARATOR)
  }
}

/// Normalize a logical URL-style path: forward slashes, no leading or trailing slash.
pub fn normalize_logical_path(path: &str) -> String {
  path.replace('\\', "/").trim_matches('/').to_string()
}

/// Normalize a base path. The application root is spelled `/`.
pub fn normalize_base_path(path: &str) -> String {
  let normalized = normalize_logical_path(path);
  if normalized.is_empty() {
    "/".to_string()
  } else {
    normalized
  }
}

/// Join normalized path pieces with `separator`, skipping empty pieces and a root base path.
pub fn combine_normalized_paths(prefix: &str, base_path: &str, route: &str, separator: char) -> String {
  let prefix = normalize_logical_path(prefix);
  let base_path = if base_path == "/" { "" } else { base_path };

  [prefix.as_str(), base_path, route]
    .iter()
    .filter(|piece| !piece.is_empty())
    .copied()
    .collect::<Vec<_>>()
    .join("/")
    .replace(['/', '\\'], &separator.to_string())
    .trim_start_matches(separator)
    .to_string()
}

/// Whether `path` (a full path) lives under `content_root` (a normalized content root).
pub fn is_under(path: &str, content_root: &str) -> bool {
  path.starts_with(content_root)
}

/// Join a logical relative path onto a physical directory.
pub fn join_logical(dir: &str, relative_path: &str) -> String {
  let mut joined = PathBuf::from(dir);
  for segment in relative_path.split('/').filter(|s| !s.is_empty()) {
    joined.push(segment);
  }
  full_path(&joined.to_string_lossy())
}
