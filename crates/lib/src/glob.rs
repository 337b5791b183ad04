//! Glob matching as a supplied capability.
//!
//! The define and discover steps only depend on [`GlobMatcher`]. Any
//! `Fn(&str, &str) -> GlobMatch` closure is a matcher, which is how a host
//! with its own glob engine plugs in. [`PatternMatcher`] is the built-in
//! implementation over `globset`:
//!
//! - `/` and `\` are both separators
//! - `*` matches within a segment, `?` one character, `**` any number of segments
//! - comparison is ASCII case-insensitive
//! - the stem starts at the first segment containing a wildcard; a pattern with
//!   no wildcard captures the file name
//! - a relative pattern tested against a rooted path may match any trailing run
//!   of the path's segments

use globset::GlobBuilder;
use tracing::warn;

/// Result of matching one path against one pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobMatch {
  pub has_match: bool,
  /// The part of the path captured by the pattern's wildcards, `/`-separated.
  pub stem: String,
}

impl GlobMatch {
  pub fn matched(stem: impl Into<String>) -> Self {
    Self {
      has_match: true,
      stem: stem.into(),
    }
  }

  pub fn no_match() -> Self {
    Self::default()
  }
}

pub trait GlobMatcher {
  fn match_path(&self, pattern: &str, path: &str) -> GlobMatch;
}

impl<F> GlobMatcher for F
where
  F: Fn(&str, &str) -> GlobMatch,
{
  fn match_path(&self, pattern: &str, path: &str) -> GlobMatch {
    self(pattern, path)
  }
}

/// The built-in matcher, backed by `globset`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternMatcher;

impl GlobMatcher for PatternMatcher {
  fn match_path(&self, pattern: &str, path: &str) -> GlobMatch {
    let (pattern_rooted, pattern) = split(pattern);
    let (path_rooted, path) = split(path);
    if pattern.is_empty() {
      return GlobMatch::no_match();
    }

    let matcher = match compile(&pattern) {
      Ok(matcher) => matcher,
      Err(e) => {
        warn!(pattern = %pattern.join("/"), error = %e, "invalid glob pattern, matching nothing");
        return GlobMatch::no_match();
      }
    };

    let stem_from = pattern
      .iter()
      .position(|segment| is_wildcard(segment))
      .unwrap_or(pattern.len() - 1);

    let last_start = if path_rooted && !pattern_rooted { path.len() } else { 0 };
    for start in 0..=last_start {
      let candidate = &path[start..];
      if matcher.is_match(candidate.join("/")) {
        let stem = candidate.get(stem_from..).unwrap_or_default().join("/");
        return GlobMatch::matched(stem);
      }
    }

    GlobMatch::no_match()
  }
}

/// `*` never crosses a separator; `**` spans segments.
fn compile(segments: &[&str]) -> Result<globset::GlobMatcher, globset::Error> {
  let glob = GlobBuilder::new(&segments.join("/"))
    .case_insensitive(true)
    .literal_separator(true)
    .build()?;
  Ok(glob.compile_matcher())
}

fn is_wildcard(segment: &str) -> bool {
  segment.contains(['*', '?', '[', '{'])
}

/// Split on either separator, dropping empty segments. Returns whether the input was rooted.
fn split(path: &str) -> (bool, Vec<&str>) {
  let rooted = path.starts_with(['/', '\\']) || has_drive(path);
  let segments = path.split(['/', '\\']).filter(|s| !s.is_empty()).collect();
  (rooted, segments)
}

fn has_drive(path: &str) -> bool {
  let bytes = path.as_bytes();
  bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}
