//! Hashing utilities for change detection.
//!
//! This module provides:
//! - `ContentHash`: a base64-encoded SHA-256 digest
//! - `Hashable`: digest of a value's canonical JSON serialization
//! - `hash_bytes()`: arbitrary byte hashing
//!
//! The canonical serialization is whatever `serde_json` produces for the value:
//! struct fields in declaration order and sequences in element order. Callers
//! that need a stable hash must therefore never build hashed values from
//! unordered collections.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub type HashError = serde_json::Error;

/// A SHA-256 digest encoded as standard, padded base64 (44 characters).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub String);

impl std::fmt::Display for ContentHash {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

pub trait Hashable: Serialize {
  fn compute_hash(&self) -> Result<ContentHash, HashError> {
    let serialized = serde_json::to_vec(self)?;
    Ok(hash_bytes(&serialized))
  }
}

/// Hash arbitrary bytes.
pub fn hash_bytes(data: &[u8]) -> ContentHash {
  let mut hasher = Sha256::new();
  hasher.update(data);
  ContentHash(STANDARD.encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[derive(Serialize)]
  struct Pair<'a> {
    first: &'a str,
    second: Vec<&'a str>,
  }

  impl Hashable for Pair<'_> {}

  #[test]
  fn hash_bytes_known_value() {
    let hash = hash_bytes(b"hello world");
    assert_eq!(hash.0, "uU0nuZNNPgilLlLX2n2r+sSE7+N6U4DukIj3rOLvzek=");
  }

  #[test]
  fn hash_is_base64_of_sha256() {
    let hash = hash_bytes(b"");
    assert_eq!(hash.0.len(), 44);
    assert!(hash.0.ends_with('='));
  }

  #[test]
  fn hashable_is_deterministic() {
    let a = Pair {
      first: "a",
      second: vec!["x", "y"],
    };
    let b = Pair {
      first: "a",
      second: vec!["x", "y"],
    };
    assert_eq!(a.compute_hash().unwrap(), b.compute_hash().unwrap());
  }

  #[test]
  fn hashable_depends_on_sequence_order() {
    let a = Pair {
      first: "a",
      second: vec!["x", "y"],
    };
    let b = Pair {
      first: "a",
      second: vec!["y", "x"],
    };
    assert_ne!(a.compute_hash().unwrap(), b.compute_hash().unwrap());
  }
}
