//! Content hashing for change detection.
//!
//! Callers store the hash next to a page record and only re-index when it
//! changes.

use sha2::{Digest, Sha256};

/// Compute the lowercase hex SHA-256 of extracted page text.
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}
