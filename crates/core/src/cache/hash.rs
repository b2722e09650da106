//! URL digest generation.
//!
//! The digest is derived from the URL string as written, never from the
//! fetched bytes. Two URLs serving identical content get two records.

use sha2::{Digest, Sha256};

/// Length of a hex-encoded digest.
pub const DIGEST_LEN: usize = 64;

/// Compute the cache key for an asset URL.
pub fn digest(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}

/// Check that a string has the shape of a digest produced by [`digest`].
pub fn is_valid_digest(candidate: &str) -> bool {
    candidate.len() == DIGEST_LEN && candidate.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
