//! Content Digests
//!
//! Ids for users and answers are derived from their login or content text,
//! so every backend and every process computes the same id for the same input.

use base64::{Engine, engine::general_purpose};
use sha1::{Digest, Sha1};

/// Compute SHA-1 hash
pub fn sha1(data: &[u8]) -> [u8; 20] {
    let mut hasher = Sha1::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Encode bytes as padded URL-safe base64
pub fn to_base64_url(bytes: &[u8]) -> String {
    general_purpose::URL_SAFE.encode(bytes)
}

/// Deterministic, unsalted, printable digest of `s`.
///
/// Always 28 characters drawn from the URL-safe alphabet plus `=` padding.
pub fn content_digest(s: &str) -> String {
    to_base64_url(&sha1(s.as_bytes()))
}
