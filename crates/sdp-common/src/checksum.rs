//! Content hashing for change detection
//!
//! Every raw payload is hashed with SHA-256 before extraction; the hex
//! digest is the only trace of the payload that outlives a run.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 content hash of a raw payload, hex-encoded
pub fn content_hash(payload: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(payload);
    hex::encode(hasher.finalize())
}

/// Compute the content hash of a textual payload
pub fn content_hash_text(payload: &str) -> String {
    content_hash(payload.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digest() {
        assert_eq!(
            content_hash(b"hello world"),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_single_byte_flip_changes_digest() {
        let a = content_hash(b"hello world");
        let b = content_hash(b"hello worle");
        assert_ne!(a, b);
    }

    #[test]
    fn test_text_and_bytes_agree() {
        assert_eq!(content_hash_text("payload"), content_hash(b"payload"));
    }
}
