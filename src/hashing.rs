//! Content hashing for template documents
//!
//! Same bytes = same digest. Digests name uploaded artifacts and are the
//! value recorded in the version manifest.

use sha2::{Digest, Sha256};

/// SHA256 of `bytes` as lowercase hex
pub fn digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Object key an artifact with this digest is stored under
pub fn artifact_key(digest: &str) -> String {
    format!("{}.json", digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_deterministic() {
        let d1 = digest(b"{\n  \"Resources\": {}\n}");
        let d2 = digest(b"{\n  \"Resources\": {}\n}");
        assert_eq!(d1, d2);
        assert_eq!(d1.len(), 64);
    }

    #[test]
    fn digest_different_content() {
        assert_ne!(digest(b"content 1"), digest(b"content 2"));
    }

    #[test]
    fn digest_known_value() {
        assert_eq!(
            digest(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn artifact_key_uses_digest() {
        assert_eq!(artifact_key("abc123"), "abc123.json");
    }
}
