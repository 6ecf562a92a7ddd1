//! Payload checksums.

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 digest of `data`.
///
/// This is the agreed batch checksum algorithm: it covers the *compressed*
/// payload, so verification can run before any decompression.
#[must_use]
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_digest() {
        // SHA-256 of the empty string.
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn digest_is_64_hex_chars() {
        let digest = sha256_hex(b"telemetry");
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn distinct_payloads_distinct_digests() {
        assert_ne!(sha256_hex(b"a"), sha256_hex(b"b"));
    }
}
