use bytes::Bytes;
use sha2::{Digest, Sha256};
use std::fmt::Write;

/// Hex SHA-256 digest of a book payload, for comparing large contents in
/// assertion messages without dumping the bytes.
pub fn sha256_hash(data: &[u8]) -> String {
    Sha256::digest(data)
        .iter()
        .fold(String::with_capacity(64), |mut hex, byte| {
            let _ = write!(hex, "{byte:02x}");
            hex
        })
}

/// Stand-in book content of `len` bytes.
///
/// The bytes come from a 64-bit LCG seeded with `seed`, so two payloads with
/// different seeds differ almost everywhere and a misplaced block is caught.
pub fn seeded_bytes(seed: u64, len: usize) -> Bytes {
    let mut state = seed;
    let mut book = Vec::with_capacity(len + 8);
    while book.len() < len {
        state = state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        book.extend_from_slice(&state.to_le_bytes());
    }
    book.truncate(len);
    Bytes::from(book)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hash() {
        let hash = sha256_hash(b"ABC");
        assert_eq!(
            hash,
            "b5d4045c3f466fa91fe2cc6abe79232a1a57cdf104f7a26e716e0a1e2789df78"
        );
    }

    #[test]
    fn test_seeded_bytes_deterministic() {
        assert_eq!(seeded_bytes(7, 4096), seeded_bytes(7, 4096));
        assert_ne!(seeded_bytes(7, 4096), seeded_bytes(8, 4096));
        assert_eq!(seeded_bytes(7, 13).len(), 13);
        assert!(seeded_bytes(7, 0).is_empty());
    }
}
