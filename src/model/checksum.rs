//! CRC32 checksum over artifact payloads
//!
//! A checksum mismatch means the artifact was truncated or edited after
//! training and must not be served.

use crc32fast::Hasher;

/// Computes a CRC32 checksum over the provided data.
pub fn compute_checksum(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_deterministic() {
        let payload = br#"{"schema":["Material Type"]}"#;
        assert_eq!(compute_checksum(payload), compute_checksum(payload));
    }

    #[test]
    fn test_single_byte_change_detected() {
        let original = b"forest payload".to_vec();
        let mut edited = original.clone();
        edited[3] ^= 0x01;
        assert_ne!(compute_checksum(&edited), compute_checksum(&original));
    }
}
