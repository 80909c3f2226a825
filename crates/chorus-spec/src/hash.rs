//! Content hashing and seed derivation.
//!
//! Script artifacts are named by the BLAKE3 hash of their contents. Stage
//! seeds are derived from the run seed the same way, so each stage draws from
//! an independent stream.

/// Computes the BLAKE3 hash of `bytes` as 64 lowercase hex characters.
///
/// # Example
/// ```
/// use chorus_spec::hash::content_hash;
///
/// let hash = content_hash(b"[0:a]anull[out]");
/// assert_eq!(hash.len(), 64);
/// ```
pub fn content_hash(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

/// Derives a seed for a named stage from the run seed.
///
/// The input is the run seed (little-endian) followed by the UTF-8 key; the
/// first eight bytes of the hash become the derived seed.
pub fn derive_stage_seed(base_seed: u64, key: &str) -> u64 {
    let mut input = Vec::with_capacity(8 + key.len());
    input.extend_from_slice(&base_seed.to_le_bytes());
    input.extend_from_slice(key.as_bytes());

    let hash = blake3::hash(&input);
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[0..8]);
    u64::from_le_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_hash_is_stable() {
        assert_eq!(content_hash(b"abc"), content_hash(b"abc"));
        assert_ne!(content_hash(b"abc"), content_hash(b"abd"));
    }

    #[test]
    fn test_stage_seeds_differ_by_key() {
        let a = derive_stage_seed(42, "pitch_shift");
        let b = derive_stage_seed(42, "automate");
        assert_ne!(a, b);
        assert_eq!(a, derive_stage_seed(42, "pitch_shift"));
        assert_ne!(a, derive_stage_seed(43, "pitch_shift"));
    }
}
