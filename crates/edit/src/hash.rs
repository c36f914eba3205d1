use sha2::{Digest, Sha256};

/// Lowercase hex sha256 of `bytes`, matching the hash callers compute
/// client-side for `expected_file_sha256` (SPEC §4.7 step 1).
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher.finalize().iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_hashes_to_the_well_known_sha256_of_nothing() {
        assert_eq!(sha256_hex(b""), "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b85");
    }

    #[test]
    fn same_bytes_always_hash_the_same() {
        assert_eq!(sha256_hex(b"fn main() {}"), sha256_hex(b"fn main() {}"));
    }

    #[test]
    fn different_bytes_hash_differently() {
        assert_ne!(sha256_hex(b"a"), sha256_hex(b"b"));
    }
}
