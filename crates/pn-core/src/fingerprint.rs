//! Short digest of an API key for logs.

use sha2::{Digest, Sha256};

pub const FINGERPRINT_LEN: usize = 12;

/// First 12 hex chars of SHA-256 over the key. Log this, never the key.
pub fn key_fingerprint(api_key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(api_key.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..FINGERPRINT_LEN].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_stability() {
        let a = key_fingerprint("0123456789abcdefABCDEF0123456789");
        let b = key_fingerprint("0123456789abcdefABCDEF0123456789");
        assert_eq!(a, b);
        assert_eq!(a.len(), FINGERPRINT_LEN);
    }

    #[test]
    fn fingerprint_known_value() {
        // sha256("abc") = ba7816bf8f01cfea...
        assert_eq!(key_fingerprint("abc"), "ba7816bf8f01");
    }

    #[test]
    fn fingerprint_differs_for_different_keys() {
        assert_ne!(key_fingerprint("key-one"), key_fingerprint("key-two"));
    }
}
