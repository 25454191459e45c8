use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::error::{error_codes, SecretError, SecretResult};

/// Number of hex characters kept from a secret fingerprint
pub const FINGERPRINT_HEX_LEN: usize = 16;

/// Generate random bytes of the specified length from the OS generator
pub fn random_bytes(length: usize) -> SecretResult<Vec<u8>> {
    let mut bytes = vec![0u8; length];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| SecretError::RandomGeneration {
            cause: e.to_string(),
            error_code: error_codes::RANDOM_SOURCE_FAILED,
        })?;
    Ok(bytes)
}

/// Constant-time comparison of two byte slices to avoid timing attacks
///
/// Slices of different length compare unequal; the length itself is not
/// treated as secret.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.ct_eq(b).into()
}

/// Securely compare two potentially sensitive strings in constant time
///
/// This is used when matching a presented signing secret against the
/// current and previous secrets.
pub fn secure_compare(a: &str, b: &str) -> bool {
    constant_time_eq(a.as_bytes(), b.as_bytes())
}

/// Short, non-reversible identifier for a secret value, safe to log.
pub fn fingerprint(value: &str) -> String {
    let digest = Sha256::digest(value.as_bytes());
    let mut hex = hex::encode(digest);
    hex.truncate(FINGERPRINT_HEX_LEN);
    hex
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_bytes() {
        let bytes1 = random_bytes(32).unwrap();
        let bytes2 = random_bytes(32).unwrap();

        assert_eq!(bytes1.len(), 32);
        assert_eq!(bytes2.len(), 32);
        // Two random byte arrays should be different
        assert_ne!(bytes1, bytes2);
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"abcd"));
        assert!(secure_compare("token-secret", "token-secret"));
    }

    #[test]
    fn test_fingerprint_is_stable_and_short() {
        let a = fingerprint("some signing secret");
        let b = fingerprint("some signing secret");
        let c = fingerprint("another signing secret");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), FINGERPRINT_HEX_LEN);
        assert!(a.chars().all(|ch| ch.is_ascii_hexdigit()));
    }
}
