//! Password hashing
//!
//! PBKDF2-HMAC-SHA256 with a per-user random salt. The stored format is
//! `pbkdf2-sha256$<iterations>$<salt-hex>$<hash-hex>` so the iteration
//! count can be raised later without invalidating existing hashes.
//! Verification is constant-time.

use hmac::Hmac;
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::core::constants::PBKDF2_ITERATIONS;

const SCHEME: &str = "pbkdf2-sha256";
const SALT_LEN: usize = 16;
const HASH_LEN: usize = 32;

/// Hash a password for storage
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    let hash = derive(password.as_bytes(), &salt, PBKDF2_ITERATIONS);
    format!(
        "{}${}${}${}",
        SCHEME,
        PBKDF2_ITERATIONS,
        hex::encode(salt),
        hex::encode(hash)
    )
}

/// Verify a password against a stored hash.
///
/// Unparseable stored values verify as false, never as a panic - a
/// corrupted row must not lock the error path open.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.split('$');
    let (Some(scheme), Some(iterations), Some(salt_hex), Some(hash_hex), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return false;
    };

    if scheme != SCHEME {
        return false;
    }
    let Ok(iterations) = iterations.parse::<u32>() else {
        return false;
    };
    let (Ok(salt), Ok(expected)) = (hex::decode(salt_hex), hex::decode(hash_hex)) else {
        return false;
    };
    if expected.len() != HASH_LEN {
        return false;
    }

    let actual = derive(password.as_bytes(), &salt, iterations);
    actual.ct_eq(expected.as_slice()).into()
}

fn derive(password: &[u8], salt: &[u8], iterations: u32) -> [u8; HASH_LEN] {
    let mut out = [0u8; HASH_LEN];
    if pbkdf2::pbkdf2::<Hmac<Sha256>>(password, salt, iterations, &mut out).is_err() {
        // Only reachable with a zero output length, which HASH_LEN rules out
        tracing::error!("PBKDF2 derivation failed");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    // Fewer iterations keep the test fast; the format carries the count
    fn quick_hash(password: &str) -> String {
        let mut salt = [0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);
        let hash = derive(password.as_bytes(), &salt, 1000);
        format!(
            "{}$1000${}${}",
            SCHEME,
            hex::encode(salt),
            hex::encode(hash)
        )
    }

    #[test]
    fn test_roundtrip() {
        let stored = quick_hash("correct horse battery staple");
        assert!(verify_password("correct horse battery staple", &stored));
        assert!(!verify_password("wrong password", &stored));
    }

    #[test]
    fn test_same_password_different_salts() {
        let a = quick_hash("secret");
        let b = quick_hash("secret");
        assert_ne!(a, b);
        assert!(verify_password("secret", &a));
        assert!(verify_password("secret", &b));
    }

    #[test]
    fn test_stored_format() {
        let stored = quick_hash("x");
        let parts: Vec<&str> = stored.split('$').collect();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0], SCHEME);
        assert_eq!(parts[1], "1000");
        assert_eq!(parts[2].len(), SALT_LEN * 2);
        assert_eq!(parts[3].len(), HASH_LEN * 2);
    }

    #[test]
    fn test_malformed_stored_hash_fails_closed() {
        assert!(!verify_password("x", ""));
        assert!(!verify_password("x", "plaintext-password"));
        assert!(!verify_password("x", "pbkdf2-sha256$notanumber$aa$bb"));
        assert!(!verify_password("x", "pbkdf2-sha256$1000$zz$zz"));
        assert!(!verify_password("x", "md5$1000$aa$bb"));
        assert!(!verify_password("x", "pbkdf2-sha256$1000$aa$bb$extra"));
    }
}
