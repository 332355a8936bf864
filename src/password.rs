//! Password hashing (Argon2id, salted).
//!
//! Plaintext never leaves this module and is never logged.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HashError {
    #[error("password hashing failed")]
    HashingFailed,
}

/// Hash a plaintext password with a fresh random salt.
pub fn hash(plaintext: &str) -> Result<String, HashError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    Ok(argon2
        .hash_password(plaintext.as_bytes(), &salt)
        .map_err(|_| HashError::HashingFailed)?
        .to_string())
}

/// Verify a plaintext password against a stored digest.
/// Returns `false` on any malformed digest rather than erroring.
pub fn verify(plaintext: &str, digest: &str) -> bool {
    let parsed = match PasswordHash::new(digest) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(plaintext.as_bytes(), &parsed)
        .is_ok()
}

/// A valid digest of a throwaway password, used to equalize the cost of
/// login failures when the username does not exist.
pub fn dummy_digest() -> String {
    hash("dummy-password-for-uniform-timing").unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let digest = hash("secret1").unwrap();
        assert!(verify("secret1", &digest));
        assert!(!verify("secret2", &digest));
    }

    #[test]
    fn test_hashes_are_salted() {
        let d1 = hash("secret1").unwrap();
        let d2 = hash("secret1").unwrap();
        assert_ne!(d1, d2);
    }

    #[test]
    fn test_malformed_digest_returns_false() {
        assert!(!verify("secret1", ""));
        assert!(!verify("secret1", "not-a-phc-string"));
    }

    #[test]
    fn test_dummy_digest_never_matches() {
        let dummy = dummy_digest();
        assert!(!dummy.is_empty());
        assert!(!verify("secret1", &dummy));
    }
}
