//! services/api/src/adapters/password.rs
//!
//! Argon2 implementation of the `PasswordHasher` port.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordVerifier, SaltString},
    Argon2, PasswordHasher as _,
};
use estante_core::ports::{PasswordHasher, PortError, PortResult};

pub struct Argon2Hasher;

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> PortResult<String> {
        if password.is_empty() {
            return Err(PortError::InvalidInput(
                "password must not be empty".to_string(),
            ));
        }
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| PortError::Unexpected(format!("failed to hash password: {e}")))?;
        Ok(hash.to_string())
    }

    fn verify(&self, password: &str, stored: &str) -> bool {
        // A malformed stored hash is a mismatch, never an error.
        let Ok(parsed) = PasswordHash::new(stored) else {
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_verifies_its_own_password_only() {
        let hasher = Argon2Hasher;
        let stored = hasher.hash("correct horse").unwrap();
        assert!(hasher.verify("correct horse", &stored));
        assert!(!hasher.verify("battery staple", &stored));
    }

    #[test]
    fn hashes_are_salted() {
        let hasher = Argon2Hasher;
        let a = hasher.hash("same password").unwrap();
        let b = hasher.hash("same password").unwrap();
        assert_ne!(a, b);
        assert!(hasher.verify("same password", &a));
        assert!(hasher.verify("same password", &b));
    }

    #[test]
    fn empty_password_is_rejected() {
        assert!(matches!(
            Argon2Hasher.hash(""),
            Err(PortError::InvalidInput(_))
        ));
    }

    #[test]
    fn malformed_stored_hash_verifies_false() {
        assert!(!Argon2Hasher.verify("anything", "not-a-phc-string"));
    }
}
