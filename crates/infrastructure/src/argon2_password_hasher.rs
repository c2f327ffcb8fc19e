//! Argon2id password hashing (OWASP Password Storage cheat sheet).

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{
    PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
};

use sandwich_application::PasswordHasher;
use sandwich_core::{AppError, AppResult};

/// Argon2id implementation of the password hasher port.
#[derive(Clone, Default)]
pub struct Argon2PasswordHasher;

impl Argon2PasswordHasher {
    /// Creates a hasher with the library's default Argon2id parameters.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|error| AppError::Internal(format!("failed to hash password: {error}")))?;

        Ok(hash.to_string())
    }

    fn verify(&self, password: &str, password_hash: &str) -> AppResult<bool> {
        let parsed = PasswordHash::new(password_hash)
            .map_err(|error| AppError::Internal(format!("stored hash is invalid: {error}")))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use sandwich_application::PasswordHasher as _;

    use super::Argon2PasswordHasher;

    #[test]
    fn hash_and_verify_roundtrip() {
        let hasher = Argon2PasswordHasher::new();
        let hash = match hasher.hash("a perfectly fine passphrase") {
            Ok(hash) => hash,
            Err(error) => panic!("hashing failed: {error}"),
        };

        assert_eq!(hasher.verify("a perfectly fine passphrase", &hash).ok(), Some(true));
        assert_eq!(hasher.verify("wrong password", &hash).ok(), Some(false));
    }

    #[test]
    fn salts_make_hashes_unique() {
        let hasher = Argon2PasswordHasher::new();
        let first = hasher.hash("a perfectly fine passphrase");
        let second = hasher.hash("a perfectly fine passphrase");
        assert_ne!(first.ok(), second.ok());
    }
}
