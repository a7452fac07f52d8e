//! Admin key hashing using Argon2.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Argon2,
};
use std::sync::Arc;
use storyloop_core::{StoryError, StoryResult};
use tracing::debug;

/// Hashes and verifies operator keys.
///
/// The configured `security.admin_key_hash` is a PHC string produced by
/// [`AdminKeyHasher::hash`].
#[derive(Clone)]
pub struct AdminKeyHasher {
    argon2: Arc<Argon2<'static>>,
}

impl AdminKeyHasher {
    /// Creates a hasher with Argon2id default parameters.
    #[must_use]
    pub fn new() -> Self {
        Self {
            argon2: Arc::new(Argon2::default()),
        }
    }

    /// Hashes a key into a PHC string.
    pub fn hash(&self, key: &str) -> StoryResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(key.as_bytes(), &salt)
            .map_err(|e| StoryError::Internal(format!("Failed to hash admin key: {}", e)))?;
        Ok(hash.to_string())
    }

    /// Verifies `key` against a PHC hash.
    pub fn verify(&self, key: &str, hash: &str) -> StoryResult<bool> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| StoryError::Configuration(format!("Invalid admin key hash format: {}", e)))?;

        match self.argon2.verify_password(key.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => {
                debug!("Admin key verification failed");
                Ok(false)
            }
            Err(e) => Err(StoryError::Internal(format!("Admin key verification error: {}", e))),
        }
    }
}

impl Default for AdminKeyHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AdminKeyHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminKeyHasher").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = AdminKeyHasher::new();
        let hash = hasher.hash("open-sesame").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify("open-sesame", &hash).unwrap());
        assert!(!hasher.verify("open-says-me", &hash).unwrap());
    }

    #[test]
    fn test_malformed_hash_is_configuration_error() {
        let err = AdminKeyHasher::new().verify("key", "plain-text").unwrap_err();
        assert!(matches!(err, StoryError::Configuration(_)));
    }
}
