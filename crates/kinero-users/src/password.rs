//! Password hashing.
//!
//! [`PasswordHasher`] is the seam for the password KDF. [`Argon2PasswordHasher`]
//! is the default: Argon2id with a random salt per hash, stored as a PHC
//! string (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`) that records its own
//! cost parameters.

use argon2::password_hash::{
    PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::rngs::OsRng;
use std::fmt;
use thiserror::Error;

/// A password could not be hashed.
#[derive(Debug, Error)]
#[error("password hashing failed: {0}")]
pub struct PasswordHashError(#[from] argon2::password_hash::Error);

/// Hashes and verifies passwords.
pub trait PasswordHasher: Send + Sync + 'static {
    /// Encodes `password` for storage.
    fn hash(&self, password: &str) -> Result<String, PasswordHashError>;

    /// Returns `true` if `password` matches the stored `encoded` hash.
    ///
    /// Unparseable hashes never match.
    fn verify(&self, password: &str, encoded: &str) -> bool;
}

/// Argon2id hasher.
///
/// # Example
///
/// ```
/// use kinero_users::{Argon2PasswordHasher, PasswordHasher};
///
/// let hasher = Argon2PasswordHasher::new();
/// let encoded = hasher.hash("password123").unwrap();
///
/// assert!(encoded.starts_with("$argon2id$"));
/// assert!(hasher.verify("password123", &encoded));
/// assert!(!hasher.verify("password124", &encoded));
/// ```
#[derive(Clone, Default)]
pub struct Argon2PasswordHasher {
    argon2: Argon2<'static>,
}

impl Argon2PasswordHasher {
    /// Creates a hasher with the recommended Argon2id parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an Argon2id hasher with explicit cost parameters.
    #[must_use]
    pub fn with_params(params: Params) -> Self {
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &str) -> Result<String, PasswordHashError> {
        let salt = SaltString::generate(&mut OsRng);
        Ok(self
            .argon2
            .hash_password(password.as_bytes(), &salt)?
            .to_string())
    }

    fn verify(&self, password: &str, encoded: &str) -> bool {
        PasswordHash::new(encoded).is_ok_and(|parsed| {
            self.argon2
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
    }
}

impl fmt::Debug for Argon2PasswordHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Argon2PasswordHasher").finish_non_exhaustive()
    }
}
