//! Password hashing.
//!
//! The authentication core never looks at a stored hash directly; it asks a
//! [`PasswordHasher`] whether a plaintext matches. [`BcryptPasswordHasher`] is
//! the implementation used by the server and the CLI.

use bcrypt::{DEFAULT_COST, hash, verify};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("failed to hash password: {0}")]
    Hash(#[source] bcrypt::BcryptError),
    #[error("failed to verify password: {0}")]
    Verify(#[source] bcrypt::BcryptError),
}

/// Hashes plaintext passwords and checks plaintexts against stored hashes.
///
/// Both operations are CPU bound; async callers should run them on a
/// blocking thread.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, plaintext: &str) -> Result<String, PasswordError>;

    /// Returns `Ok(false)` on mismatch. An unparseable stored hash is an
    /// error, not a mismatch.
    fn matches(&self, plaintext: &str, hash: &str) -> Result<bool, PasswordError>;
}

#[derive(Debug, Clone, Copy)]
pub struct BcryptPasswordHasher {
    cost: u32,
}

impl BcryptPasswordHasher {
    pub fn with_cost(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }
}

impl Default for BcryptPasswordHasher {
    fn default() -> Self {
        Self { cost: DEFAULT_COST }
    }
}

impl PasswordHasher for BcryptPasswordHasher {
    fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        hash(plaintext, self.cost).map_err(PasswordError::Hash)
    }

    fn matches(&self, plaintext: &str, hash: &str) -> Result<bool, PasswordError> {
        verify(plaintext, hash).map_err(PasswordError::Verify)
    }
}

pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    BcryptPasswordHasher::default().hash(password)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    BcryptPasswordHasher::default().matches(password, hash)
}
