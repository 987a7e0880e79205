//! Credential hashing port.
//!
//! Member secrets only ever reach storage as the output of a
//! [`CredentialHasher`]. The concrete algorithm lives in `infra::hashing`.

use std::sync::Arc;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HashError {
    #[error("secret must not be empty")]
    Empty,

    #[error("secret too long: {len} bytes (max: {max})")]
    TooLong { len: usize, max: usize },

    #[error("hashing failed: {0}")]
    Backend(String),
}

/// One-way salted hashing of member secrets.
pub trait CredentialHasher: Send + Sync {
    /// Hash `plaintext` with a fresh random salt embedded in the output.
    fn hash(&self, plaintext: &str) -> Result<String, HashError>;

    /// Check `plaintext` against a stored hash. Malformed hashes yield `false`.
    fn verify(&self, plaintext: &str, hash: &str) -> bool;
}

/// Hash on the blocking pool; adaptive hashes take tens of milliseconds.
pub async fn hash_secret(
    hasher: Arc<dyn CredentialHasher>,
    secret: String,
) -> Result<String, HashError> {
    tokio::task::spawn_blocking(move || hasher.hash(&secret))
        .await
        .map_err(|e| HashError::Backend(e.to_string()))?
}
