//! Argon2id implementation of [`CredentialHasher`].
//!
//! Output is a PHC string (`$argon2id$v=19$m=..,t=..,p=..$salt$hash`), so the
//! salt and cost parameters travel with the hash and verification never needs
//! the current configuration.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};

use crate::config::HashingConfig;
use crate::domain::credentials::{CredentialHasher, HashError};

#[derive(Debug, Clone)]
pub struct Argon2CredentialHasher {
    params: Params,
    max_secret_len: usize,
}

impl Argon2CredentialHasher {
    pub fn from_config(cfg: &HashingConfig) -> Result<Self, HashError> {
        let params = Params::new(cfg.memory_kib, cfg.iterations, cfg.parallelism, None)
            .map_err(|e| HashError::Backend(format!("argon2 params error: {e}")))?;
        Ok(Self {
            params,
            max_secret_len: cfg.max_secret_len,
        })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl CredentialHasher for Argon2CredentialHasher {
    fn hash(&self, plaintext: &str) -> Result<String, HashError> {
        if plaintext.is_empty() {
            return Err(HashError::Empty);
        }
        if plaintext.len() > self.max_secret_len {
            return Err(HashError::TooLong {
                len: plaintext.len(),
                max: self.max_secret_len,
            });
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| HashError::Backend(format!("password hash error: {e}")))?;
        Ok(hash.to_string())
    }

    fn verify(&self, plaintext: &str, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            return false;
        };
        self.argon2()
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }
}
