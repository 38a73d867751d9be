//! Password hashing with Argon2id.
//!
//! The work factor is fixed at construction and constant for the process
//! lifetime. Verification is constant-time and never conflates a mismatch
//! with a backend fault.

use argon2::{
    password_hash::{
        rand_core::OsRng, Error as PhcError, PasswordHash, PasswordHasher, PasswordVerifier,
        SaltString,
    },
    Algorithm, Argon2, Params, Version,
};
use thiserror::Error;

use crate::config::HasherConfig;

/// Hash backend fault. Distinct from "password incorrect", which is a
/// plain `Ok(false)` from [`CredentialHasher::verify`].
#[derive(Debug, Error)]
#[error("password hash backend failure: {0}")]
pub struct HashError(String);

/// One-way credential hasher with an explicit work factor.
#[derive(Clone)]
pub struct CredentialHasher {
    argon2: Argon2<'static>,
}

impl CredentialHasher {
    pub fn new(config: &HasherConfig) -> Result<Self, HashError> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            None,
        )
        .map_err(|e| HashError(e.to_string()))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hash a plaintext password. Salt is generated per call and embedded
    /// in the PHC string.
    pub fn hash(&self, plaintext: &str) -> Result<String, HashError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| HashError(e.to_string()))?;
        Ok(hash.to_string())
    }

    /// Verify a plaintext against a stored PHC hash.
    ///
    /// Returns `Ok(false)` for a mismatch; `Err` only for a malformed hash
    /// or a backend fault.
    pub fn verify(&self, plaintext: &str, digest: &str) -> Result<bool, HashError> {
        let parsed = PasswordHash::new(digest).map_err(|e| HashError(e.to_string()))?;

        match self.argon2.verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(PhcError::Password) => Ok(false),
            Err(e) => Err(HashError(e.to_string())),
        }
    }
}
