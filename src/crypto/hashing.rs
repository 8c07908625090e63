//! Account password hashing
//!
//! Hashes are stored as PHC strings (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`),
//! so the parameters travel with every hash. When the configured parameters
//! change, `needs_rehash` reports old hashes so they can be upgraded on the
//! next successful login.

use argon2::{Algorithm, Argon2, Params, Version};
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::Error as PhcError;

use crate::error::{Result, VaultError};

/// Argon2id hasher with fixed cost parameters
#[derive(Debug, Clone)]
pub struct PasswordHashing {
    params: Params,
}

impl PasswordHashing {
    /// Create a hasher with explicit cost parameters
    ///
    /// * `memory_kib` - memory cost in KiB
    /// * `iterations` - time cost
    /// * `parallelism` - lanes
    pub fn new(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| VaultError::HashingError(format!("Invalid Argon2 parameters: {}", e)))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a password with a fresh random salt
    pub fn hash(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self.argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| VaultError::HashingError(format!("Hashing failed: {}", e)))?;
        Ok(hash.to_string())
    }

    /// Verify a password against a stored hash
    ///
    /// Returns `Ok(false)` on mismatch and an error only when the stored
    /// hash cannot be parsed.
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool> {
        let parsed = parse_hash(hash)?;

        // Verification takes its parameters from the stored hash
        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(PhcError::Password) => Ok(false),
            Err(e) => Err(VaultError::HashingError(format!("Verification failed: {}", e))),
        }
    }

    /// Check whether a stored hash was produced with different settings
    pub fn needs_rehash(&self, hash: &str) -> Result<bool> {
        let parsed = parse_hash(hash)?;

        if parsed.algorithm != Algorithm::Argon2id.ident() {
            return Ok(true);
        }
        if parsed.version != Some(Version::V0x13.into()) {
            return Ok(true);
        }

        let stored = Params::try_from(&parsed)
            .map_err(|e| VaultError::HashingError(format!("Invalid hash parameters: {}", e)))?;

        Ok(stored.m_cost() != self.params.m_cost()
            || stored.t_cost() != self.params.t_cost()
            || stored.p_cost() != self.params.p_cost())
    }
}

impl Default for PasswordHashing {
    fn default() -> Self {
        Self { params: Params::default() }
    }
}

fn parse_hash(hash: &str) -> Result<PasswordHash<'_>> {
    PasswordHash::new(hash)
        .map_err(|e| VaultError::HashingError(format!("Invalid password hash: {}", e)))
}
