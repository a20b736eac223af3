//! Password hashing utilities using Argon2

use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as Argon2PasswordHasher, PasswordVerifier,
        SaltString,
    },
    Algorithm, Argon2, Params, Version,
};
use std::fmt::Debug;

use crate::domain::DomainError;

/// Trait for password hashing operations
pub trait PasswordHasher: Send + Sync + Debug {
    /// Hash a password with a fresh salt. `cost` is chosen by the caller.
    fn hash(&self, password: &str, cost: u32) -> Result<String, DomainError>;

    /// Verify a password against a hash. Never errors, a malformed hash is a mismatch.
    fn verify(&self, password: &str, hash: &str) -> bool;
}

/// Argon2id password hasher. The cost is the Argon2 time cost (iterations).
#[derive(Debug, Clone, Default)]
pub struct Argon2Hasher;

impl Argon2Hasher {
    /// Create a new Argon2 hasher
    pub fn new() -> Self {
        Self
    }

    /// Reject a cost Argon2 would refuse, so bad config fails at startup
    pub fn check_cost(cost: u32) -> Result<(), DomainError> {
        Self::argon2(cost).map(|_| ())
    }

    fn argon2(cost: u32) -> Result<Argon2<'static>, DomainError> {
        let params = Params::new(Params::DEFAULT_M_COST, cost, Params::DEFAULT_P_COST, None)
            .map_err(|e| DomainError::configuration(format!("Invalid hash cost {}: {}", cost, e)))?;

        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str, cost: u32) -> Result<String, DomainError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Self::argon2(cost)?;

        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| DomainError::internal(format!("Failed to hash password: {}", e)))
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(h) => h,
            Err(_) => return false,
        };

        // Params come from the PHC string, so any cost verifies here
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }
}
