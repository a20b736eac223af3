//! User entity and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation::UserValidationError;
use crate::domain::DomainError;

/// Version every account starts at
pub const INITIAL_VERSION: i32 = 1;

/// User identifier, a UUID assigned by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Parse a UserId from its textual form
    pub fn parse(id: &str) -> Result<Self, UserValidationError> {
        Uuid::parse_str(id)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId(id.to_string()))
    }

    /// Generate a fresh random identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for UserId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A user record that has not been stored yet. The store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub login: String,
    pub password_hash: String,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewUser {
    /// Build a first-version record with both timestamps set to `now`
    pub fn new(
        login: impl Into<String>,
        password_hash: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            login: login.into(),
            password_hash: password_hash.into(),
            version: INITIAL_VERSION,
            created_at: now,
            updated_at: now,
        }
    }

    /// Attach the identifier assigned by the store
    pub fn into_user(self, id: UserId) -> User {
        User {
            id,
            login: self.login,
            password_hash: self.password_hash,
            version: self.version,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Stored user account
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    id: UserId,
    login: String,
    /// Argon2 PHC string, never plaintext
    password_hash: String,
    version: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl User {
    /// Rebuild a user from persisted columns
    pub fn restore(
        id: UserId,
        login: impl Into<String>,
        password_hash: impl Into<String>,
        version: i32,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            login: login.into(),
            password_hash: password_hash.into(),
            version,
            created_at,
            updated_at,
        }
    }

    // Getters

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn login(&self) -> &str {
        &self.login
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    // Mutators

    /// Replace the password hash, bump the version by one and stamp `updated_at`.
    ///
    /// `updated_at` never moves backwards even if the clock does. A user at
    /// `i32::MAX` can no longer be rotated and is left untouched.
    pub fn rotate_password(
        &mut self,
        password_hash: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let version = self.version.checked_add(1).ok_or_else(|| {
            DomainError::internal(format!("User '{}' version counter exhausted", self.id))
        })?;

        self.password_hash = password_hash.into();
        self.version = version;
        self.updated_at = now.max(self.updated_at);
        Ok(())
    }
}
