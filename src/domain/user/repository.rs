//! User repository trait

use async_trait::async_trait;
use std::fmt::Debug;

#[cfg(test)]
use mockall::automock;

use super::entity::{NewUser, User, UserId};
use crate::domain::DomainError;

/// Repository trait for user storage
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserRepository: Send + Sync + Debug {
    /// Get a user by their ID
    async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError>;

    /// Get a user by their login
    async fn get_by_login(&self, login: &str) -> Result<Option<User>, DomainError>;

    /// List every stored user, in store order
    async fn list(&self) -> Result<Vec<User>, DomainError>;

    /// Insert a new user. The store assigns the ID.
    ///
    /// Fails with `Conflict` when the login is already taken.
    async fn create(&self, user: NewUser) -> Result<User, DomainError>;

    /// Persist `user` only if the stored version still equals `expected_version`.
    ///
    /// Fails with `NotFound` when the user is gone and with `Conflict` when
    /// another writer changed the version in between.
    async fn update(&self, user: &User, expected_version: i32) -> Result<User, DomainError>;

    /// Delete a user. Returns false if nothing was removed.
    async fn delete(&self, id: &UserId) -> Result<bool, DomainError>;

    /// Check if a login is taken
    async fn login_exists(&self, login: &str) -> Result<bool, DomainError> {
        Ok(self.get_by_login(login).await?.is_some())
    }
}
