//! In-memory user repository implementation

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::user::{NewUser, User, UserId, UserRepository};
use crate::domain::DomainError;

/// In-memory implementation of UserRepository
#[derive(Debug)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
    /// Index for login -> user ID lookup
    login_index: Arc<RwLock<HashMap<String, Uuid>>>,
}

impl InMemoryUserRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
            login_index: Arc::new(RwLock::new(HashMap::new())),
        }
    }

}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let users = self.users.read().await;
        Ok(users.get(id.as_uuid()).cloned())
    }

    async fn get_by_login(&self, login: &str) -> Result<Option<User>, DomainError> {
        // Same lock order as the writers: users, then login_index
        let users = self.users.read().await;
        let login_index = self.login_index.read().await;

        Ok(login_index.get(login).and_then(|id| users.get(id)).cloned())
    }

    async fn list(&self) -> Result<Vec<User>, DomainError> {
        let users = self.users.read().await;
        Ok(users.values().cloned().collect())
    }

    async fn create(&self, user: NewUser) -> Result<User, DomainError> {
        let mut users = self.users.write().await;
        let mut login_index = self.login_index.write().await;

        if login_index.contains_key(&user.login) {
            return Err(DomainError::conflict(format!(
                "Login '{}' already exists",
                user.login
            )));
        }

        let mut id = UserId::generate();

        while users.contains_key(id.as_uuid()) {
            id = UserId::generate();
        }

        let user = user.into_user(id);
        login_index.insert(user.login().to_string(), *id.as_uuid());
        users.insert(*id.as_uuid(), user.clone());

        Ok(user)
    }

    async fn update(&self, user: &User, expected_version: i32) -> Result<User, DomainError> {
        let mut users = self.users.write().await;

        let stored = users
            .get(user.id().as_uuid())
            .ok_or_else(|| DomainError::not_found(format!("User '{}' not found", user.id())))?;

        if stored.version() != expected_version {
            return Err(DomainError::conflict(format!(
                "User '{}' was modified concurrently (expected version {}, found {})",
                user.id(),
                expected_version,
                stored.version()
            )));
        }

        // Login is immutable, so the index needs no maintenance here
        users.insert(*user.id().as_uuid(), user.clone());

        Ok(user.clone())
    }

    async fn delete(&self, id: &UserId) -> Result<bool, DomainError> {
        let mut users = self.users.write().await;
        let mut login_index = self.login_index.write().await;

        if let Some(user) = users.remove(id.as_uuid()) {
            login_index.remove(user.login());
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn new_user(login: &str) -> NewUser {
        NewUser::new(login, "hashed_password", Utc::now())
    }

    #[tokio::test]
    async fn test_create_assigns_id_and_get() {
        let repo = InMemoryUserRepository::new();

        let created = repo.create(new_user("alice")).await.unwrap();

        let retrieved = repo.get(created.id()).await.unwrap();
        assert!(retrieved.is_some());
        assert_eq!(retrieved.unwrap().login(), "alice");
    }

    #[tokio::test]
    async fn test_create_assigns_distinct_ids() {
        let repo = InMemoryUserRepository::new();

        let first = repo.create(new_user("alice")).await.unwrap();
        let second = repo.create(new_user("bob")).await.unwrap();

        assert_ne!(first.id(), second.id());
    }

    #[tokio::test]
    async fn test_get_by_login() {
        let repo = InMemoryUserRepository::new();
        let created = repo.create(new_user("alice")).await.unwrap();

        let retrieved = repo.get_by_login("alice").await.unwrap();
        assert_eq!(retrieved.unwrap().id(), created.id());

        let not_found = repo.get_by_login("nonexistent").await.unwrap();
        assert!(not_found.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_login() {
        let repo = InMemoryUserRepository::new();

        repo.create(new_user("alice")).await.unwrap();

        let result = repo.create(new_user("alice")).await;
        assert!(result.unwrap_err().is_conflict());
    }

    #[tokio::test]
    async fn test_update_with_matching_version() {
        let repo = InMemoryUserRepository::new();
        let mut user = repo.create(new_user("alice")).await.unwrap();

        user.rotate_password("new_hash", Utc::now()).unwrap();
        let updated = repo.update(&user, 1).await.unwrap();

        assert_eq!(updated.version(), 2);
        let stored = repo.get(user.id()).await.unwrap().unwrap();
        assert_eq!(stored.password_hash(), "new_hash");
    }

    #[tokio::test]
    async fn test_update_with_stale_version() {
        let repo = InMemoryUserRepository::new();
        let original = repo.create(new_user("alice")).await.unwrap();

        let mut first = original.clone();
        first.rotate_password("first_hash", Utc::now()).unwrap();
        repo.update(&first, 1).await.unwrap();

        let mut second = original.clone();
        second.rotate_password("second_hash", Utc::now()).unwrap();
        let result = repo.update(&second, 1).await;

        assert!(result.unwrap_err().is_conflict());
        let stored = repo.get(original.id()).await.unwrap().unwrap();
        assert_eq!(stored.password_hash(), "first_hash");
    }

    #[tokio::test]
    async fn test_update_nonexistent() {
        let repo = InMemoryUserRepository::new();
        let user = new_user("ghost").into_user(UserId::generate());

        let result = repo.update(&user, 1).await;
        assert!(result.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = InMemoryUserRepository::new();
        let user = repo.create(new_user("alice")).await.unwrap();

        assert!(repo.delete(user.id()).await.unwrap());
        assert!(!repo.delete(user.id()).await.unwrap());
        assert!(repo.get(user.id()).await.unwrap().is_none());

        // Login is free again
        assert!(!repo.login_exists("alice").await.unwrap());
    }

    #[tokio::test]
    async fn test_list() {
        let repo = InMemoryUserRepository::new();
        assert!(repo.list().await.unwrap().is_empty());

        repo.create(new_user("alice")).await.unwrap();
        repo.create(new_user("bob")).await.unwrap();

        let all = repo.list().await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(repo.login_exists("bob").await.unwrap());
    }
}
