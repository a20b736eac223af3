//! User service for account management and password rotation

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::domain::user::{
    validate_login, validate_password, validate_password_change, NewUser, UserId, UserRepository,
    UserResponse,
};
use crate::domain::DomainError;

use super::password::PasswordHasher;

/// Request for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUserRequest {
    pub login: String,
    pub password: String,
}

/// Request for rotating a user's password
#[derive(Debug, Clone)]
pub struct UpdatePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

/// Settings injected into the service at construction
#[derive(Debug, Clone, Copy)]
pub struct UserServiceConfig {
    /// Cost handed to the password hasher
    pub hash_cost: u32,
}

/// User service for account management
#[derive(Debug)]
pub struct UserService<R: UserRepository, H: PasswordHasher> {
    repository: Arc<R>,
    hasher: Arc<H>,
    config: UserServiceConfig,
}

impl<R: UserRepository, H: PasswordHasher + 'static> UserService<R, H> {
    /// Create a new user service
    pub fn new(repository: Arc<R>, hasher: Arc<H>, config: UserServiceConfig) -> Self {
        Self {
            repository,
            hasher,
            config,
        }
    }

    /// Create a new user
    pub async fn create(&self, request: CreateUserRequest) -> Result<UserResponse, DomainError> {
        validate_login(&request.login).map_err(|e| DomainError::validation(e.to_string()))?;
        validate_password(&request.password).map_err(|e| DomainError::validation(e.to_string()))?;

        if self.repository.login_exists(&request.login).await? {
            return Err(DomainError::conflict(format!(
                "Login '{}' already exists",
                request.login
            )));
        }

        let password_hash = self.hash_password(request.password).await?;
        let user = NewUser::new(request.login, password_hash, Utc::now());

        let user = self.repository.create(user).await?;
        info!(user_id = %user.id(), login = %user.login(), "User created");

        Ok(UserResponse::from(&user))
    }

    /// List all users
    pub async fn get_all(&self) -> Result<Vec<UserResponse>, DomainError> {
        let users = self.repository.list().await?;
        Ok(users.iter().map(UserResponse::from).collect())
    }

    /// Get a user by ID
    pub async fn get_by_id(&self, id: &str) -> Result<UserResponse, DomainError> {
        let user_id = parse_id(id)?;

        let user = self
            .repository
            .get(&user_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("User '{}' not found", id)))?;

        Ok(UserResponse::from(&user))
    }

    /// Rotate a user's password. The caller must know the current one.
    pub async fn update(
        &self,
        id: &str,
        request: UpdatePasswordRequest,
    ) -> Result<UserResponse, DomainError> {
        let user_id = parse_id(id)?;
        validate_password_change(&request.old_password, &request.new_password)
            .map_err(|e| DomainError::validation(e.to_string()))?;

        let mut user = self
            .repository
            .get(&user_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("User '{}' not found", id)))?;

        if !self.verify_password(request.old_password, user.password_hash()).await? {
            warn!(user_id = %user_id, "Password rotation rejected: old password mismatch");
            return Err(DomainError::forbidden("Old password is incorrect"));
        }

        let read_version = user.version();
        let new_hash = self.hash_password(request.new_password).await?;
        user.rotate_password(new_hash, Utc::now())?;

        let user = self.repository.update(&user, read_version).await?;
        info!(user_id = %user_id, version = user.version(), "User password rotated");

        Ok(UserResponse::from(&user))
    }

    /// Delete a user
    pub async fn delete(&self, id: &str) -> Result<(), DomainError> {
        let user_id = parse_id(id)?;

        if self.repository.get(&user_id).await?.is_none() {
            return Err(DomainError::not_found(format!("User '{}' not found", id)));
        }

        // A concurrent delete may still win between the read and this write
        if !self.repository.delete(&user_id).await? {
            return Err(DomainError::not_found(format!("User '{}' not found", id)));
        }

        info!(user_id = %user_id, "User deleted");
        Ok(())
    }

    /// Check that the backing store answers
    pub async fn ping(&self) -> Result<(), DomainError> {
        self.repository.list().await.map(|_| ())
    }

    async fn hash_password(&self, password: String) -> Result<String, DomainError> {
        let hasher = self.hasher.clone();
        let cost = self.config.hash_cost;
        debug!(cost, "Hashing password");

        tokio::task::spawn_blocking(move || hasher.hash(&password, cost))
            .await
            .map_err(|e| DomainError::internal(format!("Hashing task failed: {}", e)))?
    }

    async fn verify_password(&self, password: String, hash: &str) -> Result<bool, DomainError> {
        let hasher = self.hasher.clone();
        let hash = hash.to_string();

        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| DomainError::internal(format!("Verification task failed: {}", e)))
    }
}

fn parse_id(id: &str) -> Result<UserId, DomainError> {
    UserId::parse(id).map_err(|e| DomainError::invalid_id(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::{MockUserRepository, User};
    use crate::infrastructure::user::password::Argon2Hasher;
    use crate::infrastructure::user::repository::InMemoryUserRepository;

    const TEST_CONFIG: UserServiceConfig = UserServiceConfig { hash_cost: 1 };

    fn create_service() -> UserService<InMemoryUserRepository, Argon2Hasher> {
        let repository = Arc::new(InMemoryUserRepository::new());
        let hasher = Arc::new(Argon2Hasher::new());
        UserService::new(repository, hasher, TEST_CONFIG)
    }

    fn create_service_with_repo(
        repository: Arc<InMemoryUserRepository>,
    ) -> UserService<InMemoryUserRepository, Argon2Hasher> {
        UserService::new(repository, Arc::new(Argon2Hasher::new()), TEST_CONFIG)
    }

    fn mocked_service(mock: MockUserRepository) -> UserService<MockUserRepository, Argon2Hasher> {
        UserService::new(Arc::new(mock), Arc::new(Argon2Hasher::new()), TEST_CONFIG)
    }

    fn make_request(login: &str, password: &str) -> CreateUserRequest {
        CreateUserRequest {
            login: login.to_string(),
            password: password.to_string(),
        }
    }

    fn rotate(old: &str, new: &str) -> UpdatePasswordRequest {
        UpdatePasswordRequest {
            old_password: old.to_string(),
            new_password: new.to_string(),
        }
    }

    fn stored_user(login: &str, password: &str) -> User {
        let hash = Argon2Hasher::new().hash(password, 1).unwrap();
        NewUser::new(login, hash, Utc::now()).into_user(UserId::generate())
    }

    #[tokio::test]
    async fn test_create_user() {
        let service = create_service();

        let user = service.create(make_request("alice", "secret1")).await.unwrap();

        assert_eq!(user.login, "alice");
        assert_eq!(user.version, 1);
        assert_eq!(user.created_at, user.updated_at);
        assert!(UserId::parse(&user.id).is_ok());
    }

    #[tokio::test]
    async fn test_create_then_get_by_id() {
        let service = create_service();

        let created = service.create(make_request("alice", "secret1")).await.unwrap();
        let fetched = service.get_by_id(&created.id).await.unwrap();

        assert_eq!(fetched, created);
        assert_eq!(fetched.version, 1);
        assert_eq!(fetched.created_at, fetched.updated_at);
    }

    #[tokio::test]
    async fn test_create_stores_hash_not_plaintext() {
        let repository = Arc::new(InMemoryUserRepository::new());
        let service = create_service_with_repo(repository.clone());

        service.create(make_request("alice", "secret1")).await.unwrap();

        let stored = repository.get_by_login("alice").await.unwrap().unwrap();
        assert_ne!(stored.password_hash(), "secret1");
        assert!(Argon2Hasher::new().verify("secret1", stored.password_hash()));
    }

    #[tokio::test]
    async fn test_create_user_empty_fields() {
        let service = create_service();

        let empty_login = service.create(make_request("", "secret1")).await;
        assert!(matches!(empty_login, Err(DomainError::Validation { .. })));

        let empty_password = service.create(make_request("alice", "")).await;
        assert!(matches!(empty_password, Err(DomainError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_create_duplicate_login() {
        let service = create_service();

        service.create(make_request("alice", "secret1")).await.unwrap();

        let result = service.create(make_request("alice", "other")).await;
        assert!(result.unwrap_err().is_conflict());
    }

    #[tokio::test]
    async fn test_create_issues_single_write() {
        let mut mock = MockUserRepository::new();
        mock.expect_login_exists().times(1).returning(|_| Ok(false));
        mock.expect_create()
            .times(1)
            .withf(|user| {
                user.login == "alice" && user.version == 1 && user.password_hash != "secret1"
            })
            .returning(|user| Ok(user.into_user(UserId::generate())));

        let service = mocked_service(mock);
        let response = service.create(make_request("alice", "secret1")).await.unwrap();

        assert_eq!(response.version, 1);
    }

    #[tokio::test]
    async fn test_get_all() {
        let service = create_service();

        service.create(make_request("alice", "secret1")).await.unwrap();
        service.create(make_request("bob", "secret2")).await.unwrap();

        let all = service.get_all().await.unwrap();
        assert_eq!(all.len(), 2);

        let mut logins: Vec<_> = all.iter().map(|u| u.login.as_str()).collect();
        logins.sort();
        assert_eq!(logins, vec!["alice", "bob"]);
    }

    #[tokio::test]
    async fn test_get_all_empty() {
        let service = create_service();

        assert!(service.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let service = create_service();

        let result = service.get_by_id(&UserId::generate().to_string()).await;
        assert!(result.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_get_by_id_invalid_uuid() {
        let service = create_service();

        let result = service.get_by_id("not-a-uuid").await;
        assert!(matches!(result, Err(DomainError::InvalidId { .. })));
    }

    #[tokio::test]
    async fn test_update_password() {
        let repository = Arc::new(InMemoryUserRepository::new());
        let service = create_service_with_repo(repository.clone());

        let created = service.create(make_request("alice", "secret1")).await.unwrap();
        let updated = service
            .update(&created.id, rotate("secret1", "secret2"))
            .await
            .unwrap();

        assert_eq!(updated.version, created.version + 1);
        assert!(updated.updated_at >= created.updated_at);
        assert_eq!(updated.created_at, created.created_at);

        let stored = repository.get_by_login("alice").await.unwrap().unwrap();
        let hasher = Argon2Hasher::new();
        assert!(!hasher.verify("secret1", stored.password_hash()));
        assert!(hasher.verify("secret2", stored.password_hash()));
    }

    #[tokio::test]
    async fn test_update_password_wrong_old_password() {
        let repository = Arc::new(InMemoryUserRepository::new());
        let service = create_service_with_repo(repository.clone());

        let created = service.create(make_request("alice", "secret1")).await.unwrap();
        let before = repository.get_by_login("alice").await.unwrap().unwrap();

        let result = service.update(&created.id, rotate("wrong", "secret2")).await;
        assert!(result.unwrap_err().is_forbidden());

        let after = repository.get_by_login("alice").await.unwrap().unwrap();
        assert_eq!(after, before);
    }

    #[tokio::test]
    async fn test_update_forbidden_never_writes() {
        let user = stored_user("alice", "secret1");
        let id = user.id().to_string();

        let mut mock = MockUserRepository::new();
        mock.expect_get().times(1).returning(move |_| Ok(Some(user.clone())));
        mock.expect_update().times(0);

        let service = mocked_service(mock);
        let result = service.update(&id, rotate("wrong", "secret2")).await;

        assert!(result.unwrap_err().is_forbidden());
    }

    #[tokio::test]
    async fn test_update_writes_with_read_version() {
        let user = stored_user("alice", "secret1");
        let id = user.id().to_string();

        let mut mock = MockUserRepository::new();
        mock.expect_get().times(1).returning(move |_| Ok(Some(user.clone())));
        mock.expect_update()
            .times(1)
            .withf(|user, expected| user.version() == 2 && *expected == 1)
            .returning(|user, _| Ok(user.clone()));

        let service = mocked_service(mock);
        let response = service.update(&id, rotate("secret1", "secret2")).await.unwrap();

        assert_eq!(response.version, 2);
    }

    #[tokio::test]
    async fn test_update_lost_race_is_conflict() {
        let user = stored_user("alice", "secret1");
        let id = user.id().to_string();

        let mut mock = MockUserRepository::new();
        mock.expect_get().returning(move |_| Ok(Some(user.clone())));
        mock.expect_update()
            .returning(|_, _| Err(DomainError::conflict("modified concurrently")));

        let service = mocked_service(mock);
        let result = service.update(&id, rotate("secret1", "secret2")).await;

        assert!(result.unwrap_err().is_conflict());
    }

    #[tokio::test]
    async fn test_update_not_found() {
        let service = create_service();

        let result = service
            .update(&UserId::generate().to_string(), rotate("secret1", "secret2"))
            .await;
        assert!(result.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_update_empty_passwords() {
        let service = create_service();
        let created = service.create(make_request("alice", "secret1")).await.unwrap();

        let result = service.update(&created.id, rotate("secret1", "")).await;
        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_rotation_scenario() {
        let repository = Arc::new(InMemoryUserRepository::new());
        let service = create_service_with_repo(repository.clone());
        let hasher = Argon2Hasher::new();

        let created = service.create(make_request("alice", "secret1")).await.unwrap();
        assert_eq!(created.version, 1);

        let rotated = service
            .update(&created.id, rotate("secret1", "secret2"))
            .await
            .unwrap();
        assert_eq!(rotated.version, 2);

        let stored = repository.get_by_login("alice").await.unwrap().unwrap();
        assert!(!hasher.verify("secret1", stored.password_hash()));
        assert!(hasher.verify("secret2", stored.password_hash()));

        // Stale old password
        let stale = service.update(&created.id, rotate("secret1", "secret3")).await;
        assert!(stale.unwrap_err().is_forbidden());

        let current = service.get_by_id(&created.id).await.unwrap();
        assert_eq!(current.version, 2);
    }

    #[tokio::test]
    async fn test_delete() {
        let service = create_service();

        let created = service.create(make_request("alice", "secret1")).await.unwrap();
        service.delete(&created.id).await.unwrap();

        let result = service.get_by_id(&created.id).await;
        assert!(result.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_deleted_user_is_terminal() {
        let service = create_service();

        let created = service.create(make_request("alice", "secret1")).await.unwrap();
        service.delete(&created.id).await.unwrap();

        assert!(service.delete(&created.id).await.unwrap_err().is_not_found());
        assert!(
            service
                .update(&created.id, rotate("secret1", "secret2"))
                .await
                .unwrap_err()
                .is_not_found()
        );
    }

    #[tokio::test]
    async fn test_delete_not_found() {
        let mut mock = MockUserRepository::new();
        mock.expect_get().times(1).returning(|_| Ok(None));
        mock.expect_delete().times(0);

        let service = mocked_service(mock);
        let result = service.delete(&UserId::generate().to_string()).await;

        assert!(result.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_storage_errors_propagate() {
        let mut mock = MockUserRepository::new();
        mock.expect_list()
            .returning(|| Err(DomainError::storage("connection refused")));

        let service = mocked_service(mock);

        assert!(matches!(service.get_all().await, Err(DomainError::Storage { .. })));
        assert!(service.ping().await.is_err());
    }
}
