//! Application state for shared services

use std::sync::Arc;

use crate::domain::{DomainError, UserRepository, UserResponse};
use crate::infrastructure::user::{
    CreateUserRequest, PasswordHasher, UpdatePasswordRequest, UserService,
};

/// Application state shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<dyn UserServiceTrait>,
}

impl AppState {
    pub fn new(user_service: Arc<dyn UserServiceTrait>) -> Self {
        Self { user_service }
    }
}

/// Object-safe view of the user service so handlers stay backend-agnostic
#[async_trait::async_trait]
pub trait UserServiceTrait: Send + Sync {
    async fn create(&self, request: CreateUserRequest) -> Result<UserResponse, DomainError>;
    async fn get_all(&self) -> Result<Vec<UserResponse>, DomainError>;
    async fn get_by_id(&self, id: &str) -> Result<UserResponse, DomainError>;
    async fn update(
        &self,
        id: &str,
        request: UpdatePasswordRequest,
    ) -> Result<UserResponse, DomainError>;
    async fn delete(&self, id: &str) -> Result<(), DomainError>;
    async fn ping(&self) -> Result<(), DomainError>;
}

#[async_trait::async_trait]
impl<R, H> UserServiceTrait for UserService<R, H>
where
    R: UserRepository + 'static,
    H: PasswordHasher + 'static,
{
    async fn create(&self, request: CreateUserRequest) -> Result<UserResponse, DomainError> {
        UserService::create(self, request).await
    }

    async fn get_all(&self) -> Result<Vec<UserResponse>, DomainError> {
        UserService::get_all(self).await
    }

    async fn get_by_id(&self, id: &str) -> Result<UserResponse, DomainError> {
        UserService::get_by_id(self, id).await
    }

    async fn update(
        &self,
        id: &str,
        request: UpdatePasswordRequest,
    ) -> Result<UserResponse, DomainError> {
        UserService::update(self, id, request).await
    }

    async fn delete(&self, id: &str) -> Result<(), DomainError> {
        UserService::delete(self, id).await
    }

    async fn ping(&self) -> Result<(), DomainError> {
        UserService::ping(self).await
    }
}
