//! Home Library Service
//!
//! User accounts for a home music library, served over HTTP:
//! - Account creation with salted password hashing
//! - Password rotation guarded by the current password and a version counter
//! - In-memory or PostgreSQL storage with embedded schema migrations

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::{AppState, UserServiceTrait};
use config::StorageBackend;
use infrastructure::storage::{connect_pool, run_migrations};
use infrastructure::user::{
    Argon2Hasher, InMemoryUserRepository, PostgresUserRepository, UserService, UserServiceConfig,
};
use tracing::info;

/// Create the application state for the configured storage backend
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    Argon2Hasher::check_cost(config.security.hash_cost)?;

    let service_config = UserServiceConfig {
        hash_cost: config.security.hash_cost,
    };
    let hasher = Arc::new(Argon2Hasher::new());

    info!(
        backend = ?config.storage.backend,
        hash_cost = service_config.hash_cost,
        "Creating user service"
    );

    let user_service: Arc<dyn UserServiceTrait> = match config.storage.backend {
        StorageBackend::Memory => {
            let repository = Arc::new(InMemoryUserRepository::new());
            Arc::new(UserService::new(repository, hasher, service_config))
        }
        StorageBackend::Postgres => {
            let pool = connect_pool(&config.database).await?;
            run_migrations(&pool).await?;

            let repository = Arc::new(PostgresUserRepository::new(pool));
            Arc::new(UserService::new(repository, hasher, service_config))
        }
    };

    Ok(AppState::new(user_service))
}

#[cfg(test)]
mod tests {
    use super::*;
    use infrastructure::user::CreateUserRequest;

    #[tokio::test]
    async fn test_memory_backend_state() {
        let mut config = AppConfig::default();
        config.security.hash_cost = 1;

        let state = create_app_state_with_config(&config).await.unwrap();

        state.user_service.ping().await.unwrap();
        let created = state
            .user_service
            .create(CreateUserRequest {
                login: "alice".to_string(),
                password: "secret1".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(state.user_service.get_all().await.unwrap(), vec![created]);
    }

    #[tokio::test]
    async fn test_zero_hash_cost_fails_at_startup() {
        let mut config = AppConfig::default();
        config.security.hash_cost = 0;

        let result = create_app_state_with_config(&config).await;

        let err = result.err().unwrap();
        assert!(err.to_string().contains("Invalid hash cost 0"));
    }
}
