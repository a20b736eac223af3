//! PostgreSQL user repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::user::{NewUser, User, UserId, UserRepository};
use crate::domain::DomainError;

/// PostgreSQL implementation of UserRepository
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT "id", "login", "password", "version", "createdAt", "updatedAt"
            FROM "user"
            WHERE "id" = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get user: {}", e)))?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn get_by_login(&self, login: &str) -> Result<Option<User>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT "id", "login", "password", "version", "createdAt", "updatedAt"
            FROM "user"
            WHERE "login" = $1
            "#,
        )
        .bind(login)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get user by login: {}", e)))?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn list(&self) -> Result<Vec<User>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT "id", "login", "password", "version", "createdAt", "updatedAt"
            FROM "user"
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list users: {}", e)))?;

        rows.iter().map(row_to_user).collect()
    }

    async fn create(&self, user: NewUser) -> Result<User, DomainError> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO "user" ("login", "password", "version", "createdAt", "updatedAt")
            VALUES ($1, $2, $3, $4, $5)
            RETURNING "id"
            "#,
        )
        .bind(&user.login)
        .bind(&user.password_hash)
        .bind(user.version)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::conflict(format!("Login '{}' already exists", user.login))
            } else {
                DomainError::storage(format!("Failed to create user: {}", e))
            }
        })?;

        Ok(user.into_user(UserId::from(id)))
    }

    async fn update(&self, user: &User, expected_version: i32) -> Result<User, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE "user"
            SET "password" = $2, "version" = $3, "updatedAt" = $4
            WHERE "id" = $1 AND "version" = $5
            "#,
        )
        .bind(user.id().as_uuid())
        .bind(user.password_hash())
        .bind(user.version())
        .bind(user.updated_at())
        .bind(expected_version)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to update user: {}", e)))?;

        if result.rows_affected() == 0 {
            // Tell a vanished row apart from a lost race
            return match self.get(user.id()).await? {
                None => Err(DomainError::not_found(format!("User '{}' not found", user.id()))),
                Some(current) => Err(DomainError::conflict(format!(
                    "User '{}' was modified concurrently (expected version {}, found {})",
                    user.id(),
                    expected_version,
                    current.version()
                ))),
            };
        }

        Ok(user.clone())
    }

    async fn delete(&self, id: &UserId) -> Result<bool, DomainError> {
        let result = sqlx::query(r#"DELETE FROM "user" WHERE "id" = $1"#)
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete user: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    error
        .as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}

fn row_to_user(row: &sqlx::postgres::PgRow) -> Result<User, DomainError> {
    let read =
        |e: sqlx::Error| DomainError::storage(format!("Invalid user row in database: {}", e));

    let id: Uuid = row.try_get("id").map_err(read)?;
    let login: String = row.try_get("login").map_err(read)?;
    let password_hash: String = row.try_get("password").map_err(read)?;
    let version: i32 = row.try_get("version").map_err(read)?;
    let created_at: DateTime<Utc> = row.try_get("createdAt").map_err(read)?;
    let updated_at: DateTime<Utc> = row.try_get("updatedAt").map_err(read)?;

    Ok(User::restore(
        UserId::from(id),
        login,
        password_hash,
        version,
        created_at,
        updated_at,
    ))
}
