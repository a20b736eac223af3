//! Database migrations infrastructure

use async_trait::async_trait;
use sqlx::postgres::PgPool;
use tracing::info;

use crate::domain::DomainError;

/// Trait for running database migrations
#[async_trait]
pub trait Migrator: Send + Sync {
    /// Runs all pending migrations
    async fn run(&self) -> Result<(), DomainError>;

    /// Reverts the last applied migration
    async fn revert(&self) -> Result<(), DomainError>;

    /// Returns the current migration version
    async fn version(&self) -> Result<Option<i64>, DomainError>;
}

/// PostgreSQL migrator over an embedded migration list
#[derive(Debug)]
pub struct PostgresMigrator {
    pool: PgPool,
    migrations: Vec<Migration>,
}

/// Whether a known migration has been applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatus {
    pub version: i64,
    pub description: String,
    pub applied: bool,
}

impl PostgresMigrator {
    pub fn new(pool: PgPool) -> Self {
        Self::with_migrations(pool, schema_migrations())
    }

    pub fn with_migrations(pool: PgPool, migrations: Vec<Migration>) -> Self {
        Self { pool, migrations }
    }

    /// Creates the migrations table if it doesn't exist
    async fn ensure_migrations_table(&self) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS _migrations (
                version BIGINT PRIMARY KEY,
                description TEXT NOT NULL,
                installed_on TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                success BOOLEAN NOT NULL DEFAULT TRUE
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to create migrations table: {}", e)))?;

        Ok(())
    }

    async fn is_applied(&self, version: i64) -> Result<bool, DomainError> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM _migrations WHERE version = $1)")
            .bind(version)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to check migration status: {}", e)))
    }

    /// Runs a single migration and records it in one transaction
    pub async fn run_migration(&self, migration: &Migration) -> Result<(), DomainError> {
        self.ensure_migrations_table().await?;

        if self.is_applied(migration.version).await? {
            return Ok(());
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to start transaction: {}", e)))?;

        // Borrow the connection concretely so the future stays Send
        sqlx::Executor::execute(&mut *tx, sqlx::raw_sql(&migration.up))
            .await
            .map_err(|e| {
                DomainError::storage(format!(
                    "Failed to run migration {}: {}",
                    migration.version, e
                ))
            })?;

        sqlx::query("INSERT INTO _migrations (version, description) VALUES ($1, $2)")
            .bind(migration.version)
            .bind(&migration.description)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                DomainError::storage(format!(
                    "Failed to record migration {}: {}",
                    migration.version, e
                ))
            })?;

        tx.commit().await.map_err(|e| {
            DomainError::storage(format!(
                "Failed to commit migration {}: {}",
                migration.version, e
            ))
        })?;

        info!(
            version = migration.version,
            description = %migration.description,
            "Migration applied"
        );
        Ok(())
    }

    /// Reverts a single migration
    pub async fn revert_migration(&self, migration: &Migration) -> Result<(), DomainError> {
        self.ensure_migrations_table().await?;

        if !self.is_applied(migration.version).await? {
            return Ok(());
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to start transaction: {}", e)))?;

        sqlx::Executor::execute(&mut *tx, sqlx::raw_sql(&migration.down))
            .await
            .map_err(|e| {
                DomainError::storage(format!(
                    "Failed to revert migration {}: {}",
                    migration.version, e
                ))
            })?;

        sqlx::query("DELETE FROM _migrations WHERE version = $1")
            .bind(migration.version)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                DomainError::storage(format!(
                    "Failed to remove migration record {}: {}",
                    migration.version, e
                ))
            })?;

        tx.commit().await.map_err(|e| {
            DomainError::storage(format!(
                "Failed to commit revert {}: {}",
                migration.version, e
            ))
        })?;

        info!(
            version = migration.version,
            description = %migration.description,
            "Migration reverted"
        );
        Ok(())
    }

    /// Returns the latest applied migration version
    pub async fn current_version(&self) -> Result<Option<i64>, DomainError> {
        self.ensure_migrations_table().await?;

        let version: Option<i64> = sqlx::query_scalar(
            "SELECT MAX(version) FROM _migrations WHERE success = TRUE",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get migration version: {}", e)))?;

        Ok(version)
    }

    /// Returns all applied migration versions
    pub async fn applied_versions(&self) -> Result<Vec<i64>, DomainError> {
        self.ensure_migrations_table().await?;

        let versions: Vec<i64> = sqlx::query_scalar(
            "SELECT version FROM _migrations WHERE success = TRUE ORDER BY version",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get applied migrations: {}", e)))?;

        Ok(versions)
    }

    /// Reports every known migration and whether it is applied
    pub async fn status(&self) -> Result<Vec<MigrationStatus>, DomainError> {
        let applied = self.applied_versions().await?;
        Ok(migration_status(&self.migrations, &applied))
    }
}

#[async_trait]
impl Migrator for PostgresMigrator {
    async fn run(&self) -> Result<(), DomainError> {
        for migration in &self.migrations {
            self.run_migration(migration).await?;
        }

        Ok(())
    }

    async fn revert(&self) -> Result<(), DomainError> {
        let Some(current) = self.current_version().await? else {
            return Ok(());
        };

        let migration = self
            .migrations
            .iter()
            .find(|m| m.version == current)
            .ok_or_else(|| {
                DomainError::storage(format!(
                    "Applied migration {} is unknown to this build",
                    current
                ))
            })?;

        self.revert_migration(migration).await
    }

    async fn version(&self) -> Result<Option<i64>, DomainError> {
        self.current_version().await
    }
}

fn migration_status(migrations: &[Migration], applied: &[i64]) -> Vec<MigrationStatus> {
    migrations
        .iter()
        .map(|m| MigrationStatus {
            version: m.version,
            description: m.description.clone(),
            applied: applied.contains(&m.version),
        })
        .collect()
}

/// Represents a database migration
#[derive(Debug, Clone)]
pub struct Migration {
    /// Migration version (timestamp-based)
    pub version: i64,
    /// Human-readable description
    pub description: String,
    /// SQL to run when applying the migration
    pub up: String,
    /// SQL to run when reverting the migration
    pub down: String,
}

impl Migration {
    pub fn new(
        version: i64,
        description: impl Into<String>,
        up: impl Into<String>,
        down: impl Into<String>,
    ) -> Self {
        Self {
            version,
            description: description.into(),
            up: up.into(),
            down: down.into(),
        }
    }
}

/// Migrations describing the library schema, oldest first
pub fn schema_migrations() -> Vec<Migration> {
    vec![
        Migration::new(
            1690836606925,
            "Create track, album, artist and user tables",
            r#"
            CREATE EXTENSION IF NOT EXISTS "uuid-ossp";
            CREATE TABLE "track" (
                "id" uuid NOT NULL DEFAULT uuid_generate_v4(),
                "name" text NOT NULL,
                "duration" smallint NOT NULL,
                "albumId" uuid,
                "artistId" uuid,
                CONSTRAINT "PK_track_id" PRIMARY KEY ("id")
            );
            CREATE TABLE "album" (
                "id" uuid NOT NULL DEFAULT uuid_generate_v4(),
                "name" text NOT NULL,
                "year" smallint NOT NULL,
                "artistId" uuid,
                CONSTRAINT "PK_album_id" PRIMARY KEY ("id")
            );
            CREATE TABLE "artist" (
                "id" uuid NOT NULL DEFAULT uuid_generate_v4(),
                "name" text NOT NULL,
                "grammy" boolean NOT NULL,
                CONSTRAINT "PK_artist_id" PRIMARY KEY ("id")
            );
            CREATE TABLE "user" (
                "id" uuid NOT NULL DEFAULT uuid_generate_v4(),
                "login" text NOT NULL,
                "password" text NOT NULL,
                "version" integer NOT NULL,
                "createdAt" TIMESTAMPTZ NOT NULL,
                "updatedAt" TIMESTAMPTZ NOT NULL,
                CONSTRAINT "PK_user_id" PRIMARY KEY ("id")
            );
            ALTER TABLE "track" ADD CONSTRAINT "FK_track_album" FOREIGN KEY ("albumId")
                REFERENCES "album"("id") ON DELETE NO ACTION ON UPDATE NO ACTION;
            ALTER TABLE "track" ADD CONSTRAINT "FK_track_artist" FOREIGN KEY ("artistId")
                REFERENCES "artist"("id") ON DELETE NO ACTION ON UPDATE NO ACTION;
            ALTER TABLE "album" ADD CONSTRAINT "FK_album_artist" FOREIGN KEY ("artistId")
                REFERENCES "artist"("id") ON DELETE NO ACTION ON UPDATE NO ACTION;
            "#,
            r#"
            ALTER TABLE "album" DROP CONSTRAINT "FK_album_artist";
            ALTER TABLE "track" DROP CONSTRAINT "FK_track_artist";
            ALTER TABLE "track" DROP CONSTRAINT "FK_track_album";
            DROP TABLE "user";
            DROP TABLE "artist";
            DROP TABLE "album";
            DROP TABLE "track";
            "#,
        ),
        Migration::new(
            1697414400000,
            "Enforce unique user login",
            r#"
            CREATE UNIQUE INDEX "UQ_user_login" ON "user" ("login");
            "#,
            r#"
            DROP INDEX IF EXISTS "UQ_user_login";
            "#,
        ),
    ]
}

/// Runs all pending schema migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), DomainError> {
    PostgresMigrator::new(pool.clone()).run().await
}
