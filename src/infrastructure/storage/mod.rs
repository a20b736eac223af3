//! Storage infrastructure - PostgreSQL pooling and schema migrations

pub mod migrations;
mod postgres;

pub use migrations::{
    run_migrations, schema_migrations, Migration, MigrationStatus, Migrator, PostgresMigrator,
};
pub use postgres::connect_pool;
