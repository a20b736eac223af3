//! Migrate command - applies or reverts the schema

use tracing::info;

use crate::cli::MigrateAction;
use crate::config::AppConfig;
use crate::infrastructure::storage::{connect_pool, MigrationStatus, Migrator, PostgresMigrator};

pub async fn run(config: &AppConfig, action: MigrateAction) -> anyhow::Result<()> {
    let pool = connect_pool(&config.database).await?;
    let migrator = PostgresMigrator::new(pool.clone());

    match action {
        MigrateAction::Up => {
            migrator.run().await?;
            info!(version = ?migrator.version().await?, "Migrations up to date");
        }
        MigrateAction::Down => {
            migrator.revert().await?;
            info!(version = ?migrator.version().await?, "Reverted last migration");
        }
        MigrateAction::Status => {
            for line in format_status(&migrator.status().await?) {
                println!("{}", line);
            }
        }
    }

    pool.close().await;
    Ok(())
}

fn format_status(status: &[MigrationStatus]) -> Vec<String> {
    status
        .iter()
        .map(|s| {
            let mark = if s.applied { "applied" } else { "pending" };
            format!("{:<8} {} {}", mark, s.version, s.description)
        })
        .collect()
}
