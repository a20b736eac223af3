use clap::Parser;
use home_library::cli::{self, Cli, Command};
use home_library::config::AppConfig;
use home_library::infrastructure::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::load()?;
    logging::init_logging(&config.logging);

    match cli.subcommand() {
        Command::Serve => cli::serve::run(&config).await,
        Command::Migrate { action } => cli::migrate::run(&config, *action).await,
    }
}
