//! Command line interface
//!
//! - `serve`: run the HTTP API (default)
//! - `migrate`: apply, revert or inspect schema migrations

pub mod migrate;
pub mod serve;

use clap::{Parser, Subcommand};

/// Home Library - user account API over the library schema
#[derive(Parser)]
#[command(name = "home-library")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Run the HTTP API server
    Serve,

    /// Manage database schema migrations
    Migrate {
        #[command(subcommand)]
        action: MigrateAction,
    },
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrateAction {
    /// Apply all pending migrations
    Up,

    /// Revert the most recently applied migration
    Down,

    /// List migrations and whether they are applied
    Status,
}

impl Cli {
    pub fn subcommand(&self) -> &Command {
        self.command.as_ref().unwrap_or(&Command::Serve)
    }
}
