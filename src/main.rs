mod commands;
mod logging;
mod render;

use std::path::PathBuf;

use anyhow::Result;
use apptsync_core::config::SyncConfig;
use apptsync_core::sync::SyncMode;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "apptsync")]
#[command(about = "Keep a Google calendar and a local appointment file in sync")]
struct Cli {
    /// Config file (defaults to ~/.config/apptsync/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Show debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one sync pass in both directions
    Sync {
        /// Only propagate additions; never delete anything
        #[arg(long)]
        additions_only: bool,
    },
    /// Show what the next sync would propagate, without changing anything
    Status,
    /// Forget the snapshots so the next sync starts from a clean baseline
    Reset,
    /// Sign in to the calendar provider
    Auth,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;

    let config = SyncConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Sync { additions_only } => {
            let mode = if additions_only {
                SyncMode::AdditionsOnly
            } else {
                SyncMode::Full
            };
            commands::sync::run(&config, mode).await
        }
        Commands::Status => commands::status::run(&config).await,
        Commands::Reset => commands::reset::run(&config),
        Commands::Auth => commands::auth::run(&config).await,
    }
}
