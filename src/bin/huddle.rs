// ABOUTME: Command-line entry point: serve the webhook, run migrations or the maintenance sweep
// ABOUTME: Configuration comes from the environment; flags only override the port and dry-run
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Huddle Binary
//!
//! ```text
//! huddle run [--port 8080]
//! huddle migrate
//! huddle maintenance [--dry-run]
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use huddle_sms::{
    config::environment::ServerConfig,
    database::{run_maintenance, Database},
    logging, server,
};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "huddle")]
#[command(about = "Huddle - SMS-first group event coordinator")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the SMS webhook (default)
    Run {
        /// Override HTTP port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Create or update the database schema
    Migrate,
    /// Run the data-integrity sweep
    Maintenance {
        /// Report what would change without committing
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut config = ServerConfig::from_env()?;
    logging::init_from_config(&config)?;

    match args.command.unwrap_or(Command::Run { port: None }) {
        Command::Run { port } => {
            if let Some(port) = port {
                config.http_port = port;
            }
            info!("{}", config.summary());
            if let Err(e) = server::run(&config).await {
                error!("Server error: {e:#}");
                return Err(e);
            }
        }
        Command::Migrate => {
            Database::new(&config.database_url).await?;
            info!(database = %config.database_url, "Schema is up to date");
        }
        Command::Maintenance { dry_run } => {
            let database = Database::new(&config.database_url).await?;
            let report = run_maintenance(&database, dry_run).await?;
            println!("orphan availability removed:     {}", report.orphan_availability);
            println!("availability re-parented:        {}", report.reparented_availability);
            println!("duplicate availability removed:  {}", report.duplicate_availability);
            println!("orphan guests removed:           {}", report.orphan_guests);
            println!(
                "total: {}{}",
                report.total(),
                if dry_run { " (dry run, rolled back)" } else { "" }
            );
        }
    }

    Ok(())
}
