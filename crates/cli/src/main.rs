//! Burgershop CLI - Database migrations and catalog management.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! bs-cli migrate
//!
//! # Add the burgers listed in a YAML file to the menu
//! bs-cli seed catalog crates/cli/data/catalog.yaml
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed catalog` - Seed the menu from a YAML file

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "bs-cli")]
#[command(author, version, about = "Burgershop CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the database
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Add burgers from a YAML file; names already on the menu are skipped
    Catalog {
        /// Path to the YAML catalog file
        file: String,

        /// Validate the file without touching the database
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { target } => match target {
            SeedTarget::Catalog { file, dry_run } => {
                commands::seed::catalog(&file, dry_run).await?;
            }
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_seed_catalog() {
        let cli = Cli::try_parse_from(["bs-cli", "seed", "catalog", "menu.yaml", "--dry-run"])
            .unwrap_or_else(|e| panic!("{e}"));
        match cli.command {
            Commands::Seed {
                target: SeedTarget::Catalog { file, dry_run },
            } => {
                assert_eq!(file, "menu.yaml");
                assert!(dry_run);
            }
            Commands::Migrate => panic!("parsed as migrate"),
        }
    }
}
