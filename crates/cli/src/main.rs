//! BrandBazaar CLI - migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Apply all pending migrations
//! bb-cli migrate
//!
//! # Create an admin account
//! bb-cli admin create -e admin@example.com -n "Admin Name" -p 'long password'
//!
//! # Give an existing account the admin role
//! bb-cli admin promote -e someone@example.com
//!
//! # Load the demo catalog (safe to re-run)
//! bb-cli seed --file crates/cli/seed/demo.yaml
//!
//! # Advance raffles whose winner let the purchase window lapse
//! bb-cli raffle sweep
//! ```
//!
//! Every command reads `DATABASE_URL` (a `.env` file is honored).

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "bb-cli")]
#[command(author, version, about = "BrandBazaar CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage admin users
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Seed the catalog from a YAML file
    Seed {
        /// Path to the seed file
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Raffle maintenance
    Raffle {
        #[command(subcommand)]
        action: RaffleAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin user
    Create {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Admin display name
        #[arg(short, long)]
        name: String,

        /// Initial password
        #[arg(short, long)]
        password: String,
    },
    /// Give an existing user the admin role
    Promote {
        /// Email of the account to promote
        #[arg(short, long)]
        email: String,
    },
}

#[derive(Subcommand)]
enum RaffleAction {
    /// Run one pass of the winner deadline sweep
    Sweep,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "brandbazaar_cli=info,brandbazaar_admin=info".into()),
        )
        .init();

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
        Commands::Admin { action } => match action {
            AdminAction::Create {
                email,
                name,
                password,
            } => {
                commands::admin::create_user(&email, &name, &password).await?;
            }
            AdminAction::Promote { email } => commands::admin::promote(&email).await?,
        },
        Commands::Seed { file } => {
            let report = commands::seed::from_file(&file).await?;
            tracing::info!(
                products_created = report.products_created,
                variants_created = report.variants_created,
                skipped = report.skipped,
                "Seed complete"
            );
        }
        Commands::Raffle {
            action: RaffleAction::Sweep,
        } => {
            let advanced = commands::raffle::sweep().await?;
            #[allow(clippy::print_stdout)]
            {
                println!("{advanced}");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_admin_create_short_flags() {
        let cli = Cli::try_parse_from([
            "bb-cli", "admin", "create", "-e", "a@b.co", "-n", "Ada", "-p", "secret-pass",
        ])
        .unwrap();
        match cli.command {
            Commands::Admin {
                action:
                    AdminAction::Create {
                        email,
                        name,
                        password,
                    },
            } => {
                assert_eq!(email, "a@b.co");
                assert_eq!(name, "Ada");
                assert_eq!(password, "secret-pass");
            }
            _ => panic!("expected admin create"),
        }
    }

    #[test]
    fn test_parses_seed_file() {
        let cli = Cli::try_parse_from(["bb-cli", "seed", "--file", "demo.yaml"]).unwrap();
        assert!(matches!(cli.command, Commands::Seed { file } if file == PathBuf::from("demo.yaml")));
    }

    #[test]
    fn test_raffle_requires_action() {
        assert!(Cli::try_parse_from(["bb-cli", "raffle"]).is_err());
    }
}
