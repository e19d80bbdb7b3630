//! `atelier`: operator commands for the salon backend.
//!
//! ```bash
//! atelier migrate
//! atelier admin create -e owner@atelier.test -n "Salon Owner" -p 'long-password' -r super_admin
//! atelier admin set-password -e owner@atelier.test -p 'new-long-password'
//! atelier seed data/seed.yaml --clear
//! ```
//!
//! Every command talks to the database named by `API_DATABASE_URL` (or
//! `DATABASE_URL`), with `.env` loaded first.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "atelier", version, about = "Migrations, admin accounts and seed content")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply pending schema migrations
    Migrate,
    /// Create admin accounts or reset their passwords
    #[command(subcommand)]
    Admin(AdminCommand),
    /// Load services, portfolio, articles, contacts and catalog from YAML
    Seed {
        file: PathBuf,
        /// Delete existing content first (booked services are kept)
        #[arg(long)]
        clear: bool,
    },
}

#[derive(Subcommand)]
enum AdminCommand {
    Create {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        password: String,
        /// `admin` or `super_admin`
        #[arg(short, long, default_value = "admin")]
        role: String,
    },
    SetPassword {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
}

impl Command {
    async fn execute(self) -> Result<(), Box<dyn Error>> {
        match self {
            Self::Migrate => commands::migrate::run().await?,
            Self::Admin(AdminCommand::Create {
                email,
                name,
                password,
                role,
            }) => commands::admin::create_user(&email, &name, &password, &role).await?,
            Self::Admin(AdminCommand::SetPassword { email, password }) => {
                commands::admin::set_password(&email, &password).await?;
            }
            Self::Seed { file, clear } => commands::seed::content(&file, clear).await?,
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,sqlx=warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match Cli::parse().command.execute().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Option<Command> {
        Cli::try_parse_from(std::iter::once("atelier").chain(args.iter().copied()))
            .ok()
            .map(|cli| cli.command)
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_admin_role_defaults_to_admin() {
        let command = parse(&["admin", "create", "-e", "a@b.co", "-n", "Ann", "-p", "password123"]);
        assert!(matches!(
            command,
            Some(Command::Admin(AdminCommand::Create { role, .. })) if role == "admin"
        ));
    }

    #[test]
    fn test_seed_arguments() {
        assert!(matches!(
            parse(&["seed", "seed.yaml", "--clear"]),
            Some(Command::Seed { clear: true, file }) if file == PathBuf::from("seed.yaml")
        ));
        assert!(matches!(parse(&["seed", "seed.yaml"]), Some(Command::Seed { clear: false, .. })));
        assert!(parse(&["seed"]).is_none());
    }

    #[test]
    fn test_set_password_requires_email() {
        assert!(parse(&["admin", "set-password", "-p", "password123"]).is_none());
    }
}
