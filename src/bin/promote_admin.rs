//! promote-admin - grant the admin flag to an existing user.
//!
//! ```text
//! promote-admin 0xAbC...        # by wallet address
//! promote-admin ops@example.com # by email
//! ```
//!
//! Exits 0 when the user is promoted or already an admin, 1 otherwise.

use std::error::Error;
use std::process::ExitCode;
use std::sync::Arc;

use clap::error::ErrorKind;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tierpass::adapters::postgres::{create_pool, PostgresUserDirectory};
use tierpass::application::{PromoteAdminCommand, PromoteAdminHandler, PromoteAdminResult};
use tierpass::config::AppConfig;

/// Grant admin rights to a user identified by wallet address or email.
#[derive(Debug, Parser)]
#[command(name = "promote-admin", version, about)]
struct Cli {
    /// Wallet address (0x...) or email; case-insensitive
    identifier: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
            _ => {
                let _ = e.print();
                return ExitCode::FAILURE;
            }
        },
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,tierpass=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(PromoteAdminResult::Promoted { user_id }) => {
            println!("Promoted user {} to admin", user_id);
            ExitCode::SUCCESS
        }
        Ok(PromoteAdminResult::AlreadyAdmin { user_id }) => {
            println!("User {} is already an admin", user_id);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<PromoteAdminResult, Box<dyn Error>> {
    let database = AppConfig::load_database()?.for_cli();
    let pool = create_pool(&database).await?;

    let handler = PromoteAdminHandler::new(Arc::new(PostgresUserDirectory::new(pool.clone())));
    let result = handler
        .handle(PromoteAdminCommand {
            identifier: cli.identifier,
        })
        .await;

    pool.close().await;
    Ok(result?)
}
