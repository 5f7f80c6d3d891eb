//! Database migration management commands.

use clap::{Args, Subcommand};

use crate::output;
use reviewhub_core::error::{AppError, ErrorKind};

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Migration subcommand
    #[command(subcommand)]
    pub command: MigrateCommand,
}

/// Migration subcommands
#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Run all pending migrations
    Run,
    /// Check that every review table exists
    Check,
}

/// Execute migration commands
pub async fn execute(args: &MigrateArgs, config_path: &str) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let db = super::connect(&config).await?;

    match &args.command {
        MigrateCommand::Run => {
            println!("Running database migrations...");
            let result = db.migrate().await;
            db.close().await;
            result?;
            output::print_success("All migrations applied successfully.");
        }
        MigrateCommand::Check => {
            let status = db.schema_status().await;
            db.close().await;
            let status = status?;
            if status.is_complete() {
                output::print_success(&format!(
                    "Review schema is complete ({} isolation).",
                    db.isolation()
                ));
            } else {
                return Err(AppError::new(
                    ErrorKind::Database,
                    format!(
                        "Review schema is missing tables: {}. Run `reviewhub migrate run`.",
                        status.missing_tables.join(", ")
                    ),
                ));
            }
        }
    }

    Ok(())
}
