//! Configuration management CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use reviewhub_core::error::AppError;
use reviewhub_database::connection::mask_password;

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,
    /// Validate configuration file
    Validate,
}

/// One allowed vote, for table output
#[derive(Debug, Serialize, Tabled)]
struct ApprovalRow {
    /// Category id
    category: String,
    /// Category name
    name: String,
    /// Vote
    value: String,
    /// Description
    description: String,
}

/// Execute config commands
pub fn execute(args: &ConfigArgs, config_path: &str, format: OutputFormat) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => {
            let mut config = super::load_config(config_path)?;
            config.database.url = mask_password(&config.database.url);

            match format {
                OutputFormat::Json => output::print_json(&config),
                OutputFormat::Table => {
                    output::print_kv("Database", &config.database.url);
                    output::print_kv(
                        "Pool",
                        &format!(
                            "{}..{} connections",
                            config.database.min_connections, config.database.max_connections
                        ),
                    );
                    output::print_kv("Serializable", &config.database.serializable.to_string());
                    output::print_kv(
                        "Logging",
                        &format!("{} ({})", config.logging.level, config.logging.format),
                    );
                    output::print_kv(
                        "Transaction retries",
                        &config.review.transaction_retries.to_string(),
                    );
                    output::print_kv("Notifications", &config.notification.enabled.to_string());

                    let rows: Vec<ApprovalRow> = config
                        .review
                        .approval_types
                        .iter()
                        .flat_map(|at| {
                            at.values.iter().map(move |v| ApprovalRow {
                                category: at.id.clone(),
                                name: at.name.clone(),
                                value: format!("{:+}", v.value),
                                description: v.name.clone(),
                            })
                        })
                        .collect();
                    output::print_list(&rows, format);
                }
            }
        }
        ConfigCommand::Validate => match super::load_config(config_path) {
            Ok(config) => {
                output::print_success(&format!("Configuration '{config_path}' is valid"));
                output::print_kv("Database", &mask_password(&config.database.url));
                output::print_kv(
                    "Approval categories",
                    &config.review.approval_types.len().to_string(),
                );
            }
            Err(e) => {
                output::print_error(&format!("Configuration invalid: {e}"));
                return Err(e);
            }
        },
    }

    Ok(())
}
