//! CLI command definitions and dispatch.

pub mod config;
pub mod drafts;
pub mod migrate;
pub mod publish;
pub mod ref_name;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use reviewhub_core::config::AppConfig;
use reviewhub_core::error::AppError;
use reviewhub_database::{DatabasePool, ReviewStore};

/// ReviewHub: code review publishing and draft management
#[derive(Debug, Parser)]
#[command(name = "reviewhub", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Print the git ref a patch set is stored under
    RefName(ref_name::RefNameArgs),
    /// Configuration management
    Config(config::ConfigArgs),
    /// Draft comment management
    Drafts(drafts::DraftsArgs),
    /// Publish drafts, votes and a message on a patch set
    Publish(publish::PublishArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        tracing::debug!(config = %self.config, command = ?self.command, "Executing command");
        match &self.command {
            Commands::Migrate(args) => migrate::execute(args, &self.config).await,
            Commands::RefName(args) => ref_name::execute(args, self.format),
            Commands::Config(args) => config::execute(args, &self.config, self.format),
            Commands::Drafts(args) => drafts::execute(args, &self.config, self.format).await,
            Commands::Publish(args) => publish::execute(args, &self.config, self.format).await,
        }
    }
}

/// Helper: load configuration from file
pub fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    AppConfig::load_from(config_path)
}

/// Helper: connect to the database described by `config`
pub async fn connect(config: &AppConfig) -> Result<DatabasePool, AppError> {
    DatabasePool::connect(&config.database).await
}

/// Helper: open the PostgreSQL review store
pub async fn open_store(config: &AppConfig) -> Result<Arc<dyn ReviewStore>, AppError> {
    let db = connect(config).await?;
    Ok(Arc::new(db.review_store()))
}
