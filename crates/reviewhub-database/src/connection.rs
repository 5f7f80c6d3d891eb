//! Review database pool and the isolation level review transactions run at.

use std::fmt;
use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use reviewhub_core::config::DatabaseConfig;
use reviewhub_core::error::{AppError, ErrorKind};
use reviewhub_core::result::AppResult;

use crate::migration::{self, SchemaStatus};
use crate::postgres::PgReviewStore;

/// Isolation level applied to every review transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsolationLevel {
    /// PostgreSQL default. Lost updates are possible under concurrent publishes.
    ReadCommitted,
    /// Concurrent publishes on the same change fail with a retryable conflict.
    Serializable,
}

impl IsolationLevel {
    /// Isolation level selected by the `database.serializable` setting.
    pub fn from_config(config: &DatabaseConfig) -> Self {
        if config.serializable {
            Self::Serializable
        } else {
            Self::ReadCommitted
        }
    }

    /// Statement run at the start of a transaction, if the level differs
    /// from the server default.
    pub fn set_statement(self) -> Option<&'static str> {
        match self {
            Self::ReadCommitted => None,
            Self::Serializable => Some("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE"),
        }
    }
}

impl fmt::Display for IsolationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadCommitted => write!(f, "read committed"),
            Self::Serializable => write!(f, "serializable"),
        }
    }
}

/// Connection pool to the review database.
#[derive(Debug, Clone)]
pub struct DatabasePool {
    pool: PgPool,
    isolation: IsolationLevel,
}

impl DatabasePool {
    /// Open the pool described by `config`.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        let isolation = IsolationLevel::from_config(config);
        info!(
            url = %mask_password(&config.url),
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            isolation = %isolation,
            "Connecting to review database"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
            .connect(&config.url)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    format!("Failed to connect to review database: {e}"),
                    e,
                )
            })?;

        Ok(Self { pool, isolation })
    }

    /// Isolation level review transactions on this pool use.
    pub fn isolation(&self) -> IsolationLevel {
        self.isolation
    }

    /// Review store sharing this pool.
    pub fn review_store(&self) -> PgReviewStore {
        PgReviewStore::new(self.pool.clone(), self.isolation)
    }

    /// Apply pending review schema migrations.
    pub async fn migrate(&self) -> AppResult<()> {
        migration::run_migrations(&self.pool).await
    }

    /// Report which review tables are missing from the database.
    pub async fn schema_status(&self) -> AppResult<SchemaStatus> {
        migration::schema_status(&self.pool).await
    }

    /// Close all connections in the pool.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Review database pool closed");
    }
}

/// Mask the password portion of a database URL for safe logging.
pub fn mask_password(url: &str) -> String {
    if let Some(at_pos) = url.find('@') {
        if let Some(colon_pos) = url[..at_pos].rfind(':') {
            let scheme_end = url.find("://").map(|p| p + 3).unwrap_or(0);
            if colon_pos > scheme_end {
                return format!("{}:****@{}", &url[..colon_pos], &url[at_pos + 1..]);
            }
        }
    }
    url.to_string()
}
