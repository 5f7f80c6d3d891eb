//! Embedded review schema and a check that it is installed.

use sqlx::PgPool;
use sqlx::migrate::Migrator;
use tracing::{info, warn};

use reviewhub_core::error::{AppError, ErrorKind};
use reviewhub_core::result::AppResult;

use crate::error::db_error;

static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Tables the review store reads and writes.
pub const REVIEW_TABLES: [&str; 7] = [
    "changes",
    "patch_sets",
    "patch_set_info",
    "patches",
    "patch_comments",
    "change_approvals",
    "change_messages",
];

/// Which review tables a database is missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaStatus {
    /// Missing tables, in [`REVIEW_TABLES`] order.
    pub missing_tables: Vec<&'static str>,
}

impl SchemaStatus {
    fn from_present(present: &[String]) -> Self {
        let missing_tables = REVIEW_TABLES
            .into_iter()
            .filter(|table| !present.iter().any(|p| p == table))
            .collect();
        Self { missing_tables }
    }

    /// Whether every review table exists.
    pub fn is_complete(&self) -> bool {
        self.missing_tables.is_empty()
    }
}

/// Apply pending review schema migrations.
pub async fn run_migrations(pool: &PgPool) -> AppResult<()> {
    info!(
        migrations = MIGRATOR.iter().count(),
        "Applying review schema migrations"
    );

    MIGRATOR.run(pool).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Database,
            format!("Failed to migrate review schema: {e}"),
            e,
        )
    })?;

    info!("Review schema is up to date");
    Ok(())
}

/// Look up the review tables in the connection's current schema.
pub async fn schema_status(pool: &PgPool) -> AppResult<SchemaStatus> {
    let wanted: Vec<String> = REVIEW_TABLES.iter().map(|t| t.to_string()).collect();
    let present: Vec<String> = sqlx::query_scalar(
        "SELECT table_name::text FROM information_schema.tables \
         WHERE table_schema = current_schema() AND table_name::text = ANY($1)",
    )
    .bind(wanted)
    .fetch_all(pool)
    .await
    .map_err(|e| db_error("Failed to inspect review schema", e))?;

    let status = SchemaStatus::from_present(&present);
    if !status.is_complete() {
        warn!(missing = ?status.missing_tables, "Review schema is incomplete");
    }
    Ok(status)
}
