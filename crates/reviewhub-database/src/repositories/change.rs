//! Change queries.

use sqlx::PgConnection;

use reviewhub_core::result::AppResult;
use reviewhub_core::types::ChangeId;
use reviewhub_entity::Change;

use crate::error::db_error;

/// Find a change by id.
pub async fn find_by_id(conn: &mut PgConnection, id: ChangeId) -> AppResult<Option<Change>> {
    sqlx::query_as::<_, Change>("SELECT * FROM changes WHERE change_id = $1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| db_error("Failed to find change", e))
}

/// Insert a new change.
pub async fn insert(conn: &mut PgConnection, change: &Change) -> AppResult<()> {
    sqlx::query(
        "INSERT INTO changes (change_id, owner_account_id, dest_branch, subject, status, \
         current_patch_set_id, created_on, last_updated_on) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(change.change_id)
    .bind(change.owner_account_id)
    .bind(&change.dest_branch)
    .bind(&change.subject)
    .bind(change.status)
    .bind(change.current_patch_set_id)
    .bind(change.created_on)
    .bind(change.last_updated_on)
    .execute(&mut *conn)
    .await
    .map_err(|e| db_error("Failed to insert change", e))?;
    Ok(())
}

/// Persist the mutable columns of a change.
pub async fn update(conn: &mut PgConnection, change: &Change) -> AppResult<()> {
    let result = sqlx::query(
        "UPDATE changes SET subject = $2, status = $3, current_patch_set_id = $4, \
         last_updated_on = $5 WHERE change_id = $1",
    )
    .bind(change.change_id)
    .bind(&change.subject)
    .bind(change.status)
    .bind(change.current_patch_set_id)
    .bind(change.last_updated_on)
    .execute(&mut *conn)
    .await
    .map_err(|e| db_error("Failed to update change", e))?;

    if result.rows_affected() == 0 {
        return Err(reviewhub_core::AppError::not_found(format!(
            "Change {} not found",
            change.change_id
        )));
    }
    Ok(())
}
