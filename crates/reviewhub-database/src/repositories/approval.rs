//! Approval (vote) queries.

use sqlx::PgConnection;

use reviewhub_core::result::AppResult;
use reviewhub_core::types::{AccountId, ChangeId};
use reviewhub_entity::ChangeApproval;

use crate::error::db_error;

/// Votes cast by one reviewer on one change.
pub async fn find_by_change_user(
    conn: &mut PgConnection,
    change: ChangeId,
    account: AccountId,
) -> AppResult<Vec<ChangeApproval>> {
    sqlx::query_as::<_, ChangeApproval>(
        "SELECT * FROM change_approvals WHERE change_id = $1 AND account_id = $2 \
         ORDER BY category_id",
    )
    .bind(change)
    .bind(account)
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| db_error("Failed to load approvals", e))
}

/// Record a new vote.
pub async fn insert(conn: &mut PgConnection, approval: &ChangeApproval) -> AppResult<()> {
    sqlx::query(
        "INSERT INTO change_approvals (change_id, account_id, category_id, value, granted) \
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(approval.change_id)
    .bind(approval.account_id)
    .bind(&approval.category_id)
    .bind(approval.value)
    .bind(approval.granted)
    .execute(&mut *conn)
    .await
    .map_err(|e| db_error("Failed to insert approval", e))?;
    Ok(())
}

/// Persist a changed vote.
pub async fn update(conn: &mut PgConnection, approval: &ChangeApproval) -> AppResult<()> {
    sqlx::query(
        "UPDATE change_approvals SET value = $4, granted = $5 \
         WHERE change_id = $1 AND account_id = $2 AND category_id = $3",
    )
    .bind(approval.change_id)
    .bind(approval.account_id)
    .bind(&approval.category_id)
    .bind(approval.value)
    .bind(approval.granted)
    .execute(&mut *conn)
    .await
    .map_err(|e| db_error("Failed to update approval", e))?;
    Ok(())
}

/// Remove a vote.
pub async fn delete(conn: &mut PgConnection, approval: &ChangeApproval) -> AppResult<()> {
    sqlx::query(
        "DELETE FROM change_approvals \
         WHERE change_id = $1 AND account_id = $2 AND category_id = $3",
    )
    .bind(approval.change_id)
    .bind(approval.account_id)
    .bind(&approval.category_id)
    .execute(&mut *conn)
    .await
    .map_err(|e| db_error("Failed to delete approval", e))?;
    Ok(())
}
