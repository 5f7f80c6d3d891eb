//! Patch set and patch set info queries.

use sqlx::PgConnection;

use reviewhub_core::result::AppResult;
use reviewhub_entity::{PatchSet, PatchSetId, PatchSetInfo};

use crate::error::db_error;

/// Find a patch set by key.
pub async fn find_by_id(conn: &mut PgConnection, id: PatchSetId) -> AppResult<Option<PatchSet>> {
    sqlx::query_as::<_, PatchSet>(
        "SELECT * FROM patch_sets WHERE change_id = $1 AND patch_set_id = $2",
    )
    .bind(id.change_id)
    .bind(id.patch_set_id)
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| db_error("Failed to find patch set", e))
}

/// Insert a new patch set.
pub async fn insert(conn: &mut PgConnection, patch_set: &PatchSet) -> AppResult<()> {
    sqlx::query(
        "INSERT INTO patch_sets (change_id, patch_set_id, revision, uploader_account_id, created_on) \
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(patch_set.id.change_id)
    .bind(patch_set.id.patch_set_id)
    .bind(&patch_set.revision)
    .bind(patch_set.uploader_account_id)
    .bind(patch_set.created_on)
    .execute(&mut *conn)
    .await
    .map_err(|e| db_error("Failed to insert patch set", e))?;
    Ok(())
}

/// Find the commit metadata of a patch set.
pub async fn find_info(
    conn: &mut PgConnection,
    id: PatchSetId,
) -> AppResult<Option<PatchSetInfo>> {
    sqlx::query_as::<_, PatchSetInfo>(
        "SELECT * FROM patch_set_info WHERE change_id = $1 AND patch_set_id = $2",
    )
    .bind(id.change_id)
    .bind(id.patch_set_id)
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| db_error("Failed to find patch set info", e))
}

/// Insert commit metadata for a patch set.
pub async fn insert_info(conn: &mut PgConnection, info: &PatchSetInfo) -> AppResult<()> {
    sqlx::query(
        "INSERT INTO patch_set_info (change_id, patch_set_id, subject, message, author_name, \
         author_email, authored_on, committer_name, committer_email, committed_on) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
    )
    .bind(info.key.change_id)
    .bind(info.key.patch_set_id)
    .bind(&info.subject)
    .bind(&info.message)
    .bind(&info.author_name)
    .bind(&info.author_email)
    .bind(info.authored_on)
    .bind(&info.committer_name)
    .bind(&info.committer_email)
    .bind(info.committed_on)
    .execute(&mut *conn)
    .await
    .map_err(|e| db_error("Failed to insert patch set info", e))?;
    Ok(())
}
