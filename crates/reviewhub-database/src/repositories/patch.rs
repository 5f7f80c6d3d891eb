//! Patch (per-file) queries.

use sqlx::PgConnection;

use reviewhub_core::result::AppResult;
use reviewhub_entity::{Patch, PatchKey, PatchSetId};

use crate::error::db_error;

/// Find a single patch.
pub async fn find_by_key(conn: &mut PgConnection, key: &PatchKey) -> AppResult<Option<Patch>> {
    sqlx::query_as::<_, Patch>(
        "SELECT * FROM patches WHERE change_id = $1 AND patch_set_id = $2 AND file_name = $3",
    )
    .bind(key.patch_set.change_id)
    .bind(key.patch_set.patch_set_id)
    .bind(&key.file_name)
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| db_error("Failed to find patch", e))
}

/// Find the named files of one patch set.
pub async fn find_by_file_names(
    conn: &mut PgConnection,
    patch_set: PatchSetId,
    file_names: &[String],
) -> AppResult<Vec<Patch>> {
    if file_names.is_empty() {
        return Ok(Vec::new());
    }
    sqlx::query_as::<_, Patch>(
        "SELECT * FROM patches WHERE change_id = $1 AND patch_set_id = $2 \
         AND file_name = ANY($3) ORDER BY file_name",
    )
    .bind(patch_set.change_id)
    .bind(patch_set.patch_set_id)
    .bind(file_names)
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| db_error("Failed to load patches", e))
}

/// Insert a new patch.
pub async fn insert(conn: &mut PgConnection, patch: &Patch) -> AppResult<()> {
    sqlx::query(
        "INSERT INTO patches (change_id, patch_set_id, file_name, change_type, source_file_name, \
         comment_count) VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(patch.key.patch_set.change_id)
    .bind(patch.key.patch_set.patch_set_id)
    .bind(&patch.key.file_name)
    .bind(patch.change_type)
    .bind(&patch.source_file_name)
    .bind(patch.comment_count)
    .execute(&mut *conn)
    .await
    .map_err(|e| db_error("Failed to insert patch", e))?;
    Ok(())
}

/// Persist the comment counter of a patch.
pub async fn update(conn: &mut PgConnection, patch: &Patch) -> AppResult<()> {
    sqlx::query(
        "UPDATE patches SET comment_count = $4 \
         WHERE change_id = $1 AND patch_set_id = $2 AND file_name = $3",
    )
    .bind(patch.key.patch_set.change_id)
    .bind(patch.key.patch_set.patch_set_id)
    .bind(&patch.key.file_name)
    .bind(patch.comment_count)
    .execute(&mut *conn)
    .await
    .map_err(|e| db_error("Failed to update patch", e))?;
    Ok(())
}
