//! Inline comment queries.

use sqlx::PgConnection;

use reviewhub_core::error::AppError;
use reviewhub_core::result::AppResult;
use reviewhub_core::types::AccountId;
use reviewhub_entity::{CommentKey, CommentStatus, PatchKey, PatchLineComment, PatchSetId};

use crate::error::db_error;

/// Find a comment by key.
pub async fn find_by_key(
    conn: &mut PgConnection,
    key: &CommentKey,
) -> AppResult<Option<PatchLineComment>> {
    sqlx::query_as::<_, PatchLineComment>(
        "SELECT * FROM patch_comments WHERE change_id = $1 AND patch_set_id = $2 \
         AND file_name = $3 AND uuid = $4",
    )
    .bind(key.patch.patch_set.change_id)
    .bind(key.patch.patch_set.patch_set_id)
    .bind(&key.patch.file_name)
    .bind(&key.uuid)
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| db_error("Failed to find comment", e))
}

/// Drafts by `author` across a whole patch set.
pub async fn drafts_by_patch_set(
    conn: &mut PgConnection,
    patch_set: PatchSetId,
    author: AccountId,
) -> AppResult<Vec<PatchLineComment>> {
    sqlx::query_as::<_, PatchLineComment>(
        "SELECT * FROM patch_comments WHERE change_id = $1 AND patch_set_id = $2 \
         AND author_id = $3 AND status = $4 ORDER BY file_name, line_nbr, written_on",
    )
    .bind(patch_set.change_id)
    .bind(patch_set.patch_set_id)
    .bind(author)
    .bind(CommentStatus::Draft)
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| db_error("Failed to load draft comments", e))
}

/// Drafts by `author` on one file.
pub async fn drafts_by_patch(
    conn: &mut PgConnection,
    patch: &PatchKey,
    author: AccountId,
) -> AppResult<Vec<PatchLineComment>> {
    sqlx::query_as::<_, PatchLineComment>(
        "SELECT * FROM patch_comments WHERE change_id = $1 AND patch_set_id = $2 \
         AND file_name = $3 AND author_id = $4 AND status = $5 ORDER BY line_nbr, written_on",
    )
    .bind(patch.patch_set.change_id)
    .bind(patch.patch_set.patch_set_id)
    .bind(&patch.file_name)
    .bind(author)
    .bind(CommentStatus::Draft)
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| db_error("Failed to load draft comments", e))
}

/// Insert a new comment.
pub async fn insert(conn: &mut PgConnection, comment: &PatchLineComment) -> AppResult<()> {
    sqlx::query(
        "INSERT INTO patch_comments (change_id, patch_set_id, file_name, uuid, line_nbr, side, \
         author_id, written_on, status, message) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
    )
    .bind(comment.key.patch.patch_set.change_id)
    .bind(comment.key.patch.patch_set.patch_set_id)
    .bind(&comment.key.patch.file_name)
    .bind(&comment.key.uuid)
    .bind(comment.line_nbr)
    .bind(comment.side)
    .bind(comment.author_id)
    .bind(comment.written_on)
    .bind(comment.status)
    .bind(&comment.message)
    .execute(&mut *conn)
    .await
    .map_err(|e| db_error("Failed to insert comment", e))?;
    Ok(())
}

/// Persist the mutable columns of a comment.
pub async fn update(conn: &mut PgConnection, comment: &PatchLineComment) -> AppResult<()> {
    let result = sqlx::query(
        "UPDATE patch_comments SET line_nbr = $5, side = $6, written_on = $7, status = $8, \
         message = $9 WHERE change_id = $1 AND patch_set_id = $2 AND file_name = $3 AND uuid = $4",
    )
    .bind(comment.key.patch.patch_set.change_id)
    .bind(comment.key.patch.patch_set.patch_set_id)
    .bind(&comment.key.patch.file_name)
    .bind(&comment.key.uuid)
    .bind(comment.line_nbr)
    .bind(comment.side)
    .bind(comment.written_on)
    .bind(comment.status)
    .bind(&comment.message)
    .execute(&mut *conn)
    .await
    .map_err(|e| db_error("Failed to update comment", e))?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found(format!(
            "Comment {} on {} not found",
            comment.key.uuid, comment.key.patch
        )));
    }
    Ok(())
}

/// Delete a comment.
pub async fn delete(conn: &mut PgConnection, key: &CommentKey) -> AppResult<()> {
    sqlx::query(
        "DELETE FROM patch_comments WHERE change_id = $1 AND patch_set_id = $2 \
         AND file_name = $3 AND uuid = $4",
    )
    .bind(key.patch.patch_set.change_id)
    .bind(key.patch.patch_set.patch_set_id)
    .bind(&key.patch.file_name)
    .bind(&key.uuid)
    .execute(&mut *conn)
    .await
    .map_err(|e| db_error("Failed to delete comment", e))?;
    Ok(())
}
