//! Change message queries.

use sqlx::PgConnection;

use reviewhub_core::result::AppResult;
use reviewhub_core::types::ChangeId;
use reviewhub_entity::ChangeMessage;

use crate::error::db_error;

/// Append a message to a change.
pub async fn insert(conn: &mut PgConnection, message: &ChangeMessage) -> AppResult<()> {
    sqlx::query(
        "INSERT INTO change_messages (change_id, uuid, author_id, written_on, message) \
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(message.change_id)
    .bind(&message.uuid)
    .bind(message.author_id)
    .bind(message.written_on)
    .bind(&message.message)
    .execute(&mut *conn)
    .await
    .map_err(|e| db_error("Failed to insert change message", e))?;
    Ok(())
}

/// Messages of a change, oldest first.
pub async fn find_by_change(
    conn: &mut PgConnection,
    change: ChangeId,
) -> AppResult<Vec<ChangeMessage>> {
    sqlx::query_as::<_, ChangeMessage>(
        "SELECT * FROM change_messages WHERE change_id = $1 ORDER BY written_on, uuid",
    )
    .bind(change)
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| db_error("Failed to load change messages", e))
}
