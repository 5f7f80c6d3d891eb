//! Mapping of sqlx errors into [`AppError`].

use reviewhub_core::error::{AppError, ErrorKind};

/// SQLSTATE codes that mean "run the transaction again".
const RETRYABLE_SQLSTATES: &[&str] = &[
    // serialization_failure
    "40001",
    // deadlock_detected
    "40P01",
    // unique_violation: a concurrent insert of the same key
    "23505",
];

/// Convert a sqlx error, classifying concurrency failures as conflicts.
pub fn db_error(context: &str, err: sqlx::Error) -> AppError {
    let kind = match &err {
        sqlx::Error::Database(db) => match db.code() {
            Some(code) if RETRYABLE_SQLSTATES.contains(&&*code) => ErrorKind::Conflict,
            _ => ErrorKind::Database,
        },
        sqlx::Error::RowNotFound => ErrorKind::NotFound,
        _ => ErrorKind::Database,
    };
    AppError::with_source(kind, format!("{context}: {err}"), err)
}
