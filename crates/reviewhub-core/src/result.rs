//! Convenience result type alias for ReviewHub.

use crate::error::AppError;

/// A specialized `Result` type for ReviewHub operations.
pub type AppResult<T> = Result<T, AppError>;
