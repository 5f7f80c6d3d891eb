//! Change message entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use reviewhub_core::types::{AccountId, ChangeId};

/// An immutable entry in a change's review history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ChangeMessage {
    /// Change the message belongs to.
    pub change_id: ChangeId,
    /// Generated identifier, unique within the change.
    pub uuid: String,
    /// Author, or `None` for messages written by the system.
    pub author_id: Option<AccountId>,
    /// When the message was written.
    pub written_on: DateTime<Utc>,
    /// Message text.
    pub message: String,
}

impl ChangeMessage {
    /// Create a message written now.
    pub fn new(
        change_id: ChangeId,
        uuid: impl Into<String>,
        author_id: Option<AccountId>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            change_id,
            uuid: uuid.into(),
            author_id,
            written_on: Utc::now(),
            message: message.into(),
        }
    }
}
