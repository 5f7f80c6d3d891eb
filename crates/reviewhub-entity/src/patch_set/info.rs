//! Commit metadata recorded for a patch set.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::model::PatchSetId;

/// Commit metadata of a patch set, used when notifying reviewers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct PatchSetInfo {
    /// The patch set this metadata describes.
    #[sqlx(flatten)]
    pub key: PatchSetId,
    /// First line of the commit message.
    pub subject: String,
    /// Full commit message.
    pub message: String,
    /// Commit author name.
    pub author_name: Option<String>,
    /// Commit author email.
    pub author_email: Option<String>,
    /// Author timestamp.
    pub authored_on: Option<DateTime<Utc>>,
    /// Committer name.
    pub committer_name: Option<String>,
    /// Committer email.
    pub committer_email: Option<String>,
    /// Commit timestamp.
    pub committed_on: Option<DateTime<Utc>>,
}

impl PatchSetInfo {
    /// Create metadata from a commit message, deriving the subject line.
    pub fn new(key: PatchSetId, message: impl Into<String>) -> Self {
        let message = message.into();
        let subject = message.lines().next().unwrap_or_default().trim().to_string();
        Self {
            key,
            subject,
            message,
            author_name: None,
            author_email: None,
            authored_on: None,
            committer_name: None,
            committer_email: None,
            committed_on: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reviewhub_core::types::ChangeId;

    #[test]
    fn test_subject_is_first_line() {
        let info = PatchSetInfo::new(
            PatchSetId::new(ChangeId::new(9), 1),
            "Fix overflow in parser\n\nThe length was read as i8.\n",
        );
        assert_eq!(info.subject, "Fix overflow in parser");
    }

    #[test]
    fn test_empty_message_has_empty_subject() {
        let info = PatchSetInfo::new(PatchSetId::new(ChangeId::new(9), 1), "");
        assert!(info.subject.is_empty());
    }
}
