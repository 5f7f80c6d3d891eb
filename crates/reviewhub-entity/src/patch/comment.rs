//! Inline line comment entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use reviewhub_core::types::AccountId;

use super::model::PatchKey;
use crate::patch_set::PatchSetId;

/// Publication state of an inline comment.
///
/// The only permitted transition is `Draft` → `Published`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "comment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CommentStatus {
    /// Visible only to its author.
    Draft,
    /// Visible to everyone who can read the change.
    Published,
}

/// Composite key of a comment: its patch plus a generated identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, FromRow)]
pub struct CommentKey {
    /// The file the comment is attached to.
    #[sqlx(flatten)]
    pub patch: PatchKey,
    /// Generated identifier, unique within the patch.
    pub uuid: String,
}

impl CommentKey {
    /// Create a comment key.
    pub fn new(patch: PatchKey, uuid: impl Into<String>) -> Self {
        Self {
            patch,
            uuid: uuid.into(),
        }
    }

    /// The patch set the comment belongs to.
    pub fn patch_set(&self) -> PatchSetId {
        self.patch.patch_set
    }
}

/// A comment attached to one line of one side of a file diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct PatchLineComment {
    /// Composite key.
    #[sqlx(flatten)]
    pub key: CommentKey,
    /// Line number the comment refers to (1-based, 0 for file-level).
    pub line_nbr: i32,
    /// Diff side: 0 for the old revision, 1 for the new one.
    pub side: i16,
    /// Comment author.
    pub author_id: AccountId,
    /// Last time the comment was written or published.
    pub written_on: DateTime<Utc>,
    /// Draft or published.
    pub status: CommentStatus,
    /// Comment text.
    pub message: String,
}

impl PatchLineComment {
    /// Side of the diff showing the old revision.
    pub const SIDE_OLD: i16 = 0;
    /// Side of the diff showing the new revision.
    pub const SIDE_NEW: i16 = 1;

    /// Create a new draft comment written now.
    pub fn new_draft(
        key: CommentKey,
        line_nbr: i32,
        author_id: AccountId,
        side: i16,
        message: impl Into<String>,
    ) -> Self {
        Self {
            key,
            line_nbr,
            side,
            author_id,
            written_on: Utc::now(),
            status: CommentStatus::Draft,
            message: message.into(),
        }
    }

    /// Whether the comment is still a draft.
    pub fn is_draft(&self) -> bool {
        self.status == CommentStatus::Draft
    }

    /// Refresh the written-on timestamp.
    pub fn updated(&mut self) {
        self.written_on = Utc::now();
    }

    /// Make the comment visible to everyone.
    pub fn publish(&mut self) {
        self.status = CommentStatus::Published;
        self.updated();
    }
}
