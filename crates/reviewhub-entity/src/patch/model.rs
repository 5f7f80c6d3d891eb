//! Per-file patch entity.

use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::patch_set::PatchSetId;

/// Composite key of a patch: a file path within one patch set.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, FromRow,
)]
pub struct PatchKey {
    /// The patch set containing the file.
    #[sqlx(flatten)]
    pub patch_set: PatchSetId,
    /// Path of the file within the repository.
    pub file_name: String,
}

impl PatchKey {
    /// Create a patch key.
    pub fn new(patch_set: PatchSetId, file_name: impl Into<String>) -> Self {
        Self {
            patch_set,
            file_name: file_name.into(),
        }
    }
}

impl fmt::Display for PatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.patch_set, self.file_name)
    }
}

/// How a file was changed by the patch set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "patch_change_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PatchChangeType {
    /// File did not exist before.
    Added,
    /// File content changed in place.
    Modified,
    /// File was removed.
    Deleted,
    /// File was moved from `source_file_name`.
    Renamed,
    /// File was copied from `source_file_name`.
    Copied,
}

/// A single file touched by a patch set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Patch {
    /// Composite key.
    #[sqlx(flatten)]
    pub key: PatchKey,
    /// Kind of modification.
    pub change_type: PatchChangeType,
    /// Original path for renames and copies.
    pub source_file_name: Option<String>,
    /// Number of published comments on this file.
    pub comment_count: i32,
}

impl Patch {
    /// Create a patch record with no comments.
    pub fn new(key: PatchKey, change_type: PatchChangeType) -> Self {
        Self {
            key,
            change_type,
            source_file_name: None,
            comment_count: 0,
        }
    }

    /// Record one more published comment on this file.
    pub fn increment_comment_count(&mut self) {
        self.comment_count += 1;
    }
}
