//! Patch set entity model and its composite key.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use reviewhub_core::AppError;
use reviewhub_core::types::{AccountId, ChangeId};

/// Composite key of a patch set: the owning change plus a sequential number.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, FromRow,
)]
pub struct PatchSetId {
    /// Owning change.
    pub change_id: ChangeId,
    /// Sequential revision number within the change, starting at 1.
    pub patch_set_id: i32,
}

impl PatchSetId {
    /// Sentinel key denoting the base revision a patch set is compared to.
    pub const BASE: PatchSetId = PatchSetId {
        change_id: ChangeId::new(-1),
        patch_set_id: -1,
    };

    /// Create a patch set key.
    pub const fn new(change_id: ChangeId, patch_set_id: i32) -> Self {
        Self {
            change_id,
            patch_set_id,
        }
    }

    /// The owning change.
    pub fn parent(&self) -> ChangeId {
        self.change_id
    }

    /// The patch set number.
    pub fn get(&self) -> i32 {
        self.patch_set_id
    }

    /// Git reference under which this revision is stored.
    ///
    /// Changes are sharded by the last two digits of their number:
    /// change 1234, patch set 5 lives at `refs/changes/34/1234/5`. A shard
    /// below 10 gets one leading zero, so change -5 shards to `0-5`.
    pub fn ref_name(&self) -> String {
        let change_id = self.change_id.get();
        let shard = change_id % 100;
        let pad = if shard < 10 { "0" } else { "" };
        format!(
            "refs/changes/{pad}{shard}/{change_id}/{}",
            self.patch_set_id
        )
    }
}

impl fmt::Display for PatchSetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.change_id, self.patch_set_id)
    }
}

impl FromStr for PatchSetId {
    type Err = AppError;

    /// Parse the `"<change>,<patch set>"` form produced by `Display`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AppError::validation(format!("Invalid patch set id: '{s}'"));
        let (change, patch_set) = s.split_once(',').ok_or_else(invalid)?;
        let change_id = change.parse::<ChangeId>().map_err(|_| invalid())?;
        let patch_set_id = patch_set.trim().parse::<i32>().map_err(|_| invalid())?;
        Ok(Self::new(change_id, patch_set_id))
    }
}

/// A Git commit id (40 hexadecimal characters).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct RevId(pub String);

impl RevId {
    /// Validate and wrap a commit id.
    pub fn parse(s: &str) -> Result<Self, AppError> {
        if s.len() == 40 && s.bytes().all(|b| b.is_ascii_hexdigit()) {
            Ok(Self(s.to_ascii_lowercase()))
        } else {
            Err(AppError::validation(format!("Invalid revision id: '{s}'")))
        }
    }

    /// Return the commit id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RevId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single revision of a change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct PatchSet {
    /// Composite key.
    #[sqlx(flatten)]
    pub id: PatchSetId,
    /// Commit holding the revision's content.
    pub revision: Option<RevId>,
    /// Account that uploaded the revision.
    pub uploader_account_id: AccountId,
    /// When this patch set was first introduced onto the change.
    pub created_on: DateTime<Utc>,
}

impl PatchSet {
    /// Create a patch set record uploaded now.
    pub fn new(id: PatchSetId, revision: Option<RevId>, uploader_account_id: AccountId) -> Self {
        Self {
            id,
            revision,
            uploader_account_id,
            created_on: Utc::now(),
        }
    }

    /// The patch set number.
    pub fn patch_set_number(&self) -> i32 {
        self.id.get()
    }

    /// Git reference name, derived from the key and never stored.
    pub fn ref_name(&self) -> String {
        self.id.ref_name()
    }
}
