//! Change entity model.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use reviewhub_core::AppError;
use reviewhub_core::types::{AccountId, ChangeId};

/// Lifecycle state of a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "change_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ChangeStatus {
    /// Under review; new patch sets and votes are accepted.
    New,
    /// Queued for merge; still open for votes.
    Submitted,
    /// Merged into its destination branch.
    Merged,
    /// Abandoned by its owner.
    Abandoned,
}

impl ChangeStatus {
    /// Whether the change still accepts approval votes.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::New | Self::Submitted)
    }

    /// Whether the change has reached a final state.
    pub fn is_closed(&self) -> bool {
        !self.is_open()
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Submitted => "submitted",
            Self::Merged => "merged",
            Self::Abandoned => "abandoned",
        }
    }
}

impl fmt::Display for ChangeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ChangeStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "new" => Ok(Self::New),
            "submitted" => Ok(Self::Submitted),
            "merged" => Ok(Self::Merged),
            "abandoned" => Ok(Self::Abandoned),
            _ => Err(AppError::validation(format!(
                "Invalid change status: '{s}'. Expected one of: new, submitted, merged, abandoned"
            ))),
        }
    }
}

/// A reviewable unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Change {
    /// Unique change number.
    pub change_id: ChangeId,
    /// Account that owns the change.
    pub owner_account_id: AccountId,
    /// Branch the change targets.
    pub dest_branch: String,
    /// First line of the current commit message.
    pub subject: String,
    /// Current lifecycle state.
    pub status: ChangeStatus,
    /// Number of the most recent patch set.
    pub current_patch_set_id: i32,
    /// When the change was created.
    pub created_on: DateTime<Utc>,
    /// When anything on the change last changed.
    pub last_updated_on: DateTime<Utc>,
}

impl Change {
    /// Create a new open change with its first patch set.
    pub fn new(
        change_id: ChangeId,
        owner_account_id: AccountId,
        dest_branch: impl Into<String>,
        subject: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            change_id,
            owner_account_id,
            dest_branch: dest_branch.into(),
            subject: subject.into(),
            status: ChangeStatus::New,
            current_patch_set_id: 1,
            created_on: now,
            last_updated_on: now,
        }
    }

    /// Whether the change still accepts approval votes.
    pub fn is_open(&self) -> bool {
        self.status.is_open()
    }

    /// Advance the last-updated timestamp to now.
    pub fn touch(&mut self) {
        self.last_updated_on = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_statuses() {
        assert!(ChangeStatus::New.is_open());
        assert!(ChangeStatus::Submitted.is_open());
        assert!(ChangeStatus::Merged.is_closed());
        assert!(ChangeStatus::Abandoned.is_closed());
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!("MERGED".parse::<ChangeStatus>().ok(), Some(ChangeStatus::Merged));
        assert!("draft".parse::<ChangeStatus>().is_err());
    }

    #[test]
    fn test_touch_never_moves_backwards() {
        let mut change = Change::new(ChangeId::new(1), AccountId::new(1), "master", "Fix it");
        let before = change.last_updated_on;
        change.touch();
        assert!(change.last_updated_on >= before);
    }
}
