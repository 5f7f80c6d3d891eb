//! Recorded reviewer votes.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use reviewhub_core::types::{AccountId, ChangeId};

/// Short identifier of an approval category, e.g. `CRVW`.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct ApprovalCategoryId(pub String);

impl ApprovalCategoryId {
    /// Wrap a category identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Return the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ApprovalCategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One reviewer's vote in one category on a change.
///
/// At most one row exists per (change, account, category).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ChangeApproval {
    /// Change the vote applies to.
    pub change_id: ChangeId,
    /// Reviewer who cast the vote.
    pub account_id: AccountId,
    /// Category voted in.
    pub category_id: ApprovalCategoryId,
    /// The vote.
    pub value: i16,
    /// When the current value was granted.
    pub granted: DateTime<Utc>,
}

impl ChangeApproval {
    /// Create a vote granted now.
    pub fn new(
        change_id: ChangeId,
        account_id: AccountId,
        category_id: ApprovalCategoryId,
        value: i16,
    ) -> Self {
        Self {
            change_id,
            account_id,
            category_id,
            value,
            granted: Utc::now(),
        }
    }

    /// Replace the vote.
    pub fn set_value(&mut self, value: i16) {
        self.value = value;
    }

    /// Stamp the grant time as now.
    pub fn set_granted(&mut self) {
        self.granted = Utc::now();
    }
}
