//! Request context carrying the acting reviewer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use reviewhub_core::types::AccountId;

/// Context for the current request.
///
/// Passed into service methods so that every operation knows *who* is
/// acting. Drafts, votes and messages are always scoped to this account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The acting reviewer.
    pub account_id: AccountId,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context for `account_id`.
    pub fn new(account_id: AccountId) -> Self {
        Self {
            account_id,
            request_time: Utc::now(),
        }
    }
}
