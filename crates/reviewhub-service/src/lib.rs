//! # reviewhub-service
//!
//! Review workflow services for ReviewHub. Services take their collaborators
//! (the review store, the configured approval types, the notifier) at
//! construction time via `Arc` references and run every use case inside a
//! retried review transaction.

pub mod approval;
pub mod comment;
pub mod context;
pub mod notification;
pub mod transaction;

#[cfg(test)]
mod test_support;

pub use approval::{ApprovalPlan, ApprovalTypes};
pub use comment::{DraftService, PublishResult, PublishService, SaveDraftRequest};
pub use context::RequestContext;
pub use notification::{CommentMail, CommentNotifier, LogNotifier};
pub use transaction::run_in_transaction;
