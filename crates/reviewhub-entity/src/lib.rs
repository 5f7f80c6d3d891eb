//! # reviewhub-entity
//!
//! Domain entity models for ReviewHub. Every struct in this crate represents
//! a database table row or a domain value object. Row entities derive
//! `sqlx::FromRow`; composite keys are their own `FromRow` structs that rows
//! embed with `#[sqlx(flatten)]`.

pub mod approval;
pub mod change;
pub mod message;
pub mod patch;
pub mod patch_set;

pub use approval::{
    ApprovalCategory, ApprovalCategoryId, ApprovalCategoryValue, ApprovalCategoryValueId,
    ApprovalType, ChangeApproval,
};
pub use change::{Change, ChangeStatus};
pub use message::ChangeMessage;
pub use patch::{CommentKey, CommentStatus, Patch, PatchChangeType, PatchKey, PatchLineComment};
pub use patch_set::{PatchSet, PatchSetId, PatchSetInfo, RevId};
