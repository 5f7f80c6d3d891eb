//! Approval categories and recorded reviewer votes.

pub mod category;
pub mod model;

pub use category::{ApprovalCategory, ApprovalCategoryValue, ApprovalCategoryValueId, ApprovalType};
pub use model::{ApprovalCategoryId, ChangeApproval};
