//! Approval category registry and vote reconciliation.

pub mod reconcile;
pub mod types;

pub use reconcile::{ApprovalPlan, plan_approvals};
pub use types::ApprovalTypes;
