//! Per-entity PostgreSQL queries.
//!
//! Each function runs on a borrowed connection so that callers can compose
//! them inside one transaction.

pub mod approval;
pub mod change;
pub mod comment;
pub mod message;
pub mod patch;
pub mod patch_set;
