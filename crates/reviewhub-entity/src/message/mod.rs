//! Change message (review audit trail) entities.

pub mod model;

pub use model::ChangeMessage;
