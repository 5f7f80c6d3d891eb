//! Change domain entities.

pub mod model;

pub use model::{Change, ChangeStatus};
