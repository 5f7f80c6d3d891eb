//! Per-file patch and inline comment entities.

pub mod comment;
pub mod model;

pub use comment::{CommentKey, CommentStatus, PatchLineComment};
pub use model::{Patch, PatchChangeType, PatchKey};
