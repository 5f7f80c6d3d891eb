//! Patch set (change revision) entities.

pub mod info;
pub mod model;

pub use info::PatchSetInfo;
pub use model::{PatchSet, PatchSetId, RevId};
