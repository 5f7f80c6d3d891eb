//! Inline comment drafting and publication.

pub mod draft;
pub mod publish;
pub mod summary;

use uuid::Uuid;

pub use draft::{DraftService, SaveDraftRequest};
pub use publish::{PublishResult, PublishService};
pub use summary::compose_summary;

/// Fresh identifier for a comment or change message.
pub(crate) fn new_uuid() -> String {
    Uuid::new_v4().simple().to_string()
}
