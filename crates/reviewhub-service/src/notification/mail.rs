//! Comment notification payload and delivery seam.

use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

use reviewhub_core::result::AppResult;
use reviewhub_core::types::AccountId;
use reviewhub_entity::{Change, ChangeMessage, PatchLineComment, PatchSet, PatchSetInfo};

/// Everything a reviewer notification about newly published comments needs.
#[derive(Debug, Clone, Serialize)]
pub struct CommentMail {
    /// Reviewer who published.
    pub from: AccountId,
    /// The change commented on.
    pub change: Change,
    /// The revision commented on.
    pub patch_set: PatchSet,
    /// Commit metadata of the revision.
    pub info: PatchSetInfo,
    /// Summary message, if one was recorded.
    pub message: Option<ChangeMessage>,
    /// Comments that were published.
    pub comments: Vec<PatchLineComment>,
}

/// Delivers comment notifications.
///
/// Called only after the publishing transaction has committed; a failure
/// here never undoes the publication.
#[async_trait]
pub trait CommentNotifier: Send + Sync {
    /// Notify interested parties that comments were published.
    async fn send_comment(&self, mail: &CommentMail) -> AppResult<()>;
}

/// Notifier that records each notification as a structured log event.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl CommentNotifier for LogNotifier {
    async fn send_comment(&self, mail: &CommentMail) -> AppResult<()> {
        info!(
            from = %mail.from,
            change_id = %mail.change.change_id,
            patch_set = mail.patch_set.patch_set_number(),
            ref_name = %mail.patch_set.ref_name(),
            subject = %mail.info.subject,
            comments = mail.comments.len(),
            has_message = mail.message.is_some(),
            "Comments published"
        );
        Ok(())
    }
}
