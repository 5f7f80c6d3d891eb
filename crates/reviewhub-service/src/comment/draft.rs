//! Draft comment management for the acting reviewer.

use std::sync::Arc;

use futures::FutureExt;
use serde::{Deserialize, Serialize};
use tracing::info;

use reviewhub_core::error::AppError;
use reviewhub_core::result::AppResult;
use reviewhub_core::types::AccountId;
use reviewhub_database::{ReviewStore, ReviewTransaction};
use reviewhub_entity::{CommentKey, CommentStatus, PatchKey, PatchLineComment};

use super::new_uuid;
use crate::context::RequestContext;
use crate::transaction::run_in_transaction;

/// Request to create or edit a draft comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveDraftRequest {
    /// File the comment is on.
    pub patch: PatchKey,
    /// Existing draft to edit, or `None` to create a new one.
    pub uuid: Option<String>,
    /// Line the comment refers to.
    pub line_nbr: i32,
    /// Diff side, [`PatchLineComment::SIDE_OLD`] or [`PatchLineComment::SIDE_NEW`].
    pub side: i16,
    /// Comment text.
    pub message: String,
    /// Status the client believes the comment has. Only drafts can be saved.
    #[serde(default = "default_status")]
    pub status: CommentStatus,
}

fn default_status() -> CommentStatus {
    CommentStatus::Draft
}

impl SaveDraftRequest {
    /// A request creating a new draft on the new side of the diff.
    pub fn new(patch: PatchKey, line_nbr: i32, message: impl Into<String>) -> Self {
        Self {
            patch,
            uuid: None,
            line_nbr,
            side: PatchLineComment::SIDE_NEW,
            message: message.into(),
            status: CommentStatus::Draft,
        }
    }

    /// Target an existing draft instead of creating one.
    pub fn with_uuid(mut self, uuid: impl Into<String>) -> Self {
        self.uuid = Some(uuid.into());
        self
    }

    /// Attach the comment to the given diff side.
    pub fn with_side(mut self, side: i16) -> Self {
        self.side = side;
        self
    }
}

/// Manages the acting reviewer's unpublished comments.
#[derive(Clone)]
pub struct DraftService {
    /// Review data.
    store: Arc<dyn ReviewStore>,
    /// Extra attempts on transaction conflicts.
    retries: u32,
}

impl DraftService {
    /// Creates a new draft service.
    pub fn new(store: Arc<dyn ReviewStore>, retries: u32) -> Self {
        Self { store, retries }
    }

    /// The acting reviewer's drafts on one file, ordered by line then time.
    pub async fn my_drafts(
        &self,
        ctx: &RequestContext,
        patch: &PatchKey,
    ) -> AppResult<Vec<PatchLineComment>> {
        let me = ctx.account_id;
        let patch = patch.clone();
        run_in_transaction(self.store.as_ref(), self.retries, move |txn| {
            let patch = patch.clone();
            async move { txn.drafts_by_patch(&patch, me).await }.boxed()
        })
        .await
    }

    /// Create a new draft or edit one of the acting reviewer's drafts.
    pub async fn save_draft(
        &self,
        ctx: &RequestContext,
        request: SaveDraftRequest,
    ) -> AppResult<PatchLineComment> {
        if request.status != CommentStatus::Draft {
            return Err(AppError::validation("Comment already published"));
        }
        if request.side != PatchLineComment::SIDE_OLD && request.side != PatchLineComment::SIDE_NEW
        {
            return Err(AppError::validation(format!(
                "Invalid diff side {}; expected 0 (old) or 1 (new)",
                request.side
            )));
        }

        let me = ctx.account_id;
        let saved = run_in_transaction(self.store.as_ref(), self.retries, move |txn| {
            let request = request.clone();
            async move { save_in_txn(txn, me, &request).await }.boxed()
        })
        .await?;

        info!(
            account_id = %me,
            patch = %saved.key.patch,
            uuid = %saved.key.uuid,
            line = saved.line_nbr,
            "Saved draft comment"
        );
        Ok(saved)
    }

    /// Delete one of the acting reviewer's drafts.
    pub async fn delete_draft(&self, ctx: &RequestContext, key: &CommentKey) -> AppResult<()> {
        let me = ctx.account_id;
        let target = key.clone();
        run_in_transaction(self.store.as_ref(), self.retries, move |txn| {
            let key = target.clone();
            async move {
                let comment = find_own(txn, &key, me).await?;
                if !comment.is_draft() {
                    return Err(AppError::validation("Comment already published"));
                }
                txn.delete_comment(&key).await
            }
            .boxed()
        })
        .await?;

        info!(account_id = %me, patch = %key.patch, uuid = %key.uuid, "Deleted draft comment");
        Ok(())
    }
}

/// Load a comment, hiding comments written by someone else.
async fn find_own(
    txn: &mut dyn ReviewTransaction,
    key: &CommentKey,
    me: AccountId,
) -> AppResult<PatchLineComment> {
    txn.comment(key)
        .await?
        .filter(|c| c.author_id == me)
        .ok_or_else(|| {
            AppError::not_found(format!("Comment {} on {} not found", key.uuid, key.patch))
        })
}

async fn save_in_txn(
    txn: &mut dyn ReviewTransaction,
    me: AccountId,
    request: &SaveDraftRequest,
) -> AppResult<PatchLineComment> {
    let patch = txn
        .patch(&request.patch)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Patch {} not found", request.patch)))?;

    match &request.uuid {
        None => {
            let draft = PatchLineComment::new_draft(
                CommentKey::new(patch.key, new_uuid()),
                request.line_nbr,
                me,
                request.side,
                request.message.clone(),
            );
            txn.insert_comment(&draft).await?;
            Ok(draft)
        }
        Some(uuid) => {
            let key = CommentKey::new(patch.key, uuid.clone());
            let mut draft = find_own(txn, &key, me).await?;
            if !draft.is_draft() {
                return Err(AppError::validation("Comment already published"));
            }
            draft.line_nbr = request.line_nbr;
            draft.side = request.side;
            draft.message = request.message.clone();
            draft.updated();
            txn.update_comments(std::slice::from_ref(&draft)).await?;
            Ok(draft)
        }
    }
}
