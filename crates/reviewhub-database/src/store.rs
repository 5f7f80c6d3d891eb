//! Transactional store abstraction for review data.
//!
//! Every read and write the service layer performs goes through a
//! [`ReviewTransaction`] obtained from a [`ReviewStore`]. Nothing a
//! transaction writes is visible to other transactions until
//! [`ReviewTransaction::commit`] succeeds; dropping or rolling back a
//! transaction discards its writes. Implementations report lost races
//! (serialization failures, deadlocks, duplicate keys) as
//! [`ErrorKind::Conflict`](reviewhub_core::error::ErrorKind::Conflict) so
//! callers can re-run the unit of work.

use async_trait::async_trait;

use reviewhub_core::result::AppResult;
use reviewhub_core::types::{AccountId, ChangeId};
use reviewhub_entity::{
    Change, ChangeApproval, ChangeMessage, CommentKey, Patch, PatchKey, PatchLineComment,
    PatchSet, PatchSetId, PatchSetInfo,
};

/// Entry point for opening review transactions.
#[async_trait]
pub trait ReviewStore: Send + Sync + 'static {
    /// Start a new transaction.
    async fn begin(&self) -> AppResult<Box<dyn ReviewTransaction>>;
}

/// A unit of work over review data.
#[async_trait]
pub trait ReviewTransaction: Send {
    // -- Changes --

    /// Find a change by id.
    async fn change(&mut self, id: ChangeId) -> AppResult<Option<Change>>;

    /// Insert a new change.
    async fn insert_change(&mut self, change: &Change) -> AppResult<()>;

    /// Persist a modified change.
    async fn update_change(&mut self, change: &Change) -> AppResult<()>;

    // -- Patch sets --

    /// Find a patch set by key.
    async fn patch_set(&mut self, id: PatchSetId) -> AppResult<Option<PatchSet>>;

    /// Insert a new patch set.
    async fn insert_patch_set(&mut self, patch_set: &PatchSet) -> AppResult<()>;

    /// Find the commit metadata of a patch set.
    async fn patch_set_info(&mut self, id: PatchSetId) -> AppResult<Option<PatchSetInfo>>;

    /// Insert commit metadata for a patch set.
    async fn insert_patch_set_info(&mut self, info: &PatchSetInfo) -> AppResult<()>;

    // -- Patches --

    /// Find a single patch.
    async fn patch(&mut self, key: &PatchKey) -> AppResult<Option<Patch>>;

    /// Find the patches of `patch_set` whose file name is in `file_names`.
    async fn patches(
        &mut self,
        patch_set: PatchSetId,
        file_names: &[String],
    ) -> AppResult<Vec<Patch>>;

    /// Insert a new patch.
    async fn insert_patch(&mut self, patch: &Patch) -> AppResult<()>;

    /// Persist modified patches.
    async fn update_patches(&mut self, patches: &[Patch]) -> AppResult<()>;

    // -- Comments --

    /// Find a comment by key.
    async fn comment(&mut self, key: &CommentKey) -> AppResult<Option<PatchLineComment>>;

    /// Draft comments written by `author` anywhere in a patch set.
    async fn drafts_by_patch_set(
        &mut self,
        patch_set: PatchSetId,
        author: AccountId,
    ) -> AppResult<Vec<PatchLineComment>>;

    /// Draft comments written by `author` on one file, ordered by line and time.
    async fn drafts_by_patch(
        &mut self,
        patch: &PatchKey,
        author: AccountId,
    ) -> AppResult<Vec<PatchLineComment>>;

    /// Insert a new comment.
    async fn insert_comment(&mut self, comment: &PatchLineComment) -> AppResult<()>;

    /// Persist modified comments.
    async fn update_comments(&mut self, comments: &[PatchLineComment]) -> AppResult<()>;

    /// Delete a comment.
    async fn delete_comment(&mut self, key: &CommentKey) -> AppResult<()>;

    // -- Approvals --

    /// Votes cast by `account` on `change`.
    async fn approvals_by_change_user(
        &mut self,
        change: ChangeId,
        account: AccountId,
    ) -> AppResult<Vec<ChangeApproval>>;

    /// Record a new vote.
    async fn insert_approval(&mut self, approval: &ChangeApproval) -> AppResult<()>;

    /// Persist a modified vote.
    async fn update_approval(&mut self, approval: &ChangeApproval) -> AppResult<()>;

    /// Remove votes.
    async fn delete_approvals(&mut self, approvals: &[ChangeApproval]) -> AppResult<()>;

    // -- Messages --

    /// Append a message to a change's history.
    async fn insert_change_message(&mut self, message: &ChangeMessage) -> AppResult<()>;

    /// Messages of a change, oldest first.
    async fn change_messages(&mut self, change: ChangeId) -> AppResult<Vec<ChangeMessage>>;

    // -- Completion --

    /// Make all writes of this transaction visible atomically.
    async fn commit(self: Box<Self>) -> AppResult<()>;

    /// Discard all writes of this transaction.
    async fn rollback(self: Box<Self>) -> AppResult<()>;
}
