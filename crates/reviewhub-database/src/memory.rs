//! In-memory implementation of [`ReviewStore`].
//!
//! Each transaction works on a private snapshot of the whole store and
//! publishes it on commit. Commits are optimistic: if another transaction
//! committed writes after this one began, the commit fails with a conflict
//! and nothing is applied. All data is lost when the store is dropped.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use reviewhub_core::error::AppError;
use reviewhub_core::result::AppResult;
use reviewhub_core::types::{AccountId, ChangeId};
use reviewhub_entity::{
    ApprovalCategoryId, Change, ChangeApproval, ChangeMessage, CommentKey, Patch, PatchKey,
    PatchLineComment, PatchSet, PatchSetId, PatchSetInfo,
};

use crate::store::{ReviewStore, ReviewTransaction};

type ApprovalKey = (ChangeId, AccountId, ApprovalCategoryId);

#[derive(Debug, Clone, Default)]
struct MemoryState {
    changes: BTreeMap<ChangeId, Change>,
    patch_sets: BTreeMap<PatchSetId, PatchSet>,
    patch_set_infos: BTreeMap<PatchSetId, PatchSetInfo>,
    patches: BTreeMap<PatchKey, Patch>,
    comments: HashMap<CommentKey, PatchLineComment>,
    approvals: BTreeMap<ApprovalKey, ChangeApproval>,
    messages: Vec<ChangeMessage>,
}

#[derive(Debug, Default)]
struct Shared {
    /// Incremented on every commit that wrote something.
    version: u64,
    state: MemoryState,
}

/// In-memory review store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    shared: Arc<RwLock<Shared>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of write commits applied so far.
    pub async fn version(&self) -> u64 {
        self.shared.read().await.version
    }
}

#[async_trait]
impl ReviewStore for MemoryStore {
    async fn begin(&self) -> AppResult<Box<dyn ReviewTransaction>> {
        let shared = self.shared.read().await;
        Ok(Box::new(MemoryTransaction {
            shared: Arc::clone(&self.shared),
            base_version: shared.version,
            working: shared.state.clone(),
            dirty: false,
        }))
    }
}

/// A snapshot transaction over a [`MemoryStore`].
pub struct MemoryTransaction {
    shared: Arc<RwLock<Shared>>,
    base_version: u64,
    working: MemoryState,
    dirty: bool,
}

fn approval_key(a: &ChangeApproval) -> ApprovalKey {
    (a.change_id, a.account_id, a.category_id.clone())
}

fn duplicate(what: &str, key: impl std::fmt::Display) -> AppError {
    AppError::conflict(format!("Duplicate {what} {key}"))
}

#[async_trait]
impl ReviewTransaction for MemoryTransaction {
    async fn change(&mut self, id: ChangeId) -> AppResult<Option<Change>> {
        Ok(self.working.changes.get(&id).cloned())
    }

    async fn insert_change(&mut self, change: &Change) -> AppResult<()> {
        if self.working.changes.contains_key(&change.change_id) {
            return Err(duplicate("change", change.change_id));
        }
        self.working.changes.insert(change.change_id, change.clone());
        self.dirty = true;
        Ok(())
    }

    async fn update_change(&mut self, change: &Change) -> AppResult<()> {
        let slot = self
            .working
            .changes
            .get_mut(&change.change_id)
            .ok_or_else(|| AppError::not_found(format!("Change {} not found", change.change_id)))?;
        *slot = change.clone();
        self.dirty = true;
        Ok(())
    }

    async fn patch_set(&mut self, id: PatchSetId) -> AppResult<Option<PatchSet>> {
        Ok(self.working.patch_sets.get(&id).cloned())
    }

    async fn insert_patch_set(&mut self, patch_set: &PatchSet) -> AppResult<()> {
        if self.working.patch_sets.contains_key(&patch_set.id) {
            return Err(duplicate("patch set", patch_set.id));
        }
        self.working.patch_sets.insert(patch_set.id, patch_set.clone());
        self.dirty = true;
        Ok(())
    }

    async fn patch_set_info(&mut self, id: PatchSetId) -> AppResult<Option<PatchSetInfo>> {
        Ok(self.working.patch_set_infos.get(&id).cloned())
    }

    async fn insert_patch_set_info(&mut self, info: &PatchSetInfo) -> AppResult<()> {
        if self.working.patch_set_infos.contains_key(&info.key) {
            return Err(duplicate("patch set info", info.key));
        }
        self.working.patch_set_infos.insert(info.key, info.clone());
        self.dirty = true;
        Ok(())
    }

    async fn patch(&mut self, key: &PatchKey) -> AppResult<Option<Patch>> {
        Ok(self.working.patches.get(key).cloned())
    }

    async fn patches(
        &mut self,
        patch_set: PatchSetId,
        file_names: &[String],
    ) -> AppResult<Vec<Patch>> {
        Ok(self
            .working
            .patches
            .values()
            .filter(|p| p.key.patch_set == patch_set && file_names.contains(&p.key.file_name))
            .cloned()
            .collect())
    }

    async fn insert_patch(&mut self, patch: &Patch) -> AppResult<()> {
        if self.working.patches.contains_key(&patch.key) {
            return Err(duplicate("patch", &patch.key));
        }
        self.working.patches.insert(patch.key.clone(), patch.clone());
        self.dirty = true;
        Ok(())
    }

    async fn update_patches(&mut self, patches: &[Patch]) -> AppResult<()> {
        for patch in patches {
            if let Some(slot) = self.working.patches.get_mut(&patch.key) {
                *slot = patch.clone();
                self.dirty = true;
            }
        }
        Ok(())
    }

    async fn comment(&mut self, key: &CommentKey) -> AppResult<Option<PatchLineComment>> {
        Ok(self.working.comments.get(key).cloned())
    }

    async fn drafts_by_patch_set(
        &mut self,
        patch_set: PatchSetId,
        author: AccountId,
    ) -> AppResult<Vec<PatchLineComment>> {
        let mut drafts: Vec<PatchLineComment> = self
            .working
            .comments
            .values()
            .filter(|c| c.key.patch_set() == patch_set && c.author_id == author && c.is_draft())
            .cloned()
            .collect();
        drafts.sort_by(|a, b| {
            (&a.key.patch.file_name, a.line_nbr, a.written_on).cmp(&(
                &b.key.patch.file_name,
                b.line_nbr,
                b.written_on,
            ))
        });
        Ok(drafts)
    }

    async fn drafts_by_patch(
        &mut self,
        patch: &PatchKey,
        author: AccountId,
    ) -> AppResult<Vec<PatchLineComment>> {
        let mut drafts: Vec<PatchLineComment> = self
            .working
            .comments
            .values()
            .filter(|c| &c.key.patch == patch && c.author_id == author && c.is_draft())
            .cloned()
            .collect();
        drafts.sort_by(|a, b| (a.line_nbr, a.written_on).cmp(&(b.line_nbr, b.written_on)));
        Ok(drafts)
    }

    async fn insert_comment(&mut self, comment: &PatchLineComment) -> AppResult<()> {
        if self.working.comments.contains_key(&comment.key) {
            return Err(duplicate("comment", &comment.key.uuid));
        }
        self.working
            .comments
            .insert(comment.key.clone(), comment.clone());
        self.dirty = true;
        Ok(())
    }

    async fn update_comments(&mut self, comments: &[PatchLineComment]) -> AppResult<()> {
        for comment in comments {
            let slot = self.working.comments.get_mut(&comment.key).ok_or_else(|| {
                AppError::not_found(format!(
                    "Comment {} on {} not found",
                    comment.key.uuid, comment.key.patch
                ))
            })?;
            *slot = comment.clone();
            self.dirty = true;
        }
        Ok(())
    }

    async fn delete_comment(&mut self, key: &CommentKey) -> AppResult<()> {
        if self.working.comments.remove(key).is_some() {
            self.dirty = true;
        }
        Ok(())
    }

    async fn approvals_by_change_user(
        &mut self,
        change: ChangeId,
        account: AccountId,
    ) -> AppResult<Vec<ChangeApproval>> {
        Ok(self
            .working
            .approvals
            .values()
            .filter(|a| a.change_id == change && a.account_id == account)
            .cloned()
            .collect())
    }

    async fn insert_approval(&mut self, approval: &ChangeApproval) -> AppResult<()> {
        let key = approval_key(approval);
        if self.working.approvals.contains_key(&key) {
            return Err(duplicate("approval", &approval.category_id));
        }
        self.working.approvals.insert(key, approval.clone());
        self.dirty = true;
        Ok(())
    }

    async fn update_approval(&mut self, approval: &ChangeApproval) -> AppResult<()> {
        if let Some(slot) = self.working.approvals.get_mut(&approval_key(approval)) {
            *slot = approval.clone();
            self.dirty = true;
        }
        Ok(())
    }

    async fn delete_approvals(&mut self, approvals: &[ChangeApproval]) -> AppResult<()> {
        for approval in approvals {
            if self.working.approvals.remove(&approval_key(approval)).is_some() {
                self.dirty = true;
            }
        }
        Ok(())
    }

    async fn insert_change_message(&mut self, message: &ChangeMessage) -> AppResult<()> {
        let exists = self
            .working
            .messages
            .iter()
            .any(|m| m.change_id == message.change_id && m.uuid == message.uuid);
        if exists {
            return Err(duplicate("change message", &message.uuid));
        }
        self.working.messages.push(message.clone());
        self.dirty = true;
        Ok(())
    }

    async fn change_messages(&mut self, change: ChangeId) -> AppResult<Vec<ChangeMessage>> {
        Ok(self
            .working
            .messages
            .iter()
            .filter(|m| m.change_id == change)
            .cloned()
            .collect())
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        if !self.dirty {
            return Ok(());
        }
        let mut shared = self.shared.write().await;
        if shared.version != self.base_version {
            debug!(
                base_version = self.base_version,
                current_version = shared.version,
                "Memory transaction lost a race"
            );
            return Err(AppError::conflict(
                "Concurrent update detected; transaction must be retried",
            ));
        }
        shared.state = self.working;
        shared.version += 1;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        Ok(())
    }
}
