//! PostgreSQL-backed [`ReviewStore`].

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;

use reviewhub_core::result::AppResult;
use reviewhub_core::types::{AccountId, ChangeId};
use reviewhub_entity::{
    Change, ChangeApproval, ChangeMessage, CommentKey, Patch, PatchKey, PatchLineComment,
    PatchSet, PatchSetId, PatchSetInfo,
};

use crate::connection::IsolationLevel;
use crate::error::db_error;
use crate::repositories::{approval, change, comment, message, patch, patch_set};
use crate::store::{ReviewStore, ReviewTransaction};

/// Review store over a PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct PgReviewStore {
    pool: PgPool,
    isolation: IsolationLevel,
}

impl PgReviewStore {
    /// Create a store whose transactions run at `isolation`.
    pub fn new(pool: PgPool, isolation: IsolationLevel) -> Self {
        Self { pool, isolation }
    }
}

#[async_trait]
impl ReviewStore for PgReviewStore {
    async fn begin(&self) -> AppResult<Box<dyn ReviewTransaction>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        if let Some(statement) = self.isolation.set_statement() {
            sqlx::query(statement)
                .execute(&mut *tx)
                .await
                .map_err(|e| db_error("Failed to set isolation level", e))?;
        }

        debug!(isolation = %self.isolation, "Review transaction started");
        Ok(Box::new(PgReviewTransaction { tx }))
    }
}

/// A review transaction on one pooled PostgreSQL connection.
pub struct PgReviewTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl ReviewTransaction for PgReviewTransaction {
    async fn change(&mut self, id: ChangeId) -> AppResult<Option<Change>> {
        change::find_by_id(&mut *self.tx, id).await
    }

    async fn insert_change(&mut self, value: &Change) -> AppResult<()> {
        change::insert(&mut *self.tx, value).await
    }

    async fn update_change(&mut self, value: &Change) -> AppResult<()> {
        change::update(&mut *self.tx, value).await
    }

    async fn patch_set(&mut self, id: PatchSetId) -> AppResult<Option<PatchSet>> {
        patch_set::find_by_id(&mut *self.tx, id).await
    }

    async fn insert_patch_set(&mut self, value: &PatchSet) -> AppResult<()> {
        patch_set::insert(&mut *self.tx, value).await
    }

    async fn patch_set_info(&mut self, id: PatchSetId) -> AppResult<Option<PatchSetInfo>> {
        patch_set::find_info(&mut *self.tx, id).await
    }

    async fn insert_patch_set_info(&mut self, info: &PatchSetInfo) -> AppResult<()> {
        patch_set::insert_info(&mut *self.tx, info).await
    }

    async fn patch(&mut self, key: &PatchKey) -> AppResult<Option<Patch>> {
        patch::find_by_key(&mut *self.tx, key).await
    }

    async fn patches(
        &mut self,
        patch_set: PatchSetId,
        file_names: &[String],
    ) -> AppResult<Vec<Patch>> {
        patch::find_by_file_names(&mut *self.tx, patch_set, file_names).await
    }

    async fn insert_patch(&mut self, value: &Patch) -> AppResult<()> {
        patch::insert(&mut *self.tx, value).await
    }

    async fn update_patches(&mut self, patches: &[Patch]) -> AppResult<()> {
        for p in patches {
            patch::update(&mut *self.tx, p).await?;
        }
        Ok(())
    }

    async fn comment(&mut self, key: &CommentKey) -> AppResult<Option<PatchLineComment>> {
        comment::find_by_key(&mut *self.tx, key).await
    }

    async fn drafts_by_patch_set(
        &mut self,
        patch_set: PatchSetId,
        author: AccountId,
    ) -> AppResult<Vec<PatchLineComment>> {
        comment::drafts_by_patch_set(&mut *self.tx, patch_set, author).await
    }

    async fn drafts_by_patch(
        &mut self,
        patch: &PatchKey,
        author: AccountId,
    ) -> AppResult<Vec<PatchLineComment>> {
        comment::drafts_by_patch(&mut *self.tx, patch, author).await
    }

    async fn insert_comment(&mut self, value: &PatchLineComment) -> AppResult<()> {
        comment::insert(&mut *self.tx, value).await
    }

    async fn update_comments(&mut self, comments: &[PatchLineComment]) -> AppResult<()> {
        for c in comments {
            comment::update(&mut *self.tx, c).await?;
        }
        Ok(())
    }

    async fn delete_comment(&mut self, key: &CommentKey) -> AppResult<()> {
        comment::delete(&mut *self.tx, key).await
    }

    async fn approvals_by_change_user(
        &mut self,
        change: ChangeId,
        account: AccountId,
    ) -> AppResult<Vec<ChangeApproval>> {
        approval::find_by_change_user(&mut *self.tx, change, account).await
    }

    async fn insert_approval(&mut self, value: &ChangeApproval) -> AppResult<()> {
        approval::insert(&mut *self.tx, value).await
    }

    async fn update_approval(&mut self, value: &ChangeApproval) -> AppResult<()> {
        approval::update(&mut *self.tx, value).await
    }

    async fn delete_approvals(&mut self, approvals: &[ChangeApproval]) -> AppResult<()> {
        for a in approvals {
            approval::delete(&mut *self.tx, a).await?;
        }
        Ok(())
    }

    async fn insert_change_message(&mut self, value: &ChangeMessage) -> AppResult<()> {
        message::insert(&mut *self.tx, value).await
    }

    async fn change_messages(&mut self, change: ChangeId) -> AppResult<Vec<ChangeMessage>> {
        message::find_by_change(&mut *self.tx, change).await
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| db_error("Failed to commit transaction", e))
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        self.tx
            .rollback()
            .await
            .map_err(|e| db_error("Failed to roll back transaction", e))
    }
}
