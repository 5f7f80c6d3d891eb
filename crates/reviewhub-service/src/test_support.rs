//! Fixtures shared by the service tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use reviewhub_core::AppError;
use reviewhub_core::config::ReviewConfig;
use reviewhub_core::result::AppResult;
use reviewhub_core::types::{AccountId, ChangeId};
use reviewhub_database::{MemoryStore, ReviewStore};
use reviewhub_entity::{
    ApprovalCategoryId, Change, ChangeApproval, ChangeStatus, CommentKey, Patch, PatchChangeType,
    PatchKey, PatchLineComment, PatchSet, PatchSetId, PatchSetInfo,
};

use crate::approval::ApprovalTypes;
use crate::notification::{CommentMail, CommentNotifier};

pub(crate) const OWNER: AccountId = AccountId::new(1);
pub(crate) const REVIEWER: AccountId = AccountId::new(1000);
pub(crate) const OTHER: AccountId = AccountId::new(1001);

pub(crate) const SOURCE_FILE: &str = "src/lib.rs";
pub(crate) const README: &str = "README.md";

pub(crate) fn psid() -> PatchSetId {
    PatchSetId::new(ChangeId::new(1234), 2)
}

pub(crate) fn patch_key(file: &str) -> PatchKey {
    PatchKey::new(psid(), file)
}

pub(crate) fn approval_types() -> Arc<ApprovalTypes> {
    Arc::new(ApprovalTypes::from_config(&ReviewConfig::default()))
}

/// A change at patch set 2 with two files and commit metadata.
pub(crate) async fn seed(status: ChangeStatus) -> MemoryStore {
    let store = MemoryStore::new();
    let mut change = Change::new(psid().parent(), OWNER, "master", "Add parser");
    change.status = status;
    change.current_patch_set_id = psid().get();

    let mut txn = store.begin().await.expect("begin");
    txn.insert_change(&change).await.expect("change");
    txn.insert_patch_set(&PatchSet::new(psid(), None, OWNER))
        .await
        .expect("patch set");
    txn.insert_patch_set_info(&PatchSetInfo::new(psid(), "Add parser\n\nBody."))
        .await
        .expect("info");
    for file in [SOURCE_FILE, README] {
        txn.insert_patch(&Patch::new(patch_key(file), PatchChangeType::Modified))
            .await
            .expect("patch");
    }
    txn.commit().await.expect("commit");
    store
}

pub(crate) async fn add_draft(
    store: &MemoryStore,
    file: &str,
    uuid: &str,
    line: i32,
    author: AccountId,
) -> PatchLineComment {
    let draft = PatchLineComment::new_draft(
        CommentKey::new(patch_key(file), uuid),
        line,
        author,
        PatchLineComment::SIDE_NEW,
        format!("comment {uuid}"),
    );
    let mut txn = store.begin().await.expect("begin");
    txn.insert_comment(&draft).await.expect("draft");
    txn.commit().await.expect("commit");
    draft
}

pub(crate) async fn add_vote(store: &MemoryStore, account: AccountId, category: &str, value: i16) {
    let vote = ChangeApproval::new(
        psid().parent(),
        account,
        ApprovalCategoryId::new(category),
        value,
    );
    let mut txn = store.begin().await.expect("begin");
    txn.insert_approval(&vote).await.expect("vote");
    txn.commit().await.expect("commit");
}

/// Notifier that keeps every mail it was asked to send.
#[derive(Debug, Default)]
pub(crate) struct RecordingNotifier {
    pub(crate) sent: Mutex<Vec<CommentMail>>,
    pub(crate) fail: bool,
}

impl RecordingNotifier {
    pub(crate) fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub(crate) fn sent(&self) -> Vec<CommentMail> {
        self.sent.lock().expect("lock").clone()
    }
}

#[async_trait]
impl CommentNotifier for RecordingNotifier {
    async fn send_comment(&self, mail: &CommentMail) -> AppResult<()> {
        self.sent.lock().expect("lock").push(mail.clone());
        if self.fail {
            return Err(AppError::external_service("SMTP server refused connection"));
        }
        Ok(())
    }
}
