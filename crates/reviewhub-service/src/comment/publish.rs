//! Publishing a reviewer's drafts, votes and summary message.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use futures::FutureExt;
use serde::Serialize;
use tracing::{info, warn};

use reviewhub_core::error::{AppError, ErrorKind};
use reviewhub_core::result::AppResult;
use reviewhub_core::types::AccountId;
use reviewhub_database::{ReviewStore, ReviewTransaction};
use reviewhub_entity::{
    ApprovalCategoryValueId, Change, ChangeMessage, Patch, PatchKey, PatchLineComment, PatchSet,
    PatchSetId, PatchSetInfo,
};

use super::new_uuid;
use super::summary::compose_summary;
use crate::approval::{ApprovalTypes, plan_approvals};
use crate::context::RequestContext;
use crate::notification::{CommentMail, CommentNotifier};
use crate::transaction::run_in_transaction;

/// State committed by a successful publication.
#[derive(Debug, Clone, Serialize)]
pub struct PublishResult {
    /// The change, with its last-updated time advanced.
    pub change: Change,
    /// The revision commented on.
    pub patch_set: PatchSet,
    /// Commit metadata of the revision.
    pub info: PatchSetInfo,
    /// Summary message, if anything was worth saying.
    pub message: Option<ChangeMessage>,
    /// Comments that went from draft to published.
    pub comments: Vec<PatchLineComment>,
}

impl PublishResult {
    fn to_mail(&self, from: AccountId) -> CommentMail {
        CommentMail {
            from,
            change: self.change.clone(),
            patch_set: self.patch_set.clone(),
            info: self.info.clone(),
            message: self.message.clone(),
            comments: self.comments.clone(),
        }
    }
}

/// Publishes review feedback on a patch set.
#[derive(Clone)]
pub struct PublishService {
    /// Review data.
    store: Arc<dyn ReviewStore>,
    /// Categories reviewers may vote in.
    approval_types: Arc<ApprovalTypes>,
    /// Post-commit notification.
    notifier: Arc<dyn CommentNotifier>,
    /// Extra attempts on transaction conflicts.
    retries: u32,
    /// Whether to notify after publishing.
    notify: bool,
}

impl PublishService {
    /// Creates a new publish service.
    pub fn new(
        store: Arc<dyn ReviewStore>,
        approval_types: Arc<ApprovalTypes>,
        notifier: Arc<dyn CommentNotifier>,
        retries: u32,
        notify: bool,
    ) -> Self {
        Self {
            store,
            approval_types,
            notifier,
            retries,
            notify,
        }
    }

    /// Publish the acting reviewer's drafts on `patch_set_id`, reconcile
    /// their votes with `approvals` and record a summary message.
    ///
    /// Everything is written in one transaction. Notification happens after
    /// commit; if it fails the publication stays committed and an
    /// [`ErrorKind::ExternalService`] error is returned.
    pub async fn publish_comments(
        &self,
        ctx: &RequestContext,
        patch_set_id: PatchSetId,
        message: Option<String>,
        approvals: Vec<ApprovalCategoryValueId>,
    ) -> AppResult<PublishResult> {
        let me = ctx.account_id;
        let types = Arc::clone(&self.approval_types);

        let result = run_in_transaction(self.store.as_ref(), self.retries, move |txn| {
            let types = Arc::clone(&types);
            let message = message.clone();
            let approvals = approvals.clone();
            async move {
                publish_in_txn(txn, &types, me, patch_set_id, message.as_deref(), &approvals).await
            }
            .boxed()
        })
        .await?;

        info!(
            account_id = %me,
            change_id = %result.change.change_id,
            patch_set = patch_set_id.get(),
            comments = result.comments.len(),
            message = result.message.is_some(),
            "Published review comments"
        );

        if self.notify {
            if let Err(e) = self.notifier.send_comment(&result.to_mail(me)).await {
                warn!(
                    change_id = %result.change.change_id,
                    error = %e,
                    "Comment notification failed"
                );
                return Err(AppError::with_source(
                    ErrorKind::ExternalService,
                    format!("Comments published, but notification failed: {}", e.message),
                    e,
                ));
            }
        }

        Ok(result)
    }
}

async fn publish_in_txn(
    txn: &mut dyn ReviewTransaction,
    types: &ApprovalTypes,
    me: AccountId,
    patch_set_id: PatchSetId,
    text: Option<&str>,
    approvals: &[ApprovalCategoryValueId],
) -> AppResult<PublishResult> {
    let not_found = || AppError::not_found(format!("Patch set {patch_set_id} not found"));
    let mut change = txn
        .change(patch_set_id.parent())
        .await?
        .ok_or_else(not_found)?;
    let patch_set = txn.patch_set(patch_set_id).await?.ok_or_else(not_found)?;
    let info = txn
        .patch_set_info(patch_set_id)
        .await?
        .ok_or_else(not_found)?;

    let mut comments = txn.drafts_by_patch_set(patch_set_id, me).await?;
    let file_names: Vec<String> = comments
        .iter()
        .map(|c| c.key.patch.file_name.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let mut patches: BTreeMap<PatchKey, Patch> = txn
        .patches(patch_set_id, &file_names)
        .await?
        .into_iter()
        .map(|p| (p.key.clone(), p))
        .collect();
    for comment in &mut comments {
        if let Some(patch) = patches.get_mut(&comment.key.patch) {
            patch.increment_comment_count();
        }
        comment.publish();
    }
    let patches: Vec<Patch> = patches.into_values().collect();
    txn.update_patches(&patches).await?;
    txn.update_comments(&comments).await?;

    let existing = txn.approvals_by_change_user(change.change_id, me).await?;
    let plan = plan_approvals(types, &change, me, existing, approvals);
    for approval in &plan.inserts {
        txn.insert_approval(approval).await?;
    }
    for approval in &plan.updates {
        txn.update_approval(approval).await?;
    }
    if !plan.deletes.is_empty() {
        txn.delete_approvals(&plan.deletes).await?;
    }

    let summary = compose_summary(patch_set_id.get(), &plan.deltas, text);
    let message = if summary.is_empty() {
        None
    } else {
        let message = ChangeMessage::new(change.change_id, new_uuid(), Some(me), summary);
        txn.insert_change_message(&message).await?;
        Some(message)
    };

    change.touch();
    txn.update_change(&change).await?;

    Ok(PublishResult {
        change,
        patch_set,
        info,
        message,
        comments,
    })
}

#[cfg(test)]
mod tests {
    use reviewhub_core::types::ChangeId;
    use reviewhub_database::MemoryStore;
    use reviewhub_entity::{
        ApprovalCategoryId, ChangeApproval, ChangeStatus, CommentKey, CommentStatus,
    };

    use super::*;
    use crate::notification::LogNotifier;
    use crate::test_support::{
        OTHER, README, REVIEWER, RecordingNotifier, SOURCE_FILE, add_draft, add_vote,
        approval_types, patch_key, psid, seed,
    };

    fn service(store: &MemoryStore, notifier: Arc<dyn CommentNotifier>) -> PublishService {
        PublishService::new(
            Arc::new(store.clone()),
            approval_types(),
            notifier,
            3,
            true,
        )
    }

    fn sel(s: &str) -> ApprovalCategoryValueId {
        s.parse().expect("valid selection")
    }

    async fn load_change(store: &MemoryStore) -> Change {
        let mut txn = store.begin().await.expect("begin");
        txn.change(psid().parent())
            .await
            .expect("read")
            .expect("change exists")
    }

    async fn votes(store: &MemoryStore) -> Vec<ChangeApproval> {
        let mut txn = store.begin().await.expect("begin");
        txn.approvals_by_change_user(psid().parent(), REVIEWER)
            .await
            .expect("read")
    }

    #[tokio::test]
    async fn test_publish_drafts_votes_and_message() {
        let store = seed(ChangeStatus::New).await;
        add_draft(&store, SOURCE_FILE, "c1", 10, REVIEWER).await;
        add_draft(&store, SOURCE_FILE, "c2", 12, REVIEWER).await;
        add_draft(&store, README, "c3", 1, REVIEWER).await;
        let before = load_change(&store).await.last_updated_on;

        let notifier = Arc::new(RecordingNotifier::default());
        let ctx = RequestContext::new(REVIEWER);
        let result = service(&store, notifier.clone())
            .publish_comments(
                &ctx,
                psid(),
                Some("Nice work".to_string()),
                vec![sel("CRVW=+2"), sel("VRIF=+1")],
            )
            .await
            .expect("publish");

        assert_eq!(result.comments.len(), 3);
        assert!(result
            .comments
            .iter()
            .all(|c| c.status == CommentStatus::Published));
        let message = result.message.as_ref().expect("summary message");
        assert_eq!(
            message.message,
            "Patch Set 2: Verified; Looks good to me, approved\nNice work"
        );
        assert_eq!(message.author_id, Some(REVIEWER));
        assert!(result.change.last_updated_on >= before);

        let mut txn = store.begin().await.expect("begin");
        let src = txn.patch(&patch_key(SOURCE_FILE)).await.expect("read").expect("patch");
        let readme = txn.patch(&patch_key(README)).await.expect("read").expect("patch");
        assert_eq!(src.comment_count, 2);
        assert_eq!(readme.comment_count, 1);
        assert!(txn
            .drafts_by_patch_set(psid(), REVIEWER)
            .await
            .expect("read")
            .is_empty());
        let messages = txn.change_messages(psid().parent()).await.expect("read");
        assert_eq!(messages.len(), 1);
        drop(txn);

        let mut votes = votes(&store).await;
        votes.sort_by(|a, b| a.category_id.cmp(&b.category_id));
        let recorded: Vec<(&str, i16)> = votes
            .iter()
            .map(|v| (v.category_id.as_str(), v.value))
            .collect();
        assert_eq!(recorded, vec![("CRVW", 2), ("VRIF", 1)]);

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].from, REVIEWER);
        assert_eq!(sent[0].comments.len(), 3);
        assert_eq!(sent[0].patch_set.ref_name(), "refs/changes/34/1234/2");
    }

    #[tokio::test]
    async fn test_missing_patch_set_is_not_found() {
        let store = seed(ChangeStatus::New).await;
        let ctx = RequestContext::new(REVIEWER);
        let missing = PatchSetId::new(ChangeId::new(1234), 9);

        let err = service(&store, Arc::new(LogNotifier))
            .publish_comments(&ctx, missing, Some("hello".to_string()), vec![])
            .await
            .expect_err("must fail");

        assert_eq!(err.kind, ErrorKind::NotFound);
        let mut txn = store.begin().await.expect("begin");
        assert!(txn
            .change_messages(psid().parent())
            .await
            .expect("read")
            .is_empty());
    }

    #[tokio::test]
    async fn test_missing_change_is_not_found() {
        let store = MemoryStore::new();
        let ctx = RequestContext::new(REVIEWER);
        let err = service(&store, Arc::new(LogNotifier))
            .publish_comments(&ctx, psid(), None, vec![])
            .await
            .expect_err("must fail");
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_empty_publish_only_touches_change() {
        let store = seed(ChangeStatus::New).await;
        let before = load_change(&store).await.last_updated_on;
        let ctx = RequestContext::new(REVIEWER);

        let result = service(&store, Arc::new(LogNotifier))
            .publish_comments(&ctx, psid(), None, vec![])
            .await
            .expect("publish");

        assert!(result.message.is_none());
        assert!(result.comments.is_empty());
        assert!(load_change(&store).await.last_updated_on >= before);
        let mut txn = store.begin().await.expect("begin");
        assert!(txn
            .change_messages(psid().parent())
            .await
            .expect("read")
            .is_empty());
    }

    #[tokio::test]
    async fn test_other_reviewers_drafts_stay_drafts() {
        let store = seed(ChangeStatus::New).await;
        add_draft(&store, SOURCE_FILE, "mine", 3, REVIEWER).await;
        add_draft(&store, SOURCE_FILE, "theirs", 4, OTHER).await;
        let ctx = RequestContext::new(REVIEWER);

        let result = service(&store, Arc::new(LogNotifier))
            .publish_comments(&ctx, psid(), None, vec![])
            .await
            .expect("publish");

        assert_eq!(result.comments.len(), 1);
        assert_eq!(result.comments[0].key.uuid, "mine");
        let mut txn = store.begin().await.expect("begin");
        let theirs = txn
            .comment(&CommentKey::new(patch_key(SOURCE_FILE), "theirs"))
            .await
            .expect("read")
            .expect("exists");
        assert!(theirs.is_draft());
        let src = txn.patch(&patch_key(SOURCE_FILE)).await.expect("read").expect("patch");
        assert_eq!(src.comment_count, 1);
    }

    #[tokio::test]
    async fn test_draft_without_patch_row_is_still_published() {
        let store = seed(ChangeStatus::New).await;
        add_draft(&store, "deleted/file.rs", "orphan", 1, REVIEWER).await;
        let ctx = RequestContext::new(REVIEWER);

        let result = service(&store, Arc::new(LogNotifier))
            .publish_comments(&ctx, psid(), None, vec![])
            .await
            .expect("publish");

        assert_eq!(result.comments.len(), 1);
        assert_eq!(result.comments[0].status, CommentStatus::Published);
    }

    #[tokio::test]
    async fn test_vote_change_and_removal() {
        let store = seed(ChangeStatus::New).await;
        add_vote(&store, REVIEWER, "CRVW", 1).await;
        add_vote(&store, REVIEWER, "VRIF", 1).await;
        add_vote(&store, OTHER, "VRIF", -1).await;
        let ctx = RequestContext::new(REVIEWER);

        let result = service(&store, Arc::new(LogNotifier))
            .publish_comments(&ctx, psid(), None, vec![sel("CRVW=-2")])
            .await
            .expect("publish");

        assert_eq!(
            result.message.expect("summary").message,
            "Patch Set 2: Do not submit\n"
        );
        let votes = votes(&store).await;
        assert_eq!(votes.len(), 1);
        assert_eq!(votes[0].category_id, ApprovalCategoryId::new("CRVW"));
        assert_eq!(votes[0].value, -2);

        let mut txn = store.begin().await.expect("begin");
        let others = txn
            .approvals_by_change_user(psid().parent(), OTHER)
            .await
            .expect("read");
        assert_eq!(others.len(), 1);
    }

    #[tokio::test]
    async fn test_closed_change_keeps_votes_but_records_message() {
        let store = seed(ChangeStatus::Merged).await;
        add_vote(&store, REVIEWER, "CRVW", 1).await;
        add_vote(&store, REVIEWER, "VRIF", 1).await;
        let ctx = RequestContext::new(REVIEWER);

        let result = service(&store, Arc::new(LogNotifier))
            .publish_comments(&ctx, psid(), None, vec![sel("CRVW=+2")])
            .await
            .expect("publish");

        assert_eq!(
            result.message.expect("summary").message,
            "Patch Set 2: Looks good to me, approved\n"
        );
        let mut votes = votes(&store).await;
        votes.sort_by(|a, b| a.category_id.cmp(&b.category_id));
        let recorded: Vec<(&str, i16)> = votes
            .iter()
            .map(|v| (v.category_id.as_str(), v.value))
            .collect();
        assert_eq!(recorded, vec![("CRVW", 1), ("VRIF", 1)]);
    }

    #[tokio::test]
    async fn test_notification_failure_keeps_publication() {
        let store = seed(ChangeStatus::New).await;
        add_draft(&store, SOURCE_FILE, "c1", 10, REVIEWER).await;
        let notifier = Arc::new(RecordingNotifier::failing());
        let ctx = RequestContext::new(REVIEWER);

        let err = service(&store, notifier.clone())
            .publish_comments(&ctx, psid(), Some("LGTM".to_string()), vec![])
            .await
            .expect_err("notification failure surfaces");

        assert_eq!(err.kind, ErrorKind::ExternalService);
        assert!(err.message.starts_with("Comments published, but notification failed"));
        assert_eq!(notifier.sent().len(), 1);

        let mut txn = store.begin().await.expect("begin");
        let comment = txn
            .comment(&CommentKey::new(patch_key(SOURCE_FILE), "c1"))
            .await
            .expect("read")
            .expect("exists");
        assert_eq!(comment.status, CommentStatus::Published);
        assert_eq!(
            txn.change_messages(psid().parent()).await.expect("read").len(),
            1
        );
    }

    #[tokio::test]
    async fn test_disabled_notifications_are_skipped() {
        let store = seed(ChangeStatus::New).await;
        let notifier = Arc::new(RecordingNotifier::failing());
        let svc = PublishService::new(
            Arc::new(store.clone()),
            approval_types(),
            notifier.clone(),
            3,
            false,
        );

        svc.publish_comments(&RequestContext::new(REVIEWER), psid(), None, vec![])
            .await
            .expect("publish without notifying");
        assert!(notifier.sent().is_empty());
    }
}
