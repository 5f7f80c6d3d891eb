//! Retrying transaction runner.

use futures::future::BoxFuture;
use tracing::{debug, warn};

use reviewhub_core::result::AppResult;
use reviewhub_database::{ReviewStore, ReviewTransaction};

/// Run `work` inside a review transaction and commit it.
///
/// When the unit of work or the commit fails with a retryable error the
/// transaction is rolled back and `work` is run again from scratch, at most
/// `retries` extra times. Any other error rolls the transaction back and is
/// returned unchanged. `work` must not have side effects outside the
/// transaction, since it may run more than once.
pub async fn run_in_transaction<T, F>(
    store: &dyn ReviewStore,
    retries: u32,
    mut work: F,
) -> AppResult<T>
where
    T: Send,
    F: for<'t> FnMut(&'t mut dyn ReviewTransaction) -> BoxFuture<'t, AppResult<T>> + Send,
{
    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        debug!(attempt, "Starting review transaction");

        let mut txn = store.begin().await?;
        let result = work(txn.as_mut()).await;
        let outcome = match result {
            Ok(value) => txn.commit().await.map(|()| value),
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    warn!(error = %rollback_err, "Failed to roll back review transaction");
                }
                Err(e)
            }
        };

        match outcome {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt <= retries => {
                warn!(attempt, retries, error = %e, "Review transaction conflicted, retrying");
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use futures::FutureExt;

    use reviewhub_core::AppError;
    use reviewhub_core::error::ErrorKind;
    use reviewhub_core::types::{AccountId, ChangeId};
    use reviewhub_database::MemoryStore;
    use reviewhub_entity::{Change, ChangeStatus};

    use super::*;

    fn change(id: i32) -> Change {
        Change::new(ChangeId::new(id), AccountId::new(1), "master", "Subject")
    }

    #[tokio::test]
    async fn test_commits_on_success() {
        let store = MemoryStore::new();
        let id = run_in_transaction(&store, 0, |txn| {
            async move {
                txn.insert_change(&change(7)).await?;
                Ok::<_, AppError>(7)
            }
            .boxed()
        })
        .await
        .expect("transaction");

        assert_eq!(id, 7);
        let mut txn = store.begin().await.expect("begin");
        assert!(txn.change(ChangeId::new(7)).await.expect("read").is_some());
    }

    #[tokio::test]
    async fn test_rolls_back_on_error() {
        let store = MemoryStore::new();
        let err = run_in_transaction(&store, 3, |txn| {
            async move {
                txn.insert_change(&change(7)).await?;
                Err::<(), _>(AppError::validation("nope"))
            }
            .boxed()
        })
        .await
        .expect_err("must fail");

        assert_eq!(err.kind, ErrorKind::Validation);
        let mut txn = store.begin().await.expect("begin");
        assert!(txn.change(ChangeId::new(7)).await.expect("read").is_none());
    }

    #[tokio::test]
    async fn test_retries_after_concurrent_commit() {
        let store = MemoryStore::new();
        {
            let mut txn = store.begin().await.expect("begin");
            txn.insert_change(&change(1)).await.expect("seed");
            txn.commit().await.expect("seed commit");
        }

        let attempts = Arc::new(AtomicU32::new(0));
        let rival = store.clone();
        let counter = Arc::clone(&attempts);
        run_in_transaction(&store, 3, move |txn| {
            let rival = rival.clone();
            let counter = Arc::clone(&counter);
            async move {
                let mut current = txn.change(ChangeId::new(1)).await?.expect("seeded");
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    // A competing writer commits between our read and our commit.
                    let mut other = rival.begin().await?;
                    other.insert_change(&change(2)).await?;
                    other.commit().await?;
                }
                current.status = ChangeStatus::Merged;
                txn.update_change(&current).await
            }
            .boxed()
        })
        .await
        .expect("second attempt succeeds");

        assert_eq!(attempts.load(Ordering::SeqCst), 2);
        let mut txn = store.begin().await.expect("begin");
        let loaded = txn.change(ChangeId::new(1)).await.expect("read").expect("exists");
        assert_eq!(loaded.status, ChangeStatus::Merged);
        assert!(txn.change(ChangeId::new(2)).await.expect("read").is_some());
    }

    #[tokio::test]
    async fn test_gives_up_after_retry_budget() {
        let store = MemoryStore::new();
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&attempts);
        let err = run_in_transaction(&store, 2, move |_txn| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(AppError::conflict("serialization failure"))
            }
            .boxed()
        })
        .await
        .expect_err("must give up");

        assert!(err.is_retryable());
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_retryable_error_runs_once() {
        let store = MemoryStore::new();
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&attempts);
        let _ = run_in_transaction(&store, 5, move |_txn| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(AppError::not_found("missing"))
            }
            .boxed()
        })
        .await;

        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}
