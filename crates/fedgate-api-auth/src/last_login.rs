//! Asynchronous last-login touch.
//!
//! Sign-in telemetry must never block or fail the request that triggered
//! it. Touch jobs go through a bounded queue to one supervised worker task;
//! each store call runs under a deadline. Overflow, timeout and store
//! failures are logged and swallowed. The touch itself is a single atomic
//! store operation, so abandoning a timed-out call cannot leave a partial
//! directory mutation.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use fedgate_db::DirectoryStore;

/// Default queue capacity.
pub const DEFAULT_CAPACITY: usize = 256;

/// Default per-touch deadline.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(5);

/// Handle for submitting touch jobs. Cheap to clone.
#[derive(Debug, Clone)]
pub struct LoginTouchHandle {
    tx: mpsc::Sender<Uuid>,
}

impl LoginTouchHandle {
    /// Submit a touch for a user, best-effort.
    ///
    /// Never blocks; a full or closed queue drops the job with a log line.
    pub fn submit(&self, user_id: Uuid) {
        match self.tx.try_send(user_id) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(user_id = %user_id, "Last-login queue full; dropping touch");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::warn!(user_id = %user_id, "Last-login worker gone; dropping touch");
            }
        }
    }
}

/// Spawn the touch worker.
///
/// The worker drains the queue until every handle is dropped, then exits;
/// the returned [`JoinHandle`] resolves once the queue is fully drained.
pub fn spawn_touch_worker(
    store: Arc<dyn DirectoryStore>,
    capacity: usize,
    deadline: Duration,
) -> (LoginTouchHandle, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::channel(capacity);

    let worker = tokio::spawn(async move {
        while let Some(user_id) = rx.recv().await {
            match tokio::time::timeout(deadline, store.touch_last_login(user_id)).await {
                Ok(Ok(true)) => {
                    tracing::debug!(user_id = %user_id, "Updated last login");
                }
                Ok(Ok(false)) => {
                    tracing::debug!(user_id = %user_id, "User gone before last-login touch");
                }
                Ok(Err(err)) => {
                    tracing::error!(user_id = %user_id, error = %err, "Failed to update last login");
                }
                Err(_) => {
                    tracing::warn!(user_id = %user_id, "Last-login touch timed out");
                }
            }
        }
    });

    (LoginTouchHandle { tx }, worker)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fedgate_db::{MemoryDirectory, NewUser};

    async fn seed(store: &MemoryDirectory) -> Uuid {
        store
            .create_user(NewUser {
                user_name: "jdoe".to_string(),
                email: Some("jdoe@example.com".to_string()),
                active: true,
                ..NewUser::default()
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_touch_is_applied_by_worker() {
        let store = Arc::new(MemoryDirectory::new());
        let user_id = seed(&store).await;

        let (handle, worker) = spawn_touch_worker(store.clone(), 16, DEFAULT_DEADLINE);
        handle.submit(user_id);

        // Dropping the last handle closes the queue; the worker drains it
        // and exits.
        drop(handle);
        worker.await.unwrap();

        let user = store.get_user(user_id).await.unwrap().unwrap();
        assert!(user.last_login_at.is_some());
        // The touch is telemetry, not a provisioning write.
        assert_eq!(user.updated_at, user.created_at);
    }

    #[tokio::test]
    async fn test_unknown_user_is_swallowed() {
        let store = Arc::new(MemoryDirectory::new());
        let (handle, worker) = spawn_touch_worker(store, 16, DEFAULT_DEADLINE);

        handle.submit(Uuid::new_v4());
        drop(handle);
        // Worker exits cleanly; nothing to assert beyond no panic.
        worker.await.unwrap();
    }

    #[tokio::test]
    async fn test_submit_after_worker_gone_does_not_panic() {
        let store = Arc::new(MemoryDirectory::new());
        let user_id = seed(&store).await;

        let (handle, worker) = spawn_touch_worker(store, 16, DEFAULT_DEADLINE);
        worker.abort();
        let _ = worker.await;

        handle.submit(user_id);
    }
}
