use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinSet;

/// Work that outlives the request that started it (donor and admin mail).
/// Shutdown drains it so in-flight deliveries are not silently dropped.
#[derive(Clone, Default)]
pub struct BackgroundTasks {
    set: Arc<Mutex<JoinSet<()>>>,
}

impl BackgroundTasks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut set = self.set.lock().unwrap_or_else(|e| e.into_inner());
        // Reap finished tasks so the set does not grow for the life of the server.
        while let Some(done) = set.try_join_next() {
            if let Err(e) = done {
                tracing::error!("background task failed: {}", e);
            }
        }
        set.spawn(task);
    }

    pub fn pending(&self) -> usize {
        self.set.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Waits up to `timeout` for outstanding tasks. Returns how many were still
    /// running when the deadline passed; those are aborted.
    pub async fn drain(&self, timeout: Duration) -> usize {
        let mut set = std::mem::take(&mut *self.set.lock().unwrap_or_else(|e| e.into_inner()));
        if set.is_empty() {
            return 0;
        }
        tracing::info!(pending = set.len(), "waiting for background tasks");

        let finished = tokio::time::timeout(timeout, async {
            while let Some(done) = set.join_next().await {
                if let Err(e) = done {
                    tracing::error!("background task failed: {}", e);
                }
            }
        })
        .await;

        match finished {
            Ok(()) => 0,
            Err(_) => {
                let left = set.len();
                tracing::warn!(left, "background tasks still running at shutdown, aborting");
                set.abort_all();
                left
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[tokio::test]
    async fn drain_waits_for_in_flight_work() {
        let tasks = BackgroundTasks::new();
        let done = Arc::new(AtomicBool::new(false));
        let flag = done.clone();
        tasks.spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            flag.store(true, Ordering::SeqCst);
        });
        assert_eq!(tasks.pending(), 1);

        assert_eq!(tasks.drain(Duration::from_secs(5)).await, 0);
        assert!(done.load(Ordering::SeqCst));
        assert_eq!(tasks.pending(), 0);
    }

    #[tokio::test]
    async fn drain_gives_up_after_timeout() {
        let tasks = BackgroundTasks::new();
        tasks.spawn(std::future::pending());
        assert_eq!(tasks.drain(Duration::from_millis(20)).await, 1);
    }
}
