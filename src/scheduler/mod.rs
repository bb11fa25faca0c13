//! # Deferred Computation Scheduler
//!
//! Fire-and-forget digest computation. `schedule` returns to the caller
//! immediately; an independent Tokio task sleeps for the configured delay,
//! computes the digest, and writes it back into the store. Many computations
//! may be in flight at once, each decoupled from the connection that
//! triggered it.
//!
//! There is no cancellation: once scheduled, a computation runs to completion
//! even while the server is shutting down. Shutdown does not wait for these
//! tasks, so computations still sleeping when the process exits are lost.

use crate::digest;
use crate::store::JobStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

/// Schedules deferred digest computations against a shared store
#[derive(Debug, Clone)]
pub struct Scheduler {
    store: Arc<JobStore>,
    delay: Duration,
}

impl Scheduler {
    /// Create a scheduler that writes results into `store` after `delay`
    #[must_use]
    pub fn new(store: Arc<JobStore>, delay: Duration) -> Self {
        Self { store, delay }
    }

    /// The fixed delay applied before each computation
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule the digest computation for one record
    ///
    /// Non-blocking; the spawned task owns the value and a store handle, so
    /// the requesting connection can close immediately.
    pub fn schedule(&self, id: u64, value: String) {
        let store = Arc::clone(&self.store);
        let delay = self.delay;
        tokio::spawn(async move {
            sleep(delay).await;
            let digest = digest::digest(&value);
            store.set_digest(id, digest);
            debug!(id, "deferred digest computation complete");
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_schedule_returns_before_digest_is_ready() {
        let store = Arc::new(JobStore::new());
        let scheduler = Scheduler::new(Arc::clone(&store), Duration::from_millis(50));

        let id = store.allocate();
        scheduler.schedule(id, "angryMonkey".to_string());

        // The call above must not have blocked on the delay
        assert_eq!(store.get(id).unwrap().digest, None);

        sleep(Duration::from_millis(200)).await;
        assert_eq!(
            store.get(id).unwrap().digest.as_deref(),
            Some(digest::digest("angryMonkey").as_str())
        );
    }

    #[tokio::test]
    async fn test_concurrent_computations_complete_independently() {
        let store = Arc::new(JobStore::new());
        let scheduler = Scheduler::new(Arc::clone(&store), Duration::from_millis(20));

        let values = ["alpha", "beta", "gamma", "delta"];
        let ids: Vec<u64> = values
            .iter()
            .map(|value| {
                let id = store.allocate();
                scheduler.schedule(id, (*value).to_string());
                id
            })
            .collect();

        sleep(Duration::from_millis(200)).await;

        for (id, value) in ids.iter().zip(values.iter()) {
            assert_eq!(
                store.get(*id).unwrap().digest.as_deref(),
                Some(digest::digest(value).as_str()),
                "record {id} resolved to the wrong digest"
            );
        }
    }

    #[tokio::test]
    async fn test_scheduler_clone_shares_store() {
        let store = Arc::new(JobStore::new());
        let scheduler = Scheduler::new(Arc::clone(&store), Duration::from_millis(10));
        let cloned = scheduler.clone();

        let id = store.allocate();
        cloned.schedule(id, "value".to_string());

        sleep(Duration::from_millis(100)).await;
        assert!(store.get(id).unwrap().digest.is_some());
    }
}
