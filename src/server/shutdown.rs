//! # Shutdown Coordinator
//!
//! Process-wide shutdown state shared between the `/shutdown` endpoint, the
//! OS signal handler, and the accept loop. Triggering is idempotent; the
//! first trigger wins and every waiter is released.
//!
//! The termination sequence it coordinates: stop accepting new connections,
//! drain in-flight handlers up to a bounded grace period, return. Outstanding
//! deferred digest computations are deliberately not part of the sequence;
//! the process may exit before they complete.

use tokio::sync::watch;
use tracing::info;

/// Idempotent shutdown trigger with async waiters
#[derive(Debug)]
pub struct ShutdownCoordinator {
    tx: watch::Sender<bool>,
}

impl ShutdownCoordinator {
    /// Create a coordinator in the not-triggered state
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// Begin the termination sequence
    ///
    /// Safe to call from any task, any number of times; only the first call
    /// has an effect.
    pub fn trigger(&self) {
        if !self.tx.send_replace(true) {
            info!("shutdown triggered");
        }
    }

    /// Whether shutdown has been triggered
    #[must_use]
    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Wait until shutdown is triggered
    ///
    /// Resolves immediately if the trigger already fired.
    pub async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in self, so wait_for cannot observe a closed
        // channel here
        let _ = rx.wait_for(|triggered| *triggered).await;
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}
