//! # Middleware Module
//!
//! Request timing and completion logging. The submit handler reuses the same
//! timer to produce the timing sample it records in the store, so the logged
//! latency and the stats average measure the same synchronous path.

use std::time::Instant;
use tracing::{info, warn};

/// Wall-clock timer for one request's synchronous handling path
#[derive(Debug, Clone, Copy)]
pub struct RequestTimer {
    started: Instant,
}

impl RequestTimer {
    /// Start timing now
    #[must_use]
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    /// Elapsed time since the timer started, in whole microseconds
    #[must_use]
    pub fn elapsed_micros(&self) -> u64 {
        u64::try_from(self.started.elapsed().as_micros()).unwrap_or(u64::MAX)
    }

    /// Log request completion with the elapsed time
    ///
    /// Client errors and above log at WARN, everything else at INFO.
    pub fn log_completion(&self, method: &str, path: &str, status: u16) {
        let elapsed_ms = self.started.elapsed().as_secs_f64() * 1000.0;
        if status >= 400 {
            warn!("{method} {path} - {status} ({elapsed_ms:.2}ms)");
        } else {
            info!("{method} {path} - {status} ({elapsed_ms:.2}ms)");
        }
    }
}
