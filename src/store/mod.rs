//! # Record Store
//!
//! Append-only, in-memory store for hash records and timing samples, shared
//! between the submission path, the retrieval path, and the deferred digest
//! computations.
//!
//! ## Locking Discipline
//!
//! A single coarse mutex guards both collections. Identifier allocation and
//! list growth must be atomic with respect to concurrent submissions, and a
//! per-record lock would buy nothing for an append-only list. The lock is
//! held only for the duration of an in-memory mutation, never across network
//! I/O or the scheduler delay.
//!
//! ## Invariants
//!
//! - Identifiers are issued in a strictly increasing sequence starting at 1;
//!   none is reused or skipped.
//! - A record's digest transitions from absent to present at most once and is
//!   never cleared or overwritten.
//! - The record list only grows; an issued identifier stays a valid index for
//!   the lifetime of the process.

use std::sync::Mutex;
use tracing::warn;

/// One submitted value's identifier and, eventually, its digest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashRecord {
    /// Externally visible 1-based identifier
    pub id: u64,
    /// Digest of the submitted value; absent until the deferred computation
    /// completes
    pub digest: Option<String>,
}

/// Point-in-time counters for the stats endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    /// Number of submissions accepted so far
    pub total: u64,
    /// Integer mean of all recorded handling times, in microseconds; zero
    /// when no samples exist
    pub average_micros: u64,
}

#[derive(Debug, Default)]
struct StoreInner {
    records: Vec<HashRecord>,
    timings: Vec<u64>,
}

/// Shared store for hash records and submission timing samples
///
/// Constructed once at startup and passed by handle to every component that
/// touches it; there is no process-wide singleton.
#[derive(Debug, Default)]
pub struct JobStore {
    inner: Mutex<StoreInner>,
}

impl JobStore {
    /// Create a new empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StoreInner> {
        // A poisoning panic cannot leave the vectors torn mid-append, so the
        // guard stays usable
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Allocate a new record with an absent digest, returning its identifier
    ///
    /// Allocation is totally ordered by the store lock: the n-th call returns
    /// identifier n.
    pub fn allocate(&self) -> u64 {
        let mut inner = self.lock();
        let id = inner.records.len() as u64 + 1;
        inner.records.push(HashRecord { id, digest: None });
        id
    }

    /// Set the digest for an allocated record
    ///
    /// Out-of-range identifiers and repeated writes are unreachable given the
    /// allocation discipline; both are logged and ignored rather than
    /// crashing the process.
    pub fn set_digest(&self, id: u64, digest: String) {
        let mut inner = self.lock();
        let slot = id
            .checked_sub(1)
            .and_then(|idx| usize::try_from(idx).ok())
            .and_then(|idx| inner.records.get_mut(idx));
        match slot {
            Some(record) if record.digest.is_none() => record.digest = Some(digest),
            Some(_) => warn!(id, "ignoring repeated digest write"),
            None => warn!(id, "ignoring digest write for unallocated identifier"),
        }
    }

    /// Look up a record by identifier
    ///
    /// Returns `None` for identifiers that were never issued. A returned
    /// record may still have an absent digest; the retrieval handler treats
    /// that the same as an unknown identifier.
    #[must_use]
    pub fn get(&self, id: u64) -> Option<HashRecord> {
        let inner = self.lock();
        id.checked_sub(1)
            .and_then(|idx| usize::try_from(idx).ok())
            .and_then(|idx| inner.records.get(idx))
            .cloned()
    }

    /// Record one submission's synchronous handling time, in microseconds
    pub fn record_timing(&self, micros: u64) {
        self.lock().timings.push(micros);
    }

    /// Snapshot the submission count and timing average
    ///
    /// The lock is released before the snapshot is returned; callers never
    /// block each other on anything beyond the in-memory read.
    #[must_use]
    pub fn snapshot(&self) -> StoreStats {
        let inner = self.lock();
        let total = inner.records.len() as u64;
        let average_micros = if inner.timings.is_empty() {
            0
        } else {
            inner.timings.iter().sum::<u64>() / inner.timings.len() as u64
        };
        StoreStats {
            total,
            average_micros,
        }
    }
}
