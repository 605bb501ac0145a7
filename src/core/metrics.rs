//! Tree logger metrics for observability
//!
//! Counters for artifact persistence, naming collisions, leaked iteration
//! contexts and replayed events.

use std::sync::atomic::{AtomicU64, Ordering};

static GLOBAL: LogMetrics = LogMetrics::new();

/// Process-wide counters updated by every backend.
pub fn metrics() -> &'static LogMetrics {
    &GLOBAL
}

/// Metrics for tree logger observability
///
/// # Example
///
/// ```
/// use treelog::LogMetrics;
///
/// let metrics = LogMetrics::new();
/// metrics.record_artifact();
/// metrics.record_collision();
///
/// assert_eq!(metrics.artifacts_written(), 1);
/// assert_eq!(metrics.name_collisions(), 1);
/// ```
#[derive(Debug)]
pub struct LogMetrics {
    /// Artifacts persisted to a directory
    artifacts_written: AtomicU64,

    /// Candidate names skipped because they already existed
    name_collisions: AtomicU64,

    /// Iteration contexts closed by finalization instead of by their owner
    leaked_contexts: AtomicU64,

    /// Events re-executed from recorded traces
    replayed_events: AtomicU64,
}

impl LogMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            artifacts_written: AtomicU64::new(0),
            name_collisions: AtomicU64::new(0),
            leaked_contexts: AtomicU64::new(0),
            replayed_events: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn artifacts_written(&self) -> u64 {
        self.artifacts_written.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn name_collisions(&self) -> u64 {
        self.name_collisions.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn leaked_contexts(&self) -> u64 {
        self.leaked_contexts.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn replayed_events(&self) -> u64 {
        self.replayed_events.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn record_artifact(&self) -> u64 {
        self.artifacts_written.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_collision(&self) -> u64 {
        self.name_collisions.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_leak(&self) -> u64 {
        self.leaked_contexts.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_replayed(&self, events: u64) -> u64 {
        self.replayed_events.fetch_add(events, Ordering::Relaxed)
    }

    /// Reset all metrics to zero
    pub fn reset(&self) {
        self.artifacts_written.store(0, Ordering::Relaxed);
        self.name_collisions.store(0, Ordering::Relaxed);
        self.leaked_contexts.store(0, Ordering::Relaxed);
        self.replayed_events.store(0, Ordering::Relaxed);
    }
}

impl Default for LogMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for LogMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            artifacts_written: AtomicU64::new(self.artifacts_written()),
            name_collisions: AtomicU64::new(self.name_collisions()),
            leaked_contexts: AtomicU64::new(self.leaked_contexts()),
            replayed_events: AtomicU64::new(self.replayed_events()),
        }
    }
}
