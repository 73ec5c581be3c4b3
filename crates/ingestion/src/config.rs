//! Shared source metrics.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters shared by all motion sources
#[derive(Debug, Default)]
pub struct SourceMetrics {
    /// Samples produced
    received: AtomicU64,

    /// Samples the consumer could not take
    dropped: AtomicU64,

    /// Malformed inputs (replay parse errors etc.)
    invalid: AtomicU64,
}

impl SourceMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a produced sample
    pub fn record_received(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("step_tracker_source_samples_total").increment(1);
    }

    /// Record a sample the consumer dropped
    pub fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("step_tracker_source_dropped_total").increment(1);
    }

    /// Record a malformed input
    pub fn record_invalid(&self) {
        self.invalid.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("step_tracker_source_invalid_total").increment(1);
    }

    /// Total samples produced
    pub fn received(&self) -> u64 {
        self.received.load(Ordering::Relaxed)
    }

    /// Total dropped samples
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Total malformed inputs
    pub fn invalid(&self) -> u64 {
        self.invalid.load(Ordering::Relaxed)
    }
}
