//! Per-sink delivery counters.
//!
//! Shared between a sink's handle (producer side) and its worker
//! (consumer side); all counters are lock-free atomics.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Delivery counters for a single sink
#[derive(Debug, Default)]
pub struct SinkMetrics {
    queue_len: AtomicUsize,
    delivered_count: AtomicU64,
    failure_count: AtomicU64,
    dropped_count: AtomicU64,
}

impl SinkMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last observed queue depth
    pub fn queue_len(&self) -> usize {
        self.queue_len.load(Ordering::Relaxed)
    }

    pub fn set_queue_len(&self, len: usize) {
        self.queue_len.store(len, Ordering::Relaxed);
    }

    /// Events the sink accepted
    pub fn delivered_count(&self) -> u64 {
        self.delivered_count.load(Ordering::Relaxed)
    }

    pub fn inc_delivered_count(&self) {
        self.delivered_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Writes the sink refused
    pub fn failure_count(&self) -> u64 {
        self.failure_count.load(Ordering::Relaxed)
    }

    pub fn inc_failure_count(&self) {
        self.failure_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Events dropped before the sink ever saw them (full queue)
    pub fn dropped_count(&self) -> u64 {
        self.dropped_count.load(Ordering::Relaxed)
    }

    pub fn inc_dropped_count(&self) {
        self.dropped_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Consistent point-in-time copy for reporting
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            queue_len: self.queue_len(),
            delivered_count: self.delivered_count(),
            failure_count: self.failure_count(),
            dropped_count: self.dropped_count(),
        }
    }
}

/// Snapshot of sink metrics (for reporting)
#[derive(Debug, Clone, Copy)]
pub struct MetricsSnapshot {
    pub queue_len: usize,
    pub delivered_count: u64,
    pub failure_count: u64,
    pub dropped_count: u64,
}
