//! StoreHandle - single-writer persistence worker.
//!
//! Record snapshots are enqueued non-blocking from the session and written
//! by one dedicated task, which serializes all writes to the store. Every
//! snapshot carries the full record, so collapsing a backlog to the newest
//! snapshot is safe (last-writer-wins). Write failures are logged and
//! counted; the in-memory record stays authoritative.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use contracts::{RecordStore, StepRecord};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument, warn};

/// Handle to the running writer worker
pub struct StoreHandle {
    /// Store name
    name: String,
    /// Channel delivering record snapshots to the worker
    tx: mpsc::Sender<StepRecord>,
    /// Shared metrics
    metrics: Arc<WriterMetrics>,
    /// Worker task handle
    worker_handle: JoinHandle<()>,
}

impl StoreHandle {
    /// Spawn the writer worker around a record store
    pub fn spawn<S: RecordStore + Send + 'static>(
        store: S,
        key: impl Into<String>,
        queue_capacity: usize,
    ) -> Self {
        let name = store.name().to_string();
        let key = key.into();
        let (tx, rx) = mpsc::channel(queue_capacity);
        let metrics = Arc::new(WriterMetrics::new());

        let worker_metrics = Arc::clone(&metrics);
        let worker_name = name.clone();

        let worker_handle = tokio::spawn(async move {
            writer_worker(store, key, rx, worker_metrics, worker_name).await;
        });

        Self {
            name,
            tx,
            metrics,
            worker_handle,
        }
    }

    /// Get store name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get current metrics
    pub fn metrics(&self) -> &Arc<WriterMetrics> {
        &self.metrics
    }

    /// Enqueue a record snapshot (non-blocking)
    ///
    /// Returns true if enqueued. A full queue drops this intent; the next
    /// snapshot carries the newer full record anyway.
    pub fn try_persist(&self, record: StepRecord) -> bool {
        match self.tx.try_send(record) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.metrics.inc_dropped_count();
                warn!(store = %self.name, "writer queue full, snapshot skipped");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                error!(store = %self.name, "writer worker closed unexpectedly");
                false
            }
        }
    }

    /// Shutdown the writer gracefully, flushing queued snapshots
    #[instrument(name = "store_handle_shutdown", skip(self))]
    pub async fn shutdown(self) {
        drop(self.tx);
        if let Err(e) = self.worker_handle.await {
            error!(store = %self.name, error = ?e, "writer task panicked");
        }
        debug!(store = %self.name, "StoreHandle shutdown complete");
    }
}

/// Worker task that consumes snapshots and writes to the store
#[instrument(
    name = "store_writer_loop",
    skip(store, rx, metrics),
    fields(store = %name)
)]
async fn writer_worker<S: RecordStore>(
    mut store: S,
    key: String,
    mut rx: mpsc::Receiver<StepRecord>,
    metrics: Arc<WriterMetrics>,
    name: String,
) {
    debug!(store = %name, "writer worker started");

    while let Some(record) = rx.recv().await {
        // Collapse any backlog: only the newest full snapshot matters.
        let mut latest = record;
        while let Ok(newer) = rx.try_recv() {
            latest = newer;
        }

        match store.save(&key, &latest).await {
            Ok(()) => {
                metrics.inc_write_count();
                ::metrics::counter!("step_tracker_persist_total", "status" => "ok").increment(1);
            }
            Err(e) => {
                // Non-fatal: the in-memory record is authoritative and the
                // next snapshot retries the full record.
                metrics.inc_failure_count();
                ::metrics::counter!("step_tracker_persist_total", "status" => "failure")
                    .increment(1);
                warn!(
                    store = %name,
                    steps = latest.steps,
                    error = %e,
                    "persist failed, will retry with next snapshot"
                );
            }
        }
    }

    debug!(store = %name, "writer worker stopped");
}

/// Metrics for the writer worker
#[derive(Debug, Default)]
pub struct WriterMetrics {
    /// Total successful writes
    write_count: AtomicU64,
    /// Total write failures
    failure_count: AtomicU64,
    /// Total snapshots dropped due to a full queue
    dropped_count: AtomicU64,
}

impl WriterMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Get total write count
    pub fn write_count(&self) -> u64 {
        self.write_count.load(Ordering::Relaxed)
    }

    /// Increment write count
    pub fn inc_write_count(&self) {
        self.write_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get failure count
    pub fn failure_count(&self) -> u64 {
        self.failure_count.load(Ordering::Relaxed)
    }

    /// Increment failure count
    pub fn inc_failure_count(&self) {
        self.failure_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get dropped count
    pub fn dropped_count(&self) -> u64 {
        self.dropped_count.load(Ordering::Relaxed)
    }

    /// Increment dropped count
    pub fn inc_dropped_count(&self) {
        self.dropped_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> WriterMetricsSnapshot {
        WriterMetricsSnapshot {
            write_count: self.write_count(),
            failure_count: self.failure_count(),
            dropped_count: self.dropped_count(),
        }
    }
}

/// Snapshot of writer metrics (for reporting)
#[derive(Debug, Clone, Copy)]
pub struct WriterMetricsSnapshot {
    pub write_count: u64,
    pub failure_count: u64,
    pub dropped_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use contracts::{EngineError, Provenance};
    use std::sync::Mutex;
    use tokio::time::{sleep, Duration};

    /// Mock store recording every saved snapshot
    struct MockStore {
        name: String,
        saved: Arc<Mutex<Vec<StepRecord>>>,
        should_fail: bool,
    }

    impl RecordStore for MockStore {
        fn name(&self) -> &str {
            &self.name
        }

        async fn load(&self, _key: &str) -> Result<Option<StepRecord>, EngineError> {
            Ok(None)
        }

        async fn save(&mut self, key: &str, record: &StepRecord) -> Result<(), EngineError> {
            if self.should_fail {
                return Err(EngineError::persistence(key, "mock failure"));
            }
            self.saved.lock().unwrap().push(record.clone());
            Ok(())
        }
    }

    fn record_with_steps(steps: u64) -> StepRecord {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        StepRecord {
            date: now.date_naive(),
            steps,
            coins: steps / 1000,
            distance_km: 0.0,
            calories: 0.0,
            last_updated: now,
            source: Provenance::Sensor,
        }
    }

    #[tokio::test]
    async fn test_snapshots_are_written() {
        let saved = Arc::new(Mutex::new(Vec::new()));
        let store = MockStore {
            name: "mock".to_string(),
            saved: Arc::clone(&saved),
            should_fail: false,
        };

        let handle = StoreHandle::spawn(store, "daily_state", 8);
        for steps in [1, 2, 3] {
            assert!(handle.try_persist(record_with_steps(steps)));
        }
        handle.shutdown().await;

        let written = saved.lock().unwrap();
        assert!(!written.is_empty());
        // Whatever was collapsed, the final state must be the newest one.
        assert_eq!(written.last().unwrap().steps, 3);
    }

    #[tokio::test]
    async fn test_failures_are_non_fatal() {
        let store = MockStore {
            name: "failing".to_string(),
            saved: Arc::new(Mutex::new(Vec::new())),
            should_fail: true,
        };

        let handle = StoreHandle::spawn(store, "daily_state", 8);
        for steps in [1, 2, 3] {
            handle.try_persist(record_with_steps(steps));
        }

        sleep(Duration::from_millis(50)).await;
        assert!(handle.metrics().failure_count() > 0);

        // The worker is still alive and accepting snapshots.
        assert!(handle.try_persist(record_with_steps(4)));
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_full_queue_drops_snapshot() {
        // A worker that never drains: block it with a full queue of size 1.
        struct SlowStore {
            name: String,
        }
        impl RecordStore for SlowStore {
            fn name(&self) -> &str {
                &self.name
            }
            async fn load(&self, _key: &str) -> Result<Option<StepRecord>, EngineError> {
                Ok(None)
            }
            async fn save(&mut self, _key: &str, _record: &StepRecord) -> Result<(), EngineError> {
                sleep(Duration::from_millis(200)).await;
                Ok(())
            }
        }

        let handle = StoreHandle::spawn(
            SlowStore {
                name: "slow".to_string(),
            },
            "daily_state",
            1,
        );

        let mut dropped_any = false;
        for steps in 0..20 {
            if !handle.try_persist(record_with_steps(steps)) {
                dropped_any = true;
            }
        }
        assert!(dropped_any);
        assert!(handle.metrics().dropped_count() > 0);

        handle.shutdown().await;
    }
}
