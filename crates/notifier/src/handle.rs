//! SinkHandle - one sink behind its own queue and worker task.
//!
//! Isolation boundary: a slow or failing sink backs up its own queue and
//! nothing else. The router never awaits a sink directly.

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument, warn};

use contracts::{EngineEvent, EventSink};

use crate::metrics::SinkMetrics;

/// Handle to a running sink worker
pub struct SinkHandle {
    name: String,
    tx: mpsc::Sender<EngineEvent>,
    metrics: Arc<SinkMetrics>,
    worker_handle: JoinHandle<()>,
}

impl SinkHandle {
    /// Spawn the worker task owning `sink`
    pub fn spawn<S: EventSink + Send + 'static>(sink: S, queue_capacity: usize) -> Self {
        let name = sink.name().to_string();
        let (tx, rx) = mpsc::channel(queue_capacity);
        let metrics = Arc::new(SinkMetrics::new());

        let worker_metrics = Arc::clone(&metrics);
        let worker_name = name.clone();

        let worker_handle = tokio::spawn(async move {
            sink_worker(sink, rx, worker_metrics, worker_name).await;
        });

        Self {
            name,
            tx,
            metrics,
            worker_handle,
        }
    }

    /// Sink name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shared delivery counters
    pub fn metrics(&self) -> &Arc<SinkMetrics> {
        &self.metrics
    }

    /// Hand an event to the sink's queue (non-blocking)
    ///
    /// A full queue drops the event and counts the drop; the caller keeps
    /// routing.
    pub fn try_send(&self, event: EngineEvent) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => {
                self.metrics.set_queue_len(self.tx.capacity());
                true
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.metrics.inc_dropped_count();
                warn!(sink = %self.name, "queue full, event dropped");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                error!(sink = %self.name, "sink worker closed unexpectedly");
                false
            }
        }
    }

    /// Close the queue and wait for the worker to drain and exit
    #[instrument(name = "sink_handle_shutdown", skip(self))]
    pub async fn shutdown(self) {
        drop(self.tx);
        if let Err(e) = self.worker_handle.await {
            error!(sink = %self.name, error = ?e, "worker task panicked");
        }
        debug!(sink = %self.name, "sink shut down");
    }
}

/// Worker loop: drain the queue into the sink, flush and close on exit
#[instrument(
    name = "sink_worker_loop",
    skip(sink, rx, metrics),
    fields(sink = %name)
)]
async fn sink_worker<S: EventSink>(
    mut sink: S,
    mut rx: mpsc::Receiver<EngineEvent>,
    metrics: Arc<SinkMetrics>,
    name: String,
) {
    debug!(sink = %name, "sink worker started");

    while let Some(event) = rx.recv().await {
        metrics.set_queue_len(rx.len());

        match sink.write(&event).await {
            Ok(()) => metrics.inc_delivered_count(),
            Err(e) => {
                // One bad write never kills the worker.
                metrics.inc_failure_count();
                error!(sink = %name, error = %e, "event delivery failed");
            }
        }
    }

    if let Err(e) = sink.flush().await {
        error!(sink = %name, error = %e, "flush failed on shutdown");
    }
    if let Err(e) = sink.close().await {
        error!(sink = %name, error = %e, "close failed on shutdown");
    }

    debug!(sink = %name, "sink worker stopped");
}
