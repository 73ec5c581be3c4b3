//! External step-service polling
//!
//! Platform step counters (health services) are treated as just another
//! provenance: a poller reads the absolute daily total at a fixed interval
//! and reports changes through a callback. The session routes those totals
//! through the same commit path as everything else.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use contracts::EngineError;
use tracing::{debug, warn};

/// Absolute-total callback type
pub type StepTotalCallback = Arc<dyn Fn(u64) + Send + Sync>;

/// A platform service exposing today's absolute step total.
pub trait StepProvider: Send + Sync {
    /// Stable identifier (used for logging/metrics)
    fn provider_id(&self) -> &str;

    /// Today's absolute step total, `None` when the service has no data yet
    ///
    /// # Errors
    /// Returns an error when the service is unreachable; the poller logs
    /// and keeps polling.
    fn daily_step_total(&self) -> Result<Option<u64>, EngineError>;
}

/// Periodic poller over a `StepProvider`
///
/// Only reports totals that changed since the previous poll.
pub struct ExternalSyncPoller {
    provider: Arc<dyn StepProvider>,
    interval: Duration,
    running: Arc<AtomicBool>,
}

impl ExternalSyncPoller {
    /// Create a poller with the given cadence
    pub fn new(provider: Arc<dyn StepProvider>, interval: Duration) -> Self {
        Self {
            provider,
            interval,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start polling, reporting changed totals through the callback
    pub fn start(&self, callback: StepTotalCallback) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!(provider = %self.provider.provider_id(), "poller already running");
            return;
        }

        let provider = self.provider.clone();
        let running = self.running.clone();
        let interval = self.interval;

        debug!(
            provider = %provider.provider_id(),
            interval_ms = interval.as_millis() as u64,
            "external sync poller started"
        );

        tokio::spawn(async move {
            let mut last_reported: Option<u64> = None;

            while running.load(Ordering::Relaxed) {
                match provider.daily_step_total() {
                    Ok(Some(total)) => {
                        if last_reported != Some(total) {
                            last_reported = Some(total);
                            metrics::counter!("step_tracker_external_sync_total").increment(1);
                            debug!(
                                provider = %provider.provider_id(),
                                total,
                                "external total changed"
                            );
                            callback(total);
                        }
                    }
                    Ok(None) => {
                        // Service reachable but empty; nothing to report.
                    }
                    Err(e) => {
                        metrics::counter!("step_tracker_external_sync_errors_total").increment(1);
                        warn!(
                            provider = %provider.provider_id(),
                            error = %e,
                            "external step service unavailable, will retry"
                        );
                    }
                }

                tokio::time::sleep(interval).await;
            }

            debug!(provider = %provider.provider_id(), "external sync poller stopped");
        });
    }

    /// Stop polling
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Check if the poller is running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }
}

/// In-memory provider for tests and demos
pub struct MockStepProvider {
    id: String,
    total: AtomicU64,
    available: AtomicBool,
}

impl MockStepProvider {
    /// Create a provider starting at the given total
    pub fn new(id: impl Into<String>, total: u64) -> Self {
        Self {
            id: id.into(),
            total: AtomicU64::new(total),
            available: AtomicBool::new(true),
        }
    }

    /// Update the reported total
    pub fn set_total(&self, total: u64) {
        self.total.store(total, Ordering::Relaxed);
    }

    /// Toggle service availability
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::Relaxed);
    }
}

impl StepProvider for MockStepProvider {
    fn provider_id(&self) -> &str {
        &self.id
    }

    fn daily_step_total(&self) -> Result<Option<u64>, EngineError> {
        if !self.available.load(Ordering::Relaxed) {
            return Err(EngineError::sensor_unavailable("mock provider offline"));
        }
        Ok(Some(self.total.load(Ordering::Relaxed)))
    }
}
