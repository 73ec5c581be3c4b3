//! SessionHandle - command surface of the tracking session.
//!
//! Cloneable; every caller talks to the same actor. Commands carrying a
//! reply are awaited, sample delivery is non-blocking so a sensor callback
//! can never stall on the engine.

use std::sync::Arc;

use contracts::{EngineError, MotionSample, PermissionDecision, SessionState, StepRecord};
use tokio::sync::{mpsc, oneshot};
use tracing::warn;

/// Commands processed by the session actor, in arrival order
pub(crate) enum Command {
    Start {
        reply: oneshot::Sender<Result<(), EngineError>>,
    },
    Stop {
        reply: oneshot::Sender<Result<(), EngineError>>,
    },
    RequestPermission {
        reply: oneshot::Sender<Result<PermissionDecision, EngineError>>,
    },
    AddSteps {
        count: u64,
        reply: oneshot::Sender<Result<StepRecord, EngineError>>,
    },
    ResetDaily {
        reply: oneshot::Sender<Result<StepRecord, EngineError>>,
    },
    SetExternalSteps {
        total: u64,
    },
    Sample(MotionSample),
    SensorFault {
        reason: String,
    },
    RolloverCheck,
    Snapshot {
        reply: oneshot::Sender<(SessionState, StepRecord)>,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

/// Handle to a running tracking session
#[derive(Clone)]
pub struct SessionHandle {
    pub(crate) tx: mpsc::Sender<Command>,
}

impl SessionHandle {
    /// Start tracking (requests permission on first use)
    pub async fn start(&self) -> Result<(), EngineError> {
        self.request(|reply| Command::Start { reply }).await?
    }

    /// Stop tracking
    ///
    /// When this returns, no further step commits occur.
    pub async fn stop(&self) -> Result<(), EngineError> {
        self.request(|reply| Command::Stop { reply }).await?
    }

    /// Run the platform permission prompt without starting
    pub async fn request_permission(&self) -> Result<PermissionDecision, EngineError> {
        self.request(|reply| Command::RequestPermission { reply })
            .await?
    }

    /// Manually add steps (provenance `manual`)
    ///
    /// # Errors
    /// `InvalidManualInput` for a zero count.
    pub async fn add_steps(&self, count: u64) -> Result<StepRecord, EngineError> {
        self.request(|reply| Command::AddSteps { count, reply })
            .await?
    }

    /// Reset today's metrics (provenance `manual`)
    pub async fn reset_daily(&self) -> Result<StepRecord, EngineError> {
        self.request(|reply| Command::ResetDaily { reply }).await?
    }

    /// Current state and record snapshot
    ///
    /// Processed in queue order, so awaiting a snapshot also proves every
    /// previously delivered sample has been processed.
    pub async fn snapshot(&self) -> Result<(SessionState, StepRecord), EngineError> {
        self.request(|reply| Command::Snapshot { reply }).await
    }

    /// Stop the actor, flushing pending persistence
    pub async fn shutdown(&self) -> Result<(), EngineError> {
        self.request(|reply| Command::Shutdown { reply }).await
    }

    /// Deliver a sample (non-blocking)
    ///
    /// Returns false when the queue is full or the session is gone; the
    /// sample is dropped and counted, never awaited.
    pub fn push_sample(&self, sample: MotionSample) -> bool {
        match self.tx.try_send(Command::Sample(sample)) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                metrics::counter!("step_tracker_samples_dropped_total").increment(1);
                warn!("session queue full, sample dropped");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        }
    }

    /// Deliver a sample, awaiting queue capacity (tests, replay drains)
    pub async fn feed_sample(&self, sample: MotionSample) -> Result<(), EngineError> {
        self.tx
            .send(Command::Sample(sample))
            .await
            .map_err(|_| EngineError::SessionClosed)
    }

    /// Report an absolute external step total (non-blocking)
    pub fn sync_external_total(&self, total: u64) -> bool {
        self.tx
            .try_send(Command::SetExternalSteps { total })
            .is_ok()
    }

    /// Report a fatal sensor error (non-blocking)
    pub fn report_sensor_fault(&self, reason: impl Into<String>) -> bool {
        self.tx
            .try_send(Command::SensorFault {
                reason: reason.into(),
            })
            .is_ok()
    }

    /// Trigger a day-rollover check (non-blocking)
    pub fn trigger_rollover_check(&self) -> bool {
        self.tx.try_send(Command::RolloverCheck).is_ok()
    }

    /// Callback adapter for an external step-total poller
    pub fn external_sync_callback(&self) -> Arc<dyn Fn(u64) + Send + Sync> {
        let handle = self.clone();
        Arc::new(move |total| {
            handle.sync_external_total(total);
        })
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, EngineError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(make(reply_tx))
            .await
            .map_err(|_| EngineError::SessionClosed)?;
        reply_rx.await.map_err(|_| EngineError::SessionClosed)
    }
}
