//! TrackingSession actor implementation.

use std::time::Duration;

use chrono::Utc;
use contracts::{
    DetectorConfig, EngineError, EngineEvent, Milestone, MotionSource, PermissionDecision,
    Provenance, SessionState, StepRecord, TrackerConfig,
};
use daily_store::{CommitOutcome, DailyStateStore, StoreHandle};
use step_engine::StepDetector;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use contracts::MotionCallback;
use std::sync::Arc;

use crate::handle::{Command, SessionHandle};

/// Session-level configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Daily step goal (drives the goal_reached milestone)
    pub daily_goal_steps: u64,

    /// Command queue capacity (samples + commands)
    pub command_queue_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            daily_goal_steps: 10_000,
            command_queue_capacity: 256,
        }
    }
}

impl From<&TrackerConfig> for SessionConfig {
    fn from(config: &TrackerConfig) -> Self {
        Self {
            daily_goal_steps: config.daily_goal_steps,
            command_queue_capacity: config.command_queue_capacity,
        }
    }
}

/// The tracking session actor
///
/// Owns the detector, the daily record and the motion source. All mutation
/// happens on the actor task, one command at a time.
pub struct TrackingSession {
    state: SessionState,
    detector: StepDetector,
    store: DailyStateStore,
    writer: Option<StoreHandle>,
    events: mpsc::Sender<EngineEvent>,
    source: Box<dyn MotionSource>,
    permission_granted: bool,
    rx: mpsc::Receiver<Command>,
    /// Weak route back into the own queue for sensor callbacks; does not
    /// keep the actor alive once all external handles are gone.
    weak_tx: mpsc::WeakSender<Command>,
}

impl TrackingSession {
    /// Spawn the session actor
    ///
    /// `initial_record` is the persisted state loaded at startup; the
    /// rollover check runs against it immediately.
    pub fn spawn(
        config: SessionConfig,
        detector_config: DetectorConfig,
        initial_record: Option<StepRecord>,
        source: Box<dyn MotionSource>,
        writer: Option<StoreHandle>,
        events: mpsc::Sender<EngineEvent>,
    ) -> (SessionHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(config.command_queue_capacity);
        let weak_tx = tx.downgrade();
        let handle = SessionHandle { tx };

        let session = Self {
            state: SessionState::Idle,
            detector: StepDetector::new(detector_config),
            store: DailyStateStore::new(initial_record, config.daily_goal_steps, Utc::now()),
            writer,
            events,
            source,
            permission_granted: false,
            rx,
            weak_tx,
        };

        let join = tokio::spawn(async move { session.run().await });

        (handle, join)
    }

    /// Actor main loop
    ///
    /// Exits on an explicit shutdown or once every external handle is gone.
    #[instrument(name = "session_run", skip(self))]
    async fn run(mut self) {
        info!(source = %self.source.source_id(), "tracking session started");

        while let Some(command) = self.rx.recv().await {
            match command {
                Command::Start { reply } => {
                    let result = self.handle_start();
                    let _ = reply.send(result);
                }
                Command::Stop { reply } => {
                    let result = self.handle_stop();
                    let _ = reply.send(result);
                }
                Command::RequestPermission { reply } => {
                    let _ = reply.send(self.handle_request_permission());
                }
                Command::AddSteps { count, reply } => {
                    let _ = reply.send(self.handle_add_steps(count));
                }
                Command::ResetDaily { reply } => {
                    let _ = reply.send(self.handle_reset_daily());
                }
                Command::SetExternalSteps { total } => self.handle_external_total(total),
                Command::Sample(sample) => self.handle_sample(sample),
                Command::SensorFault { reason } => self.handle_sensor_fault(reason),
                Command::RolloverCheck => self.handle_rollover_check(),
                Command::Snapshot { reply } => {
                    let _ = reply.send((self.state.clone(), self.store.record().clone()));
                }
                Command::Shutdown { reply } => {
                    let _ = reply.send(());
                    break;
                }
            }
        }

        self.source.stop();
        if let Some(writer) = self.writer.take() {
            writer.shutdown().await;
        }
        info!("tracking session stopped");
    }

    fn handle_start(&mut self) -> Result<(), EngineError> {
        match &self.state {
            SessionState::Active => return Ok(()),
            // A previously granted permission survives stop/start cycles.
            SessionState::Stopped if self.permission_granted => {}
            _ => {
                self.state = SessionState::RequestingPermission;
                match self.source.request_permission() {
                    Ok(PermissionDecision::Granted) => {
                        self.permission_granted = true;
                    }
                    Ok(PermissionDecision::Denied) => {
                        self.fail("permission denied");
                        return Err(EngineError::PermissionDenied);
                    }
                    Err(e) => {
                        self.fail(&e.to_string());
                        return Err(e);
                    }
                }
            }
        }

        if let Err(e) = self.source.listen(self.sample_callback()) {
            self.fail(&e.to_string());
            return Err(e);
        }

        self.state = SessionState::Active;
        info!(source = %self.source.source_id(), "tracking active");
        Ok(())
    }

    /// Sample callback routed through the weak sender
    ///
    /// Never blocks; a full queue drops the sample and counts it.
    fn sample_callback(&self) -> MotionCallback {
        let weak_tx = self.weak_tx.clone();
        Arc::new(move |sample| {
            let Some(tx) = weak_tx.upgrade() else {
                return;
            };
            if tx.try_send(Command::Sample(sample)).is_err() {
                metrics::counter!("step_tracker_samples_dropped_total").increment(1);
            }
        })
    }

    fn handle_stop(&mut self) -> Result<(), EngineError> {
        self.source.stop();
        // Transient pipeline state goes, the cumulative record stays.
        self.detector.reset();
        self.state = SessionState::Stopped;
        info!("tracking stopped");
        Ok(())
    }

    fn handle_request_permission(&mut self) -> Result<PermissionDecision, EngineError> {
        let decision = self.source.request_permission()?;
        if decision == PermissionDecision::Granted {
            self.permission_granted = true;
        }
        Ok(decision)
    }

    fn handle_sample(&mut self, sample: contracts::MotionSample) {
        if !self.state.is_active() {
            return;
        }

        if self.detector.process_sample(sample).is_some() {
            let outcome = self.store.add_steps(1, Provenance::Sensor, Utc::now());
            self.finish_commit(outcome);
        }
    }

    fn handle_add_steps(&mut self, count: u64) -> Result<StepRecord, EngineError> {
        if count == 0 {
            return Err(EngineError::invalid_manual_input(
                count,
                "step count must be positive",
            ));
        }

        let outcome = self.store.add_steps(count, Provenance::Manual, Utc::now());
        let record = outcome.record.clone();
        self.finish_commit(outcome);
        Ok(record)
    }

    fn handle_reset_daily(&mut self) -> Result<StepRecord, EngineError> {
        let outcome = self.store.reset_daily(Utc::now());
        let record = outcome.record.clone();
        self.finish_commit(outcome);
        info!("daily metrics reset");
        Ok(record)
    }

    fn handle_external_total(&mut self, total: u64) {
        let outcome = self
            .store
            .set_steps(total, Provenance::ExternalSync, Utc::now());
        debug!(total, "external step total applied");
        self.finish_commit(outcome);
    }

    fn handle_sensor_fault(&mut self, reason: String) {
        warn!(reason = %reason, "fatal sensor error");
        self.source.stop();
        self.detector.reset();
        self.fail(&reason);
    }

    fn handle_rollover_check(&mut self) {
        if self.store.check_rollover(Utc::now()) {
            let record = self.store.record().clone();
            self.persist(record.clone());
            self.emit(EngineEvent::StateChanged { record });
        }
    }

    /// Persist the committed record and emit the resulting events
    fn finish_commit(&mut self, outcome: CommitOutcome) {
        let goal = self.store.daily_goal_steps();
        self.persist(outcome.record.clone());

        self.emit(EngineEvent::StateChanged {
            record: outcome.record.clone(),
        });
        if outcome.coins_earned > 0 {
            self.emit(EngineEvent::Milestone {
                milestone: Milestone::CoinEarned {
                    total_coins: outcome.record.coins,
                    newly_earned: outcome.coins_earned,
                },
            });
        }
        if outcome.goal_reached {
            self.emit(EngineEvent::Milestone {
                milestone: Milestone::GoalReached {
                    steps: outcome.record.steps,
                    goal,
                },
            });
        }
    }

    fn persist(&self, record: StepRecord) {
        if let Some(writer) = &self.writer {
            writer.try_persist(record);
        }
    }

    fn emit(&self, event: EngineEvent) {
        if self.events.try_send(event).is_err() {
            metrics::counter!("step_tracker_events_dropped_total").increment(1);
            warn!("event channel full, event dropped");
        }
    }

    fn fail(&mut self, reason: &str) {
        self.state = SessionState::Errored(reason.to_string());
        self.emit(EngineEvent::Error {
            reason: reason.to_string(),
        });
    }
}

/// Spawn the periodic rollover tick
///
/// Delivered as a command so the timer and the sample path can never race
/// on the record. Holds only a weak route into the session, so the timer
/// exits once the session is gone.
pub fn spawn_rollover_timer(handle: &SessionHandle, interval: Duration) -> JoinHandle<()> {
    let weak_tx = handle.tx.downgrade();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The immediate first tick duplicates the startup check; skip it.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let Some(tx) = weak_tx.upgrade() else {
                break;
            };
            match tx.try_send(Command::RolloverCheck) {
                Ok(()) => {}
                // Queue pressure; the next tick retries.
                Err(mpsc::error::TrySendError::Full(_)) => {}
                Err(mpsc::error::TrySendError::Closed(_)) => break,
            }
        }
    })
}
