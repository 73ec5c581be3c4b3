//! Pipeline orchestrator - coordinates all components.
//!
//! Wires store -> writer -> notifier -> session -> motion source, runs the
//! event loop until a bound is hit or the caller cancels, then shuts the
//! stages down in reverse order.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use contracts::{EngineEvent, MotionSource, TrackerBlueprint};
use daily_store::{JsonFileStore, RecordStore, StoreHandle};
use ingestion::{MockWalker, ReplayConfig, ReplaySource, WalkerConfig};
use observability::{record_commit_metrics, record_milestone, record_session_error};
use session::{spawn_rollover_timer, SessionConfig, TrackingSession};
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::PipelineStats;

/// Which motion source feeds the session
#[derive(Debug, Clone)]
pub enum PipelineSource {
    /// Synthetic walking generator
    Mock { cadence_hz: f64 },

    /// Recorded JSON-lines sample capture
    Replay { path: PathBuf, speed: f64 },
}

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// The tracker blueprint configuration
    pub blueprint: TrackerBlueprint,

    /// Stop after this many committed daily steps (None = unlimited)
    pub max_steps: Option<u64>,

    /// Run duration (None = until interrupted)
    pub duration: Option<Duration>,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,

    /// Motion source selection
    pub source: PipelineSource,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run the pipeline to completion
    pub async fn run(self) -> Result<PipelineStats> {
        let start_time = Instant::now();
        let blueprint = &self.config.blueprint;

        // Initialize Metrics (optional)
        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        // Persistence: load yesterday's leftovers, then hand the store to
        // the single-writer worker.
        info!(path = %blueprint.store.base_path, "Opening record store");
        let store = JsonFileStore::new("json_store", &blueprint.store.base_path)
            .context("Failed to open record store")?;

        let loaded = match store.load(&blueprint.store.record_key).await {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "Persisted record unreadable, starting fresh");
                None
            }
        };
        if let Some(ref record) = loaded {
            info!(
                date = %record.date,
                steps = record.steps,
                coins = record.coins,
                "Loaded persisted record"
            );
        }

        let writer = StoreHandle::spawn(
            store,
            blueprint.store.record_key.clone(),
            blueprint.store.writer_queue_capacity,
        );

        // Notifier: events flow session -> event loop -> router -> sinks.
        if blueprint.sinks.is_empty() {
            warn!("No sinks configured - milestone events will be dropped");
        }

        let (events_tx, mut events_rx) =
            mpsc::channel::<EngineEvent>(blueprint.tracker.event_queue_capacity);
        let (router_tx, router_rx) =
            mpsc::channel::<EngineEvent>(blueprint.tracker.event_queue_capacity);

        let router = notifier::create_router(blueprint.sinks.clone(), router_rx)
            .context("Failed to create event router")?;
        let active_sinks = blueprint.sinks.len();
        let router_handle = router.spawn();

        info!(active_sinks, "Event router started");

        // Motion source
        let source: Box<dyn MotionSource> = match &self.config.source {
            PipelineSource::Mock { cadence_hz } => {
                info!(cadence_hz, "Using mock walking source");
                Box::new(MockWalker::new(WalkerConfig {
                    cadence_hz: *cadence_hz,
                    ..Default::default()
                }))
            }
            PipelineSource::Replay { path, speed } => {
                info!(path = %path.display(), speed, "Using replay source");
                Box::new(ReplaySource::new(ReplayConfig {
                    source_id: "replay".to_string(),
                    path: path.clone(),
                    speed: *speed,
                }))
            }
        };

        // Session actor
        let (handle, session_join) = TrackingSession::spawn(
            SessionConfig::from(&blueprint.tracker),
            blueprint.to_detector_config(),
            loaded,
            source,
            Some(writer),
            events_tx,
        );
        let rollover_handle = spawn_rollover_timer(
            &handle,
            Duration::from_secs(blueprint.tracker.rollover_check_interval_secs),
        );

        handle
            .start()
            .await
            .context("Failed to start tracking session")?;

        let (_, initial_record) = handle
            .snapshot()
            .await
            .context("Session died before first snapshot")?;

        let mut stats = PipelineStats::new(active_sinks, initial_record.steps);

        let max_steps = self.config.max_steps;
        let deadline = self
            .config
            .duration
            .map(|d| tokio::time::Instant::now() + d);

        info!(max_steps = ?max_steps, duration = ?self.config.duration, "Pipeline running");

        // Event loop: observe, record metrics, forward to the router.
        loop {
            let received = match deadline {
                Some(at) => match tokio::time::timeout_at(at, events_rx.recv()).await {
                    Ok(event) => event,
                    Err(_) => {
                        info!("Run duration elapsed");
                        break;
                    }
                },
                None => events_rx.recv().await,
            };

            let Some(event) = received else {
                warn!("Session event channel closed");
                break;
            };

            match &event {
                EngineEvent::StateChanged { record } => {
                    record_commit_metrics(record);
                }
                EngineEvent::Milestone { milestone } => {
                    record_milestone(milestone);
                    info!(kind = milestone.kind(), "Milestone crossed");
                }
                EngineEvent::Error { reason } => {
                    record_session_error();
                    warn!(reason = %reason, "Session error surfaced");
                }
            }
            stats.observe_event(&event);

            let reached_limit = matches!(
                (&event, max_steps),
                (EngineEvent::StateChanged { record }, Some(max)) if record.steps >= max
            );

            if router_tx.send(event).await.is_err() {
                warn!("Event router channel closed");
                break;
            }

            if reached_limit {
                info!(steps = ?max_steps, "Reached max steps limit");
                break;
            }
        }

        // Shutdown: stop commits, snapshot the final record, flush stages.
        info!("Shutting down pipeline...");
        handle.stop().await.context("Failed to stop session")?;

        let (_, final_record) = handle
            .snapshot()
            .await
            .context("Session died during shutdown")?;
        stats.final_record = Some(final_record);

        handle.shutdown().await.context("Session shutdown failed")?;
        let _ = session_join.await;
        rollover_handle.abort();

        // Closing the router input drains and closes the sinks.
        drop(router_tx);
        let _ = tokio::time::timeout(Duration::from_secs(5), router_handle).await;

        stats.duration = start_time.elapsed();

        info!(
            duration_secs = stats.duration.as_secs_f64(),
            steps = stats.steps_committed(),
            "Pipeline shutdown complete"
        );

        Ok(stats)
    }
}
