//! Mock walking source
//!
//! Generates a synthetic gait signal for tests, demos and sensorless
//! environments: a sinusoidal magnitude swing around gravity whose crests
//! land inside the walking amplitude band at the configured cadence.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use contracts::{
    EngineError, MotionCallback, MotionSample, MotionSource, PermissionDecision,
};
use tracing::{debug, trace, warn};

use crate::config::SourceMetrics;

/// Mock walker configuration
#[derive(Debug, Clone)]
pub struct WalkerConfig {
    /// Source ID
    pub source_id: String,

    /// Sample delivery rate (Hz)
    pub sample_rate_hz: f64,

    /// Walking cadence (steps per second)
    pub cadence_hz: f64,

    /// Resting magnitude, roughly gravity (m/s²)
    pub base_magnitude: f64,

    /// Crest height above the resting magnitude (m/s²)
    pub swing_amplitude: f64,

    /// Whether the permission prompt is granted
    pub grant_permission: bool,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            source_id: "mock_walker".to_string(),
            sample_rate_hz: 50.0,
            cadence_hz: 2.0,
            base_magnitude: 9.81,
            swing_amplitude: 3.0,
            grant_permission: true,
        }
    }
}

/// Synthetic walking source
///
/// Spawns a generator task on `listen` and delivers samples through the
/// callback at the configured rate until stopped.
pub struct MockWalker {
    config: WalkerConfig,
    metrics: Arc<SourceMetrics>,
    running: Arc<AtomicBool>,
}

impl MockWalker {
    /// Create a walker with the given configuration
    pub fn new(config: WalkerConfig) -> Self {
        Self {
            config,
            metrics: Arc::new(SourceMetrics::new()),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Create a walker with default gait parameters
    pub fn with_cadence(source_id: &str, cadence_hz: f64) -> Self {
        Self::new(WalkerConfig {
            source_id: source_id.to_string(),
            cadence_hz,
            ..Default::default()
        })
    }

    /// Shared source metrics
    pub fn metrics(&self) -> Arc<SourceMetrics> {
        self.metrics.clone()
    }
}

impl MotionSource for MockWalker {
    fn source_id(&self) -> &str {
        &self.config.source_id
    }

    fn request_permission(&self) -> Result<PermissionDecision, EngineError> {
        if self.config.grant_permission {
            Ok(PermissionDecision::Granted)
        } else {
            Ok(PermissionDecision::Denied)
        }
    }

    fn listen(&self, callback: MotionCallback) -> Result<(), EngineError> {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!(source_id = %self.config.source_id, "walker already listening");
            return Ok(());
        }

        let config = self.config.clone();
        let running = self.running.clone();
        let metrics = self.metrics.clone();

        let interval_ms = (1000.0 / config.sample_rate_hz).round().max(1.0) as u64;
        let start_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| EngineError::sensor_unavailable(format!("clock error: {e}")))?
            .as_millis() as u64;

        debug!(
            source_id = %config.source_id,
            sample_rate_hz = config.sample_rate_hz,
            cadence_hz = config.cadence_hz,
            "mock walker started"
        );

        tokio::spawn(async move {
            let mut tick: u64 = 0;

            while running.load(Ordering::Relaxed) {
                let timestamp_ms = start_ms + tick * interval_ms;
                let elapsed_s = (tick * interval_ms) as f64 / 1000.0;

                // Gait model: vertical swing around gravity, one crest per step.
                let phase = std::f64::consts::TAU * config.cadence_hz * elapsed_s;
                let z = config.base_magnitude + config.swing_amplitude * phase.sin();
                let sample = MotionSample::new(0.2, 0.1, z, timestamp_ms);

                metrics.record_received();
                callback(sample);

                trace!(source_id = %config.source_id, timestamp_ms, z, "sample delivered");

                tick += 1;
                tokio::time::sleep(Duration::from_millis(interval_ms)).await;
            }

            debug!(source_id = %config.source_id, "mock walker stopped");
        });

        Ok(())
    }

    fn stop(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            debug!(source_id = %self.config.source_id, "stopping mock walker");
        }
    }

    fn is_listening(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }
}
