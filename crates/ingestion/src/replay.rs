//! Recorded sample replay
//!
//! Replays a JSON-lines capture of `MotionSample`s, pacing deliveries by
//! the recorded timestamp deltas (optionally scaled).

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use contracts::{
    EngineError, MotionCallback, MotionSample, MotionSource, PermissionDecision,
};
use tracing::{debug, warn};

use crate::config::SourceMetrics;

/// Replay configuration
#[derive(Debug, Clone)]
pub struct ReplayConfig {
    /// Source ID
    pub source_id: String,

    /// Path to the JSON-lines capture
    pub path: PathBuf,

    /// Speed multiplier (1.0 = recorded pace, 0 = as fast as possible)
    pub speed: f64,
}

/// Motion source replaying a recorded capture
pub struct ReplaySource {
    config: ReplayConfig,
    metrics: Arc<SourceMetrics>,
    running: Arc<AtomicBool>,
}

impl ReplaySource {
    /// Create a replay source for the given capture
    pub fn new(config: ReplayConfig) -> Self {
        Self {
            config,
            metrics: Arc::new(SourceMetrics::new()),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Shared source metrics
    pub fn metrics(&self) -> Arc<SourceMetrics> {
        self.metrics.clone()
    }

    fn load_samples(&self) -> Result<Vec<MotionSample>, EngineError> {
        let content = std::fs::read_to_string(&self.config.path).map_err(|e| {
            EngineError::sensor_unavailable(format!(
                "replay capture {} unreadable: {e}",
                self.config.path.display()
            ))
        })?;

        let mut samples = Vec::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<MotionSample>(line) {
                Ok(sample) => samples.push(sample),
                Err(e) => {
                    self.metrics.record_invalid();
                    warn!(path = %self.config.path.display(), error = %e, "skipping bad replay line");
                }
            }
        }

        if samples.is_empty() {
            return Err(EngineError::sensor_unavailable(format!(
                "replay capture {} holds no samples",
                self.config.path.display()
            )));
        }
        Ok(samples)
    }
}

impl MotionSource for ReplaySource {
    fn source_id(&self) -> &str {
        &self.config.source_id
    }

    fn request_permission(&self) -> Result<PermissionDecision, EngineError> {
        // Replays carry no platform prompt.
        Ok(PermissionDecision::Granted)
    }

    fn listen(&self, callback: MotionCallback) -> Result<(), EngineError> {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!(source_id = %self.config.source_id, "replay already listening");
            return Ok(());
        }

        let samples = match self.load_samples() {
            Ok(samples) => samples,
            Err(e) => {
                self.running.store(false, Ordering::SeqCst);
                return Err(e);
            }
        };

        let running = self.running.clone();
        let metrics = self.metrics.clone();
        let speed = self.config.speed;
        let source_id = self.config.source_id.clone();

        debug!(
            source_id = %source_id,
            samples = samples.len(),
            speed,
            "replay started"
        );

        tokio::spawn(async move {
            let mut previous_ts: Option<u64> = None;

            for sample in samples {
                if !running.load(Ordering::Relaxed) {
                    break;
                }

                if speed > 0.0 {
                    if let Some(prev) = previous_ts {
                        let delta_ms = sample.timestamp_ms.saturating_sub(prev);
                        if delta_ms > 0 {
                            let paced = (delta_ms as f64 / speed).round() as u64;
                            tokio::time::sleep(Duration::from_millis(paced)).await;
                        }
                    }
                }
                previous_ts = Some(sample.timestamp_ms);

                metrics.record_received();
                callback(sample);
            }

            running.store(false, Ordering::SeqCst);
            debug!(source_id = %source_id, "replay finished");
        });

        Ok(())
    }

    fn stop(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            debug!(source_id = %self.config.source_id, "stopping replay");
        }
    }

    fn is_listening(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }
}
