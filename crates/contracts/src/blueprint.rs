//! TrackerBlueprint - Config Loader output
//!
//! Describes the full engine configuration: tracker settings, detector
//! profile and overrides, persistence, event routing.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

use crate::{DetectionProfile, DetectorConfig};

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Full engine configuration blueprint
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TrackerBlueprint {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Session-level settings
    #[validate(nested)]
    pub tracker: TrackerConfig,

    /// Detector profile and overrides
    #[serde(default)]
    pub detector: DetectorSettings,

    /// Persistence settings
    #[validate(nested)]
    pub store: StoreConfig,

    /// Event routing configuration
    #[serde(default)]
    pub sinks: Vec<SinkConfig>,
}

/// Session-level settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TrackerConfig {
    /// Daily step goal (drives the goal_reached milestone)
    #[serde(default = "default_daily_goal")]
    #[validate(range(min = 1))]
    pub daily_goal_steps: u64,

    /// Session command queue capacity (samples + commands)
    #[serde(default = "default_command_queue")]
    #[validate(range(min = 1))]
    pub command_queue_capacity: usize,

    /// Event channel capacity toward the notifier
    #[serde(default = "default_event_queue")]
    #[validate(range(min = 1))]
    pub event_queue_capacity: usize,

    /// Interval between periodic day-rollover checks (seconds)
    #[serde(default = "default_rollover_interval")]
    #[validate(range(min = 1))]
    pub rollover_check_interval_secs: u64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            daily_goal_steps: default_daily_goal(),
            command_queue_capacity: default_command_queue(),
            event_queue_capacity: default_event_queue(),
            rollover_check_interval_secs: default_rollover_interval(),
        }
    }
}

fn default_daily_goal() -> u64 {
    10_000
}

fn default_command_queue() -> usize {
    256
}

fn default_event_queue() -> usize {
    128
}

fn default_rollover_interval() -> u64 {
    3600
}

/// Detector profile selection plus optional threshold overrides
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectorSettings {
    /// Named profile providing the threshold baseline
    #[serde(default)]
    pub profile: DetectionProfile,

    /// Field-level overrides applied on top of the profile
    #[serde(default)]
    pub overrides: DetectorOverrides,
}

/// Optional overrides for individual detector thresholds
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectorOverrides {
    #[serde(default)]
    pub buffer_capacity: Option<usize>,

    #[serde(default)]
    pub peak_window: Option<usize>,

    #[serde(default)]
    pub peak_min: Option<f64>,

    #[serde(default)]
    pub amplitude_min: Option<f64>,

    #[serde(default)]
    pub amplitude_max: Option<f64>,

    #[serde(default)]
    pub min_step_interval_ms: Option<u64>,

    #[serde(default)]
    pub max_step_interval_ms: Option<u64>,

    #[serde(default)]
    pub cadence_min_hz: Option<f64>,

    #[serde(default)]
    pub cadence_max_hz: Option<f64>,

    #[serde(default)]
    pub magnitude_variance_max: Option<f64>,

    #[serde(default)]
    pub timestamp_variance_min: Option<f64>,
}

/// Persistence settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StoreConfig {
    /// Directory holding the persisted record documents
    #[validate(length(min = 1))]
    pub base_path: String,

    /// Fixed daily-state identifier the record is keyed by
    #[serde(default = "default_record_key")]
    #[validate(length(min = 1))]
    pub record_key: String,

    /// Writer queue capacity (pending record snapshots)
    #[serde(default = "default_writer_queue")]
    #[validate(range(min = 1))]
    pub writer_queue_capacity: usize,
}

fn default_record_key() -> String {
    "daily_state".to_string()
}

fn default_writer_queue() -> usize {
    8
}

/// Sink output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Sink name
    pub name: String,

    /// Sink type
    pub sink_type: SinkType,

    /// Queue capacity
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Type-specific parameters
    #[serde(default)]
    pub params: HashMap<String, String>,
}

fn default_queue_capacity() -> usize {
    100
}

/// Sink type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkType {
    /// Structured log output (the toast/alert analog)
    Log,
    /// JSON-lines event journal on disk
    File,
}

impl TrackerBlueprint {
    /// Build a DetectorConfig from the selected profile and overrides
    pub fn to_detector_config(&self) -> DetectorConfig {
        let mut config = DetectorConfig::for_profile(self.detector.profile);
        let overrides = &self.detector.overrides;

        if let Some(capacity) = overrides.buffer_capacity {
            config.buffer_capacity = capacity;
        }
        if let Some(window) = overrides.peak_window {
            config.peak_window = window;
        }
        if let Some(peak_min) = overrides.peak_min {
            config.peak_min = peak_min;
        }
        if let Some(min) = overrides.amplitude_min {
            config.amplitude_min = min;
        }
        if let Some(max) = overrides.amplitude_max {
            config.amplitude_max = max;
        }
        if let Some(interval) = overrides.min_step_interval_ms {
            config.min_step_interval_ms = interval;
        }
        if let Some(interval) = overrides.max_step_interval_ms {
            config.max_step_interval_ms = interval;
        }
        if let Some(hz) = overrides.cadence_min_hz {
            config.cadence_min_hz = hz;
        }
        if let Some(hz) = overrides.cadence_max_hz {
            config.cadence_max_hz = hz;
        }
        if let Some(ceiling) = overrides.magnitude_variance_max {
            config.magnitude_variance_max = ceiling;
        }
        if let Some(floor) = overrides.timestamp_variance_min {
            config.timestamp_variance_min = floor;
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_blueprint() -> TrackerBlueprint {
        TrackerBlueprint {
            version: ConfigVersion::V1,
            tracker: TrackerConfig::default(),
            detector: DetectorSettings::default(),
            store: StoreConfig {
                base_path: "state".into(),
                record_key: default_record_key(),
                writer_queue_capacity: default_writer_queue(),
            },
            sinks: vec![SinkConfig {
                name: "log".into(),
                sink_type: SinkType::Log,
                queue_capacity: 100,
                params: HashMap::new(),
            }],
        }
    }

    #[test]
    fn detector_config_profile_defaults() {
        let blueprint = sample_blueprint();
        let config = blueprint.to_detector_config();
        assert_eq!(config, DetectorConfig::simple());
    }

    #[test]
    fn detector_config_overrides() {
        let mut blueprint = sample_blueprint();
        blueprint.detector.profile = DetectionProfile::Strict;
        blueprint.detector.overrides.amplitude_max = Some(18.0);
        blueprint.detector.overrides.min_step_interval_ms = Some(350);

        let config = blueprint.to_detector_config();
        assert_eq!(config.amplitude_min, 10.5);
        assert_eq!(config.amplitude_max, 18.0);
        assert_eq!(config.min_step_interval_ms, 350);
    }

    #[test]
    fn tracker_config_defaults() {
        let config = TrackerConfig::default();
        assert_eq!(config.daily_goal_steps, 10_000);
        assert_eq!(config.rollover_check_interval_secs, 3600);
    }
}
