//! Detector configuration contracts that can be shared across crates.

use serde::{Deserialize, Serialize};

/// Which validation profile the detector runs.
///
/// `Simple` carries the thresholds of the original sensitivity-tuned
/// detector; `Strict` narrows the amplitude band and enables cadence and
/// consistency analysis to reject shaking and jostling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionProfile {
    #[default]
    Simple,
    Strict,
}

/// Step detector configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Validation profile
    pub profile: DetectionProfile,

    /// Sample ring capacity (oldest entries evicted FIFO)
    pub buffer_capacity: usize,

    /// Peak detection window size; must be odd
    pub peak_window: usize,

    /// Bounded peak history capacity (diagnostics)
    pub peak_history: usize,

    /// Minimum magnitude for a window midpoint to qualify as a peak
    pub peak_min: f64,

    /// Lower amplitude bound for a valid step (m/s²)
    pub amplitude_min: f64,

    /// Upper amplitude bound for a valid step (m/s²)
    pub amplitude_max: f64,

    /// Minimum interval between accepted steps (ms)
    pub min_step_interval_ms: u64,

    /// Gap above which a new walking bout starts (ms, strict profile)
    pub max_step_interval_ms: u64,

    /// Lower walking-cadence bound (Hz, strict profile)
    pub cadence_min_hz: f64,

    /// Upper walking-cadence bound (Hz, strict profile)
    pub cadence_max_hz: f64,

    /// Accepted step timestamps retained for cadence analysis
    pub step_history: usize,

    /// Magnitude variance ceiling over the detection window (strict profile)
    pub magnitude_variance_max: f64,

    /// Timestamp variance floor over the detection window (ms², strict profile)
    pub timestamp_variance_min: f64,
}

impl DetectorConfig {
    /// Simple profile: the original detector's thresholds.
    pub fn simple() -> Self {
        Self {
            profile: DetectionProfile::Simple,
            buffer_capacity: 16,
            peak_window: 5,
            peak_history: 10,
            peak_min: 8.0,
            amplitude_min: 8.0,
            amplitude_max: 20.0,
            min_step_interval_ms: 300,
            max_step_interval_ms: 2000,
            cadence_min_hz: 0.5,
            cadence_max_hz: 3.0,
            step_history: 10,
            magnitude_variance_max: 40.0,
            timestamp_variance_min: 4.0,
        }
    }

    /// Strict profile: narrower amplitude band plus cadence and
    /// consistency checks.
    pub fn strict() -> Self {
        Self {
            profile: DetectionProfile::Strict,
            peak_min: 10.5,
            amplitude_min: 10.5,
            amplitude_max: 16.0,
            ..Self::simple()
        }
    }

    /// Profile defaults by name
    pub fn for_profile(profile: DetectionProfile) -> Self {
        match profile {
            DetectionProfile::Simple => Self::simple(),
            DetectionProfile::Strict => Self::strict(),
        }
    }

    /// Whether the strict-only checks are enabled
    pub fn is_strict(&self) -> bool {
        self.profile == DetectionProfile::Strict
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self::simple()
    }
}
