//! Step pattern validation.
//!
//! Applies amplitude, timing, cadence and motion-consistency constraints to
//! a confirmed peak, in order, short-circuiting on the first failure. A
//! rejected candidate leaves no observable state behind.

use std::collections::VecDeque;
use std::fmt;

use contracts::{DetectorConfig, PeakCandidate};

use crate::buffer::BufferedSample;

/// Why a peak was not accepted as a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Magnitude outside the walking amplitude band
    AmplitudeOutOfBand,
    /// Too close to the previously accepted step
    TooSoon,
    /// Mean step frequency outside the human walking band
    CadenceOutOfBand,
    /// Window magnitude variance above the noise ceiling
    InconsistentMotion,
    /// Window timestamps implausibly dense (sensor glitch)
    GlitchTimestamps,
}

impl RejectReason {
    /// Stable label for metrics/log fields
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AmplitudeOutOfBand => "amplitude_out_of_band",
            Self::TooSoon => "too_soon",
            Self::CadenceOutOfBand => "cadence_out_of_band",
            Self::InconsistentMotion => "inconsistent_motion",
            Self::GlitchTimestamps => "glitch_timestamps",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stateful validator for confirmed peaks
///
/// Tracks the last accepted step time and a bounded history of accepted
/// step timestamps for cadence analysis.
pub struct StepPatternValidator {
    config: DetectorConfig,
    last_accepted_ms: Option<u64>,
    step_times: VecDeque<u64>,
}

impl StepPatternValidator {
    /// Create a validator for the given configuration
    pub fn new(config: DetectorConfig) -> Self {
        let history = config.step_history;
        Self {
            config,
            last_accepted_ms: None,
            step_times: VecDeque::with_capacity(history),
        }
    }

    /// Validate a confirmed peak against the full check sequence
    ///
    /// On success the internal step history is updated. On failure nothing
    /// changes.
    pub fn validate(
        &mut self,
        candidate: &PeakCandidate,
        window: &[BufferedSample],
    ) -> Result<(), RejectReason> {
        let config = &self.config;

        // 1. Amplitude band: too weak is not walking, too strong is impact.
        if candidate.magnitude < config.amplitude_min || candidate.magnitude > config.amplitude_max
        {
            return Err(RejectReason::AmplitudeOutOfBand);
        }

        // 2. Minimum inter-step interval rejects mechanical double-triggers.
        let mut new_bout = self.last_accepted_ms.is_none();
        if let Some(last) = self.last_accepted_ms {
            let gap = candidate.timestamp_ms.saturating_sub(last);
            if gap < config.min_step_interval_ms {
                return Err(RejectReason::TooSoon);
            }
            // 3. A long silence means walking stopped; this peak starts a
            // fresh bout and stale cadence must not link across it.
            if config.is_strict() && gap > config.max_step_interval_ms {
                new_bout = true;
            }
        }

        // 4. Cadence band over the recent accepted steps plus the candidate.
        if config.is_strict() && !new_bout {
            if let Some(hz) = self.projected_cadence_hz(candidate.timestamp_ms) {
                if hz < config.cadence_min_hz || hz > config.cadence_max_hz {
                    return Err(RejectReason::CadenceOutOfBand);
                }
            }
        }

        // 5. Motion consistency over the detection window.
        if config.is_strict() {
            let magnitude_variance = variance(window.iter().map(|entry| entry.magnitude));
            if magnitude_variance > config.magnitude_variance_max {
                return Err(RejectReason::InconsistentMotion);
            }

            let timestamp_variance =
                variance(window.iter().map(|entry| entry.timestamp_ms() as f64));
            if timestamp_variance < config.timestamp_variance_min {
                return Err(RejectReason::GlitchTimestamps);
            }
        }

        if new_bout {
            self.step_times.clear();
        }
        self.accept(candidate.timestamp_ms);
        Ok(())
    }

    /// Timestamp of the last accepted step, if any
    pub fn last_accepted_ms(&self) -> Option<u64> {
        self.last_accepted_ms
    }

    /// Number of step timestamps retained for cadence analysis
    pub fn step_history_len(&self) -> usize {
        self.step_times.len()
    }

    /// Forget all timing state (new session / stop)
    pub fn clear(&mut self) {
        self.last_accepted_ms = None;
        self.step_times.clear();
    }

    /// Mean cadence over the retained history extended by the candidate.
    ///
    /// Needs at least two intervals to judge; returns `None` below that.
    fn projected_cadence_hz(&self, candidate_ms: u64) -> Option<f64> {
        if self.step_times.len() < 2 {
            return None;
        }

        let mut prev: Option<u64> = None;
        let mut total_ms = 0u64;
        let mut intervals = 0u32;
        for &ts in self.step_times.iter().chain(std::iter::once(&candidate_ms)) {
            if let Some(p) = prev {
                total_ms += ts.saturating_sub(p);
                intervals += 1;
            }
            prev = Some(ts);
        }

        if intervals == 0 || total_ms == 0 {
            return None;
        }
        let mean_interval_ms = total_ms as f64 / intervals as f64;
        Some(1000.0 / mean_interval_ms)
    }

    fn accept(&mut self, timestamp_ms: u64) {
        self.last_accepted_ms = Some(timestamp_ms);
        self.step_times.push_back(timestamp_ms);
        while self.step_times.len() > self.config.step_history {
            self.step_times.pop_front();
        }
    }
}

/// Population variance
fn variance(values: impl Iterator<Item = f64>) -> f64 {
    let collected: Vec<f64> = values.collect();
    if collected.is_empty() {
        return 0.0;
    }
    let mean = collected.iter().sum::<f64>() / collected.len() as f64;
    collected
        .iter()
        .map(|v| (v - mean) * (v - mean))
        .sum::<f64>()
        / collected.len() as f64
}
