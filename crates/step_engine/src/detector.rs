//! Main step detection pipeline.
//!
//! Composes the sample ring, peak detector and pattern validator into a
//! push-based pipeline: one sample in, at most one validated step out.
//! Per-sample work is O(window size) and never blocks.

use contracts::{DetectorConfig, MotionSample, PeakCandidate, StepEvent};
use tracing::{instrument, trace};

use crate::buffer::SampleBuffer;
use crate::peak::PeakDetector;
use crate::validator::StepPatternValidator;

/// Push-based step detector
///
/// All pipeline state lives in this instance; independent detectors never
/// share anything, so multiple sessions can run side by side.
pub struct StepDetector {
    config: DetectorConfig,
    buffer: SampleBuffer,
    peaks: PeakDetector,
    validator: StepPatternValidator,
    samples_seen: u64,
    steps_detected: u64,
}

impl StepDetector {
    /// Create a detector with the given configuration
    pub fn new(config: DetectorConfig) -> Self {
        debug_assert!(
            config.peak_window % 2 == 1,
            "peak window must be odd (validated at config load)"
        );
        Self {
            buffer: SampleBuffer::new(config.buffer_capacity),
            peaks: PeakDetector::new(config.peak_min, config.peak_history),
            validator: StepPatternValidator::new(config.clone()),
            config,
            samples_seen: 0,
            steps_detected: 0,
        }
    }

    /// Process a single sample
    ///
    /// Returns `Some(StepEvent)` when the sample completes a validated step
    /// pattern.
    #[instrument(
        level = "trace",
        name = "step_detector_process",
        skip(self, sample),
        fields(timestamp = sample.timestamp_ms)
    )]
    pub fn process_sample(&mut self, sample: MotionSample) -> Option<StepEvent> {
        self.samples_seen += 1;
        metrics::counter!("step_tracker_samples_total").increment(1);

        self.buffer.push(sample);

        let window = self.buffer.window(self.config.peak_window)?;
        let candidate = self.peaks.evaluate(&window)?;

        match self.validator.validate(&candidate, &window) {
            Ok(()) => {
                self.steps_detected += 1;
                metrics::counter!("step_tracker_steps_detected_total").increment(1);
                metrics::histogram!("step_tracker_step_magnitude").record(candidate.magnitude);
                trace!(magnitude = candidate.magnitude, "step validated");
                Some(StepEvent {
                    timestamp_ms: candidate.timestamp_ms,
                })
            }
            Err(reason) => {
                metrics::counter!(
                    "step_tracker_steps_rejected_total",
                    "reason" => reason.as_str()
                )
                .increment(1);
                trace!(%reason, magnitude = candidate.magnitude, "peak rejected");
                None
            }
        }
    }

    /// Process a batch of samples and return all validated steps
    pub fn process_batch(&mut self, samples: &[MotionSample]) -> Vec<StepEvent> {
        samples
            .iter()
            .filter_map(|sample| self.process_sample(*sample))
            .collect()
    }

    /// Forget all transient pipeline state
    ///
    /// The cumulative record is owned elsewhere and is unaffected.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.peaks.clear();
        self.validator.clear();
    }

    /// Total samples processed
    pub fn samples_seen(&self) -> u64 {
        self.samples_seen
    }

    /// Total validated steps
    pub fn steps_detected(&self) -> u64 {
        self.steps_detected
    }

    /// Recent peak candidates (diagnostics)
    pub fn peak_history(&self) -> Vec<PeakCandidate> {
        self.peaks.history().copied().collect()
    }

    /// Active configuration
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Baseline gravity reading at 50 Hz with magnitude spikes at the
    /// given timestamps.
    fn walk_trace(duration_ms: u64, spike_times: &[u64], spike_z: f64) -> Vec<MotionSample> {
        let mut samples = Vec::new();
        let mut t = 0u64;
        while t <= duration_ms {
            let z = if spike_times.contains(&t) { spike_z } else { 9.81 };
            samples.push(MotionSample::new(0.0, 0.0, z, t));
            t += 20;
        }
        samples
    }

    #[test]
    fn test_detects_clear_steps() {
        let mut detector = StepDetector::new(DetectorConfig::simple());
        // Spikes every 500 ms (2 Hz walking)
        let spikes: Vec<u64> = (1..=8).map(|i| i * 500).collect();
        let samples = walk_trace(4500, &spikes, 12.5);

        let steps = detector.process_batch(&samples);
        assert_eq!(steps.len(), 8, "every clean spike should commit one step");
        assert_eq!(steps[0].timestamp_ms, 500);
        assert_eq!(detector.steps_detected(), 8);
    }

    #[test]
    fn test_baseline_alone_yields_no_steps() {
        let mut detector = StepDetector::new(DetectorConfig::simple());
        let samples = walk_trace(2000, &[], 12.5);

        // Constant magnitudes never strictly dominate a window.
        assert!(detector.process_batch(&samples).is_empty());
    }

    #[test]
    fn test_double_trigger_commits_once() {
        let mut detector = StepDetector::new(DetectorConfig::simple());
        // Two peaks 160 ms apart: below the 300 ms minimum interval.
        let samples = walk_trace(2000, &[1000, 1160], 12.5);

        let steps = detector.process_batch(&samples);
        assert_eq!(steps.len(), 1, "the echo peak must be rejected");
        assert_eq!(steps[0].timestamp_ms, 1000);
    }

    #[test]
    fn test_impact_spike_rejected() {
        let mut detector = StepDetector::new(DetectorConfig::simple());
        // Magnitude above the amplitude band (a shock, not a step).
        let samples = walk_trace(2000, &[1000], 25.0);

        assert!(detector.process_batch(&samples).is_empty());
        // The peak itself was observed, only validation refused it.
        assert_eq!(detector.peak_history().len(), 1);
    }

    #[test]
    fn test_strict_profile_narrow_band() {
        let mut detector = StepDetector::new(DetectorConfig::strict());
        // 18 m/s² passes the simple band but not the strict one.
        let samples = walk_trace(2000, &[1000], 18.0);

        assert!(detector.process_batch(&samples).is_empty());
    }

    #[test]
    fn test_reset_clears_pipeline_state() {
        let mut detector = StepDetector::new(DetectorConfig::simple());
        let samples = walk_trace(2000, &[500, 1000], 12.5);
        let committed = detector.process_batch(&samples).len();
        assert_eq!(committed, 2);

        detector.reset();
        assert!(detector.peak_history().is_empty());

        // A step right after reset is a first step again, so the
        // minimum-interval gate does not apply.
        let more = walk_trace(2100, &[2060], 12.5);
        let steps: Vec<_> = more
            .into_iter()
            .filter(|s| s.timestamp_ms >= 2000)
            .filter_map(|s| detector.process_sample(s))
            .collect();
        assert_eq!(steps.len(), 1);
    }

    #[test]
    fn test_counters_accumulate() {
        let mut detector = StepDetector::new(DetectorConfig::simple());
        let samples = walk_trace(1000, &[500], 12.5);
        let total = samples.len() as u64;

        detector.process_batch(&samples);
        assert_eq!(detector.samples_seen(), total);
        assert_eq!(detector.steps_detected(), 1);
    }
}
