//! Sliding-window peak detection.
//!
//! The midpoint of an odd-sized window is a peak iff its magnitude is
//! strictly greater than every other sample in the window and exceeds the
//! minimum peak threshold. Equal magnitudes anywhere disqualify the
//! midpoint, which prevents double-counting on sensor plateaus.

use contracts::PeakCandidate;
use ringbuf::{traits::*, HeapRb};

use crate::buffer::BufferedSample;

/// Local-maximum detector with a bounded candidate history
pub struct PeakDetector {
    peak_min: f64,
    history: HeapRb<PeakCandidate>,
}

impl PeakDetector {
    /// Create a detector with the given noise threshold and history capacity
    pub fn new(peak_min: f64, history_capacity: usize) -> Self {
        Self {
            peak_min,
            history: HeapRb::new(history_capacity),
        }
    }

    /// Evaluate the window midpoint
    ///
    /// `window` must have odd length. Qualifying candidates are recorded in
    /// the history (oldest evicted FIFO) and returned.
    pub fn evaluate(&mut self, window: &[BufferedSample]) -> Option<PeakCandidate> {
        debug_assert!(window.len() % 2 == 1, "detection window must be odd");

        let mid = window.len() / 2;
        let magnitude = window[mid].magnitude;

        // Noise floor: strict inequality, a peak at exactly the threshold
        // does not qualify.
        if magnitude <= self.peak_min {
            return None;
        }

        let strictly_dominates = window
            .iter()
            .enumerate()
            .all(|(i, entry)| i == mid || entry.magnitude < magnitude);
        if !strictly_dominates {
            return None;
        }

        let candidate = PeakCandidate {
            magnitude,
            timestamp_ms: window[mid].timestamp_ms(),
            is_peak: true,
        };

        if self.history.is_full() {
            let _ = self.history.try_pop();
        }
        let _ = self.history.try_push(candidate);

        Some(candidate)
    }

    /// Recorded candidates, oldest first
    pub fn history(&self) -> impl Iterator<Item = &PeakCandidate> {
        self.history.iter()
    }

    /// Number of recorded candidates
    pub fn history_len(&self) -> usize {
        self.history.occupied_len()
    }

    /// Drop the candidate history
    pub fn clear(&mut self) {
        self.history.pop_iter().for_each(drop);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::MotionSample;

    fn window_of(magnitudes: &[f64]) -> Vec<BufferedSample> {
        magnitudes
            .iter()
            .enumerate()
            .map(|(i, &m)| BufferedSample {
                sample: MotionSample::new(0.0, 0.0, m, i as u64 * 20),
                magnitude: m,
            })
            .collect()
    }

    #[test]
    fn test_strict_maximum_is_flagged() {
        let mut detector = PeakDetector::new(8.0, 10);
        let window = window_of(&[5.0, 9.0, 14.0, 9.0, 5.0]);

        let candidate = detector.evaluate(&window).expect("midpoint is a peak");
        assert_eq!(candidate.magnitude, 14.0);
        assert_eq!(candidate.timestamp_ms, 40);
        assert!(candidate.is_peak);
    }

    #[test]
    fn test_below_threshold_is_suppressed() {
        // Same shape, but the threshold sits at the peak value: 14 > 14 fails.
        let mut detector = PeakDetector::new(14.0, 10);
        let window = window_of(&[5.0, 9.0, 14.0, 9.0, 5.0]);

        assert!(detector.evaluate(&window).is_none());
    }

    #[test]
    fn test_plateau_never_flags() {
        let mut detector = PeakDetector::new(8.0, 10);
        let window = window_of(&[5.0, 14.0, 14.0, 14.0, 5.0]);

        assert!(detector.evaluate(&window).is_none());
        assert_eq!(detector.history_len(), 0);
    }

    #[test]
    fn test_midpoint_must_dominate_everywhere() {
        let mut detector = PeakDetector::new(8.0, 10);
        // A later sample exceeds the midpoint.
        let window = window_of(&[5.0, 9.0, 12.0, 13.0, 5.0]);

        assert!(detector.evaluate(&window).is_none());
    }

    #[test]
    fn test_history_is_bounded() {
        let mut detector = PeakDetector::new(8.0, 3);
        for round in 0..5u64 {
            let mut window = window_of(&[5.0, 9.0, 14.0, 9.0, 5.0]);
            for entry in &mut window {
                entry.sample.timestamp_ms += round * 1000;
            }
            detector.evaluate(&window).unwrap();
        }

        assert_eq!(detector.history_len(), 3);
        // Oldest candidates were evicted
        let first = detector.history().next().unwrap();
        assert!(first.timestamp_ms >= 2040);
    }
}
