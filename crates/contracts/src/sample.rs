//! MotionSample - sensor source output
//!
//! Raw tri-axial acceleration readings and the transient detection artifacts
//! derived from them.

use serde::{Deserialize, Serialize};

/// A single accelerometer reading.
///
/// Produced by the platform motion source, consumed exactly once by the
/// sample buffer. Never persisted individually.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionSample {
    /// Acceleration on the x axis (m/s²)
    pub x: f64,

    /// Acceleration on the y axis (m/s²)
    pub y: f64,

    /// Acceleration on the z axis (m/s²)
    pub z: f64,

    /// Arrival timestamp (epoch milliseconds) - primary clock
    pub timestamp_ms: u64,
}

impl MotionSample {
    /// Create a sample from raw axis values
    pub fn new(x: f64, y: f64, z: f64, timestamp_ms: u64) -> Self {
        Self {
            x,
            y,
            z,
            timestamp_ms,
        }
    }

    /// Euclidean norm of the acceleration vector
    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

/// A buffered entry flagged as a candidate local maximum.
///
/// Transient; retained briefly in a bounded peak history for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeakCandidate {
    /// Cached magnitude at the window midpoint
    pub magnitude: f64,

    /// Timestamp of the midpoint sample (epoch milliseconds)
    pub timestamp_ms: u64,

    /// Whether the midpoint strictly dominated its window
    pub is_peak: bool,
}

/// The result of successful step validation.
///
/// Causes exactly one increment of the cumulative step counter and is
/// irreversible once committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepEvent {
    /// Timestamp of the validated peak (epoch milliseconds)
    pub timestamp_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magnitude_unit_axes() {
        let sample = MotionSample::new(3.0, 4.0, 0.0, 0);
        assert!((sample.magnitude() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_magnitude_gravity_only() {
        let sample = MotionSample::new(0.0, 0.0, 9.81, 100);
        assert!((sample.magnitude() - 9.81).abs() < 1e-12);
    }

    #[test]
    fn test_sample_serde_round_trip() {
        let sample = MotionSample::new(0.1, -0.2, 9.8, 1_700_000_000_000);
        let json = serde_json::to_string(&sample).unwrap();
        let back: MotionSample = serde_json::from_str(&json).unwrap();
        assert_eq!(sample, back);
    }
}
