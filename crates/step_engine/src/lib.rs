//! # Step Engine
//!
//! Step detection pipeline over a tri-axial accelerometer stream.
//!
//! Responsibilities:
//! - Sample ring buffering with cached magnitudes
//! - Sliding-window peak detection
//! - Step pattern validation (amplitude / timing / cadence / consistency)
//! - Pure reward calculation (distance, calories, coins)
//!
//! ## Usage example
//!
//! ```ignore
//! use step_engine::StepDetector;
//! use contracts::{DetectorConfig, MotionSample};
//!
//! let mut detector = StepDetector::new(DetectorConfig::strict());
//!
//! // Push samples as they arrive
//! if let Some(step) = detector.process_sample(MotionSample::new(0.3, 0.1, 12.4, 1000)) {
//!     // Commit the validated step
//! }
//! ```

mod buffer;
mod detector;
mod peak;
pub mod rewards;
mod validator;

// Re-exports
pub use buffer::{BufferedSample, SampleBuffer};
pub use detector::StepDetector;
pub use peak::PeakDetector;
pub use validator::{RejectReason, StepPatternValidator};

// Re-export contracts types
pub use contracts::{DetectionProfile, DetectorConfig, MotionSample, PeakCandidate, StepEvent};
