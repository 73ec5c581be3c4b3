//! # Session
//!
//! Tracking session orchestration.
//!
//! Responsibilities:
//! - Lifecycle state machine (idle → permission → active → stopped)
//! - Driving the detection pipeline from sensor callbacks
//! - Committing validated steps and emitting milestones
//! - Periodic day-rollover checks
//!
//! All pipeline state is owned by one `TrackingSession` actor; commands,
//! samples and timer ticks arrive over a single queue and are processed
//! strictly in order, which keeps the single-writer invariant explicit.
//!
//! ## Usage example
//!
//! ```ignore
//! use session::{SessionConfig, TrackingSession};
//!
//! let (events_tx, events_rx) = tokio::sync::mpsc::channel(128);
//! let (handle, join) = TrackingSession::spawn(
//!     SessionConfig::default(),
//!     contracts::DetectorConfig::simple(),
//!     None,
//!     Box::new(source),
//!     Some(writer),
//!     events_tx,
//! );
//!
//! handle.start().await?;
//! ```

mod handle;
mod session;

// Re-exports
pub use handle::SessionHandle;
pub use session::{spawn_rollover_timer, SessionConfig, TrackingSession};

// Re-export contracts types
pub use contracts::{EngineEvent, EngineError, SessionState, StepRecord};
