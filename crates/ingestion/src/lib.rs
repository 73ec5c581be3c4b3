//! # Ingestion
//!
//! Motion source implementations.
//!
//! Responsibilities:
//! - Synthetic walking generator for tests and demos (`MockWalker`)
//! - Recorded sample replay (`ReplaySource`)
//! - External step-service polling (`ExternalSyncPoller`)
//!
//! All sources speak the `MotionSource` callback contract; the session
//! never knows which implementation feeds it.

mod config;
mod external;
mod mock;
mod replay;

// Re-exports
pub use config::SourceMetrics;
pub use external::{ExternalSyncPoller, MockStepProvider, StepProvider, StepTotalCallback};
pub use mock::{MockWalker, WalkerConfig};
pub use replay::{ReplayConfig, ReplaySource};

// Re-export contracts types
pub use contracts::{MotionCallback, MotionSample, MotionSource, PermissionDecision};
