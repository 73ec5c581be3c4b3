//! MotionSource trait - sensor data source abstraction
//!
//! Defines a unified interface for motion sources, decoupling the session
//! from concrete sensor implementations. Real platform sensors and mock
//! generators are handled identically.

use std::sync::Arc;

use crate::{EngineError, MotionSample};

/// Motion sample callback type
///
/// When the source produces a reading, it delivers a `MotionSample` through
/// this callback. Uses `Arc` to allow callback sharing across contexts.
pub type MotionCallback = Arc<dyn Fn(MotionSample) + Send + Sync>;

/// Outcome of a platform permission prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionDecision {
    Granted,
    Denied,
}

/// Motion data source trait
///
/// Abstracts the common behavior of platform accelerometers and mock
/// generators. Permission prompting and start/stop semantics are owned by
/// the implementation; the session only orchestrates them.
///
/// # Design Principles
///
/// 1. **Decoupling**: separates sample generation from sample consumption
/// 2. **Unified interface**: mock and real sensors use the same API
/// 3. **Callback pattern**: sources push samples; the callback must never block
///
/// # Example
///
/// ```ignore
/// let source: Box<dyn MotionSource> = build_source();
/// if source.request_permission()? == PermissionDecision::Granted {
///     source.listen(Arc::new(|sample| {
///         println!("magnitude {}", sample.magnitude());
///     }))?;
/// }
/// // ... later ...
/// source.stop();
/// ```
pub trait MotionSource: Send + Sync {
    /// Stable identifier (used for logging/metrics)
    fn source_id(&self) -> &str;

    /// Prompt the platform for motion access
    ///
    /// Implementations that need no prompt return `Granted` immediately.
    ///
    /// # Errors
    /// `SensorUnavailable` when the underlying sensor does not exist.
    fn request_permission(&self) -> Result<PermissionDecision, EngineError>;

    /// Register the sample callback and start delivering readings
    ///
    /// Repeated calls while already listening are idempotent (no duplicate
    /// callback registration).
    ///
    /// # Errors
    /// `SensorUnavailable` when the sensor cannot be started.
    fn listen(&self, callback: MotionCallback) -> Result<(), EngineError>;

    /// Stop delivering readings
    ///
    /// No samples are delivered through the callback after this returns.
    fn stop(&self);

    /// Check if currently listening
    fn is_listening(&self) -> bool;
}
