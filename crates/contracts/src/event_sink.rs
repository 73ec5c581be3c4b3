//! EventSink trait - notifier output interface
//!
//! Defines the abstract interface for event sinks.

use crate::{EngineError, EngineEvent};

/// Event output trait
///
/// All sink implementations must implement this trait.
#[trait_variant::make(EventSink: Send)]
pub trait LocalEventSink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Deliver an engine event
    ///
    /// # Errors
    /// Returns write error (should include context)
    async fn write(&mut self, event: &EngineEvent) -> Result<(), EngineError>;

    /// Flush buffer (if any)
    async fn flush(&mut self) -> Result<(), EngineError>;

    /// Close sink
    async fn close(&mut self) -> Result<(), EngineError>;
}
