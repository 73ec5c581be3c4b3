//! # Notifier
//!
//! Event distribution module.
//!
//! Responsibilities:
//! - Consume `EngineEvent`s from the session
//! - Fan-out to multiple sinks
//! - Isolate slow sinks so they never stall the engine

pub mod error;
pub mod handle;
pub mod metrics;
pub mod router;
pub mod sinks;

pub use contracts::{EngineEvent, EventSink};
pub use error::NotifierError;
pub use handle::SinkHandle;
pub use metrics::{MetricsSnapshot, SinkMetrics};
pub use router::{create_router, EventRouter, RouterBuilder, RouterConfig};
pub use sinks::{FileSink, LogSink};
