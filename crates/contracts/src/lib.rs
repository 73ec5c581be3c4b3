//! # Contracts
//!
//! Frozen interface contracts (ICD), defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Sensor samples carry epoch milliseconds (`u64`) as the primary clock
//! - Persisted records use `chrono` calendar dates (ISO) and UTC timestamps

mod blueprint;
mod detector_config;
mod error;
mod event_sink;
mod events;
mod motion_source;
mod record;
mod record_store;
mod sample;

pub use blueprint::*;
pub use detector_config::*;
pub use error::*;
pub use event_sink::*;
pub use events::*;
pub use motion_source::{MotionCallback, MotionSource, PermissionDecision};
pub use record::*;
pub use record_store::*;
pub use sample::*;
