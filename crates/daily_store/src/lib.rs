//! # Daily Store
//!
//! Ownership and persistence of the day-scoped step record.
//!
//! Responsibilities:
//! - Reward recomputation on every commit (full record, never partial)
//! - Day rollover detection with lifetime coin carry
//! - JSON persistence behind the `RecordStore` contract
//! - Serialized async writes through a single-writer worker
//!
//! ## Usage example
//!
//! ```ignore
//! use daily_store::{DailyStateStore, JsonFileStore, StoreHandle};
//!
//! let store = JsonFileStore::new("json_store", "state")?;
//! let loaded = store.load("daily_state").await?;
//! let mut daily = DailyStateStore::new(loaded, 10_000, chrono::Utc::now());
//!
//! let outcome = daily.add_steps(1, contracts::Provenance::Sensor, chrono::Utc::now());
//! ```

mod json_store;
mod store;
mod writer;

// Re-exports
pub use json_store::JsonFileStore;
pub use store::{CommitOutcome, DailyStateStore};
pub use writer::{StoreHandle, WriterMetrics, WriterMetricsSnapshot};

// Re-export contracts types
pub use contracts::{Provenance, RecordStore, StepRecord};
