//! RecordStore trait - persistence interface
//!
//! A key-value store for the daily step record. Backends must guarantee
//! that a failed save never leaves a partially written record behind.

use crate::{EngineError, StepRecord};

/// Daily record persistence trait
///
/// All store implementations must implement this trait.
#[trait_variant::make(RecordStore: Send)]
pub trait LocalRecordStore {
    /// Store name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Load the record stored under `key`
    ///
    /// Returns `None` when nothing has been persisted yet.
    ///
    /// # Errors
    /// Returns a persistence error on unreadable/corrupt data.
    async fn load(&self, key: &str) -> Result<Option<StepRecord>, EngineError>;

    /// Persist the full record under `key` (last-writer-wins)
    ///
    /// # Errors
    /// Returns a persistence error; callers treat it as non-fatal and retry
    /// with the next full snapshot.
    async fn save(&mut self, key: &str, record: &StepRecord) -> Result<(), EngineError>;
}
