//! JsonFileStore - RecordStore over one JSON document per key.
//!
//! Writes go to a sibling temp file followed by an atomic rename, so a
//! crashed write can never leave a partially written record behind.

use std::fs;
use std::path::PathBuf;

use contracts::{EngineError, RecordStore, StepRecord};
use tracing::{debug, instrument};

/// File-backed record store
pub struct JsonFileStore {
    name: String,
    base_path: PathBuf,
}

impl JsonFileStore {
    /// Create a store rooted at `base_path` (created if missing)
    pub fn new(name: impl Into<String>, base_path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path)?;

        Ok(Self {
            name: name.into(),
            base_path,
        })
    }

    fn record_path(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{key}.json"))
    }
}

impl RecordStore for JsonFileStore {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(name = "json_store_load", skip(self), fields(store = %self.name))]
    async fn load(&self, key: &str) -> Result<Option<StepRecord>, EngineError> {
        let path = self.record_path(key);
        if !path.exists() {
            debug!(store = %self.name, key, "no persisted record");
            return Ok(None);
        }

        let content = fs::read_to_string(&path)
            .map_err(|e| EngineError::persistence(key, format!("read failed: {e}")))?;
        let record = serde_json::from_str(&content)
            .map_err(|e| EngineError::persistence(key, format!("corrupt record: {e}")))?;

        Ok(Some(record))
    }

    #[instrument(name = "json_store_save", skip(self, record), fields(store = %self.name))]
    async fn save(&mut self, key: &str, record: &StepRecord) -> Result<(), EngineError> {
        let path = self.record_path(key);
        let tmp_path = self.base_path.join(format!("{key}.json.tmp"));

        let json = serde_json::to_string_pretty(record)
            .map_err(|e| EngineError::persistence(key, format!("serialize failed: {e}")))?;

        fs::write(&tmp_path, json)
            .map_err(|e| EngineError::persistence(key, format!("write failed: {e}")))?;
        fs::rename(&tmp_path, &path)
            .map_err(|e| EngineError::persistence(key, format!("rename failed: {e}")))?;

        debug!(store = %self.name, key, steps = record.steps, "record persisted");
        Ok(())
    }
}
