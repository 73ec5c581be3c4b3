//! FileSink - append-only JSON-lines event journal

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use chrono::Utc;
use contracts::{EngineError, EngineEvent, EventSink};
use serde::Serialize;
use tracing::{debug, instrument};

/// Configuration for FileSink
#[derive(Debug, Clone)]
pub struct FileSinkConfig {
    /// Journal file path
    pub path: PathBuf,
}

impl FileSinkConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let path = params
            .get("path")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./events.jsonl"));

        Self { path }
    }
}

/// One journal line: the event plus a wall-clock write stamp
#[derive(Serialize)]
struct JournalLine<'a> {
    written_at: chrono::DateTime<Utc>,
    #[serde(flatten)]
    event: &'a EngineEvent,
}

/// Sink that appends events to a JSON-lines journal
pub struct FileSink {
    name: String,
    file: File,
    path: PathBuf,
}

impl FileSink {
    /// Create a new FileSink, creating parent directories as needed
    pub fn new(name: impl Into<String>, config: FileSinkConfig) -> std::io::Result<Self> {
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.path)?;

        Ok(Self {
            name: name.into(),
            file,
            path: config.path,
        })
    }

    /// Create from params map (for factory)
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> std::io::Result<Self> {
        let config = FileSinkConfig::from_params(params);
        Self::new(name, config)
    }

    fn append_line(&mut self, event: &EngineEvent) -> Result<(), EngineError> {
        let line = JournalLine {
            written_at: Utc::now(),
            event,
        };
        let json = serde_json::to_string(&line)
            .map_err(|e| EngineError::sink_write(&self.name, e.to_string()))?;

        writeln!(self.file, "{json}")
            .map_err(|e| EngineError::sink_write(&self.name, e.to_string()))
    }
}

impl EventSink for FileSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "file_sink_write",
        skip(self, event),
        fields(sink = %self.name)
    )]
    async fn write(&mut self, event: &EngineEvent) -> Result<(), EngineError> {
        self.append_line(event)
    }

    #[instrument(name = "file_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), EngineError> {
        self.file
            .flush()
            .map_err(|e| EngineError::sink_write(&self.name, e.to_string()))
    }

    #[instrument(name = "file_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), EngineError> {
        self.file
            .flush()
            .map_err(|e| EngineError::sink_write(&self.name, e.to_string()))?;
        debug!(sink = %self.name, path = %self.path.display(), "FileSink closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::Milestone;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_file_sink_appends_json_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        let config = FileSinkConfig { path: path.clone() };

        let mut sink = FileSink::new("test_file", config).unwrap();
        for total_coins in 1..=3u64 {
            let event = EngineEvent::Milestone {
                milestone: Milestone::CoinEarned {
                    total_coins,
                    newly_earned: 1,
                },
            };
            sink.write(&event).await.unwrap();
        }
        sink.flush().await.unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("\"coin_earned\""));
        assert!(lines[0].contains("written_at"));
    }

    #[tokio::test]
    async fn test_file_sink_appends_across_instances() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("events.jsonl");

        for _ in 0..2 {
            let mut sink = FileSink::new("test_file", FileSinkConfig { path: path.clone() }).unwrap();
            let event = EngineEvent::Error {
                reason: "sensor glitch".to_string(),
            };
            sink.write(&event).await.unwrap();
            sink.close().await.unwrap();
        }

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2, "journal must append, not truncate");
    }

    #[tokio::test]
    async fn test_from_params_default_path() {
        let dir = tempdir().unwrap();
        let mut params = HashMap::new();
        params.insert(
            "path".to_string(),
            dir.path().join("journal.jsonl").display().to_string(),
        );

        let sink = FileSink::from_params("journal", &params).unwrap();
        assert_eq!(sink.name(), "journal");
    }
}
