//! Notifier error types

use thiserror::Error;

/// Notifier-specific errors
#[derive(Debug, Error)]
pub enum NotifierError {
    /// Sink creation error
    #[error("failed to create sink '{name}': {message}")]
    SinkCreation { name: String, message: String },

    /// Queue full - event dropped
    #[error("queue full for sink '{sink_name}', event dropped")]
    QueueFull { sink_name: String },

    /// Sink write error (from contract)
    #[error("sink error: {0}")]
    Contract(#[from] contracts::EngineError),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl NotifierError {
    /// Create a sink creation error
    pub fn sink_creation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkCreation {
            name: name.into(),
            message: message.into(),
        }
    }
}
