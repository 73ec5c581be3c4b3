//! Layered error definitions
//!
//! Categorized by source: permission / sensor / persistence / command / config / sink

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum EngineError {
    // ===== Permission / Sensor Errors =====
    /// Motion permission was denied by the platform
    #[error("motion permission denied")]
    PermissionDenied,

    /// Motion sensor could not be started or died
    #[error("motion sensor unavailable: {message}")]
    SensorUnavailable { message: String },

    // ===== Persistence Errors =====
    /// Persistence failure (non-fatal, the next write retries the full record)
    #[error("persistence failure for '{key}': {message}")]
    Persistence { key: String, message: String },

    // ===== Command Errors =====
    /// Manual input rejected, no state change
    #[error("invalid manual input: {message} (got {value})")]
    InvalidManualInput { value: u64, message: String },

    /// Session actor is gone, command cannot be delivered
    #[error("session command channel closed")]
    SessionClosed,

    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Sink Errors =====
    /// Event sink write error
    #[error("sink '{sink_name}' write error: {message}")]
    SinkWrite { sink_name: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl EngineError {
    /// Create sensor unavailable error
    pub fn sensor_unavailable(message: impl Into<String>) -> Self {
        Self::SensorUnavailable {
            message: message.into(),
        }
    }

    /// Create persistence error
    pub fn persistence(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Persistence {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create invalid manual input error
    pub fn invalid_manual_input(value: u64, message: impl Into<String>) -> Self {
        Self::InvalidManualInput {
            value,
            message: message.into(),
        }
    }

    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create sink write error
    pub fn sink_write(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkWrite {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }

    /// Whether the error should transition the session to `Errored`
    pub fn is_fatal_for_session(&self) -> bool {
        matches!(
            self,
            Self::PermissionDenied | Self::SensorUnavailable { .. }
        )
    }
}
