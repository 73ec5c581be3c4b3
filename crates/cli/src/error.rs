//! Error types for CLI operations.

use thiserror::Error;

/// CLI-specific error types
#[allow(dead_code)]
#[derive(Error, Debug)]
pub enum CliError {
    /// No configuration file at the given path
    #[error("config file missing: {path}")]
    ConfigNotFound { path: String },

    /// The configuration could not be parsed or failed validation
    #[error("bad config: {message}")]
    BadConfig { message: String },

    /// The motion source refused to start or died mid-run
    #[error("motion source '{source_id}' failed: {message}")]
    SourceFailure { source_id: String, message: String },

    /// The tracking session rejected a command or went away
    #[error("session failure: {message}")]
    SessionFailure { message: String },

    /// The record store could not be opened
    #[error("record store unusable at '{path}': {message}")]
    StoreFailure { path: String, message: String },

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error wrapper
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

#[allow(dead_code)]
impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn bad_config(message: impl Into<String>) -> Self {
        Self::BadConfig {
            message: message.into(),
        }
    }

    pub fn source_failure(source_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SourceFailure {
            source_id: source_id.into(),
            message: message.into(),
        }
    }

    pub fn session_failure(message: impl Into<String>) -> Self {
        Self::SessionFailure {
            message: message.into(),
        }
    }

    pub fn store_failure(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StoreFailure {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for CLI operations
#[allow(dead_code)]
pub type Result<T> = std::result::Result<T, CliError>;
