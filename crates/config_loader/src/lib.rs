//! # Config Loader
//!
//! Blueprint loading and validation.
//!
//! Responsibilities:
//! - Parse TOML/JSON blueprint documents
//! - Apply the semantic validation rules
//! - Generate `TrackerBlueprint`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let blueprint = ConfigLoader::load_from_path(Path::new("config.toml")).unwrap();
//! println!("Daily goal: {}", blueprint.tracker.daily_goal_steps);
//! ```

mod parser;
mod validator;

pub use contracts::TrackerBlueprint;
pub use parser::ConfigFormat;

use contracts::EngineError;
use std::path::Path;

/// Configuration loader
///
/// Stateless facade; every method is an associated function.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load a blueprint from disk
    ///
    /// The format is inferred from the file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<TrackerBlueprint, EngineError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load a blueprint from an in-memory string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<TrackerBlueprint, EngineError> {
        Self::parse_and_validate(content, format)
    }

    /// Serialize TrackerBlueprint to TOML string
    pub fn to_toml(blueprint: &TrackerBlueprint) -> Result<String, EngineError> {
        toml::to_string_pretty(blueprint)
            .map_err(|e| EngineError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize TrackerBlueprint to JSON string
    pub fn to_json(blueprint: &TrackerBlueprint) -> Result<String, EngineError> {
        serde_json::to_string_pretty(blueprint)
            .map_err(|e| EngineError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    /// Infer the document format from a file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, EngineError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            EngineError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext)
            .ok_or_else(|| EngineError::config_parse(format!("unsupported config format: .{ext}")))
    }

    /// Read the raw document
    fn read_file(path: &Path) -> Result<String, EngineError> {
        Ok(std::fs::read_to_string(path)?)
    }

    /// Parse, then run semantic validation (first error wins)
    fn parse_and_validate(
        content: &str,
        format: ConfigFormat,
    ) -> Result<TrackerBlueprint, EngineError> {
        let blueprint = parser::parse(content, format)?;
        validator::validate(&blueprint)?;
        Ok(blueprint)
    }
}
