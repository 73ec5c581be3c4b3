//! Configuration parsing
//!
//! Supports TOML (primary) and JSON (optional) formats.

use contracts::{EngineError, TrackerBlueprint};

/// Configuration file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML format (recommended)
    Toml,
    /// JSON format
    Json,
}

impl ConfigFormat {
    /// Infer the format from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Parse a TOML configuration
pub fn parse_toml(content: &str) -> Result<TrackerBlueprint, EngineError> {
    toml::from_str(content).map_err(|e| EngineError::ConfigParse {
        message: format!("TOML parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse a JSON configuration
pub fn parse_json(content: &str) -> Result<TrackerBlueprint, EngineError> {
    serde_json::from_str(content).map_err(|e| EngineError::ConfigParse {
        message: format!("JSON parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse by format
pub fn parse(content: &str, format: ConfigFormat) -> Result<TrackerBlueprint, EngineError> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{DetectionProfile, SinkType};

    #[test]
    fn test_parse_toml_minimal() {
        let content = r#"
[tracker]
daily_goal_steps = 10000

[detector]
profile = "strict"

[store]
base_path = "state"

[[sinks]]
name = "log"
sink_type = "log"
"#;
        let result = parse_toml(content);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let blueprint = result.unwrap();
        assert_eq!(blueprint.tracker.daily_goal_steps, 10_000);
        assert_eq!(blueprint.detector.profile, DetectionProfile::Strict);
        assert_eq!(blueprint.store.base_path, "state");
        assert_eq!(blueprint.sinks.len(), 1);
        assert_eq!(blueprint.sinks[0].sink_type, SinkType::Log);
    }

    #[test]
    fn test_parse_toml_with_overrides() {
        let content = r#"
[tracker]

[detector]
profile = "simple"

[detector.overrides]
amplitude_max = 18.0
min_step_interval_ms = 350

[store]
base_path = "state"
record_key = "today"
"#;
        let blueprint = parse_toml(content).unwrap();
        assert_eq!(blueprint.detector.overrides.amplitude_max, Some(18.0));
        assert_eq!(blueprint.detector.overrides.min_step_interval_ms, Some(350));
        assert_eq!(blueprint.store.record_key, "today");
        // Defaults filled in
        assert_eq!(blueprint.tracker.rollover_check_interval_secs, 3600);
    }

    #[test]
    fn test_parse_json_minimal() {
        let content = r#"{
            "tracker": { "daily_goal_steps": 8000 },
            "detector": { "profile": "simple" },
            "store": { "base_path": "state" },
            "sinks": [{ "name": "log", "sink_type": "log" }]
        }"#;
        let result = parse_json(content);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        assert_eq!(result.unwrap().tracker.daily_goal_steps, 8000);
    }

    #[test]
    fn test_parse_toml_syntax_error() {
        let content = "invalid toml [[[";
        let result = parse_toml(content);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, EngineError::ConfigParse { .. }));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ConfigFormat::from_extension("toml"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("TOML"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("json"),
            Some(ConfigFormat::Json)
        );
        assert_eq!(ConfigFormat::from_extension("yaml"), None);
    }
}
