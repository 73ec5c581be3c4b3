//! Configuration validation
//!
//! Rules:
//! - declared range/length constraints on the blueprint hold
//! - detection window odd, at least 3, and within the buffer
//! - amplitude band and cadence band ordered
//! - step intervals ordered
//! - sink names unique and non-empty, queue capacities positive

use std::collections::HashSet;

use contracts::{EngineError, TrackerBlueprint};
use validator::Validate;

/// Validate a TrackerBlueprint
///
/// Returns the first encountered error, or Ok(()).
pub fn validate(blueprint: &TrackerBlueprint) -> Result<(), EngineError> {
    validate_declared_constraints(blueprint)?;
    validate_detector(blueprint)?;
    validate_sinks(blueprint)?;
    Ok(())
}

/// Run the derive-level range/length constraints
fn validate_declared_constraints(blueprint: &TrackerBlueprint) -> Result<(), EngineError> {
    blueprint.validate().map_err(|errors| {
        let field = errors
            .field_errors()
            .keys()
            .next()
            .map(|k| k.to_string())
            .unwrap_or_else(|| "blueprint".to_string());
        EngineError::config_validation(field, errors.to_string())
    })
}

/// Validate the merged detector configuration
fn validate_detector(blueprint: &TrackerBlueprint) -> Result<(), EngineError> {
    let config = blueprint.to_detector_config();

    if config.peak_window < 3 || config.peak_window % 2 == 0 {
        return Err(EngineError::config_validation(
            "detector.peak_window",
            format!("window must be odd and >= 3, got {}", config.peak_window),
        ));
    }

    if config.buffer_capacity < config.peak_window {
        return Err(EngineError::config_validation(
            "detector.buffer_capacity",
            format!(
                "buffer ({}) must hold at least one window ({})",
                config.buffer_capacity, config.peak_window
            ),
        ));
    }

    if config.amplitude_min >= config.amplitude_max {
        return Err(EngineError::config_validation(
            "detector.amplitude_min / detector.amplitude_max",
            format!(
                "amplitude_min ({}) must be < amplitude_max ({})",
                config.amplitude_min, config.amplitude_max
            ),
        ));
    }

    if config.peak_min <= 0.0 {
        return Err(EngineError::config_validation(
            "detector.peak_min",
            format!("peak_min must be > 0, got {}", config.peak_min),
        ));
    }

    if config.min_step_interval_ms == 0
        || config.min_step_interval_ms >= config.max_step_interval_ms
    {
        return Err(EngineError::config_validation(
            "detector.min_step_interval_ms / detector.max_step_interval_ms",
            format!(
                "intervals must satisfy 0 < min ({}) < max ({})",
                config.min_step_interval_ms, config.max_step_interval_ms
            ),
        ));
    }

    if config.cadence_min_hz <= 0.0 || config.cadence_min_hz >= config.cadence_max_hz {
        return Err(EngineError::config_validation(
            "detector.cadence_min_hz / detector.cadence_max_hz",
            format!(
                "cadence band must satisfy 0 < min ({}) < max ({})",
                config.cadence_min_hz, config.cadence_max_hz
            ),
        ));
    }

    if config.magnitude_variance_max <= 0.0 {
        return Err(EngineError::config_validation(
            "detector.magnitude_variance_max",
            format!(
                "variance ceiling must be > 0, got {}",
                config.magnitude_variance_max
            ),
        ));
    }

    Ok(())
}

/// Validate the sink list
fn validate_sinks(blueprint: &TrackerBlueprint) -> Result<(), EngineError> {
    let mut seen = HashSet::new();
    for (idx, sink) in blueprint.sinks.iter().enumerate() {
        if sink.name.is_empty() {
            return Err(EngineError::config_validation(
                format!("sinks[{idx}].name"),
                "sink name cannot be empty",
            ));
        }
        if !seen.insert(&sink.name) {
            return Err(EngineError::config_validation(
                format!("sinks[name={}]", sink.name),
                "duplicate sink name",
            ));
        }
        if sink.queue_capacity == 0 {
            return Err(EngineError::config_validation(
                format!("sinks[{}].queue_capacity", sink.name),
                "queue capacity must be > 0",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{
        ConfigVersion, DetectorSettings, SinkConfig, SinkType, StoreConfig, TrackerConfig,
    };
    use std::collections::HashMap;

    fn minimal_blueprint() -> TrackerBlueprint {
        TrackerBlueprint {
            version: ConfigVersion::V1,
            tracker: TrackerConfig::default(),
            detector: DetectorSettings::default(),
            store: StoreConfig {
                base_path: "state".into(),
                record_key: "daily_state".into(),
                writer_queue_capacity: 8,
            },
            sinks: vec![SinkConfig {
                name: "log".into(),
                sink_type: SinkType::Log,
                queue_capacity: 100,
                params: HashMap::new(),
            }],
        }
    }

    #[test]
    fn test_valid_config() {
        let blueprint = minimal_blueprint();
        assert!(validate(&blueprint).is_ok());
    }

    #[test]
    fn test_even_window_rejected() {
        let mut blueprint = minimal_blueprint();
        blueprint.detector.overrides.peak_window = Some(4);
        let result = validate(&blueprint);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("odd"), "got: {err}");
    }

    #[test]
    fn test_window_larger_than_buffer_rejected() {
        let mut blueprint = minimal_blueprint();
        blueprint.detector.overrides.peak_window = Some(21);
        let result = validate(&blueprint);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("buffer"), "got: {err}");
    }

    #[test]
    fn test_inverted_amplitude_band_rejected() {
        let mut blueprint = minimal_blueprint();
        blueprint.detector.overrides.amplitude_min = Some(25.0);
        let result = validate(&blueprint);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("amplitude_min"), "got: {err}");
    }

    #[test]
    fn test_inverted_intervals_rejected() {
        let mut blueprint = minimal_blueprint();
        blueprint.detector.overrides.min_step_interval_ms = Some(3000);
        let result = validate(&blueprint);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("interval"), "got: {err}");
    }

    #[test]
    fn test_inverted_cadence_band_rejected() {
        let mut blueprint = minimal_blueprint();
        blueprint.detector.overrides.cadence_min_hz = Some(5.0);
        let result = validate(&blueprint);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("cadence"), "got: {err}");
    }

    #[test]
    fn test_empty_sink_name() {
        let mut blueprint = minimal_blueprint();
        blueprint.sinks[0].name = String::new();
        let result = validate(&blueprint);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("cannot be empty"), "got: {err}");
    }

    #[test]
    fn test_duplicate_sink_name() {
        let mut blueprint = minimal_blueprint();
        blueprint.sinks.push(blueprint.sinks[0].clone());
        let result = validate(&blueprint);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("duplicate"), "got: {err}");
    }

    #[test]
    fn test_empty_store_path_rejected() {
        let mut blueprint = minimal_blueprint();
        blueprint.store.base_path = String::new();
        let result = validate(&blueprint);
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_goal_rejected() {
        let mut blueprint = minimal_blueprint();
        blueprint.tracker.daily_goal_steps = 0;
        let result = validate(&blueprint);
        assert!(result.is_err());
    }
}
