//! `validate` command: parse + check a blueprint without running it.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Machine-readable validation report
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    profile: String,
    daily_goal_steps: u64,
    store_path: String,
    sink_count: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "validating blueprint");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("validation report not serializable")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("blueprint validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    // Check file exists
    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("no such file: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    version: format!("{:?}", blueprint.version),
                    profile: format!("{:?}", blueprint.detector.profile),
                    daily_goal_steps: blueprint.tracker.daily_goal_steps,
                    store_path: blueprint.store.base_path.clone(),
                    sink_count: blueprint.sinks.len(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Non-fatal findings worth surfacing alongside a valid blueprint
fn collect_warnings(blueprint: &contracts::TrackerBlueprint) -> Vec<String> {
    use contracts::DetectionProfile;

    let mut warnings = Vec::new();

    if blueprint.sinks.is_empty() {
        warnings.push("No sinks configured - milestone events will be dropped".to_string());
    }

    // Strict-only overrides are dead weight under the simple profile
    if blueprint.detector.profile == DetectionProfile::Simple {
        let overrides = &blueprint.detector.overrides;
        if overrides.cadence_min_hz.is_some()
            || overrides.cadence_max_hz.is_some()
            || overrides.magnitude_variance_max.is_some()
            || overrides.timestamp_variance_min.is_some()
        {
            warnings.push(
                "Cadence/variance overrides have no effect under the simple profile".to_string(),
            );
        }
    }

    // A very low goal fires the goal_reached milestone almost immediately
    if blueprint.tracker.daily_goal_steps < 1000 {
        warnings.push(format!(
            "Daily goal of {} steps is unusually low",
            blueprint.tracker.daily_goal_steps
        ));
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ blueprint is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Profile: {}", summary.profile);
            println!("  Daily goal: {} steps", summary.daily_goal_steps);
            println!("  Store: {}", summary.store_path);
            println!("  Sinks: {}", summary.sink_count);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ blueprint is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
