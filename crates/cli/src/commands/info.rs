//! `info` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    tracker: TrackerInfo,
    detector: DetectorInfo,
    store: StoreInfo,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    sinks: Vec<SinkInfo>,
}

#[derive(Serialize)]
struct TrackerInfo {
    daily_goal_steps: u64,
    command_queue_capacity: usize,
    event_queue_capacity: usize,
    rollover_check_interval_secs: u64,
}

#[derive(Serialize)]
struct DetectorInfo {
    profile: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    thresholds: Option<ThresholdInfo>,
}

#[derive(Serialize)]
struct ThresholdInfo {
    buffer_capacity: usize,
    peak_window: usize,
    peak_min: f64,
    amplitude_min: f64,
    amplitude_max: f64,
    min_step_interval_ms: u64,
    max_step_interval_ms: u64,
    cadence_min_hz: f64,
    cadence_max_hz: f64,
}

#[derive(Serialize)]
struct StoreInfo {
    base_path: String,
    record_key: String,
    writer_queue_capacity: usize,
}

#[derive(Serialize)]
struct SinkInfo {
    name: String,
    sink_type: String,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&blueprint, args);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&blueprint, args);
    }

    Ok(())
}

fn build_config_info(blueprint: &contracts::TrackerBlueprint, args: &InfoArgs) -> ConfigInfo {
    let detector_config = blueprint.to_detector_config();

    let thresholds = if args.thresholds {
        Some(ThresholdInfo {
            buffer_capacity: detector_config.buffer_capacity,
            peak_window: detector_config.peak_window,
            peak_min: detector_config.peak_min,
            amplitude_min: detector_config.amplitude_min,
            amplitude_max: detector_config.amplitude_max,
            min_step_interval_ms: detector_config.min_step_interval_ms,
            max_step_interval_ms: detector_config.max_step_interval_ms,
            cadence_min_hz: detector_config.cadence_min_hz,
            cadence_max_hz: detector_config.cadence_max_hz,
        })
    } else {
        None
    };

    let sinks = if args.sinks {
        blueprint
            .sinks
            .iter()
            .map(|s| SinkInfo {
                name: s.name.clone(),
                sink_type: format!("{:?}", s.sink_type),
            })
            .collect()
    } else {
        Vec::new()
    };

    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        tracker: TrackerInfo {
            daily_goal_steps: blueprint.tracker.daily_goal_steps,
            command_queue_capacity: blueprint.tracker.command_queue_capacity,
            event_queue_capacity: blueprint.tracker.event_queue_capacity,
            rollover_check_interval_secs: blueprint.tracker.rollover_check_interval_secs,
        },
        detector: DetectorInfo {
            profile: format!("{:?}", blueprint.detector.profile),
            thresholds,
        },
        store: StoreInfo {
            base_path: blueprint.store.base_path.clone(),
            record_key: blueprint.store.record_key.clone(),
            writer_queue_capacity: blueprint.store.writer_queue_capacity,
        },
        sinks,
    }
}

fn print_config_info(blueprint: &contracts::TrackerBlueprint, args: &InfoArgs) {
    let detector = blueprint.to_detector_config();

    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║               Step Tracker Configuration                     ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    // Tracker settings
    println!("🚶 Tracker");
    println!("   ├─ Version: {:?}", blueprint.version);
    println!("   ├─ Daily goal: {} steps", blueprint.tracker.daily_goal_steps);
    println!(
        "   ├─ Command queue: {}",
        blueprint.tracker.command_queue_capacity
    );
    println!(
        "   └─ Rollover check: every {}s",
        blueprint.tracker.rollover_check_interval_secs
    );

    // Detector
    println!("\n📈 Detector");
    if args.thresholds {
        println!("   ├─ Profile: {:?}", detector.profile);
        println!(
            "   ├─ Buffer: {} samples, window {}",
            detector.buffer_capacity, detector.peak_window
        );
        println!("   ├─ Peak minimum: {:.1} m/s²", detector.peak_min);
        println!(
            "   ├─ Amplitude band: {:.1} - {:.1} m/s²",
            detector.amplitude_min, detector.amplitude_max
        );
        println!(
            "   ├─ Step interval: {} - {} ms",
            detector.min_step_interval_ms, detector.max_step_interval_ms
        );
        println!(
            "   └─ Cadence band: {:.1} - {:.1} Hz",
            detector.cadence_min_hz, detector.cadence_max_hz
        );
    } else {
        println!("   └─ Profile: {:?}", detector.profile);
    }

    // Store
    println!("\n💾 Store");
    println!("   ├─ Path: {}", blueprint.store.base_path);
    println!("   ├─ Record key: {}", blueprint.store.record_key);
    println!(
        "   └─ Writer queue: {}",
        blueprint.store.writer_queue_capacity
    );

    // Sinks
    if !blueprint.sinks.is_empty() {
        println!("\n📤 Sinks ({})", blueprint.sinks.len());
        for (i, sink) in blueprint.sinks.iter().enumerate() {
            let is_last = i == blueprint.sinks.len() - 1;
            let prefix = if is_last { "└─" } else { "├─" };
            println!("   {} {} ({:?})", prefix, sink.name, sink.sink_type);
        }
    }

    println!();
}
