//! `run` command: drive the full tracking pipeline from a blueprint.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{info, warn};

use crate::cli::{RunArgs, SourceKind};
use crate::pipeline::{Pipeline, PipelineConfig, PipelineSource};

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "loading blueprint");

    if !args.config.exists() {
        anyhow::bail!("no config file at {}", args.config.display());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("blueprint at {} did not load", args.config.display()))?;

    info!(
        daily_goal = blueprint.tracker.daily_goal_steps,
        profile = ?blueprint.detector.profile,
        store = %blueprint.store.base_path,
        sinks = blueprint.sinks.len(),
        "blueprint loaded"
    );

    if args.dry_run {
        info!("dry run: blueprint is valid, nothing started");
        print_config_summary(&blueprint);
        return Ok(());
    }

    let source = match args.source {
        SourceKind::Mock => PipelineSource::Mock {
            cadence_hz: args.cadence,
        },
        SourceKind::Replay => {
            let path = args
                .replay
                .clone()
                .context("--source replay requires --replay <path>")?;
            PipelineSource::Replay {
                path,
                speed: args.replay_speed,
            }
        }
    };

    let pipeline_config = PipelineConfig {
        blueprint,
        max_steps: if args.max_steps == 0 {
            None
        } else {
            Some(args.max_steps)
        },
        duration: if args.duration == 0 {
            None
        } else {
            Some(Duration::from_secs(args.duration))
        },
        metrics_port: if args.metrics_port == 0 {
            None
        } else {
            Some(args.metrics_port)
        },
        source,
    };

    let pipeline = Pipeline::new(pipeline_config);

    let shutdown_signal = setup_shutdown_signal();

    info!("starting pipeline");
    tokio::select! {
        result = pipeline.run() => {
            match result {
                Ok(stats) => {
                    info!(
                        steps_committed = stats.steps_committed(),
                        coins_earned = stats.coins_earned(),
                        duration_secs = stats.duration.as_secs_f64(),
                        steps_per_min = format!("{:.1}", stats.steps_per_minute()),
                        "pipeline finished"
                    );

                    stats.print_summary();
                }
                Err(e) => {
                    return Err(e).context("pipeline run failed");
                }
            }
        }
        _ = shutdown_signal => {
            warn!("shutdown signal received, stopping");
        }
    }

    info!("step-tracker done");
    Ok(())
}

/// Resolve once the process receives Ctrl+C or SIGTERM
async fn setup_shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Ctrl+C handler install failed");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler install failed")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Human-readable blueprint summary for dry runs
fn print_config_summary(blueprint: &contracts::TrackerBlueprint) {
    let detector = blueprint.to_detector_config();

    println!("\n=== Blueprint Summary ===\n");
    println!("Tracker:");
    println!("  Daily goal: {} steps", blueprint.tracker.daily_goal_steps);
    println!(
        "  Rollover check interval: {}s",
        blueprint.tracker.rollover_check_interval_secs
    );
    println!("\nDetector:");
    println!("  Profile: {:?}", detector.profile);
    println!(
        "  Amplitude band: {:.1} - {:.1} m/s²",
        detector.amplitude_min, detector.amplitude_max
    );
    println!(
        "  Step interval: {} - {} ms",
        detector.min_step_interval_ms, detector.max_step_interval_ms
    );
    println!("\nStore:");
    println!(
        "  {} (key '{}')",
        blueprint.store.base_path, blueprint.store.record_key
    );

    if !blueprint.sinks.is_empty() {
        println!("\nSinks ({}):", blueprint.sinks.len());
        for sink in &blueprint.sinks {
            println!("  - {} ({:?})", sink.name, sink.sink_type);
        }
    }

    println!();
}
