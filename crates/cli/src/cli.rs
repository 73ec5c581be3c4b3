//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Step Tracker - accelerometer step detection and reward pipeline
#[derive(Parser, Debug)]
#[command(
    name = "step-tracker",
    author,
    version,
    about = "Step detection and reward tracking pipeline",
    long_about = "Converts a tri-axial accelerometer stream into validated step events,\n\
                  derives reward metrics (distance, calories, coins), persists a\n\
                  day-scoped record, and routes milestone events to configured sinks."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "STEP_TRACKER_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "STEP_TRACKER_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the tracking pipeline
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "config.toml",
        env = "STEP_TRACKER_CONFIG"
    )]
    pub config: PathBuf,

    /// Motion source feeding the session
    #[arg(long, value_enum, default_value = "mock", env = "STEP_TRACKER_SOURCE")]
    pub source: SourceKind,

    /// Path to a JSON-lines sample capture (replay source only)
    #[arg(long, env = "STEP_TRACKER_REPLAY")]
    pub replay: Option<PathBuf>,

    /// Replay speed multiplier (1.0 = recorded pace, 0 = as fast as possible)
    #[arg(long, default_value = "1.0", env = "STEP_TRACKER_REPLAY_SPEED")]
    pub replay_speed: f64,

    /// Walking cadence of the mock source, steps per second
    #[arg(long, default_value = "2.0", env = "STEP_TRACKER_CADENCE")]
    pub cadence: f64,

    /// Stop after this many committed steps (0 = unlimited)
    #[arg(long, default_value = "0", env = "STEP_TRACKER_MAX_STEPS")]
    pub max_steps: u64,

    /// Run duration in seconds (0 = until interrupted)
    #[arg(long, default_value = "0", env = "STEP_TRACKER_DURATION")]
    pub duration: u64,

    /// Validate configuration and exit without running pipeline
    #[arg(long)]
    pub dry_run: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "9000", env = "STEP_TRACKER_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show detector thresholds
    #[arg(long)]
    pub thresholds: bool,

    /// Show sink configuration
    #[arg(long)]
    pub sinks: bool,
}

/// Motion source selection
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SourceKind {
    /// Synthetic walking generator (no hardware required)
    #[default]
    Mock,
    /// Replay a recorded JSON-lines sample capture
    Replay,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}
