//! Pipeline statistics and metrics.

use std::time::Duration;

use contracts::{EngineEvent, StepRecord};
use observability::TrackerMetricsAggregator;

/// Statistics from a pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Total duration of the pipeline run
    pub duration: Duration,

    /// Number of sinks that received events
    pub active_sinks: usize,

    /// Record snapshot taken after the session stopped
    pub final_record: Option<StepRecord>,

    /// Event-derived run metrics
    pub tracker_metrics: TrackerMetricsAggregator,
}

impl PipelineStats {
    /// Create stats for a run starting from the given daily step count
    pub fn new(active_sinks: usize, baseline_steps: u64) -> Self {
        let mut tracker_metrics = TrackerMetricsAggregator::new();
        tracker_metrics.set_baseline(baseline_steps);
        Self {
            active_sinks,
            tracker_metrics,
            ..Default::default()
        }
    }

    /// Feed one session event into the run metrics
    pub fn observe_event(&mut self, event: &EngineEvent) {
        self.tracker_metrics.observe_event(event);
    }

    /// Steps committed during this run
    pub fn steps_committed(&self) -> u64 {
        self.tracker_metrics.steps_committed
    }

    /// Coins earned during this run
    pub fn coins_earned(&self) -> u64 {
        self.tracker_metrics.total_coins_earned
    }

    /// Committed steps per minute of wall clock
    pub fn steps_per_minute(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.steps_committed() as f64 / (self.duration.as_secs_f64() / 60.0)
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        let summary = self.tracker_metrics.summary();

        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                    Pipeline Statistics                       ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Steps committed: {}", summary.steps_committed);
        println!("   ├─ Record commits: {}", summary.total_commits);
        println!("   ├─ Steps/min: {:.1}", self.steps_per_minute());
        println!("   └─ Active sinks: {}", self.active_sinks);

        println!("\n📈 Detection Metrics");
        println!("   ├─ Coins earned: {}", summary.total_coins_earned);
        println!("   ├─ Goals reached: {}", summary.goals_reached);
        println!("   ├─ Errors surfaced: {}", summary.errors_surfaced);
        println!("   ├─ Mean cadence: {:.2} Hz", summary.mean_cadence_hz);
        println!("   └─ Step interval (ms): {}", summary.step_interval_ms);

        if let Some(ref record) = self.final_record {
            println!("\n🚶 Daily Record ({})", record.date);
            println!("   ├─ Steps: {}", record.steps);
            println!("   ├─ Coins: {}", record.coins);
            println!("   ├─ Distance: {:.2} km", record.distance_km);
            println!("   ├─ Calories: {:.0} kcal", record.calories);
            println!("   └─ Source: {:?}", record.source);
        }

        println!();
    }
}
