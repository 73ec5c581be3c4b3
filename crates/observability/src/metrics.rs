//! Tracker metric collection
//!
//! Prometheus-facing helpers plus an in-memory aggregator used for run
//! summaries. Both consume the session's event stream; per-stage counters
//! (samples, rejections, persistence attempts) are recorded inline by the
//! crates that own those stages.

use contracts::{EngineEvent, Milestone, Provenance, StepRecord};
use metrics::{counter, gauge};

/// Record metrics for a committed record
///
/// Call on every `StateChanged` event (sensor, manual, external sync).
pub fn record_commit_metrics(record: &StepRecord) {
    counter!("step_tracker_commits_observed_total").increment(1);

    gauge!("step_tracker_record_steps").set(record.steps as f64);
    gauge!("step_tracker_record_coins").set(record.coins as f64);
    gauge!("step_tracker_record_distance_km").set(record.distance_km);
    gauge!("step_tracker_record_calories").set(record.calories);
}

/// Record a crossed milestone
pub fn record_milestone(milestone: &Milestone) {
    match milestone {
        Milestone::CoinEarned { newly_earned, .. } => {
            counter!("step_tracker_coins_earned_total").increment(*newly_earned);
        }
        Milestone::GoalReached { .. } => {
            counter!("step_tracker_goals_reached_total").increment(1);
        }
    }
}

/// Record an error surfaced by the session
pub fn record_session_error() {
    counter!("step_tracker_session_errors_total").increment(1);
}

/// Tracker metrics aggregator
///
/// Aggregates the session's event stream in memory for run summaries.
/// Cadence is derived from sensor commits only; manual entries and external
/// syncs move the step counter in jumps that say nothing about gait.
#[derive(Debug, Clone, Default)]
pub struct TrackerMetricsAggregator {
    /// Record commits observed
    pub total_commits: u64,

    /// Steps added across all observed commits
    pub steps_committed: u64,

    /// Coins earned during the run
    pub total_coins_earned: u64,

    /// Goal milestones observed
    pub goals_reached: u64,

    /// Errors surfaced by the session
    pub errors_surfaced: u64,

    /// Inter-step interval statistics (ms, sensor commits only)
    pub interval_stats: RunningStats,

    /// Daily step count of the previously observed record
    last_steps: Option<u64>,

    /// Commit timestamp of the last sensor step, for interval tracking
    last_sensor_commit_ms: Option<i64>,
}

impl TrackerMetricsAggregator {
    /// Create a new aggregator
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the daily step count the run starts from
    ///
    /// Without a baseline the first observed commit only anchors the delta
    /// tracking and its steps are not counted.
    pub fn set_baseline(&mut self, steps: u64) {
        self.last_steps = Some(steps);
    }

    /// Update with one session event
    pub fn observe_event(&mut self, event: &EngineEvent) {
        match event {
            EngineEvent::StateChanged { record } => self.observe_commit(record),
            EngineEvent::Milestone { milestone } => match milestone {
                Milestone::CoinEarned { newly_earned, .. } => {
                    self.total_coins_earned += newly_earned;
                }
                Milestone::GoalReached { .. } => {
                    self.goals_reached += 1;
                }
            },
            EngineEvent::Error { .. } => {
                self.errors_surfaced += 1;
            }
        }
    }

    fn observe_commit(&mut self, record: &StepRecord) {
        self.total_commits += 1;

        let stepped_forward = match self.last_steps {
            Some(prev) if record.steps > prev => {
                self.steps_committed += record.steps - prev;
                true
            }
            // Resets, rollovers and absent baselines only anchor the delta.
            _ => false,
        };
        self.last_steps = Some(record.steps);

        if stepped_forward && record.source == Provenance::Sensor {
            let commit_ms = record.last_updated.timestamp_millis();
            if let Some(last) = self.last_sensor_commit_ms {
                if commit_ms > last {
                    self.interval_stats.push((commit_ms - last) as f64);
                }
            }
            self.last_sensor_commit_ms = Some(commit_ms);
        }
    }

    /// Mean walking cadence over the run, in Hz
    pub fn mean_cadence_hz(&self) -> f64 {
        let mean_interval = self.interval_stats.mean();
        if mean_interval > 0.0 {
            1000.0 / mean_interval
        } else {
            0.0
        }
    }

    /// Generate a summary report
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_commits: self.total_commits,
            steps_committed: self.steps_committed,
            total_coins_earned: self.total_coins_earned,
            goals_reached: self.goals_reached,
            errors_surfaced: self.errors_surfaced,
            mean_cadence_hz: self.mean_cadence_hz(),
            step_interval_ms: StatsSummary::from(&self.interval_stats),
        }
    }

    /// Reset all statistics
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Metrics summary
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub total_commits: u64,
    pub steps_committed: u64,
    pub total_coins_earned: u64,
    pub goals_reached: u64,
    pub errors_surfaced: u64,
    pub mean_cadence_hz: f64,
    pub step_interval_ms: StatsSummary,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Tracker Metrics Summary ===")?;
        writeln!(f, "Record commits: {}", self.total_commits)?;
        writeln!(f, "Steps committed: {}", self.steps_committed)?;
        writeln!(f, "Coins earned: {}", self.total_coins_earned)?;
        writeln!(f, "Goals reached: {}", self.goals_reached)?;
        writeln!(f, "Errors surfaced: {}", self.errors_surfaced)?;
        writeln!(f, "Mean cadence: {:.2} Hz", self.mean_cadence_hz)?;
        writeln!(f, "Step interval (ms): {}", self.step_interval_ms)?;
        Ok(())
    }
}

/// Statistics summary
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count(),
            min: stats.min(),
            max: stats.max(),
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// Add a new value
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// Sample count
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Mean
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// Standard deviation
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Minimum
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Maximum
    pub fn max(&self) -> f64 {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn commit_event(steps: u64, at_ms: i64, source: Provenance) -> EngineEvent {
        let last_updated = Utc.timestamp_millis_opt(at_ms).unwrap();
        EngineEvent::StateChanged {
            record: StepRecord {
                date: last_updated.date_naive(),
                steps,
                coins: steps / 1000,
                distance_km: 0.0,
                calories: 0.0,
                last_updated,
                source,
            },
        }
    }

    #[test]
    fn test_running_stats() {
        let mut stats = RunningStats::default();

        stats.push(1.0);
        stats.push(2.0);
        stats.push(3.0);
        stats.push(4.0);
        stats.push(5.0);

        assert_eq!(stats.count(), 5);
        assert!((stats.mean() - 3.0).abs() < 1e-10);
        assert!((stats.min() - 1.0).abs() < 1e-10);
        assert!((stats.max() - 5.0).abs() < 1e-10);
        assert!((stats.variance() - 2.5).abs() < 1e-10);
    }

    #[test]
    fn test_aggregator_tracks_sensor_cadence() {
        let mut aggregator = TrackerMetricsAggregator::new();
        aggregator.set_baseline(0);

        aggregator.observe_event(&commit_event(1, 1000, Provenance::Sensor));
        aggregator.observe_event(&commit_event(2, 1500, Provenance::Sensor));
        aggregator.observe_event(&commit_event(3, 2000, Provenance::Sensor));

        assert_eq!(aggregator.total_commits, 3);
        assert_eq!(aggregator.steps_committed, 3);
        // Two 500ms intervals => 2 Hz
        assert!((aggregator.mean_cadence_hz() - 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_manual_jumps_count_steps_not_cadence() {
        let mut aggregator = TrackerMetricsAggregator::new();
        aggregator.set_baseline(0);

        aggregator.observe_event(&commit_event(1, 1000, Provenance::Sensor));
        aggregator.observe_event(&commit_event(501, 1200, Provenance::Manual));
        aggregator.observe_event(&commit_event(502, 1700, Provenance::Sensor));

        assert_eq!(aggregator.steps_committed, 502);
        // The manual jump neither contributes an interval nor breaks the
        // sensor chain: 1000 -> 1700 is one 700ms interval.
        assert_eq!(aggregator.interval_stats.count(), 1);
        assert!((aggregator.interval_stats.mean() - 700.0).abs() < 1e-10);
    }

    #[test]
    fn test_baseline_excludes_preexisting_steps() {
        let mut aggregator = TrackerMetricsAggregator::new();
        aggregator.set_baseline(5000);

        aggregator.observe_event(&commit_event(5001, 1000, Provenance::Sensor));
        assert_eq!(aggregator.steps_committed, 1);
    }

    #[test]
    fn test_resets_do_not_underflow() {
        let mut aggregator = TrackerMetricsAggregator::new();
        aggregator.set_baseline(0);

        aggregator.observe_event(&commit_event(800, 1000, Provenance::Manual));
        // Daily reset drops the count to zero
        aggregator.observe_event(&commit_event(0, 2000, Provenance::Manual));
        aggregator.observe_event(&commit_event(100, 3000, Provenance::Manual));

        assert_eq!(aggregator.steps_committed, 900);
    }

    #[test]
    fn test_milestones_and_errors() {
        let mut aggregator = TrackerMetricsAggregator::new();

        aggregator.observe_event(&EngineEvent::Milestone {
            milestone: Milestone::CoinEarned {
                total_coins: 2,
                newly_earned: 1,
            },
        });
        aggregator.observe_event(&EngineEvent::Milestone {
            milestone: Milestone::GoalReached {
                steps: 10_000,
                goal: 10_000,
            },
        });
        aggregator.observe_event(&EngineEvent::Error {
            reason: "sensor died".to_string(),
        });

        assert_eq!(aggregator.total_coins_earned, 1);
        assert_eq!(aggregator.goals_reached, 1);
        assert_eq!(aggregator.errors_surfaced, 1);
    }

    #[test]
    fn test_summary_display() {
        let mut aggregator = TrackerMetricsAggregator::new();
        aggregator.set_baseline(0);
        aggregator.observe_event(&commit_event(1, 1000, Provenance::Sensor));
        aggregator.observe_event(&commit_event(2, 1500, Provenance::Sensor));

        let output = format!("{}", aggregator.summary());
        assert!(output.contains("Steps committed: 2"));
        assert!(output.contains("Mean cadence: 2.00 Hz"));
    }

    #[test]
    fn test_empty_summary_is_na() {
        let summary = TrackerMetricsAggregator::new().summary();
        let output = format!("{}", summary);
        assert!(output.contains("N/A"));
    }
}
