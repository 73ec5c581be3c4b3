//! Daily record ownership and rollover.
//!
//! The store is the only mutator of the `StepRecord`. Every commit
//! recomputes all reward fields from the new cumulative step count, so a
//! persisted record can always be reproduced from its step counter.
//!
//! Coins are a lifetime balance: the portion earned on previous days is
//! carried in `coin_base` and survives the daily reset.

use chrono::{DateTime, Utc};
use contracts::{Provenance, StepRecord};
use step_engine::rewards;
use tracing::{debug, info};

/// Result of a commit operation
#[derive(Debug, Clone)]
pub struct CommitOutcome {
    /// Snapshot of the record after the commit
    pub record: StepRecord,
    /// Coins added by this commit
    pub coins_earned: u64,
    /// Whether this commit crossed the daily goal
    pub goal_reached: bool,
}

/// Owner of the current day's `StepRecord`
pub struct DailyStateStore {
    record: StepRecord,
    /// Lifetime coins earned before today
    coin_base: u64,
    daily_goal_steps: u64,
}

impl DailyStateStore {
    /// Build the store from a loaded record (or fresh state) and apply the
    /// startup rollover check.
    pub fn new(loaded: Option<StepRecord>, daily_goal_steps: u64, now: DateTime<Utc>) -> Self {
        let record = loaded.unwrap_or_else(|| StepRecord::fresh(now.date_naive(), now));
        let coin_base = record.coins.saturating_sub(rewards::coins(record.steps));

        let mut store = Self {
            record,
            coin_base,
            daily_goal_steps,
        };
        store.check_rollover(now);
        store
    }

    /// Current record snapshot
    pub fn record(&self) -> &StepRecord {
        &self.record
    }

    /// The configured daily goal
    pub fn daily_goal_steps(&self) -> u64 {
        self.daily_goal_steps
    }

    /// Reset the daily metrics when the calendar day changed
    ///
    /// Steps, distance and calories restart at zero; the coin balance is
    /// carried forward as the new lifetime base. Idempotent: calling twice
    /// within the same day changes nothing.
    pub fn check_rollover(&mut self, now: DateTime<Utc>) -> bool {
        let today = now.date_naive();
        if self.record.date == today {
            return false;
        }

        info!(
            from = %self.record.date,
            to = %today,
            carried_coins = self.record.coins,
            "day rollover, resetting daily metrics"
        );

        self.coin_base = self.record.coins;
        self.record.date = today;
        self.record.steps = 0;
        self.record.distance_km = 0.0;
        self.record.calories = 0.0;
        self.record.last_updated = now;
        true
    }

    /// Add steps on top of the current daily count
    pub fn add_steps(
        &mut self,
        count: u64,
        provenance: Provenance,
        now: DateTime<Utc>,
    ) -> CommitOutcome {
        self.check_rollover(now);
        let total = self.record.steps.saturating_add(count);
        self.commit(total, provenance, now)
    }

    /// Replace the daily count with an absolute total (external sync)
    pub fn set_steps(
        &mut self,
        total: u64,
        provenance: Provenance,
        now: DateTime<Utc>,
    ) -> CommitOutcome {
        self.check_rollover(now);
        self.commit(total, provenance, now)
    }

    /// Explicit user reset of the daily metrics
    ///
    /// Today's earned coins fall out of the total; the lifetime base stays.
    pub fn reset_daily(&mut self, now: DateTime<Utc>) -> CommitOutcome {
        self.check_rollover(now);
        self.commit(0, Provenance::Manual, now)
    }

    fn commit(&mut self, total_steps: u64, provenance: Provenance, now: DateTime<Utc>) -> CommitOutcome {
        let prev_steps = self.record.steps;
        let prev_coins = self.record.coins;

        self.record.steps = total_steps;
        self.record.distance_km = rewards::distance_km(total_steps);
        self.record.calories = rewards::calories(total_steps);
        self.record.coins = self.coin_base + rewards::coins(total_steps);
        self.record.last_updated = now;
        self.record.source = provenance;

        let coins_earned = self.record.coins.saturating_sub(prev_coins);
        let goal_reached =
            prev_steps < self.daily_goal_steps && total_steps >= self.daily_goal_steps;

        debug!(
            steps = total_steps,
            coins = self.record.coins,
            coins_earned,
            goal_reached,
            source = ?provenance,
            "record committed"
        );
        metrics::counter!("step_tracker_commits_total").increment(1);
        metrics::gauge!("step_tracker_daily_steps").set(total_steps as f64);

        CommitOutcome {
            record: self.record.clone(),
            coins_earned,
            goal_reached,
        }
    }
}
