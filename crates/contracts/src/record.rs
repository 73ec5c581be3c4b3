//! StepRecord - DailyStateStore output
//!
//! The persisted day-scoped accumulation of steps and derived rewards.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Where a record update originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// On-device motion sensor detection
    #[default]
    Sensor,

    /// Manual user entry
    Manual,

    /// Absolute totals pushed by a platform step service
    ExternalSync,
}

/// The daily step record, one per calendar day.
///
/// Owned exclusively by the daily state store and mutated only through its
/// commit operations. On day rollover the daily metrics are replaced, not
/// merged; `coins` carries forward as a lifetime balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    /// Calendar day the daily metrics belong to (ISO date)
    pub date: NaiveDate,

    /// Cumulative validated steps for the day
    pub steps: u64,

    /// Lifetime coin balance (1 coin per 1000 steps, carried across days)
    pub coins: u64,

    /// Distance walked today, kilometers, rounded to 2 decimals
    pub distance_km: f64,

    /// Calories burned today (0.04 kcal per step, rounded)
    pub calories: f64,

    /// Timestamp of the last commit (ISO-8601, UTC)
    pub last_updated: DateTime<Utc>,

    /// Provenance of the last commit
    pub source: Provenance,
}

impl StepRecord {
    /// Create an empty record for the given day
    pub fn fresh(date: NaiveDate, now: DateTime<Utc>) -> Self {
        Self {
            date,
            steps: 0,
            coins: 0,
            distance_km: 0.0,
            calories: 0.0,
            last_updated: now,
            source: Provenance::default(),
        }
    }
}
