//! EngineEvent - TrackingSession output
//!
//! Events emitted toward UI collaborators. The engine never renders anything
//! itself; these are the only outward surface.

use serde::{Deserialize, Serialize};

use crate::StepRecord;

/// Tracking session lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Created, nothing started yet
    Idle,

    /// `start()` issued, waiting on the platform permission prompt
    RequestingPermission,

    /// Sensor listening, samples flowing through the pipeline
    Active,

    /// Explicitly stopped; cumulative record untouched
    Stopped,

    /// Unrecoverable until the caller retries `start()`
    Errored(String),
}

impl SessionState {
    /// Whether samples are currently being committed
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

/// A reward milestone crossed by a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Milestone {
    /// The coin balance increased
    CoinEarned { total_coins: u64, newly_earned: u64 },

    /// The daily step goal was reached
    GoalReached { steps: u64, goal: u64 },
}

impl Milestone {
    /// Stable kind label (matches the serialized tag)
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CoinEarned { .. } => "coin_earned",
            Self::GoalReached { .. } => "goal_reached",
        }
    }
}

/// Event emitted by the tracking session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EngineEvent {
    /// The daily record changed (step commit, manual entry, reset, rollover)
    StateChanged { record: StepRecord },

    /// A reward milestone was crossed
    Milestone { milestone: Milestone },

    /// A surfaced error (permission, sensor)
    Error { reason: String },
}
