//! LogSink - surfaces events via tracing
//!
//! The toast/alert analog: milestones come out as human-readable lines,
//! record changes and errors as structured fields.

use contracts::{EngineError, EngineEvent, EventSink, Milestone};
use tracing::{info, instrument, warn};

/// Sink that logs engine events
pub struct LogSink {
    name: String,
}

impl LogSink {
    /// Create a new LogSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn log_event(&self, event: &EngineEvent) {
        match event {
            EngineEvent::StateChanged { record } => {
                info!(
                    sink = %self.name,
                    date = %record.date,
                    steps = record.steps,
                    coins = record.coins,
                    distance_km = record.distance_km,
                    calories = record.calories,
                    source = ?record.source,
                    "step record updated"
                );
            }
            EngineEvent::Milestone { milestone } => match milestone {
                Milestone::CoinEarned {
                    total_coins,
                    newly_earned,
                } => {
                    info!(
                        sink = %self.name,
                        total_coins,
                        newly_earned,
                        "coin earned! balance is now {total_coins}"
                    );
                }
                Milestone::GoalReached { steps, goal } => {
                    info!(
                        sink = %self.name,
                        steps,
                        goal,
                        "daily goal reached at {steps} steps"
                    );
                }
            },
            EngineEvent::Error { reason } => {
                warn!(sink = %self.name, reason = %reason, "engine error surfaced");
            }
        }
    }
}

impl EventSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_sink_write",
        skip(self, event),
        fields(sink = %self.name)
    )]
    async fn write(&mut self, event: &EngineEvent) -> Result<(), EngineError> {
        self.log_event(event);
        Ok(())
    }

    #[instrument(name = "log_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), EngineError> {
        // Nothing to flush for log sink
        Ok(())
    }

    #[instrument(name = "log_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), EngineError> {
        info!(sink = %self.name, "LogSink closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_sink_write() {
        let mut sink = LogSink::new("test_log");
        let event = EngineEvent::Milestone {
            milestone: Milestone::GoalReached {
                steps: 10_000,
                goal: 10_000,
            },
        };

        let result = sink.write(&event).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_log_sink_name() {
        let sink = LogSink::new("my_logger");
        assert_eq!(sink.name(), "my_logger");
    }
}
