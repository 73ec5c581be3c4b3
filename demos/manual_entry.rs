//! Manual Entry Demo
//!
//! Exercises the command path only: manual step additions and a daily reset
//! flow through the same reward pipeline as sensor detection, without ever
//! starting the sensor.
//!
//! Run with: cargo run --bin manual_entry

use contracts::{DetectorConfig, EngineEvent};
use ingestion::{MockWalker, WalkerConfig};
use session::{SessionConfig, TrackingSession};
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let (events_tx, mut events_rx) = mpsc::channel(256);
    let (handle, join) = TrackingSession::spawn(
        SessionConfig {
            daily_goal_steps: 1500,
            command_queue_capacity: 64,
        },
        DetectorConfig::strict(),
        None,
        Box::new(MockWalker::new(WalkerConfig::default())),
        None,
        events_tx,
    );

    // Commands work from any state; the sensor never starts here.
    let record = handle.add_steps(800).await?;
    println!(
        "after 800 manual steps: {} steps, {} coins",
        record.steps, record.coins
    );

    let record = handle.add_steps(500).await?;
    println!(
        "after 500 more: {} steps, {} coins, {:.2} km, {:.0} kcal",
        record.steps, record.coins, record.distance_km, record.calories
    );

    match handle.add_steps(0).await {
        Err(e) => println!("zero steps rejected: {e}"),
        Ok(_) => unreachable!("zero manual steps must be rejected"),
    }

    let record = handle.reset_daily().await?;
    println!(
        "after reset: {} steps, {} coins (today's coin forfeited)",
        record.steps, record.coins
    );

    handle.shutdown().await?;
    join.await?;

    // Every commit surfaced an event for the UI layer.
    println!("\nemitted events:");
    while let Ok(event) = events_rx.try_recv() {
        match event {
            EngineEvent::StateChanged { record } => println!(
                "  state_changed: {} steps ({:?})",
                record.steps, record.source
            ),
            EngineEvent::Milestone { milestone } => println!("  milestone: {}", milestone.kind()),
            EngineEvent::Error { reason } => println!("  error: {reason}"),
        }
    }

    Ok(())
}
