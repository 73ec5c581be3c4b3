//! Walk Session Demo
//!
//! Drives the full pipeline with a synthetic walking source. No sensor
//! hardware required.
//!
//! Run with: cargo run --bin walk_session [config.toml]

use std::collections::HashMap;
use std::time::Duration;

use config_loader::ConfigLoader;
use contracts::{
    ConfigVersion, DetectorSettings, EngineEvent, SinkConfig, SinkType, StoreConfig,
    TrackerBlueprint, TrackerConfig,
};
use daily_store::{JsonFileStore, RecordStore as _, StoreHandle};
use ingestion::{MockWalker, WalkerConfig};
use notifier::create_router;
use observability::TrackerMetricsAggregator;
use session::{SessionConfig, TrackingSession};
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    tracing::info!("Starting Walk Session Demo");

    // ==== Stage 1: Use default config or load from file ====
    let blueprint = if let Some(path) = std::env::args().nth(1) {
        tracing::info!(path = %path, "Loading blueprint config");
        ConfigLoader::load_from_path(std::path::Path::new(&path))?
    } else {
        create_demo_blueprint()
    };

    // ==== Stage 2: Open the record store ====
    let store = JsonFileStore::new("json_store", &blueprint.store.base_path)?;
    let loaded = store.load(&blueprint.store.record_key).await?;
    if let Some(ref record) = loaded {
        tracing::info!(
            date = %record.date,
            steps = record.steps,
            coins = record.coins,
            "Loaded persisted record"
        );
    }
    let writer = StoreHandle::spawn(
        store,
        blueprint.store.record_key.clone(),
        blueprint.store.writer_queue_capacity,
    );

    // ==== Stage 3: Event routing ====
    let (events_tx, mut events_rx) =
        mpsc::channel::<EngineEvent>(blueprint.tracker.event_queue_capacity);
    let (router_tx, router_rx) =
        mpsc::channel::<EngineEvent>(blueprint.tracker.event_queue_capacity);
    let router = create_router(blueprint.sinks.clone(), router_rx)?;
    let router_handle = router.spawn();

    // ==== Stage 4: Session with a synthetic walker ====
    let walker = MockWalker::new(WalkerConfig {
        sample_rate_hz: 50.0,
        cadence_hz: 2.0,
        ..Default::default()
    });

    let (handle, session_join) = TrackingSession::spawn(
        SessionConfig::from(&blueprint.tracker),
        blueprint.to_detector_config(),
        loaded,
        Box::new(walker),
        Some(writer),
        events_tx,
    );

    handle.start().await?;
    tracing::info!("Tracking active, walking...");

    // ==== Stage 5: Walk until the target is reached ====
    let target_steps = 12u64;
    let mut metrics = TrackerMetricsAggregator::new();

    let demo_loop = async {
        while let Some(event) = events_rx.recv().await {
            metrics.observe_event(&event);

            if let EngineEvent::Milestone { milestone } = &event {
                tracing::info!(kind = milestone.kind(), "Milestone crossed");
            }

            let done = matches!(
                &event,
                EngineEvent::StateChanged { record } if record.steps >= target_steps
            );

            if router_tx.send(event).await.is_err() {
                break;
            }
            if done {
                break;
            }
        }
    };

    if tokio::time::timeout(Duration::from_secs(30), demo_loop)
        .await
        .is_err()
    {
        tracing::warn!("Demo timed out before reaching {} steps", target_steps);
    }

    // ==== Stage 6: Shutdown and report ====
    handle.stop().await?;
    let (_, record) = handle.snapshot().await?;
    handle.shutdown().await?;
    let _ = session_join.await;

    drop(router_tx);
    let _ = tokio::time::timeout(Duration::from_secs(2), router_handle).await;

    println!("\n{}", metrics.summary());
    println!(
        "Final record ({}): {} steps, {} coins, {:.2} km, {:.0} kcal",
        record.date, record.steps, record.coins, record.distance_km, record.calories
    );

    Ok(())
}

fn create_demo_blueprint() -> TrackerBlueprint {
    TrackerBlueprint {
        version: ConfigVersion::V1,
        tracker: TrackerConfig::default(),
        detector: DetectorSettings::default(),
        store: StoreConfig {
            base_path: "demo_state".to_string(),
            record_key: "daily_state".to_string(),
            writer_queue_capacity: 8,
        },
        sinks: vec![SinkConfig {
            name: "log_sink".to_string(),
            sink_type: SinkType::Log,
            queue_capacity: 100,
            params: HashMap::new(),
        }],
    }
}
