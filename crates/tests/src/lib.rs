//! # Integration Tests
//!
//! Cross-crate end-to-end tests.
//!
//! Covers:
//! - Full pipeline runs (source -> session -> store -> notifier)
//! - Reward arithmetic observed through the real actor
//! - Persistence behavior across restarts and failures

#[cfg(test)]
mod contract_tests {
    #[test]
    fn test_contracts_compile() {
        // The frozen ICD stays constructible.
        let _ = contracts::ConfigVersion::V1;
        let _ = contracts::DetectorConfig::simple();
    }
}

#[cfg(test)]
mod reward_property_tests {
    use step_engine::rewards;

    /// The reward mappings are pure and total-count-based: recomputing from
    /// any cumulative step value reproduces the same outputs.
    #[test]
    fn test_rewards_hold_over_range() {
        for steps in 0..=20_000u64 {
            assert_eq!(rewards::coins(steps), steps / 1000);
            assert_eq!(rewards::calories(steps), (steps as f64 * 0.04).round());

            let distance = rewards::distance_km(steps);
            // Exactly two decimals, close to the unrounded value.
            assert!(
                (distance * 100.0 - (distance * 100.0).round()).abs() < 1e-9,
                "distance {distance} not two-decimal at {steps} steps"
            );
            assert!((distance - steps as f64 * 0.0007).abs() <= 0.005 + 1e-9);

            // Deterministic: a second evaluation is bit-for-bit identical.
            assert_eq!(distance, rewards::distance_km(steps));
        }
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use chrono::{Duration as ChronoDuration, Utc};
    use contracts::{
        DetectorConfig, EngineError, EngineEvent, Milestone, MotionCallback, MotionSample,
        MotionSource, PermissionDecision, Provenance, RecordStore as _, SessionState, SinkConfig,
        SinkType, StepRecord,
    };
    use daily_store::{JsonFileStore, StoreHandle};
    use ingestion::{ExternalSyncPoller, MockStepProvider, MockWalker, WalkerConfig};
    use notifier::create_router;
    use session::{SessionConfig, SessionHandle, TrackingSession};
    use tokio::sync::mpsc;
    use tokio::task::JoinHandle;
    use tokio::time::{sleep, Duration};

    /// Inert granting source for tests that feed samples by hand
    struct StubSource {
        listening: Arc<AtomicBool>,
    }

    impl StubSource {
        fn new() -> Self {
            Self {
                listening: Arc::new(AtomicBool::new(false)),
            }
        }
    }

    impl MotionSource for StubSource {
        fn source_id(&self) -> &str {
            "stub_source"
        }

        fn request_permission(&self) -> Result<PermissionDecision, EngineError> {
            Ok(PermissionDecision::Granted)
        }

        fn listen(&self, _callback: MotionCallback) -> Result<(), EngineError> {
            self.listening.store(true, Ordering::SeqCst);
            Ok(())
        }

        fn stop(&self) {
            self.listening.store(false, Ordering::SeqCst);
        }

        fn is_listening(&self) -> bool {
            self.listening.load(Ordering::SeqCst)
        }
    }

    fn spawn_stub_session(
        event_capacity: usize,
    ) -> (SessionHandle, mpsc::Receiver<EngineEvent>, JoinHandle<()>) {
        let (events_tx, events_rx) = mpsc::channel(event_capacity);
        let (handle, join) = TrackingSession::spawn(
            SessionConfig {
                daily_goal_steps: 10_000,
                command_queue_capacity: 1024,
            },
            DetectorConfig::simple(),
            None,
            Box::new(StubSource::new()),
            None,
            events_tx,
        );
        (handle, events_rx, join)
    }

    /// Gravity baseline at the given sample period with magnitude spikes
    fn spiked_trace(duration_ms: u64, period_ms: u64, spike_times: &[u64]) -> Vec<MotionSample> {
        let mut samples = Vec::new();
        let mut t = 0u64;
        while t <= duration_ms {
            let z = if spike_times.contains(&t) { 12.5 } else { 9.81 };
            samples.push(MotionSample::new(0.0, 0.0, z, t));
            t += period_ms;
        }
        samples
    }

    /// Poll snapshots until the daily count reaches `min_steps`
    async fn wait_for_steps(handle: &SessionHandle, min_steps: u64, wait: Duration) -> StepRecord {
        let deadline = tokio::time::Instant::now() + wait;
        loop {
            let (_, record) = handle.snapshot().await.expect("session alive");
            if record.steps >= min_steps {
                return record;
            }
            assert!(
                tokio::time::Instant::now() < deadline,
                "timed out waiting for {} steps, got {}",
                min_steps,
                record.steps
            );
            sleep(Duration::from_millis(20)).await;
        }
    }

    /// End-to-end: MockWalker -> TrackingSession -> EventRouter
    ///
    /// A synthetic gait at 2 Hz must produce committed sensor steps and the
    /// router must drain without stalling the session.
    #[tokio::test]
    async fn test_e2e_mock_walker_pipeline() {
        let (events_tx, events_rx) = mpsc::channel::<EngineEvent>(1024);

        let sink_configs = vec![SinkConfig {
            name: "test_log".to_string(),
            sink_type: SinkType::Log,
            queue_capacity: 100,
            params: HashMap::new(),
        }];
        let router = create_router(sink_configs, events_rx).unwrap();
        let router_handle = router.spawn();

        let walker = MockWalker::new(WalkerConfig {
            sample_rate_hz: 50.0,
            cadence_hz: 2.0,
            ..Default::default()
        });

        let (handle, join) = TrackingSession::spawn(
            SessionConfig::default(),
            DetectorConfig::simple(),
            None,
            Box::new(walker),
            None,
            events_tx,
        );

        handle.start().await.unwrap();
        let record = wait_for_steps(&handle, 3, Duration::from_secs(10)).await;
        assert_eq!(record.source, Provenance::Sensor);

        handle.stop().await.unwrap();
        handle.shutdown().await.unwrap();
        join.await.unwrap();

        // Session gone -> event channel closed -> router drains and exits.
        tokio::time::timeout(Duration::from_secs(2), router_handle)
            .await
            .expect("router should shut down")
            .unwrap();
    }

    /// 1000 validated steps must land exactly on the reward table
    #[tokio::test]
    async fn test_thousand_steps_match_reward_table() {
        let (handle, mut events_rx, join) = spawn_stub_session(4096);
        handle.start().await.unwrap();

        // One clean spike every 500 ms, a thousand times over.
        let spikes: Vec<u64> = (1..=1000u64).map(|i| i * 500).collect();
        for sample in spiked_trace(500_200, 100, &spikes) {
            handle.feed_sample(sample).await.unwrap();
        }

        let (_, record) = handle.snapshot().await.unwrap();
        assert_eq!(record.steps, 1000);
        assert_eq!(record.coins, 1);
        assert_eq!(record.distance_km, 0.70);
        assert_eq!(record.calories, 40.0);

        let mut coin_milestones = 0;
        while let Ok(event) = events_rx.try_recv() {
            if let EngineEvent::Milestone {
                milestone: Milestone::CoinEarned { total_coins, .. },
            } = event
            {
                assert_eq!(total_coins, 1);
                coin_milestones += 1;
            }
        }
        assert_eq!(coin_milestones, 1, "the 1000th step earns exactly one coin");

        handle.shutdown().await.unwrap();
        join.await.unwrap();
    }

    /// Two peaks 150 ms apart are one step, not two
    #[tokio::test]
    async fn test_rapid_double_trigger_commits_one_step() {
        let (handle, _events, join) = spawn_stub_session(256);
        handle.start().await.unwrap();

        for sample in spiked_trace(1500, 50, &[1000, 1150]) {
            handle.feed_sample(sample).await.unwrap();
        }

        let (_, record) = handle.snapshot().await.unwrap();
        assert_eq!(record.steps, 1, "the echo peak must be rejected");

        handle.shutdown().await.unwrap();
        join.await.unwrap();
    }

    /// A record persisted yesterday loads as a fresh day with coins intact
    #[tokio::test]
    async fn test_rollover_preserves_lifetime_coins() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::new("json_store", dir.path()).unwrap();

        let yesterday = Utc::now() - ChronoDuration::days(1);
        store
            .save(
                "daily_state",
                &StepRecord {
                    date: yesterday.date_naive(),
                    steps: 2500,
                    coins: 2,
                    distance_km: 1.75,
                    calories: 100.0,
                    last_updated: yesterday,
                    source: Provenance::Sensor,
                },
            )
            .await
            .unwrap();

        let loaded = store.load("daily_state").await.unwrap();
        let (events_tx, _events_rx) = mpsc::channel(256);
        let (handle, join) = TrackingSession::spawn(
            SessionConfig::default(),
            DetectorConfig::simple(),
            loaded,
            Box::new(StubSource::new()),
            None,
            events_tx,
        );

        let (_, record) = handle.snapshot().await.unwrap();
        assert_eq!(record.date, Utc::now().date_naive());
        assert_eq!(record.steps, 0, "daily metrics reset");
        assert_eq!(record.distance_km, 0.0);
        assert_eq!(record.coins, 2, "lifetime coins carried forward");

        // A second check within the same day must change nothing.
        assert!(handle.trigger_rollover_check());
        let (_, again) = handle.snapshot().await.unwrap();
        assert_eq!(again, record);

        handle.shutdown().await.unwrap();
        join.await.unwrap();
    }

    /// Persistence failures never interrupt tracking
    #[tokio::test]
    async fn test_persistence_failures_do_not_interrupt_tracking() {
        /// Store whose writes always fail
        struct FailingStore;

        impl contracts::RecordStore for FailingStore {
            fn name(&self) -> &str {
                "failing_store"
            }

            async fn load(&self, _key: &str) -> Result<Option<StepRecord>, EngineError> {
                Ok(None)
            }

            async fn save(&mut self, key: &str, _record: &StepRecord) -> Result<(), EngineError> {
                Err(EngineError::persistence(key, "disk on fire"))
            }
        }

        let writer = StoreHandle::spawn(FailingStore, "daily_state", 8);
        let writer_metrics = Arc::clone(writer.metrics());

        let (events_tx, _events_rx) = mpsc::channel(256);
        let (handle, join) = TrackingSession::spawn(
            SessionConfig::default(),
            DetectorConfig::simple(),
            None,
            Box::new(StubSource::new()),
            Some(writer),
            events_tx,
        );

        handle.add_steps(700).await.unwrap();
        let record = handle.add_steps(400).await.unwrap();
        assert_eq!(record.steps, 1100);
        assert_eq!(record.coins, 1);

        sleep(Duration::from_millis(50)).await;
        assert!(
            writer_metrics.failure_count() > 0,
            "failed writes must be counted"
        );

        // The in-memory record stays authoritative.
        let (state, record) = handle.snapshot().await.unwrap();
        assert_eq!(state, SessionState::Idle, "store trouble never errors the session");
        assert_eq!(record.steps, 1100);

        handle.shutdown().await.unwrap();
        join.await.unwrap();
    }

    /// Platform step services flow through the same commit path
    #[tokio::test]
    async fn test_external_sync_sets_absolute_totals() {
        let (handle, _events, join) = spawn_stub_session(256);

        let provider = Arc::new(MockStepProvider::new("mock_health", 2345));
        let poller = ExternalSyncPoller::new(provider.clone(), Duration::from_millis(10));
        poller.start(handle.external_sync_callback());

        let record = wait_for_steps(&handle, 2345, Duration::from_secs(2)).await;
        assert_eq!(record.steps, 2345);
        assert_eq!(record.source, Provenance::ExternalSync);
        assert_eq!(record.coins, 2);

        provider.set_total(2400);
        let record = wait_for_steps(&handle, 2400, Duration::from_secs(2)).await;
        assert_eq!(record.steps, 2400);

        poller.stop();
        handle.shutdown().await.unwrap();
        join.await.unwrap();
    }

    /// A blueprint wires the whole pipeline, and the record survives restart
    #[tokio::test]
    async fn test_blueprint_run_persists_across_restart() {
        let dir = tempfile::tempdir().unwrap();
        let toml = format!(
            r#"
[tracker]
daily_goal_steps = 10000

[detector]
profile = "simple"

[store]
base_path = "{}"

[[sinks]]
name = "log"
sink_type = "log"
"#,
            dir.path().display()
        );
        let blueprint =
            config_loader::ConfigLoader::load_from_str(&toml, config_loader::ConfigFormat::Toml)
                .unwrap();

        // First run: walk a few steps, then shut down cleanly.
        let store = JsonFileStore::new("json_store", &blueprint.store.base_path).unwrap();
        let loaded = store.load(&blueprint.store.record_key).await.unwrap();
        assert!(loaded.is_none());

        let writer = StoreHandle::spawn(
            store,
            blueprint.store.record_key.clone(),
            blueprint.store.writer_queue_capacity,
        );

        let (events_tx, events_rx) = mpsc::channel(blueprint.tracker.event_queue_capacity);
        let router = create_router(blueprint.sinks.clone(), events_rx).unwrap();
        let router_handle = router.spawn();

        let walker = MockWalker::new(WalkerConfig {
            sample_rate_hz: 50.0,
            cadence_hz: 2.5,
            ..Default::default()
        });
        let (handle, join) = TrackingSession::spawn(
            SessionConfig::from(&blueprint.tracker),
            blueprint.to_detector_config(),
            loaded,
            Box::new(walker),
            Some(writer),
            events_tx,
        );

        handle.start().await.unwrap();
        wait_for_steps(&handle, 2, Duration::from_secs(10)).await;

        handle.stop().await.unwrap();
        let (_, final_record) = handle.snapshot().await.unwrap();
        handle.shutdown().await.unwrap();
        join.await.unwrap();
        let _ = tokio::time::timeout(Duration::from_secs(2), router_handle).await;

        // Second run: the persisted record comes back verbatim.
        let store = JsonFileStore::new("json_store", &blueprint.store.base_path).unwrap();
        let persisted = store
            .load(&blueprint.store.record_key)
            .await
            .unwrap()
            .expect("record persisted on shutdown");
        assert_eq!(persisted, final_record);
    }
}
