//! EventRouter - main loop for fan-out to sinks

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};

use contracts::{EngineEvent, SinkConfig, SinkType};

use crate::error::NotifierError;
use crate::handle::SinkHandle;
use crate::metrics::MetricsSnapshot;
use crate::sinks::{FileSink, LogSink};

/// Router configuration
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Sink configurations
    pub sinks: Vec<SinkConfig>,
}

/// Builder for creating an EventRouter
pub struct RouterBuilder {
    config: RouterConfig,
    input_rx: mpsc::Receiver<EngineEvent>,
}

impl RouterBuilder {
    /// Create a new RouterBuilder
    pub fn new(config: RouterConfig, input_rx: mpsc::Receiver<EngineEvent>) -> Self {
        Self { config, input_rx }
    }

    /// Build and start the router
    #[instrument(name = "router_builder_build", skip(self))]
    pub fn build(self) -> Result<EventRouter, NotifierError> {
        let handles = Self::initialize_handles(&self.config)?;

        Ok(EventRouter {
            handles,
            input_rx: self.input_rx,
        })
    }

    #[instrument(
        name = "router_initialize_handles",
        skip(config),
        fields(sink_count = config.sinks.len())
    )]
    fn initialize_handles(config: &RouterConfig) -> Result<Vec<SinkHandle>, NotifierError> {
        let mut handles = Vec::with_capacity(config.sinks.len());
        for sink_config in &config.sinks {
            handles.push(create_sink_handle(sink_config)?);
        }
        Ok(handles)
    }
}

/// Create a SinkHandle from configuration
#[instrument(
    name = "router_create_sink_handle",
    skip(config),
    fields(sink = %config.name, sink_type = ?config.sink_type)
)]
fn create_sink_handle(config: &SinkConfig) -> Result<SinkHandle, NotifierError> {
    match config.sink_type {
        SinkType::Log => {
            let sink = LogSink::new(&config.name);
            Ok(SinkHandle::spawn(sink, config.queue_capacity))
        }
        SinkType::File => {
            let sink = FileSink::from_params(&config.name, &config.params)
                .map_err(|e| NotifierError::sink_creation(&config.name, e.to_string()))?;
            Ok(SinkHandle::spawn(sink, config.queue_capacity))
        }
    }
}

/// The main EventRouter that fans out events to sinks
pub struct EventRouter {
    handles: Vec<SinkHandle>,
    input_rx: mpsc::Receiver<EngineEvent>,
}

impl EventRouter {
    /// Create a router with custom sink handles (for testing)
    pub fn with_handles(handles: Vec<SinkHandle>, input_rx: mpsc::Receiver<EngineEvent>) -> Self {
        Self { handles, input_rx }
    }

    /// Get metrics for all sinks
    pub fn metrics(&self) -> Vec<(String, MetricsSnapshot)> {
        self.handles
            .iter()
            .map(|h| (h.name().to_string(), h.metrics().snapshot()))
            .collect()
    }

    /// Run the router main loop
    ///
    /// Consumes events from input and fans out to all sinks.
    /// Returns when the input channel is closed.
    #[instrument(name = "router_run", skip(self))]
    pub async fn run(mut self) {
        info!(sinks = self.handles.len(), "EventRouter started");

        let mut event_count: u64 = 0;

        while let Some(event) = self.input_rx.recv().await {
            event_count += 1;
            self.route_event(&event);

            if event_count.is_multiple_of(100) {
                debug!(events = event_count, "EventRouter progress");
            }
        }

        info!(
            events = event_count,
            "EventRouter input closed, shutting down"
        );

        Self::shutdown_handles(self.handles).await;

        info!("EventRouter shutdown complete");
    }

    /// Spawn the router as a background task
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    fn route_event(&self, event: &EngineEvent) {
        for handle in &self.handles {
            handle.try_send(event.clone());
        }
    }

    async fn shutdown_handles(handles: Vec<SinkHandle>) {
        for handle in handles {
            handle.shutdown().await;
        }
    }
}

/// Convenience function to create a router from sink configs
#[instrument(name = "router_create", skip(sink_configs, input_rx))]
pub fn create_router(
    sink_configs: Vec<SinkConfig>,
    input_rx: mpsc::Receiver<EngineEvent>,
) -> Result<EventRouter, NotifierError> {
    let config = RouterConfig {
        sinks: sink_configs,
    };
    RouterBuilder::new(config, input_rx).build()
}
