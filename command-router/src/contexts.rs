//! Context wiring.
//!
//! Stands up the other two contexts around the dispatcher: the page context
//! (extraction responders over a fresh snapshot per request) and the
//! privileged relay context (the delivery host behind a frame pump). Neither
//! shares state with the dispatcher — only envelopes cross.

use std::sync::Arc;

use serde_json::Value;
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tracing::error;

use content_extractor::{
    identify_environment, EnvironmentId, ExtractorRegistry, SnapshotSource,
};
use context_bridge::{spawn_frame_pump, ChannelSet, MessageBus, Responder};
use delivery_service::{delivery_channel, serve, EndpointClient};

use crate::config::PageConfig;

/// The unprivileged page context: owns the snapshot source and the extractor
/// registry, and answers the session's extraction channels.
pub struct PageContext {
    registry: ExtractorRegistry,
    source: Arc<dyn SnapshotSource>,
    cell_deadline: Duration,
    problem_deadline: Duration,
}

impl PageContext {
    pub fn new(registry: ExtractorRegistry, source: Arc<dyn SnapshotSource>) -> Self {
        let defaults = PageConfig::default();
        Self::with_deadlines(registry, source, &defaults)
    }

    pub fn with_deadlines(
        registry: ExtractorRegistry,
        source: Arc<dyn SnapshotSource>,
        config: &PageConfig,
    ) -> Self {
        Self {
            registry,
            source,
            cell_deadline: Duration::from_millis(config.cell_deadline_ms),
            problem_deadline: Duration::from_millis(config.problem_deadline_ms),
        }
    }

    /// Spawn responders for all three extraction channels.
    pub fn spawn(self, bus: MessageBus, channels: &ChannelSet) -> Vec<JoinHandle<()>> {
        let responder = Responder::new(bus);
        let context = Arc::new(self);

        let cell_context = context.clone();
        let cell = responder.serve(channels.cell.clone(), move |_| {
            let context = cell_context.clone();
            async move { context.cell_request().await }
        });

        let problem_context = context.clone();
        let problem = responder.serve(channels.problem.clone(), move |_| {
            let context = problem_context.clone();
            async move { context.problem_request().await }
        });

        let document_context = context;
        let document = responder.serve(channels.document.clone(), move |_| {
            let context = document_context.clone();
            async move { context.document_request() }
        });

        vec![cell, problem, document]
    }

    async fn cell_request(&self) -> Value {
        let Some(snapshot) = self.source.snapshot() else {
            return Value::Null;
        };
        match self
            .registry
            .extract(&EnvironmentId::Notebook, &snapshot, self.cell_deadline)
            .await
        {
            Some(bundle) => serde_json::to_value(bundle).unwrap_or(Value::Null),
            None => Value::Null,
        }
    }

    async fn problem_request(&self) -> Value {
        let Some(snapshot) = self.source.snapshot() else {
            return Value::Null;
        };
        let environment = identify_environment(&snapshot);
        if environment == EnvironmentId::Notebook {
            // The problem channel has nothing to say about a notebook
            // surface; the cell channel owns it.
            return Value::Null;
        }
        match self
            .registry
            .extract(&environment, &snapshot, self.problem_deadline)
            .await
        {
            Some(bundle) => serde_json::to_value(bundle).unwrap_or(Value::Null),
            None => Value::Null,
        }
    }

    fn document_request(&self) -> Value {
        self.source
            .snapshot()
            .and_then(|snapshot| snapshot.document)
            .and_then(|document| serde_json::to_value(document).ok())
            .unwrap_or(Value::Null)
    }
}

/// Stand up the privileged relay context in-process: a duplex stream with
/// the delivery host on the far side and a frame pump bridging the bus to
/// it. Deployments that want the relay out-of-process run the `relay-host`
/// binary over stdio instead.
pub fn spawn_relay_context(bus: MessageBus, client: EndpointClient) -> JoinHandle<()> {
    let (near, far) = tokio::io::duplex(256 * 1024);
    spawn_frame_pump(near, bus, std::slice::from_ref(&delivery_channel()));

    let (reader, writer) = tokio::io::split(far);
    tokio::spawn(async move {
        if let Err(e) = serve(reader, writer, client).await {
            error!("relay context stopped: {e}");
        }
    })
}
