//! Cellcast host - main entry point
//!
//! Long-running host that wires the three contexts together and drives the
//! dispatcher from command lines on stdin. Commands: `send`, `output`,
//! `copy`, `doc` (or their full names), `quit` to exit.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use command_router::{
    spawn_relay_context, BridgeTimeouts, Command, Config, Dispatcher, PageContext, SystemClipboard,
};
use content_extractor::{
    identify_environment, EnvironmentId, ExtractorRegistry, FileSnapshotSource, SnapshotSource,
    StaticSnapshotSource,
};
use context_bridge::{BridgeClient, ChannelSet, MessageBus};
use delivery_service::{delivery_channel, EndpointClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting cellcast host");

    let config = Config::load();
    if !config.general.enabled {
        info!("Host is disabled in configuration, exiting");
        return Ok(());
    }

    // Per-session channels; the delivery channel is the one fixed pair.
    let channels = ChannelSet::generate();
    let bus = MessageBus::new(64);

    // Page context: extraction responders over a fresh snapshot per request.
    let source: Arc<dyn SnapshotSource> = match &config.page.snapshot_path {
        Some(path) => Arc::new(FileSnapshotSource::new(path.clone())),
        None => Arc::new(StaticSnapshotSource::empty()),
    };
    PageContext::with_deadlines(ExtractorRegistry::new(), source.clone(), &config.page)
        .spawn(bus.clone(), &channels);

    // Privileged context: the delivery host behind the frame pump.
    let client = EndpointClient::new(config.delivery.clone())?;
    spawn_relay_context(bus.clone(), client);

    let dispatcher = Dispatcher::new(
        BridgeClient::new(bus),
        channels,
        delivery_channel(),
        BridgeTimeouts::from(&config.bridge),
        Box::new(SystemClipboard),
    );

    info!("Commands: send | output | copy | doc | quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                break;
            }
        };

        let Some(line) = line else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input == "quit" || input == "exit" {
            break;
        }

        let Some(command) = Command::parse(input) else {
            println!("unknown command: {input}");
            continue;
        };

        // Environment detection probes the same surface the page context
        // serves from; only the identification happens on this side.
        let environment = source
            .snapshot()
            .map(|snapshot| identify_environment(&snapshot))
            .unwrap_or(EnvironmentId::Unknown);

        let status = dispatcher.invoke(command, environment).await;
        println!("{status}");
    }

    Ok(())
}
