//! Relay Host - standalone privileged relay over stdio
//!
//! Deployment variant of the privileged context: the sandboxed side launches
//! this binary and exchanges length-prefixed delivery frames with it over
//! stdin/stdout. Logging goes to stderr; stdout carries only frames.

use std::path::PathBuf;

use serde::Deserialize;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use delivery_service::{serve, DeliveryConfig, EndpointClient};

/// The host reads only the delivery table of the shared config file.
#[derive(Debug, Default, Deserialize)]
struct HostConfig {
    #[serde(default)]
    delivery: DeliveryConfig,
}

fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cellcast")
        .join("config.toml")
}

fn load_delivery_config() -> DeliveryConfig {
    let path = config_path();
    match std::fs::read_to_string(&path) {
        Ok(contents) => match toml::from_str::<HostConfig>(&contents) {
            Ok(config) => config.delivery,
            Err(e) => {
                warn!("Failed to parse config file: {}, using defaults", e);
                DeliveryConfig::default()
            }
        },
        Err(_) => {
            info!("No config file found at {:?}, using defaults", path);
            DeliveryConfig::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // stdout belongs to the frame protocol; all diagnostics go to stderr.
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let delivery = load_delivery_config();
    if !delivery.is_provisioned() {
        // Still serve: every delivery answers "missing configuration", which
        // the far side surfaces to the user.
        warn!("Delivery credentials not provisioned");
    }

    let client = EndpointClient::new(delivery)?;
    info!("Relay host started");

    serve(tokio::io::stdin(), tokio::io::stdout(), client).await?;
    Ok(())
}
