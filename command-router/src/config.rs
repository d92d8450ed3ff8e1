//! Host configuration.
//!
//! Loaded from TOML with per-field defaults; a missing or unparseable file
//! falls back to defaults rather than refusing to start.

use std::path::PathBuf;

use delivery_service::DeliveryConfig;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub bridge: BridgeConfig,

    #[serde(default)]
    pub page: PageConfig,

    #[serde(default)]
    pub delivery: DeliveryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Whether the host runs at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_level: "info".to_string(),
        }
    }
}

/// Bridge request timeouts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Timeout for locally available content (the active cell, the open
    /// document).
    #[serde(default = "default_cell_timeout")]
    pub cell_timeout_ms: u64,

    /// Timeout for content that may need a remote round trip (problem
    /// statements).
    #[serde(default = "default_problem_timeout")]
    pub problem_timeout_ms: u64,

    /// Timeout for one delivery request. Generous: a chunked text delivery
    /// holds the bridge slot for all of its sequential endpoint calls.
    #[serde(default = "default_relay_timeout")]
    pub relay_timeout_ms: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            cell_timeout_ms: default_cell_timeout(),
            problem_timeout_ms: default_problem_timeout(),
            relay_timeout_ms: default_relay_timeout(),
        }
    }
}

/// Page-context settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageConfig {
    /// Where the surface snapshot JSON is read from. Unset means no surface.
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,

    /// Extraction deadline for local content; kept inside the bridge's cell
    /// timeout so the responder answers before the caller gives up.
    #[serde(default = "default_cell_deadline")]
    pub cell_deadline_ms: u64,

    /// Extraction deadline for content involving a remote round trip.
    #[serde(default = "default_problem_deadline")]
    pub problem_deadline_ms: u64,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            snapshot_path: None,
            cell_deadline_ms: default_cell_deadline(),
            problem_deadline_ms: default_problem_deadline(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_cell_timeout() -> u64 {
    3000
}

fn default_problem_timeout() -> u64 {
    5000
}

fn default_relay_timeout() -> u64 {
    90_000
}

fn default_cell_deadline() -> u64 {
    2500
}

fn default_problem_deadline() -> u64 {
    4500
}

impl Config {
    /// Load configuration from the default path.
    pub fn load() -> Self {
        Self::load_from_path(Self::default_config_path())
    }

    /// Load configuration from a specific path.
    pub fn load_from_path(path: PathBuf) -> Self {
        match std::fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    info!("Loaded configuration from {:?}", path);
                    config
                }
                Err(e) => {
                    warn!("Failed to parse config file: {}, using defaults", e);
                    Self::default()
                }
            },
            Err(_) => {
                info!("No config file found at {:?}, using defaults", path);
                Self::default()
            }
        }
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("cellcast")
            .join("config.toml")
    }

    /// Save configuration to a specific path.
    pub fn save_to_path(&self, path: PathBuf) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;

        std::fs::write(&path, contents)?;
        info!("Saved configuration to {:?}", path);
        Ok(())
    }
}
