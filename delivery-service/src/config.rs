//! Delivery configuration.
//!
//! One fixed credential and one fixed conversation id per deployment, both
//! opaque to this crate. How they are provisioned is out of scope; they are
//! simply available (or not) at relay construction time.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Bot credential for the endpoint.
    #[serde(default)]
    pub bot_token: String,

    /// Target conversation identifier.
    #[serde(default)]
    pub chat_id: String,

    /// Endpoint base URL. Overridable for tests.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            chat_id: String::new(),
            api_base: default_api_base(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl DeliveryConfig {
    /// Whether both the credential and the target are present.
    pub fn is_provisioned(&self) -> bool {
        !self.bot_token.is_empty() && !self.chat_id.is_empty()
    }
}

fn default_api_base() -> String {
    "https://api.telegram.org".to_string()
}

fn default_request_timeout() -> u64 {
    15
}
