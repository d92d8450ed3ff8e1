//! Delivery payload and error types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One payload handed to the relay. Ephemeral: exists for a single delivery
/// call and is never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutboundMessage {
    /// Markup-formatted text; split into ordered chunks when oversized.
    Text { body: String },
    /// A single base64-encoded PNG, sent as one multipart request.
    Image {
        base64: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
    },
    /// A single text document, sent as one multipart request.
    Document {
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        filename: Option<String>,
    },
}

/// Why a delivery failed.
///
/// The variants mirror what the user must be told: the endpoint's own words,
/// a connectivity problem, a deadline, or absent credentials. Nothing here is
/// retried automatically.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("missing configuration")]
    ConfigurationMissing,

    #[error("request timed out")]
    Timeout,

    /// The endpoint answered with `ok: false`; carries its description
    /// verbatim.
    #[error("{0}")]
    Rejected(String),

    #[error("no network: {0}")]
    Transport(String),

    /// The payload itself was unusable (e.g. malformed base64 image data).
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
}

/// Outcome frame answered by the relay context for one delivery request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryReceipt {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Set when the failure was the delivery deadline, which callers absorb
    /// as a neutral outcome rather than an error.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub timed_out: bool,
}

impl DeliveryReceipt {
    pub fn success() -> Self {
        Self {
            ok: true,
            error: None,
            timed_out: false,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(error.into()),
            timed_out: false,
        }
    }

    pub fn from_error(error: &DeliveryError) -> Self {
        Self {
            ok: false,
            error: Some(error.to_string()),
            timed_out: matches!(error, DeliveryError::Timeout),
        }
    }
}
