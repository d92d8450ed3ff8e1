//! Outbound Delivery Service
//!
//! Converts an assembled [`OutboundMessage`] into one or more protocol-valid
//! requests to the chat endpoint: oversized text is split into ordered
//! line-aligned chunks, binary payloads travel as single multipart uploads,
//! every request is bounded by a fixed timeout, and endpoint-reported errors
//! surface verbatim. No request is ever retried here.

pub mod client;
pub mod config;
pub mod host;
pub mod markup;
pub mod splitter;
pub mod types;

pub use client::EndpointClient;
pub use config::DeliveryConfig;
pub use host::{delivery_channel, serve};
pub use markup::{bold, escape_markup, pre, truncate_caption, CAPTION_LIMIT};
pub use splitter::{split_message, MESSAGE_LIMIT};
pub use types::{DeliveryError, DeliveryReceipt, OutboundMessage};
