//! HTTP client for the chat endpoint.
//!
//! Speaks the Bot-API wire shape: `sendMessage` as JSON, `sendPhoto` and
//! `sendDocument` as multipart form uploads. Every request shares one fixed
//! timeout; a timeout, a transport failure and an endpoint rejection each
//! surface as their own error so the user sees the distinguishing detail.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::DeliveryConfig;
use crate::markup::truncate_caption;
use crate::splitter::{split_message, MESSAGE_LIMIT};
use crate::types::{DeliveryError, OutboundMessage};

/// Response wrapper the endpoint uses for every method.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    description: Option<String>,
}

/// Client for one deployment's endpoint, conversation and credential.
#[derive(Debug, Clone)]
pub struct EndpointClient {
    http: reqwest::Client,
    config: DeliveryConfig,
}

impl EndpointClient {
    /// Build a client. Provisioning is checked per delivery, not here, so a
    /// host can start before credentials exist.
    pub fn new(config: DeliveryConfig) -> Result<Self, DeliveryError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;
        Ok(Self { http, config })
    }

    /// Deliver one message, whatever its kind.
    pub async fn deliver(&self, message: &OutboundMessage) -> Result<(), DeliveryError> {
        if !self.config.is_provisioned() {
            return Err(DeliveryError::ConfigurationMissing);
        }
        match message {
            OutboundMessage::Text { body } => self.send_text(body).await,
            OutboundMessage::Image { base64, caption } => {
                self.send_image(base64, caption.as_deref()).await
            }
            OutboundMessage::Document { content, filename } => {
                self.send_document(content, filename.as_deref()).await
            }
        }
    }

    /// Send text, splitting past the endpoint limit. Chunks go out strictly
    /// in original order, each awaited before the next; a failure aborts the
    /// remainder.
    pub async fn send_text(&self, text: &str) -> Result<(), DeliveryError> {
        let chunks = split_message(text, MESSAGE_LIMIT);
        let total = chunks.len();
        for (index, chunk) in chunks.into_iter().enumerate() {
            debug!(chunk = index + 1, total, "sending text chunk");
            let body = json!({
                "chat_id": self.config.chat_id,
                "text": chunk,
                "parse_mode": "HTML",
            });
            let request = self.http.post(self.method_url("sendMessage")).json(&body);
            self.execute(request).await?;
        }
        info!(chunks = total, "text delivered");
        Ok(())
    }

    /// Send a single image as one multipart request. The optional caption is
    /// truncated to the endpoint's caption limit first.
    pub async fn send_image(
        &self,
        base64_data: &str,
        caption: Option<&str>,
    ) -> Result<(), DeliveryError> {
        let bytes = BASE64
            .decode(base64_data.trim())
            .map_err(|e| DeliveryError::InvalidPayload(format!("image data: {e}")))?;

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name("output.png")
            .mime_str("image/png")
            .map_err(|e| DeliveryError::InvalidPayload(e.to_string()))?;

        let mut form = reqwest::multipart::Form::new()
            .text("chat_id", self.config.chat_id.clone())
            .part("photo", part);
        if let Some(caption) = caption {
            form = form
                .text("caption", truncate_caption(caption))
                .text("parse_mode", "HTML");
        }

        let request = self.http.post(self.method_url("sendPhoto")).multipart(form);
        self.execute(request).await?;
        info!("image delivered");
        Ok(())
    }

    /// Send a single text document as one multipart request.
    pub async fn send_document(
        &self,
        content: &str,
        filename: Option<&str>,
    ) -> Result<(), DeliveryError> {
        let part = reqwest::multipart::Part::bytes(content.as_bytes().to_vec())
            .file_name(filename.unwrap_or("file.txt").to_string())
            .mime_str("text/plain")
            .map_err(|e| DeliveryError::InvalidPayload(e.to_string()))?;

        let form = reqwest::multipart::Form::new()
            .text("chat_id", self.config.chat_id.clone())
            .part("document", part);

        let request = self
            .http
            .post(self.method_url("sendDocument"))
            .multipart(form);
        self.execute(request).await?;
        info!("document delivered");
        Ok(())
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.config.api_base, self.config.bot_token, method
        )
    }

    /// Issue one request and interpret the endpoint's answer. No retry on
    /// any failure.
    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<(), DeliveryError> {
        let response = request.send().await.map_err(classify_transport)?;
        let api: ApiResponse = response.json().await.map_err(classify_transport)?;
        if !api.ok {
            let description = api.description.unwrap_or_else(|| "API error".to_string());
            return Err(DeliveryError::Rejected(description));
        }
        Ok(())
    }
}

fn classify_transport(error: reqwest::Error) -> DeliveryError {
    if error.is_timeout() {
        DeliveryError::Timeout
    } else {
        DeliveryError::Transport(error.to_string())
    }
}
