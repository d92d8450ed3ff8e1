//! Command dispatcher.
//!
//! A two-state machine: Idle and Sending. Invoking a command while one is
//! already Sending is rejected immediately — nothing queues. Every outcome,
//! success or failure, puts the state back to Idle, so no invocation can
//! poison the next.

use serde_json::Value;
use tokio::sync::Mutex;
use tokio::time::Duration;
use tracing::{debug, info};

use content_extractor::{Bundle, ContentBundle, EnvironmentId, OpenDocument, ProblemBundle};
use context_bridge::{BridgeClient, Channel, ChannelSet};
use delivery_service::{DeliveryReceipt, OutboundMessage};

use crate::clipboard::ClipboardSink;
use crate::compose;
use crate::config::BridgeConfig;

/// Dispatcher state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Idle,
    Sending,
}

/// The four host-bindable commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Extract and relay the full content (cell or problem statement).
    SendContent,
    /// Relay only the active cell's outputs.
    SendOutputOnly,
    /// Extract and copy locally, bypassing the relay.
    CopyToClipboard,
    /// Relay the open document verbatim as a file.
    SendWholeDocument,
}

impl Command {
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::SendContent => "send-content",
            Command::SendOutputOnly => "send-output-only",
            Command::CopyToClipboard => "copy-to-clipboard",
            Command::SendWholeDocument => "send-whole-document",
        }
    }

    /// Parse a command name or its short alias.
    pub fn parse(input: &str) -> Option<Command> {
        match input.trim() {
            "send-content" | "send" => Some(Command::SendContent),
            "send-output-only" | "send-output" | "output" => Some(Command::SendOutputOnly),
            "copy-to-clipboard" | "copy" => Some(Command::CopyToClipboard),
            "send-whole-document" | "send-document" | "doc" => Some(Command::SendWholeDocument),
            _ => None,
        }
    }
}

/// Outcome surfaced to the user. Absent content and timeouts are neutral;
/// rejections carry the distinguishing detail verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandStatus {
    Sent,
    Copied,
    NoContent,
    NoOutput,
    Busy,
    Timeout,
    Failed(String),
}

impl std::fmt::Display for CommandStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandStatus::Sent => write!(f, "sent"),
            CommandStatus::Copied => write!(f, "copied"),
            CommandStatus::NoContent => write!(f, "no content"),
            CommandStatus::NoOutput => write!(f, "no output"),
            CommandStatus::Busy => write!(f, "already sending"),
            CommandStatus::Timeout => write!(f, "timed out"),
            CommandStatus::Failed(detail) => write!(f, "failed: {detail}"),
        }
    }
}

/// Bridge timeouts per request kind.
#[derive(Debug, Clone, Copy)]
pub struct BridgeTimeouts {
    /// Locally available content.
    pub cell: Duration,
    /// Content that may need a remote round trip.
    pub problem: Duration,
    /// One delivery request, covering all of its sequential endpoint calls.
    pub relay: Duration,
}

impl From<&BridgeConfig> for BridgeTimeouts {
    fn from(config: &BridgeConfig) -> Self {
        Self {
            cell: Duration::from_millis(config.cell_timeout_ms),
            problem: Duration::from_millis(config.problem_timeout_ms),
            relay: Duration::from_millis(config.relay_timeout_ms),
        }
    }
}

pub struct Dispatcher {
    state: Mutex<DispatchState>,
    bridge: Mutex<BridgeClient>,
    channels: ChannelSet,
    delivery: Channel,
    timeouts: BridgeTimeouts,
    clipboard: Mutex<Box<dyn ClipboardSink>>,
}

impl Dispatcher {
    pub fn new(
        bridge: BridgeClient,
        channels: ChannelSet,
        delivery: Channel,
        timeouts: BridgeTimeouts,
        clipboard: Box<dyn ClipboardSink>,
    ) -> Self {
        Self {
            state: Mutex::new(DispatchState::Idle),
            bridge: Mutex::new(bridge),
            channels,
            delivery,
            timeouts,
            clipboard: Mutex::new(clipboard),
        }
    }

    /// Current state.
    pub async fn state(&self) -> DispatchState {
        *self.state.lock().await
    }

    /// Invoke one command against the identified environment.
    pub async fn invoke(&self, command: Command, environment: EnvironmentId) -> CommandStatus {
        if !self.begin().await {
            debug!(command = command.as_str(), "rejected: already sending");
            return CommandStatus::Busy;
        }

        info!(command = command.as_str(), ?environment, "dispatching");
        let status = self.run(command, environment).await;
        info!(command = command.as_str(), %status, "completed");

        self.finish().await;
        status
    }

    /// Idle -> Sending, or refuse.
    async fn begin(&self) -> bool {
        let mut state = self.state.lock().await;
        match *state {
            DispatchState::Sending => false,
            DispatchState::Idle => {
                *state = DispatchState::Sending;
                true
            }
        }
    }

    /// Back to Idle, whatever happened.
    async fn finish(&self) {
        *self.state.lock().await = DispatchState::Idle;
    }

    async fn run(&self, command: Command, environment: EnvironmentId) -> CommandStatus {
        let mut bridge = self.bridge.lock().await;
        match command {
            Command::SendContent => match environment {
                EnvironmentId::Notebook => self.send_cell(&mut bridge).await,
                _ => self.send_problem(&mut bridge).await,
            },
            Command::SendOutputOnly => self.send_output(&mut bridge).await,
            Command::CopyToClipboard => self.copy(&mut bridge, environment).await,
            Command::SendWholeDocument => self.send_document(&mut bridge).await,
        }
    }

    async fn send_cell(&self, bridge: &mut BridgeClient) -> CommandStatus {
        let Some(bundle) = self.request_cell(bridge).await else {
            return CommandStatus::NoContent;
        };
        self.deliver_all(bridge, compose::cell_messages(&bundle))
            .await
    }

    async fn send_output(&self, bridge: &mut BridgeClient) -> CommandStatus {
        let Some(bundle) = self.request_cell(bridge).await else {
            return CommandStatus::NoContent;
        };
        match compose::output_messages(&bundle) {
            Some(messages) => self.deliver_all(bridge, messages).await,
            None => CommandStatus::NoOutput,
        }
    }

    async fn send_problem(&self, bridge: &mut BridgeClient) -> CommandStatus {
        let Some(bundle) = self.request_problem(bridge).await else {
            return CommandStatus::NoContent;
        };
        self.deliver_all(bridge, compose::problem_messages(&bundle))
            .await
    }

    async fn send_document(&self, bridge: &mut BridgeClient) -> CommandStatus {
        let channel = self.channels.document.clone();
        let Some(document) = self
            .request_as::<OpenDocument>(bridge, &channel, self.timeouts.cell)
            .await
        else {
            return CommandStatus::NoContent;
        };
        self.deliver_all(bridge, vec![compose::document_message(&document)])
            .await
    }

    async fn copy(
        &self,
        bridge: &mut BridgeClient,
        environment: EnvironmentId,
    ) -> CommandStatus {
        let text = match environment {
            EnvironmentId::Notebook => self
                .request_cell(bridge)
                .await
                .map(|bundle| bundle.code),
            _ => self
                .request_problem(bridge)
                .await
                .map(|bundle| bundle.body),
        };
        let Some(text) = text else {
            return CommandStatus::NoContent;
        };

        match self.clipboard.lock().await.write_text(&text) {
            Ok(()) => CommandStatus::Copied,
            Err(e) => CommandStatus::Failed(e.to_string()),
        }
    }

    async fn request_cell(&self, bridge: &mut BridgeClient) -> Option<ContentBundle> {
        let channel = self.channels.cell.clone();
        match self
            .request_as::<Bundle>(bridge, &channel, self.timeouts.cell)
            .await?
        {
            Bundle::Content(bundle) => Some(bundle),
            Bundle::Problem(_) => None,
        }
    }

    async fn request_problem(&self, bridge: &mut BridgeClient) -> Option<ProblemBundle> {
        let channel = self.channels.problem.clone();
        match self
            .request_as::<Bundle>(bridge, &channel, self.timeouts.problem)
            .await?
        {
            Bundle::Problem(bundle) => Some(bundle),
            Bundle::Content(_) => None,
        }
    }

    /// One bridge request, decoded. Timeout, explicit null and a malformed
    /// payload all come back as `None` — the bridge's failure mode is
    /// uniform.
    async fn request_as<T: serde::de::DeserializeOwned>(
        &self,
        bridge: &mut BridgeClient,
        channel: &Channel,
        timeout: Duration,
    ) -> Option<T> {
        let value = bridge.request(channel, Value::Null, timeout).await?;
        if value.is_null() {
            return None;
        }
        serde_json::from_value(value).ok()
    }

    /// Deliver messages strictly in order, stopping on the first failure.
    async fn deliver_all(
        &self,
        bridge: &mut BridgeClient,
        messages: Vec<OutboundMessage>,
    ) -> CommandStatus {
        for message in messages {
            let payload = match serde_json::to_value(&message) {
                Ok(payload) => payload,
                Err(e) => return CommandStatus::Failed(e.to_string()),
            };

            let Some(value) = bridge
                .request(&self.delivery, payload, self.timeouts.relay)
                .await
            else {
                return CommandStatus::Timeout;
            };

            match serde_json::from_value::<DeliveryReceipt>(value) {
                Ok(receipt) if receipt.ok => {}
                Ok(receipt) if receipt.timed_out => return CommandStatus::Timeout,
                Ok(receipt) => {
                    return CommandStatus::Failed(
                        receipt
                            .error
                            .unwrap_or_else(|| "delivery failed".to_string()),
                    )
                }
                Err(e) => return CommandStatus::Failed(format!("invalid receipt: {e}")),
            }
        }
        CommandStatus::Sent
    }
}
