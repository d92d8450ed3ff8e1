//! Broadcast message bus between adjacent contexts.
//!
//! Models the one-way fan-out channel available between two contexts: anyone
//! can publish, every subscriber observes every envelope, and delivery is
//! never acknowledged. Routing happens entirely by tag matching at the
//! receiver.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::trace;

/// The unit that crosses a context boundary.
///
/// Envelopes are always serialized when they leave a context; no payload is
/// ever shared by reference.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Envelope {
    /// Channel tag this envelope is addressed to.
    pub tag: String,
    /// Correlation id, echoed unmodified by responders.
    pub id: u64,
    /// Payload; `null` means "no data".
    #[serde(default)]
    pub data: serde_json::Value,
}

impl Envelope {
    pub fn new(tag: impl Into<String>, id: u64, data: serde_json::Value) -> Self {
        Self {
            tag: tag.into(),
            id,
            data,
        }
    }
}

/// One-way broadcast bus for a context pair.
#[derive(Debug, Clone)]
pub struct MessageBus {
    tx: broadcast::Sender<Envelope>,
}

impl MessageBus {
    /// Create a bus able to buffer `capacity` in-flight envelopes per
    /// subscriber before old ones are dropped.
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish an envelope. Fire-and-forget: a bus with no listeners silently
    /// drops the envelope, exactly like a broadcast with no receiver.
    pub fn publish(&self, envelope: Envelope) {
        trace!(tag = %envelope.tag, id = envelope.id, "publish");
        let _ = self.tx.send(envelope);
    }

    /// Subscribe to every envelope published after this call.
    pub fn subscribe(&self) -> BusSubscription {
        BusSubscription {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new(64)
    }
}

/// A subscriber's view of the bus.
#[derive(Debug)]
pub struct BusSubscription {
    rx: broadcast::Receiver<Envelope>,
}

impl BusSubscription {
    /// Receive the next envelope, or `None` once the bus is gone.
    ///
    /// A slow subscriber that falls behind loses the oldest envelopes and
    /// keeps going; a lost broadcast is indistinguishable from one that was
    /// never sent, which is exactly the medium's contract.
    pub async fn recv(&mut self) -> Option<Envelope> {
        loop {
            match self.rx.recv().await {
                Ok(envelope) => return Some(envelope),
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    trace!(missed, "subscription lagged, dropping missed envelopes");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
