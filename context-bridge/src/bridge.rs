//! Correlation-id request/response over the broadcast bus.
//!
//! A [`BridgeClient`] owns one side of the protocol: it allocates strictly
//! increasing request ids, keeps at most one request pending, and matches a
//! response only when both tag and id agree. Timeout is the only failure
//! signal — an absent responder and absent content are indistinguishable by
//! design. A [`Responder`] serves the other side, echoing the received id
//! unmodified.

use serde_json::Value;
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant};
use tracing::{debug, trace};

use crate::bus::{Envelope, MessageBus};
use crate::channel::Channel;

/// Bookkeeping for the single in-flight request.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingRequest {
    id: u64,
    response_tag: String,
}

/// The requesting side of the bridge.
///
/// One request may be outstanding at a time; issuing a new request implicitly
/// abandons tracking of the previous one, whose late response then matches
/// nothing and is dropped. Ids increase monotonically and are never reused
/// within the client's lifetime, so a stale response can never resolve a newer
/// request.
#[derive(Debug)]
pub struct BridgeClient {
    bus: MessageBus,
    next_id: u64,
    pending: Option<PendingRequest>,
}

impl BridgeClient {
    pub fn new(bus: MessageBus) -> Self {
        Self {
            bus,
            next_id: 0,
            pending: None,
        }
    }

    /// Whether a request is currently tracked as pending.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Send one request on `channel` and wait for its response.
    ///
    /// Returns the response payload, or `None` when `timeout` fires first.
    /// Envelopes that do not match the pending `(tag, id)` pair — including
    /// late responses to superseded requests — are skipped and left for other
    /// listeners.
    pub async fn request(
        &mut self,
        channel: &Channel,
        data: Value,
        timeout: Duration,
    ) -> Option<Value> {
        self.next_id += 1;
        let id = self.next_id;

        // Subscribe before publishing so the response cannot slip past us.
        let mut subscription = self.bus.subscribe();
        self.pending = Some(PendingRequest {
            id,
            response_tag: channel.response_tag.clone(),
        });
        self.bus
            .publish(Envelope::new(channel.request_tag.clone(), id, data));

        let deadline = Instant::now() + timeout;
        loop {
            let envelope = match tokio::time::timeout_at(deadline, subscription.recv()).await {
                Err(_elapsed) => {
                    debug!(
                        tag = %channel.request_tag,
                        id,
                        "request timed out with no matching response"
                    );
                    self.pending = None;
                    return None;
                }
                Ok(None) => {
                    // Bus gone; same outcome as a timeout.
                    self.pending = None;
                    return None;
                }
                Ok(Some(envelope)) => envelope,
            };

            if envelope.tag == channel.response_tag && envelope.id == id {
                trace!(tag = %envelope.tag, id, "response matched");
                self.pending = None;
                return Some(envelope.data);
            }
            trace!(tag = %envelope.tag, id = envelope.id, "ignoring unmatched envelope");
        }
    }
}

/// The serving side of the bridge.
#[derive(Debug, Clone)]
pub struct Responder {
    bus: MessageBus,
}

impl Responder {
    pub fn new(bus: MessageBus) -> Self {
        Self { bus }
    }

    /// Serve one channel: for every envelope matching the request tag, run
    /// `handler` and publish its result under the response tag with the
    /// request's id echoed unmodified. Runs until the bus is dropped.
    pub fn serve<H, Fut>(&self, channel: Channel, handler: H) -> JoinHandle<()>
    where
        H: Fn(Value) -> Fut + Send + 'static,
        Fut: std::future::Future<Output = Value> + Send + 'static,
    {
        let bus = self.bus.clone();
        let mut subscription = self.bus.subscribe();
        tokio::spawn(async move {
            while let Some(envelope) = subscription.recv().await {
                if envelope.tag != channel.request_tag {
                    continue;
                }
                trace!(tag = %envelope.tag, id = envelope.id, "serving request");
                let data = handler(envelope.data).await;
                bus.publish(Envelope::new(
                    channel.response_tag.clone(),
                    envelope.id,
                    data,
                ));
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn channel() -> Channel {
        Channel::new("req", "res")
    }

    #[tokio::test]
    async fn test_request_response_roundtrip() {
        let bus = MessageBus::new(16);
        let responder = Responder::new(bus.clone());
        responder.serve(channel(), |data| async move { json!({ "echo": data }) });

        let mut client = BridgeClient::new(bus);
        let result = client
            .request(&channel(), json!("hello"), Duration::from_secs(1))
            .await;

        assert_eq!(result, Some(json!({ "echo": "hello" })));
        assert!(!client.has_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_responder_times_out_to_none() {
        let bus = MessageBus::new(16);
        let mut client = BridgeClient::new(bus);

        let started = Instant::now();
        let result = client
            .request(&channel(), Value::Null, Duration::from_secs(3))
            .await;

        assert_eq!(result, None);
        assert!(started.elapsed() >= Duration::from_secs(3));
        assert!(!client.has_pending());
    }

    #[tokio::test]
    async fn test_mismatched_id_is_ignored() {
        let bus = MessageBus::new(16);

        // A rogue peer answers with the wrong id first, then the right one.
        let rogue = bus.clone();
        let mut sub = bus.subscribe();
        tokio::spawn(async move {
            let request = sub.recv().await.unwrap();
            rogue.publish(Envelope::new("res", request.id + 100, json!("stale")));
            rogue.publish(Envelope::new("res", request.id, json!("fresh")));
        });

        let mut client = BridgeClient::new(bus);
        let result = client
            .request(&channel(), Value::Null, Duration::from_secs(1))
            .await;

        assert_eq!(result, Some(json!("fresh")));
    }

    #[tokio::test]
    async fn test_mismatched_tag_is_ignored() {
        let bus = MessageBus::new(16);

        let rogue = bus.clone();
        let mut sub = bus.subscribe();
        tokio::spawn(async move {
            let request = sub.recv().await.unwrap();
            rogue.publish(Envelope::new("other", request.id, json!("wrong channel")));
            rogue.publish(Envelope::new("res", request.id, json!("right channel")));
        });

        let mut client = BridgeClient::new(bus);
        let result = client
            .request(&channel(), Value::Null, Duration::from_secs(1))
            .await;

        assert_eq!(result, Some(json!("right channel")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_response_cannot_resolve_newer_request() {
        let bus = MessageBus::new(16);
        let mut client = BridgeClient::new(bus.clone());

        // First request times out; its id is now dead.
        let first = client
            .request(&channel(), Value::Null, Duration::from_millis(10))
            .await;
        assert_eq!(first, None);

        // A responder that always answers with the dead id, then (after a
        // beat) with the live one.
        let replayer = bus.clone();
        let mut sub = bus.subscribe();
        tokio::spawn(async move {
            let request = sub.recv().await.unwrap();
            replayer.publish(Envelope::new("res", request.id - 1, json!("late for #1")));
            replayer.publish(Envelope::new("res", request.id, json!("for #2")));
        });

        let second = client
            .request(&channel(), Value::Null, Duration::from_secs(1))
            .await;
        assert_eq!(second, Some(json!("for #2")));
    }

    #[tokio::test]
    async fn test_ids_strictly_increase_across_requests() {
        let bus = MessageBus::new(16);

        let seen = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let record = seen.clone();
        let echo = bus.clone();
        let mut sub = bus.subscribe();
        tokio::spawn(async move {
            while let Some(envelope) = sub.recv().await {
                if envelope.tag == "req" {
                    record.lock().unwrap().push(envelope.id);
                    echo.publish(Envelope::new("res", envelope.id, Value::Null));
                }
            }
        });

        let mut client = BridgeClient::new(bus);
        for _ in 0..3 {
            client
                .request(&channel(), Value::Null, Duration::from_secs(1))
                .await;
        }

        let ids = seen.lock().unwrap().clone();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_responder_answers_null_data() {
        let bus = MessageBus::new(16);
        let responder = Responder::new(bus.clone());
        responder.serve(channel(), |_| async { Value::Null });

        let mut client = BridgeClient::new(bus);
        let result = client
            .request(&channel(), Value::Null, Duration::from_secs(1))
            .await;

        // "Responder present but no content" arrives as an explicit null,
        // distinct from a timeout at the protocol level.
        assert_eq!(result, Some(Value::Null));
    }
}
