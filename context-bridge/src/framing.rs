//! Length-prefixed frame transport.
//!
//! The hop into the privileged relay context has no shared broadcast medium,
//! only a byte stream. Envelopes cross it as u32-LE length-prefixed JSON
//! frames. [`spawn_frame_pump`] extends a local [`MessageBus`] across such a
//! stream: request envelopes for the configured channels are written out as
//! frames, and every frame arriving from the peer is published back onto the
//! bus, where the usual `(tag, id)` matching applies.

use std::collections::HashSet;
use std::io;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::bus::{Envelope, MessageBus};
use crate::channel::Channel;

/// Upper bound on a single frame. Text chunks are tiny; image payloads are
/// the sizing case and stay well under this.
pub const MAX_FRAME_BYTES: usize = 16 * 1024 * 1024;

/// Read one frame. `Ok(None)` on a clean end of stream.
pub async fn read_frame<R>(reader: &mut R) -> io::Result<Option<Envelope>>
where
    R: AsyncRead + Unpin,
{
    let mut length_bytes = [0u8; 4];
    match reader.read_exact(&mut length_bytes).await {
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e),
    }

    let length = u32::from_le_bytes(length_bytes) as usize;
    if length == 0 {
        return Ok(None);
    }
    if length > MAX_FRAME_BYTES {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("frame of {length} bytes exceeds cap"),
        ));
    }

    let mut payload = vec![0u8; length];
    reader.read_exact(&mut payload).await?;

    let envelope = serde_json::from_slice(&payload)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
    Ok(Some(envelope))
}

/// Write one frame and flush it.
pub async fn write_frame<W>(writer: &mut W, envelope: &Envelope) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let payload = serde_json::to_vec(envelope)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
    if payload.len() > MAX_FRAME_BYTES {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("frame of {} bytes exceeds cap", payload.len()),
        ));
    }

    let length_bytes = (payload.len() as u32).to_le_bytes();
    writer.write_all(&length_bytes).await?;
    writer.write_all(&payload).await?;
    writer.flush().await?;
    Ok(())
}

/// Bridge a bus across a byte stream.
///
/// Bus envelopes whose tag is one of the `outbound` channels' request tags are
/// written to the stream; every envelope read from the stream is published on
/// the bus. Both tasks end when the stream or the bus goes away.
pub fn spawn_frame_pump<S>(
    stream: S,
    bus: MessageBus,
    outbound: &[Channel],
) -> (JoinHandle<()>, JoinHandle<()>)
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let request_tags: HashSet<String> = outbound
        .iter()
        .map(|channel| channel.request_tag.clone())
        .collect();

    let (mut read_half, mut write_half) = tokio::io::split(stream);

    let mut subscription = bus.subscribe();
    let writer = tokio::spawn(async move {
        while let Some(envelope) = subscription.recv().await {
            if !request_tags.contains(&envelope.tag) {
                continue;
            }
            if let Err(e) = write_frame(&mut write_half, &envelope).await {
                error!("frame write failed: {e}");
                break;
            }
        }
    });

    let reader = tokio::spawn(async move {
        loop {
            match read_frame(&mut read_half).await {
                Ok(Some(envelope)) => bus.publish(envelope),
                Ok(None) => {
                    debug!("frame peer disconnected");
                    break;
                }
                Err(e) => {
                    error!("frame read failed: {e}");
                    break;
                }
            }
        }
    });

    (writer, reader)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::BridgeClient;
    use serde_json::json;
    use tokio::time::Duration;

    #[tokio::test]
    async fn test_frame_roundtrip() {
        let (mut a, mut b) = tokio::io::duplex(1024);

        let envelope = Envelope::new("tag", 42, json!({"k": "v"}));
        write_frame(&mut a, &envelope).await.unwrap();

        let decoded = read_frame(&mut b).await.unwrap().unwrap();
        assert_eq!(decoded, envelope);
    }

    #[tokio::test]
    async fn test_closed_stream_reads_none() {
        let (a, mut b) = tokio::io::duplex(64);
        drop(a);
        assert!(read_frame(&mut b).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_zero_length_frame_reads_none() {
        let (mut a, mut b) = tokio::io::duplex(64);
        a.write_all(&0u32.to_le_bytes()).await.unwrap();
        assert!(read_frame(&mut b).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_oversized_frame_rejected() {
        let (mut a, mut b) = tokio::io::duplex(64);
        a.write_all(&(u32::MAX).to_le_bytes()).await.unwrap();
        let err = read_frame(&mut b).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[tokio::test]
    async fn test_pump_carries_request_and_response() {
        let (near, far) = tokio::io::duplex(4096);
        let bus = MessageBus::new(16);
        let channel = Channel::new("deliver", "delivered");

        spawn_frame_pump(near, bus.clone(), std::slice::from_ref(&channel));

        // The far side plays the privileged peer: read a request frame,
        // answer it with the id echoed.
        tokio::spawn(async move {
            let (mut reader, mut writer) = tokio::io::split(far);
            while let Ok(Some(request)) = read_frame(&mut reader).await {
                let response = Envelope::new("delivered", request.id, json!({"ok": true}));
                if write_frame(&mut writer, &response).await.is_err() {
                    break;
                }
            }
        });

        let mut client = BridgeClient::new(bus);
        let result = client
            .request(&channel, json!({"body": "hi"}), Duration::from_secs(1))
            .await;

        assert_eq!(result, Some(json!({"ok": true})));
    }

    #[tokio::test]
    async fn test_pump_ignores_unrelated_tags() {
        let (near, far) = tokio::io::duplex(4096);
        let bus = MessageBus::new(16);
        let channel = Channel::new("deliver", "delivered");

        spawn_frame_pump(near, bus.clone(), std::slice::from_ref(&channel));

        bus.publish(Envelope::new("local-only", 1, json!(null)));
        bus.publish(Envelope::new("deliver", 2, json!(null)));

        let (mut reader, _writer) = tokio::io::split(far);
        let first = read_frame(&mut reader).await.unwrap().unwrap();
        assert_eq!(first.tag, "deliver");
        assert_eq!(first.id, 2);
    }
}
