//! Relay host serve loop.
//!
//! The privileged context's side of the bridge: read one delivery request
//! frame at a time, perform it against the endpoint, answer with a receipt
//! frame carrying the same correlation id. Failures become receipts, never
//! dropped requests — the caller's timeout handles a host that is truly gone.

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{info, warn};

use context_bridge::{read_frame, write_frame, Channel, Envelope};

use crate::client::EndpointClient;
use crate::types::{DeliveryReceipt, OutboundMessage};

/// The fixed delivery channel. Unlike the extraction channels this one is not
/// per-session random: both ends of the frame transport are ours.
pub fn delivery_channel() -> Channel {
    Channel::new("relay:deliver", "relay:result")
}

/// Serve delivery requests until the peer disconnects.
pub async fn serve<R, W>(
    mut reader: R,
    mut writer: W,
    client: EndpointClient,
) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let channel = delivery_channel();
    info!("relay host serving");

    while let Some(request) = read_frame(&mut reader).await? {
        if request.tag != channel.request_tag {
            continue;
        }

        let receipt = match serde_json::from_value::<OutboundMessage>(request.data) {
            Ok(message) => match client.deliver(&message).await {
                Ok(()) => DeliveryReceipt::success(),
                Err(e) => {
                    warn!("delivery failed: {e}");
                    DeliveryReceipt::from_error(&e)
                }
            },
            Err(e) => {
                warn!("unparseable delivery request: {e}");
                DeliveryReceipt::failure(format!("invalid payload: {e}"))
            }
        };

        let data = serde_json::to_value(&receipt)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        write_frame(
            &mut writer,
            &Envelope::new(channel.response_tag.clone(), request.id, data),
        )
        .await?;
    }

    info!("relay host peer disconnected");
    Ok(())
}
