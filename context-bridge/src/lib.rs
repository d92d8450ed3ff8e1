//! Cross-context request/response bridge.
//!
//! Execution contexts in this system (page, isolated, privileged) cannot share
//! memory or call into each other directly. Everything that crosses a context
//! boundary is serialized into an [`Envelope`] and broadcast on a one-way bus;
//! replies are matched back to their request by `(tag, id)` correlation.
//!
//! The same contract runs over two transports:
//!
//! - **In-memory broadcast** ([`bus::MessageBus`]) between contexts that share
//!   a process (the page/isolated hop).
//! - **Length-prefixed frames** ([`framing`]) over a byte stream for the hop
//!   into the privileged relay context.

pub mod bridge;
pub mod bus;
pub mod channel;
pub mod framing;

pub use bridge::{BridgeClient, Responder};
pub use bus::{BusSubscription, Envelope, MessageBus};
pub use channel::{session_tag, Channel, ChannelError, ChannelSet};
pub use framing::{read_frame, spawn_frame_pump, write_frame, MAX_FRAME_BYTES};
