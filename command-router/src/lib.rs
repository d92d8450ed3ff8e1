//! Command Router - user command dispatch over the cross-context bridge
//!
//! Binds the four user commands (send content, send output only, copy to
//! clipboard, send whole document) to extraction requests over the bridge and
//! delivery requests to the relay, under a strict single-in-flight-send
//! invariant. Also hosts the wiring that stands up the page and privileged
//! contexts around the dispatcher.

pub mod clipboard;
pub mod compose;
pub mod config;
pub mod contexts;
pub mod dispatcher;

pub use clipboard::{BufferClipboard, ClipboardError, ClipboardSink, SystemClipboard};
pub use config::{BridgeConfig, Config, GeneralConfig, PageConfig};
pub use contexts::{spawn_relay_context, PageContext};
pub use dispatcher::{BridgeTimeouts, Command, CommandStatus, DispatchState, Dispatcher};
