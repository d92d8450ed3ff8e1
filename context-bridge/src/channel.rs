//! Channel naming and per-session tag generation.
//!
//! A channel is a `(request_tag, response_tag)` pair identifying one logical
//! request type on the broadcast medium. Extraction channels use per-session
//! random tags so an unrelated listener sharing the medium cannot address or
//! spoof them; delivery channels use fixed tags. Tag uniqueness within a
//! session is an invariant checked at construction, not a property hoped for
//! from randomness.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Errors raised while assembling a session's channels.
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("duplicate channel tag within session: {0}")]
    DuplicateTag(String),
}

/// A named request/response tag pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub request_tag: String,
    pub response_tag: String,
}

impl Channel {
    pub fn new(request_tag: impl Into<String>, response_tag: impl Into<String>) -> Self {
        Self {
            request_tag: request_tag.into(),
            response_tag: response_tag.into(),
        }
    }
}

/// Generate one per-session random tag.
pub fn session_tag() -> String {
    let token = Uuid::new_v4().simple().to_string();
    format!("_{}", &token[..8])
}

/// The extraction channels of one page session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSet {
    /// Active notebook cell (code, outputs, images).
    pub cell: Channel,
    /// Problem statement of the current page.
    pub problem: Channel,
    /// The whole open document, verbatim.
    pub document: Channel,
}

impl ChannelSet {
    /// Build a channel set, rejecting any tag collision.
    pub fn new(cell: Channel, problem: Channel, document: Channel) -> Result<Self, ChannelError> {
        let mut seen = HashSet::new();
        for tag in [
            &cell.request_tag,
            &cell.response_tag,
            &problem.request_tag,
            &problem.response_tag,
            &document.request_tag,
            &document.response_tag,
        ] {
            if !seen.insert(tag.clone()) {
                return Err(ChannelError::DuplicateTag(tag.clone()));
            }
        }
        Ok(Self {
            cell,
            problem,
            document,
        })
    }

    /// Generate a fresh set of per-session channels.
    pub fn generate() -> Self {
        loop {
            let candidate = Self::new(
                Channel::new(session_tag(), session_tag()),
                Channel::new(session_tag(), session_tag()),
                Channel::new(session_tag(), session_tag()),
            );
            // A v4 collision within six tags is vanishingly rare; regenerate
            // rather than propagate when it happens.
            if let Ok(set) = candidate {
                return set;
            }
        }
    }
}
