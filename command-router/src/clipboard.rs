//! Local clipboard sink.
//!
//! The copy command bypasses the relay entirely and writes to the system
//! clipboard. The sink is a trait so the dispatcher can be exercised without
//! a display server.

use std::sync::{Arc, Mutex};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),
}

pub trait ClipboardSink: Send {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// The real system clipboard.
pub struct SystemClipboard;

impl ClipboardSink for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
        clipboard
            .set_text(text.to_string())
            .map_err(|e| ClipboardError::Unavailable(e.to_string()))
    }
}

/// In-memory sink for tests; the handle observes what was written.
#[derive(Debug, Clone, Default)]
pub struct BufferClipboard {
    store: Arc<Mutex<Option<String>>>,
}

impl BufferClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// A shared handle onto the written contents.
    pub fn handle(&self) -> Arc<Mutex<Option<String>>> {
        self.store.clone()
    }
}

impl ClipboardSink for BufferClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        let mut guard = self
            .store
            .lock()
            .map_err(|_| ClipboardError::Unavailable("buffer poisoned".to_string()))?;
        *guard = Some(text.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_clipboard_records_writes() {
        let mut clipboard = BufferClipboard::new();
        let handle = clipboard.handle();

        clipboard.write_text("copied text").unwrap();
        assert_eq!(handle.lock().unwrap().as_deref(), Some("copied text"));
    }
}
