//! System clipboard
//!
//! Reads and writes plain text on the OS clipboard through `arboard`.

use crate::platform::{ClipboardAccess, ClipboardError};

/// Clipboard service backed by the OS clipboard.
///
/// A fresh `arboard::Clipboard` is opened per call so the service can be
/// shared freely between the UI thread and background tasks.
#[derive(Default)]
pub struct SystemClipboard;

impl SystemClipboard {
    pub fn new() -> Self {
        Self
    }
}

impl ClipboardAccess for SystemClipboard {
    fn get_text(&self) -> Result<String, ClipboardError> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| ClipboardError::Unavailable(e.to_string()))?;

        match clipboard.get_text() {
            Ok(text) => Ok(text),
            // Images or an empty clipboard read as empty text
            Err(arboard::Error::ContentNotAvailable) => Ok(String::new()),
            Err(e) => Err(ClipboardError::Unavailable(e.to_string())),
        }
    }

    fn set_text(&self, text: &str) -> Result<(), ClipboardError> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
        clipboard
            .set_text(text)
            .map_err(|e| ClipboardError::Write(e.to_string()))
    }
}
