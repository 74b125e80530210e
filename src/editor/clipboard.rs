//! Clipboard access for the code block copy control
//!
//! The system clipboard goes through arboard. The controller only sees the
//! `ClipboardProvider` trait so headless hosts and tests can swap in an
//! in-memory clipboard.

use std::cell::RefCell;
use std::rc::Rc;

use arboard::Clipboard;

use crate::error::{Error, Result};

/// Somewhere text can be copied to.
pub trait ClipboardProvider {
    fn set_text(&mut self, text: &str) -> Result<()>;
}

// ─────────────────────────────────────────────────────────────────────────────
// System Clipboard
// ─────────────────────────────────────────────────────────────────────────────

/// The OS clipboard, opened per copy.
#[derive(Debug, Default)]
pub struct SystemClipboard;

impl ClipboardProvider for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        let mut clipboard = Clipboard::new().map_err(|e| Error::Clipboard(e.to_string()))?;
        clipboard
            .set_text(text)
            .map_err(|e| Error::Clipboard(e.to_string()))?;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Memory Clipboard
// ─────────────────────────────────────────────────────────────────────────────

/// Clipboard kept in memory. Clones share contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    contents: Rc<RefCell<Option<String>>>,
    /// When set, every copy fails with this message
    fail_with: Option<String>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// A clipboard that rejects every write.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            fail_with: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.contents.borrow().clone()
    }
}

impl ClipboardProvider for MemoryClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        if let Some(message) = &self.fail_with {
            return Err(Error::Clipboard(message.clone()));
        }
        *self.contents.borrow_mut() = Some(text.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_clipboard_shared() {
        let clipboard = MemoryClipboard::new();
        let mut handle = clipboard.clone();
        handle.set_text("copied").unwrap();
        assert_eq!(clipboard.contents().as_deref(), Some("copied"));
    }

    #[test]
    fn test_failing_clipboard() {
        let mut clipboard = MemoryClipboard::failing("no display");
        let err = clipboard.set_text("x").unwrap_err();
        assert_eq!(err.to_string(), "Clipboard error: no display");
        assert_eq!(clipboard.contents(), None);
    }
}
