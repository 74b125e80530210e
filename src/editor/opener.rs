//! Opening external URLs

use std::cell::RefCell;
use std::rc::Rc;

use log::debug;

use crate::error::{Error, Result};

/// Hands URLs to something outside the editor.
pub trait ExternalOpener {
    fn open(&mut self, url: &str) -> Result<()>;
}

/// The system browser via `open`.
#[derive(Debug, Default)]
pub struct SystemOpener;

impl ExternalOpener for SystemOpener {
    fn open(&mut self, url: &str) -> Result<()> {
        open::that(url).map_err(|e| Error::Application(format!("Failed to open URL: {}", e)))?;
        debug!("Opened URL: {}", url);
        Ok(())
    }
}

/// Records URLs instead of opening them. Clones share the record.
#[derive(Debug, Clone, Default)]
pub struct RecordingOpener {
    opened: Rc<RefCell<Vec<String>>>,
}

impl RecordingOpener {
    pub fn opened(&self) -> Vec<String> {
        self.opened.borrow().clone()
    }
}

impl ExternalOpener for RecordingOpener {
    fn open(&mut self, url: &str) -> Result<()> {
        self.opened.borrow_mut().push(url.to_string());
        Ok(())
    }
}
