//! Editor module for hybridmark
//!
//! This module contains the document buffer, the edit-mode state machine and
//! the controller that ties parsing, decoration and widget commands together.

mod clipboard;
mod command;
mod controller;
mod document;
mod edit_mode;
mod opener;
mod outline;
mod paste;

pub use clipboard::{ClipboardProvider, MemoryClipboard, SystemClipboard};
pub use command::{CommandChannel, EditorCommand, EditorEvent};
pub use controller::HybridEditor;
pub use document::{Document, Selection, Transaction};
pub use edit_mode::{EditInput, EditModeState, KeyDisposition, Modifiers};
pub use opener::{ExternalOpener, RecordingOpener, SystemOpener};
pub use outline::{
    extract_outline, normalize_anchor, normalize_heading, DocumentOutline, OutlineItem,
};
pub use paste::{is_tabular, normalize_paste};
