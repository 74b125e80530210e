//! Edit-mode state machine
//!
//! Tracks the single line (if any) shown as raw Markdown. Double-click,
//! Enter and the first typed character enter edit mode; Escape leaves it;
//! while editing, the edit line follows clicks and cursor movement.

use log::debug;

use crate::text::LineIndex;

/// Modifier keys held during an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    /// Cmd on macOS, Super elsewhere
    pub meta: bool,
}

impl Modifiers {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn any(&self) -> bool {
        self.ctrl || self.alt || self.meta
    }
}

/// An input the state machine reacts to. Positions are byte offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditInput {
    DoubleClick { pos: usize },
    Click { pos: usize },
    Enter,
    Escape,
    TypedChar { ch: char, modifiers: Modifiers },
    SelectionChanged { head: usize },
}

/// Whether the host should still run its default handling for the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDisposition {
    /// The state machine used the input up
    Consumed,
    /// Default handling (insert the newline or character, move the cursor)
    PassThrough,
}

/// The line shown raw, or `None` when the document is fully rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EditModeState {
    pub edit_line: Option<usize>,
}

impl EditModeState {
    pub fn is_editing(&self) -> bool {
        self.edit_line.is_some()
    }

    /// React to an input. `cursor` is the cursor offset before the input.
    pub fn handle(&mut self, input: EditInput, index: &LineIndex, cursor: usize) -> KeyDisposition {
        let before = self.edit_line;
        let disposition = match input {
            EditInput::DoubleClick { pos } => {
                self.edit_line = Some(index.line_of(pos));
                KeyDisposition::PassThrough
            }
            EditInput::Click { pos } => {
                self.follow(index.line_of(pos));
                KeyDisposition::PassThrough
            }
            EditInput::Enter => {
                if self.is_editing() {
                    KeyDisposition::PassThrough
                } else {
                    self.edit_line = Some(index.line_of(cursor));
                    KeyDisposition::Consumed
                }
            }
            EditInput::Escape => {
                if self.is_editing() {
                    self.edit_line = None;
                    KeyDisposition::Consumed
                } else {
                    KeyDisposition::PassThrough
                }
            }
            EditInput::TypedChar { ch, modifiers } => {
                if !self.is_editing() && !ch.is_control() && !modifiers.any() {
                    self.edit_line = Some(index.line_of(cursor));
                }
                KeyDisposition::PassThrough
            }
            EditInput::SelectionChanged { head } => {
                self.follow(index.line_of(head));
                KeyDisposition::PassThrough
            }
        };

        if self.edit_line != before {
            debug!(
                "Edit mode {:?} -> {:?} on {:?}",
                before, self.edit_line, input
            );
        }
        disposition
    }

    /// Move the edit line to `line` if already editing.
    pub fn follow(&mut self, line: usize) {
        if self.is_editing() {
            self.edit_line = Some(line);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
