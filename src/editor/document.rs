//! Document buffer and transactions

use log::debug;

use crate::error::{Error, Result};
use crate::text::LineIndex;

use super::edit_mode::EditModeState;

// ─────────────────────────────────────────────────────────────────────────────
// Selection
// ─────────────────────────────────────────────────────────────────────────────

/// Selection as byte offsets; `head` is the cursor end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub anchor: usize,
    pub head: usize,
}

impl Selection {
    pub fn new(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    /// An empty selection at `pos`.
    pub fn cursor(pos: usize) -> Self {
        Self::new(pos, pos)
    }

    pub fn from(&self) -> usize {
        self.anchor.min(self.head)
    }

    pub fn to(&self) -> usize {
        self.anchor.max(self.head)
    }

    pub fn is_empty(&self) -> bool {
        self.anchor == self.head
    }

    /// Map through an edit that replaced `[from, to)` with `inserted` bytes.
    fn map(self, from: usize, to: usize, inserted: usize) -> Self {
        let map_pos = |pos: usize| {
            if pos < from {
                pos
            } else if pos >= to {
                pos - (to - from) + inserted
            } else {
                from + inserted
            }
        };
        Self::new(map_pos(self.anchor), map_pos(self.head))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Transaction
// ─────────────────────────────────────────────────────────────────────────────

/// A single buffer mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transaction {
    Insert { at: usize, text: String },
    Delete { from: usize, to: usize },
    Replace { from: usize, to: usize, text: String },
}

impl Transaction {
    fn parts(&self) -> (usize, usize, &str) {
        match self {
            Transaction::Insert { at, text } => (*at, *at, text),
            Transaction::Delete { from, to } => (*from, *to, ""),
            Transaction::Replace { from, to, text } => (*from, *to, text),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Document
// ─────────────────────────────────────────────────────────────────────────────

/// The text buffer with its revision, selection and edit-mode line.
#[derive(Debug, Clone, Default)]
pub struct Document {
    text: String,
    revision: u64,
    selection: Selection,
    pub edit_mode: EditModeState,
}

impl Document {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Set the selection, clamped to the buffer and to char boundaries.
    pub fn set_selection(&mut self, selection: Selection) {
        let clamp = |pos: usize| crate::text::floor_char_boundary(&self.text, pos.min(self.text.len()));
        self.selection = Selection::new(clamp(selection.anchor), clamp(selection.head));
    }

    pub fn line_index(&self) -> LineIndex {
        LineIndex::new(&self.text)
    }

    /// 1-based line of the cursor.
    pub fn cursor_line(&self) -> usize {
        self.line_index().line_of(self.selection.head)
    }

    /// Apply a transaction, mapping the selection through it.
    pub fn apply(&mut self, transaction: Transaction) -> Result<()> {
        let (from, to, insert) = transaction.parts();
        let len = self.text.len();
        if from > to
            || to > len
            || !self.text.is_char_boundary(from)
            || !self.text.is_char_boundary(to)
        {
            return Err(Error::InvalidRange { from, to, len });
        }

        self.text.replace_range(from..to, insert);
        self.selection = self.selection.map(from, to, insert.len());
        self.revision += 1;
        debug!(
            "Applied transaction {}..{} (+{} bytes), revision {}",
            from,
            to,
            insert.len(),
            self.revision
        );
        Ok(())
    }

    /// Replace the whole buffer, as on a file switch.
    pub fn replace_all(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.selection = Selection::default();
        self.edit_mode = EditModeState::default();
        self.revision += 1;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
