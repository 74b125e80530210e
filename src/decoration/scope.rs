//! Edit-mode membership for one decoration pass

use std::ops::RangeInclusive;

use crate::editor::Selection;
use crate::markdown::prepass::StructuralPrepass;
use crate::text::LineIndex;

/// Which lines are shown raw during one pass.
///
/// Built from the edit line; a multi-line selection made while editing
/// widens it to every selected line.
#[derive(Debug, Clone)]
pub struct EditScope<'a> {
    index: &'a LineIndex,
    prepass: &'a StructuralPrepass,
    lines: Option<RangeInclusive<usize>>,
}

impl<'a> EditScope<'a> {
    pub fn new(
        index: &'a LineIndex,
        prepass: &'a StructuralPrepass,
        edit_line: Option<usize>,
        selection: Selection,
    ) -> Self {
        let lines = edit_line.map(|line| {
            if selection.is_empty() {
                return line..=line;
            }
            let first = index.line_of(selection.from());
            let last = index.line_of(selection.to());
            line.min(first)..=line.max(last)
        });
        Self {
            index,
            prepass,
            lines,
        }
    }

    /// Whether any line is being edited.
    pub fn is_editing(&self) -> bool {
        self.lines.is_some()
    }

    /// Edit lines, if any.
    pub fn lines(&self) -> Option<&RangeInclusive<usize>> {
        self.lines.as_ref()
    }

    /// Whether `[from, to)` is shown raw.
    ///
    /// True when an edit line falls on a line the range touches, or when an
    /// edit line sits inside a table or code block overlapping the range.
    pub fn is_in_edit_mode(&self, from: usize, to: usize) -> bool {
        let Some(lines) = &self.lines else {
            return false;
        };
        let first = self.index.line_of(from);
        let last = self.index.line_of(to.max(from));
        if *lines.start() <= last && first <= *lines.end() {
            return true;
        }
        self.prepass.blocks.iter().any(|block| {
            block.overlaps(from, to)
                && *lines.start() <= block.end_line
                && block.start_line <= *lines.end()
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
