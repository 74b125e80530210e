//! Line indexing and UTF-8 safe slicing over a document revision
//!
//! Every position in the engine is a byte offset into the document text.
//! Lines are 1-based. Offsets coming from the parser or from a host cursor
//! may land inside a multi-byte character (`ø`, `中`, `🎉`), so all slicing
//! goes through the boundary helpers here instead of `text[a..b]`.

// ─────────────────────────────────────────────────────────────────────────────
// Character Boundary Functions
// ─────────────────────────────────────────────────────────────────────────────

/// Largest index `<= index` that lies on a character boundary.
#[inline]
pub fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    let mut i = index;
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Smallest index `>= index` that lies on a character boundary.
#[inline]
pub fn ceil_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    let mut i = index;
    while i < s.len() && !s.is_char_boundary(i) {
        i += 1;
    }
    i
}

/// Slice `start..end`, widening both ends to character boundaries.
///
/// Returns an empty string if the adjusted range is empty.
#[inline]
pub fn safe_slice(s: &str, start: usize, end: usize) -> &str {
    let start = floor_char_boundary(s, start);
    let end = ceil_char_boundary(s, end);
    if start >= end {
        return "";
    }
    &s[start..end]
}

// ─────────────────────────────────────────────────────────────────────────────
// LineIndex
// ─────────────────────────────────────────────────────────────────────────────

/// Byte offsets of every line start in one document revision.
///
/// Built once per computation pass; lookups are binary searches so the
/// decoration traversal never rescans the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    /// Index the given text.
    pub fn new(text: &str) -> Self {
        let mut starts = Vec::with_capacity(text.len() / 32 + 1);
        starts.push(0);
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                starts.push(i + 1);
            }
        }
        Self {
            starts,
            len: text.len(),
        }
    }

    /// Number of lines (an empty document has one empty line).
    pub fn line_count(&self) -> usize {
        self.starts.len()
    }

    /// Total document length in bytes.
    pub fn text_len(&self) -> usize {
        self.len
    }

    /// 1-based line number containing `pos` (clamped to the document).
    pub fn line_of(&self, pos: usize) -> usize {
        let pos = pos.min(self.len);
        match self.starts.binary_search(&pos) {
            Ok(i) => i + 1,
            Err(i) => i,
        }
    }

    /// Byte offset where `line` starts. Out-of-range lines clamp to the last line.
    pub fn line_start(&self, line: usize) -> usize {
        let idx = line.clamp(1, self.starts.len()) - 1;
        self.starts[idx]
    }

    /// Byte offset where `line` ends, excluding its newline.
    pub fn line_end(&self, line: usize) -> usize {
        let line = line.clamp(1, self.starts.len());
        if line < self.starts.len() {
            self.starts[line] - 1
        } else {
            self.len
        }
    }

    /// Text of `line`, without the trailing newline.
    pub fn line_text<'t>(&self, text: &'t str, line: usize) -> &'t str {
        safe_slice(text, self.line_start(line), self.line_end(line))
    }

    /// Convert a parser position (1-based line, 1-based byte column) to an offset.
    pub fn offset_of(&self, line: usize, column: usize) -> usize {
        let start = self.line_start(line);
        let end = self.line_end(line);
        (start + column.saturating_sub(1)).min(end.max(start)).min(self.len)
    }

    /// Exclusive end offset for an inclusive parser end position.
    pub fn end_offset_of(&self, line: usize, column: usize) -> usize {
        if column == 0 {
            return self.line_start(line);
        }
        let start = self.line_start(line);
        // The inclusive end column may point at the newline itself; the
        // newline never belongs to a node's span.
        (start + column).min(self.line_end(line))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
