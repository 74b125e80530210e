//! Document outline and in-document anchor resolution
//!
//! Headings are extracted from the raw text (ATX style only, fenced code
//! skipped). The same list backs outline/navigation hosts and the
//! `#anchor` targets of link widgets.

use std::sync::OnceLock;

use regex::Regex;

// ─────────────────────────────────────────────────────────────────────────────
// OutlineItem
// ─────────────────────────────────────────────────────────────────────────────

/// Represents a single heading item in the document outline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineItem {
    /// Heading level (1-6 for H1-H6)
    pub level: u8,
    /// The heading text content (stripped of markdown formatting)
    pub title: String,
    /// The heading text as written, closing `#`s removed
    pub raw_title: String,
    /// Line number in the source document (1-indexed)
    pub line: usize,
    /// Byte offset of the heading line
    pub offset: usize,
}

impl OutlineItem {
    /// Get the indentation level (0 for H1, 1 for H2, etc.)
    pub fn indent_level(&self) -> usize {
        (self.level.saturating_sub(1)) as usize
    }

    /// Whether this heading is the target of `#anchor`.
    pub fn matches_anchor(&self, anchor: &str) -> bool {
        let normalized_anchor = normalize_anchor(anchor);
        normalize_heading(&self.raw_title) == normalized_anchor
            || self.raw_title.to_lowercase() == anchor.to_lowercase()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// DocumentOutline
// ─────────────────────────────────────────────────────────────────────────────

/// A complete document outline containing all headings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentOutline {
    /// All heading items in document order
    pub items: Vec<OutlineItem>,
}

impl DocumentOutline {
    /// Check if the outline is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Find the index of the heading whose section contains `line`.
    ///
    /// Returns None if the line is before any heading.
    pub fn find_current_section(&self, line: usize) -> Option<usize> {
        self.items.iter().rposition(|item| item.line <= line)
    }

    /// First heading matching an anchor id (without the leading `#`).
    pub fn find_anchor(&self, anchor: &str) -> Option<&OutlineItem> {
        let anchor = anchor.strip_prefix('#').unwrap_or(anchor);
        self.items.iter().find(|item| item.matches_anchor(anchor))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Outline Extraction Functions
// ─────────────────────────────────────────────────────────────────────────────

/// Extract ATX headings from raw markdown text, skipping fenced code.
pub fn extract_outline(text: &str) -> DocumentOutline {
    let mut items = Vec::new();
    let mut offset = 0;
    let mut fence: Option<(char, usize)> = None;

    for (line_idx, line) in text.split('\n').enumerate() {
        let line_len = line.len() + 1;
        let line = line.strip_suffix('\r').unwrap_or(line);

        if let Some(marker) = fence_marker(line) {
            match fence {
                None => fence = Some(marker),
                Some((c, n)) if c == marker.0 && marker.1 >= n && is_closing_fence(line) => {
                    fence = None
                }
                _ => {}
            }
        } else if fence.is_none() {
            if let Some((level, raw_title)) = parse_atx_heading(line) {
                items.push(OutlineItem {
                    level,
                    title: strip_inline_formatting(&raw_title),
                    raw_title,
                    line: line_idx + 1,
                    offset,
                });
            }
        }

        offset += line_len;
    }

    DocumentOutline { items }
}

/// Fence character and run length if the line opens or closes a fence.
fn fence_marker(line: &str) -> Option<(char, usize)> {
    let trimmed = line.trim_start();
    if line.len() - trimmed.len() > 3 {
        return None;
    }
    let c = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let run = trimmed.chars().take_while(|&x| x == c).count();
    (run >= 3).then_some((c, run))
}

fn is_closing_fence(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.chars().all(|c| c == '`' || c == '~')
}

/// Parse an ATX-style heading from a line.
///
/// Returns Some((level, title)) if the line is a heading, None otherwise.
fn parse_atx_heading(line: &str) -> Option<(u8, String)> {
    let trimmed = line.trim_start();
    if line.len() - trimmed.len() > 3 || !trimmed.starts_with('#') {
        return None;
    }

    let hash_count = trimmed.chars().take_while(|&c| c == '#').count();
    if hash_count > 6 {
        return None;
    }

    // Must have a space after the hashes (or be empty for a valid heading)
    let rest = &trimmed[hash_count..];
    if !rest.is_empty() && !rest.starts_with(' ') && !rest.starts_with('\t') {
        return None;
    }

    let title = rest.trim().trim_end_matches('#').trim().to_string();
    Some((hash_count as u8, title))
}

fn inline_format_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"!?\[([^\]]*)\]\([^)]*\)|\*\*(.+?)\*\*|__(.+?)__|~~(.+?)~~|`([^`]+)`|\*([^*\s][^*]*)\*")
            .expect("valid inline format regex")
    })
}

/// Strip common inline markdown formatting from text.
///
/// Removes: **bold**, *italic*, `code`, ~~strikethrough~~, [links](url), ![images](url)
pub fn strip_inline_formatting(text: &str) -> String {
    let mut result = text.to_string();
    // Nested formatting unwraps one layer per pass
    for _ in 0..3 {
        let next = inline_format_regex()
            .replace_all(&result, |caps: &regex::Captures| {
                (1..=6)
                    .find_map(|i| caps.get(i))
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default()
            })
            .into_owned();
        if next == result {
            break;
        }
        result = next;
    }
    result
}

// ─────────────────────────────────────────────────────────────────────────────
// Anchor Normalization
// ─────────────────────────────────────────────────────────────────────────────

fn heading_noise_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"[^\w\s\x{3040}-\x{309f}\x{30a0}-\x{30ff}\x{4e00}-\x{9faf}]")
            .expect("valid heading noise regex")
    })
}

/// Lowercase an anchor id and turn dashes back into spaces.
pub fn normalize_anchor(anchor: &str) -> String {
    anchor.to_lowercase().replace('-', " ")
}

/// Lowercase heading text, drop punctuation (kana and CJK kept), collapse whitespace.
pub fn normalize_heading(heading: &str) -> String {
    let lower = heading.to_lowercase();
    let cleaned = heading_noise_regex().replace_all(&lower, "");
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
