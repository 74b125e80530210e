//! Structural pre-pass
//!
//! Runs once per decoration computation, before the tree traversal:
//!
//! 1. Block spans: tables (with corrected ends) and code blocks. These drive
//!    the whole-block edit-mode rule and exclude HTML matches.
//! 2. HTML regions: `<details>` sections, allow-listed block tags matched
//!    with depth tracking, and allow-listed inline tag pairs. The parser has
//!    no structural model of raw HTML, so these come from text scans.

use std::sync::OnceLock;

use regex::Regex;

use crate::markdown::parser::{NodeKind, SyntaxNode, SyntaxTree};
use crate::markdown::table::table_span;
use crate::text::LineIndex;

/// Block-level tags recognized at the start of a line.
const BLOCK_TAGS: &[&str] = &[
    "article", "aside", "blockquote", "center", "div", "dl", "figure", "footer", "h1", "h2", "h3",
    "h4", "h5", "h6", "header", "hr", "nav", "ol", "p", "pre", "section", "table", "ul",
];

/// Inline tags recognized inside a line.
const INLINE_TAGS: &[&str] = &[
    "abbr", "b", "br", "del", "i", "img", "ins", "kbd", "mark", "s", "small", "span", "sub",
    "sup", "u",
];

/// Tags that never have a closing tag.
const VOID_TAGS: &[&str] = &["br", "hr", "img"];

// ─────────────────────────────────────────────────────────────────────────────
// Types
// ─────────────────────────────────────────────────────────────────────────────

/// Kind of block construct that is edited as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Table,
    FencedCode,
    IndentedCode,
}

/// A table or code block span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSpan {
    pub kind: BlockKind,
    pub from: usize,
    pub to: usize,
    pub start_line: usize,
    pub end_line: usize,
}

impl BlockSpan {
    pub fn overlaps(&self, from: usize, to: usize) -> bool {
        self.from < to.max(from + 1) && from < self.to.max(self.from + 1)
    }
}

/// What an HTML region holds (unsanitized).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HtmlRegionKind {
    /// `<details><summary>…</summary>…</details>`
    Details { summary: String, content: String },
    /// Allow-listed block tag with its matched closing tag
    Block { html: String },
    /// Allow-listed inline tag pair or void tag within one line
    Inline { html: String },
}

/// A raw HTML range claimed by the pre-pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlRegion {
    pub from: usize,
    pub to: usize,
    pub kind: HtmlRegionKind,
}

/// Result of the pre-pass for one document revision.
#[derive(Debug, Clone, Default)]
pub struct StructuralPrepass {
    /// Table and code spans sorted by start
    pub blocks: Vec<BlockSpan>,
    /// Claimed HTML regions sorted by start, pairwise disjoint
    pub html: Vec<HtmlRegion>,
}

impl StructuralPrepass {
    pub fn run(text: &str, index: &LineIndex, tree: &SyntaxTree) -> Self {
        let blocks = collect_block_spans(text, index, tree);
        let html = scan_html(text, index, &blocks);
        Self { blocks, html }
    }

    /// Whether `[from, to)` lies entirely inside a claimed HTML region.
    pub fn inside_html(&self, from: usize, to: usize) -> bool {
        self.html.iter().any(|r| r.from <= from && to <= r.to)
    }

    /// Whether `[from, to)` intersects a claimed HTML region.
    pub fn overlaps_html(&self, from: usize, to: usize) -> bool {
        self.html.iter().any(|r| r.from < to && from < r.to)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Block Spans
// ─────────────────────────────────────────────────────────────────────────────

/// Collect table and code block spans from the tree.
pub fn collect_block_spans(text: &str, index: &LineIndex, tree: &SyntaxTree) -> Vec<BlockSpan> {
    let mut spans = Vec::new();
    tree.root.for_each(&mut |node: &SyntaxNode| {
        let (kind, from, to) = match &node.kind {
            NodeKind::Table { .. } => {
                let (from, to) = table_span(text, index, node);
                (BlockKind::Table, from, to)
            }
            NodeKind::CodeBlock { fenced, .. } => {
                let kind = if *fenced {
                    BlockKind::FencedCode
                } else {
                    BlockKind::IndentedCode
                };
                (kind, node.from, index.line_end(index.line_of(node.to)).max(node.from))
            }
            _ => return,
        };
        spans.push(BlockSpan {
            kind,
            from,
            to,
            start_line: index.line_of(from),
            end_line: index.line_of(to),
        });
    });
    spans.sort_by_key(|s| s.from);
    spans
}

// ─────────────────────────────────────────────────────────────────────────────
// HTML Scan
// ─────────────────────────────────────────────────────────────────────────────

fn details_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)<details>\s*<summary>(.*?)</summary>(.*?)</details>")
            .expect("valid details regex")
    })
}

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"<(/?)([a-zA-Z][a-zA-Z0-9]*)((?:[^>"']|"[^"]*"|'[^']*')*)>"#)
            .expect("valid tag regex")
    })
}

/// Find claimed HTML regions, skipping anything that touches a block span.
pub fn scan_html(text: &str, index: &LineIndex, blocks: &[BlockSpan]) -> Vec<HtmlRegion> {
    let mut regions: Vec<HtmlRegion> = Vec::new();
    let free = |from: usize, to: usize, regions: &[HtmlRegion]| {
        !blocks.iter().any(|b| b.overlaps(from, to))
            && !regions.iter().any(|r| r.from < to && from < r.to)
    };

    for caps in details_regex().captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        if !free(whole.start(), whole.end(), regions.as_slice()) {
            continue;
        }
        regions.push(HtmlRegion {
            from: whole.start(),
            to: whole.end(),
            kind: HtmlRegionKind::Details {
                summary: caps.get(1).map_or("", |m| m.as_str()).trim().to_string(),
                content: caps.get(2).map_or("", |m| m.as_str()).trim().to_string(),
            },
        });
    }

    scan_block_tags(text, index, &mut regions, &free);
    scan_inline_tags(text, index, &mut regions, &free);

    regions.sort_by_key(|r| r.from);
    regions
}

fn scan_block_tags(
    text: &str,
    index: &LineIndex,
    regions: &mut Vec<HtmlRegion>,
    free: &impl Fn(usize, usize, &[HtmlRegion]) -> bool,
) {
    let mut line = 1;
    while line <= index.line_count() {
        let line_text = index.line_text(text, line);
        let indent = line_text.len() - line_text.trim_start().len();
        let start = index.line_start(line) + indent;

        let opener = tag_regex()
            .captures(&text[start..index.line_end(line).max(start)])
            .filter(|c| c.get(0).is_some_and(|m| m.start() == 0));

        if let Some(caps) = opener {
            let closing = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
            let name = caps.get(2).map_or(String::new(), |m| m.as_str().to_ascii_lowercase());
            let open_end = start + caps.get(0).map_or(0, |m| m.end());

            if !closing && BLOCK_TAGS.contains(&name.as_str()) {
                let end = if VOID_TAGS.contains(&name.as_str()) {
                    Some(open_end)
                } else {
                    find_closing(text, open_end, &name)
                };
                if let Some(end) = end {
                    if free(start, end, regions.as_slice()) {
                        regions.push(HtmlRegion {
                            from: start,
                            to: end,
                            kind: HtmlRegionKind::Block {
                                html: text[start..end].to_string(),
                            },
                        });
                        line = index.line_of(end) + 1;
                        continue;
                    }
                }
            }
        }
        line += 1;
    }
}

fn scan_inline_tags(
    text: &str,
    index: &LineIndex,
    regions: &mut Vec<HtmlRegion>,
    free: &impl Fn(usize, usize, &[HtmlRegion]) -> bool,
) {
    for line in 1..=index.line_count() {
        let line_start = index.line_start(line);
        let line_text = index.line_text(text, line);
        let mut search_from = 0;

        while let Some(caps) = tag_regex().captures_at(line_text, search_from) {
            let Some(whole) = caps.get(0) else { break };
            search_from = whole.end();

            let closing = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
            let name = caps.get(2).map_or(String::new(), |m| m.as_str().to_ascii_lowercase());
            if closing || !INLINE_TAGS.contains(&name.as_str()) {
                continue;
            }
            // Odd number of backticks before the tag: it sits in inline code
            if line_text[..whole.start()].matches('`').count() % 2 == 1 {
                continue;
            }

            let end_in_line = if VOID_TAGS.contains(&name.as_str()) {
                Some(whole.end())
            } else {
                find_closing(line_text, whole.end(), &name)
            };
            let Some(end_in_line) = end_in_line else { continue };

            let from = line_start + whole.start();
            let to = line_start + end_in_line;
            if free(from, to, regions.as_slice()) {
                regions.push(HtmlRegion {
                    from,
                    to,
                    kind: HtmlRegionKind::Inline {
                        html: line_text[whole.start()..end_in_line].to_string(),
                    },
                });
                search_from = end_in_line;
            }
        }
    }
}

/// End offset of the closing tag matching an opener that ended at `after`.
///
/// Nested tags of the same name are counted so `<div><div></div></div>`
/// closes at the outer `</div>`.
fn find_closing(text: &str, after: usize, name: &str) -> Option<usize> {
    let mut depth = 1usize;
    let mut pos = after;
    while let Some(caps) = tag_regex().captures_at(text, pos) {
        let whole = caps.get(0)?;
        pos = whole.end();
        let tag = caps.get(2).map_or("", |m| m.as_str());
        if !tag.eq_ignore_ascii_case(name) {
            continue;
        }
        let closing = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
        let self_closing = caps
            .get(3)
            .is_some_and(|m| m.as_str().trim_end().ends_with('/'));
        if closing {
            depth -= 1;
            if depth == 0 {
                return Some(whole.end());
            }
        } else if !self_closing {
            depth += 1;
        }
    }
    None
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
