//! Decoration computation
//!
//! One pre-order walk over the syntax tree. Each node kind either emits
//! decorations and keeps descending, or claims its whole span and stops.
//! HTML regions from the structural pre-pass are emitted first and shadow
//! every node that lies inside them.

use std::sync::OnceLock;

use log::{debug, warn};
use regex::Regex;

use super::{finalize, Decoration, EditScope};
use crate::editor::Selection;
use crate::markdown::parser::{NodeKind, SyntaxNode, SyntaxTree};
use crate::markdown::prepass::{HtmlRegionKind, StructuralPrepass};
use crate::markdown::table::{parse_table_source, table_span};
use crate::text::{safe_slice, LineIndex};
use crate::widgets::{
    is_diagram_language, CheckboxWidget, CodeWidget, DetailsWidget, DiagramWidget, HtmlWidget,
    ImageWidget, LinkWidget, Widget,
};

/// Compute the decoration list for one document revision.
pub fn compute_decorations(
    text: &str,
    tree: &SyntaxTree,
    selection: Selection,
    edit_line: Option<usize>,
    base_dir: &str,
) -> Vec<Decoration> {
    let index = LineIndex::new(text);
    let prepass = StructuralPrepass::run(text, &index, tree);
    compute_with_prepass(text, tree, &index, &prepass, selection, edit_line, base_dir)
}

/// Same as [`compute_decorations`] with a line index and pre-pass the caller
/// already built for this revision.
pub fn compute_with_prepass(
    text: &str,
    tree: &SyntaxTree,
    index: &LineIndex,
    prepass: &StructuralPrepass,
    selection: Selection,
    edit_line: Option<usize>,
    base_dir: &str,
) -> Vec<Decoration> {
    let mut pass = Pass {
        text,
        index,
        prepass,
        scope: EditScope::new(index, prepass, edit_line, selection),
        base_dir,
        out: Vec::new(),
        visited: 0,
    };

    pass.html_regions();
    let mut ancestors = Vec::new();
    pass.visit(&tree.root, &mut ancestors);

    let visited = pass.visited;
    let decorations = finalize(pass.out);
    debug!(
        "Computed {} decorations from {} nodes (edit line {:?})",
        decorations.len(),
        visited,
        edit_line
    );
    decorations
}

// ─────────────────────────────────────────────────────────────────────────────
// Traversal
// ─────────────────────────────────────────────────────────────────────────────

struct Pass<'a> {
    text: &'a str,
    index: &'a LineIndex,
    prepass: &'a StructuralPrepass,
    scope: EditScope<'a>,
    base_dir: &'a str,
    out: Vec<Decoration>,
    visited: usize,
}

impl<'a> Pass<'a> {
    /// Queue a decoration; ranges touching claimed HTML are skipped.
    fn push(&mut self, decoration: Decoration) {
        if decoration.is_range() && self.prepass.overlaps_html(decoration.from(), decoration.to()) {
            return;
        }
        self.out.push(decoration);
    }

    fn editing(&self, from: usize, to: usize) -> bool {
        self.scope.is_in_edit_mode(from, to)
    }

    fn visit(&mut self, node: &'a SyntaxNode, ancestors: &mut Vec<&'a SyntaxNode>) {
        self.visited += 1;
        if node.kind != NodeKind::Document && self.prepass.inside_html(node.from, node.to) {
            return;
        }

        let descend = match &node.kind {
            NodeKind::Emphasis | NodeKind::Strong | NodeKind::Strikethrough => {
                self.emphasis(node);
                true
            }
            NodeKind::Heading { setext: false, .. } => {
                self.atx_heading(node);
                true
            }
            NodeKind::BlockQuote => {
                self.blockquote(node, ancestors);
                true
            }
            NodeKind::Item { ordered } => {
                self.list_item(node, *ordered, None);
                true
            }
            NodeKind::TaskItem { ordered, checked } => {
                self.list_item(node, *ordered, Some(*checked));
                true
            }
            NodeKind::Image { url, title } => self.image(node, url, title),
            NodeKind::Link { url, .. } => self.link(node, url),
            NodeKind::Table { .. } => {
                self.table(node);
                false
            }
            NodeKind::Code => {
                self.inline_code(node);
                false
            }
            NodeKind::CodeBlock {
                fenced,
                info,
                literal,
            } => {
                if *fenced {
                    self.fenced_code(node, info, literal);
                }
                false
            }
            _ => true,
        };

        if descend {
            ancestors.push(node);
            for child in &node.children {
                self.visit(child, ancestors);
            }
            ancestors.pop();
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // HTML Regions
    // ─────────────────────────────────────────────────────────────────────────

    fn html_regions(&mut self) {
        for region in &self.prepass.html {
            if self.editing(region.from, region.to) {
                continue;
            }
            let widget = match &region.kind {
                HtmlRegionKind::Details { summary, content } => {
                    Widget::Details(DetailsWidget::new(summary, content))
                }
                HtmlRegionKind::Block { html } => Widget::HtmlBlock(HtmlWidget::new(html, false)),
                HtmlRegionKind::Inline { html } => Widget::HtmlBlock(HtmlWidget::new(html, true)),
            };
            self.out
                .push(Decoration::replace(region.from, region.to, widget));
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Inline Marks
    // ─────────────────────────────────────────────────────────────────────────

    fn emphasis(&mut self, node: &SyntaxNode) {
        if self.editing(node.from, node.to) {
            return;
        }
        let slice = safe_slice(self.text, node.from, node.to);
        let width = match node.kind {
            NodeKind::Emphasis => 1,
            NodeKind::Strong => 2,
            _ => slice.bytes().take_while(|&b| b == b'~').count().clamp(1, 2),
        };
        if delimiters_match(slice, width) {
            self.push(Decoration::hide(node.from, node.from + width));
            self.push(Decoration::hide(node.to - width, node.to));
        }
    }

    fn inline_code(&mut self, node: &SyntaxNode) {
        if self.editing(node.from, node.to) {
            return;
        }
        let bytes = self.text.as_bytes();
        let slice = &bytes[node.from..node.to];
        let lead = slice.iter().take_while(|&&b| b == b'`').count();
        let trail = slice.iter().rev().take_while(|&&b| b == b'`').count();

        if lead > 0 {
            if lead == trail && slice.len() > lead * 2 {
                self.push(Decoration::hide(node.from, node.from + lead));
                self.push(Decoration::hide(node.to - trail, node.to));
            }
            return;
        }

        // Node covers only the code content; the runs sit just outside it
        let before = bytes[..node.from].iter().rev().take_while(|&&b| b == b'`').count();
        let after = bytes[node.to..].iter().take_while(|&&b| b == b'`').count();
        if before > 0 && before == after {
            self.push(Decoration::hide(node.from - before, node.from));
            self.push(Decoration::hide(node.to, node.to + after));
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Block Marks
    // ─────────────────────────────────────────────────────────────────────────

    fn atx_heading(&mut self, node: &SyntaxNode) {
        if self.editing(node.from, node.to) {
            return;
        }
        let bytes = self.text.as_bytes();
        let end = self.index.line_end(node.start_line);
        let mut pos = node.from;
        while pos < end && bytes[pos] == b' ' {
            pos += 1;
        }
        let hashes = pos;
        while pos < end && bytes[pos] == b'#' {
            pos += 1;
        }
        if pos == hashes {
            return;
        }
        if pos < end && (bytes[pos] == b' ' || bytes[pos] == b'\t') {
            pos += 1;
        }
        self.push(Decoration::hide(node.from, pos));
    }

    fn blockquote(&mut self, node: &SyntaxNode, ancestors: &[&SyntaxNode]) {
        let quotes: Vec<&SyntaxNode> = ancestors
            .iter()
            .copied()
            .filter(|a| a.kind == NodeKind::BlockQuote)
            .collect();
        if self.editing(node.from, node.to) || quotes.iter().any(|q| self.editing(q.from, q.to)) {
            return;
        }

        let level = quotes.len() + 1;
        let outermost = quotes.first().copied().unwrap_or(node);
        let column = outermost.from - self.index.line_start(outermost.start_line);

        for line in node.start_line..=node.end_line {
            let mut class_name = format!("cm-blockquote-line cm-blockquote-level-{}", level);
            if line == node.start_line {
                class_name.push_str(" cm-blockquote-start");
            }
            if line == node.end_line {
                class_name.push_str(" cm-blockquote-end");
            }
            self.push(
                Decoration::line_mark(self.index.line_start(line), class_name)
                    .with_attribute("data-level", level.to_string()),
            );

            if let Some((from, to)) = self.quote_mark(line, column, level) {
                // Prefixes inside a claimed code block or table belong to it
                let in_block = self.prepass.blocks.iter().any(|b| b.from < from && from < b.to);
                if !in_block {
                    self.push(Decoration::hide(from, to));
                }
            }
        }
    }

    /// Range of the `level`-th `>` on a line: leading blanks, the mark and
    /// one trailing space.
    fn quote_mark(&self, line: usize, column: usize, level: usize) -> Option<(usize, usize)> {
        let bytes = self.text.as_bytes();
        let line_start = self.index.line_start(line);
        let line_end = self.index.line_end(line);
        let base = (line_start + column).min(line_end);

        let mut pos = if bytes[line_start..base].iter().all(|b| *b == b' ' || *b == b'\t') {
            line_start
        } else {
            base
        };

        for depth in 1..=level {
            let start = pos;
            while pos < line_end && (bytes[pos] == b' ' || bytes[pos] == b'\t') {
                pos += 1;
            }
            if pos >= line_end || bytes[pos] != b'>' {
                return None;
            }
            pos += 1;
            if pos < line_end && bytes[pos] == b' ' {
                pos += 1;
            }
            if depth == level {
                return Some((start, pos));
            }
        }
        None
    }

    fn list_item(&mut self, node: &SyntaxNode, ordered: bool, task: Option<bool>) {
        let line_end = self.index.line_end(node.start_line);
        let Some(marker) = ListMarker::parse(self.text, node.from, line_end) else {
            return;
        };

        let width = marker.content_start - marker.from;
        let mut class_name = String::from("cm-list-item");
        if ordered {
            class_name.push_str(" cm-list-item-ordered");
        }
        if task.is_some() {
            class_name.push_str(" cm-task-item");
        }
        self.push(
            Decoration::line_mark(self.index.line_start(node.start_line), class_name).with_attribute(
                "style",
                format!("padding-left: {w}ch; text-indent: -{w}ch", w = width),
            ),
        );

        if self.editing(marker.from, marker.to) {
            return;
        }

        if let Some(checked) = task {
            let bracket = marker.content_start;
            if is_task_marker(self.text, bracket) {
                let from = if marker.bullet { marker.from } else { bracket };
                self.push(Decoration::replace(
                    from,
                    bracket + 3,
                    Widget::Checkbox(CheckboxWidget {
                        checked,
                        pos: bracket,
                    }),
                ));
                return;
            }
        }

        if marker.bullet {
            self.push(Decoration::replace(marker.from, marker.to, Widget::Bullet));
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Widgets
    // ─────────────────────────────────────────────────────────────────────────

    fn image(&mut self, node: &SyntaxNode, url: &str, title: &str) -> bool {
        if self.editing(node.from, node.to) {
            return true;
        }
        let slice = safe_slice(self.text, node.from, node.to);
        let widget = match image_regex().captures(slice) {
            Some(caps) => ImageWidget::new(
                caps.get(2).map_or("", |m| m.as_str()),
                caps.get(1).map_or("", |m| m.as_str()),
                caps.get(3).map(|m| m.as_str().to_string()),
                self.base_dir,
            ),
            None => ImageWidget::new(
                url,
                image_alt_regex()
                    .captures(slice)
                    .and_then(|c| c.get(1))
                    .map_or("", |m| m.as_str()),
                (!title.is_empty()).then(|| title.to_string()),
                self.base_dir,
            ),
        };
        self.push(Decoration::replace(node.from, node.to, Widget::Image(widget)));
        false
    }

    fn link(&mut self, node: &SyntaxNode, url: &str) -> bool {
        if self.editing(node.from, node.to) {
            return true;
        }
        let slice = safe_slice(self.text, node.from, node.to);
        let Some(text) = link_text(slice, url) else {
            debug!("Link at {} does not match its source slice, left raw", node.from);
            return true;
        };
        self.push(Decoration::replace(
            node.from,
            node.to,
            Widget::Link(LinkWidget::new(text, url)),
        ));
        false
    }

    fn table(&mut self, node: &SyntaxNode) {
        let (from, to) = table_span(self.text, self.index, node);
        if self.editing(from, to) {
            return;
        }
        let data = parse_table_source(safe_slice(self.text, from, to), from);
        let widget = Widget::table(data).unwrap_or_else(|e| {
            warn!("Table at {} rendered as error placeholder: {}", from, e);
            Widget::render_error(e.to_string())
        });
        self.push(Decoration::replace(from, to, widget));
    }

    fn fenced_code(&mut self, node: &SyntaxNode, info: &str, literal: &str) {
        let end_line = self.index.line_of(node.to);
        let to = self.index.line_end(end_line).max(node.from);
        let language = info.split_whitespace().next().unwrap_or("");

        if self.editing(node.from, to) {
            for line in node.start_line..=end_line {
                let mut class_name = String::from("cm-codeblock-line");
                if line == node.start_line {
                    class_name.push_str(" cm-codeblock-start");
                }
                if line == end_line {
                    class_name.push_str(" cm-codeblock-end");
                }
                let mut mark = Decoration::line_mark(self.index.line_start(line), class_name);
                if !language.is_empty() {
                    mark = mark.with_attribute("data-language", language);
                }
                self.push(mark);
            }
            return;
        }

        let widget = if is_diagram_language(language) {
            Widget::Diagram(DiagramWidget::new(language, literal))
        } else {
            Widget::CodeBlock(CodeWidget::new(language, literal))
        };
        self.push(Decoration::replace(node.from, to, widget));
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Slice Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn image_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"^!\[(.*?)\]\((.*?)(?:\s+"(.*?)")?\)"#).expect("valid image regex")
    })
}

fn image_alt_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^!\[(.*?)\]").expect("valid image alt regex"))
}

/// Opening and closing runs of `width` identical emphasis characters.
fn delimiters_match(slice: &str, width: usize) -> bool {
    let bytes = slice.as_bytes();
    if bytes.len() < width * 2 + 1 {
        return false;
    }
    let mark = bytes[0];
    matches!(mark, b'*' | b'_' | b'~')
        && bytes[..width].iter().all(|&b| b == mark)
        && bytes[bytes.len() - width..].iter().all(|&b| b == mark)
}

/// Display text for a link node's source slice.
///
/// Inline and reference links use the bracketed text, autolinks the text
/// between angle brackets, bare URLs the slice itself. Returns `None` when
/// the slice is not the link at all.
fn link_text(slice: &str, url: &str) -> Option<String> {
    if let Some(rest) = slice.strip_prefix('[') {
        let mut depth = 1usize;
        let mut escaped = false;
        for (i, c) in rest.char_indices() {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '[' => depth += 1,
                ']' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(rest[..i].to_string());
                    }
                }
                _ => {}
            }
        }
        return None;
    }
    if let Some(inner) = slice.strip_prefix('<').and_then(|s| s.strip_suffix('>')) {
        return Some(inner.to_string());
    }
    (!slice.is_empty() && url.ends_with(slice)).then(|| slice.to_string())
}

/// Whether `[ ]`, `[x]` or `[X]` starts at `pos`.
fn is_task_marker(text: &str, pos: usize) -> bool {
    matches!(
        text.as_bytes().get(pos..pos + 3),
        Some(b"[ ]") | Some(b"[x]") | Some(b"[X]")
    )
}

/// A list item's marker as found in the source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ListMarker {
    from: usize,
    to: usize,
    /// First byte after the marker and its following blanks
    content_start: usize,
    bullet: bool,
}

impl ListMarker {
    fn parse(text: &str, from: usize, line_end: usize) -> Option<Self> {
        let bytes = text.as_bytes();
        let mut pos = from;
        while pos < line_end && (bytes[pos] == b' ' || bytes[pos] == b'\t') {
            pos += 1;
        }
        let start = pos;
        let bullet = match bytes.get(pos) {
            Some(b'-' | b'*' | b'+') => {
                pos += 1;
                true
            }
            Some(b) if b.is_ascii_digit() => {
                while pos < line_end && bytes[pos].is_ascii_digit() && pos - start < 9 {
                    pos += 1;
                }
                if !matches!(bytes.get(pos), Some(b'.' | b')')) {
                    return None;
                }
                pos += 1;
                false
            }
            _ => return None,
        };
        let to = pos;
        while pos < line_end && (bytes[pos] == b' ' || bytes[pos] == b'\t') {
            pos += 1;
        }
        Some(Self {
            from: start,
            to,
            content_start: pos,
            bullet,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::table::TableData;
    use pretty_assertions::assert_eq;

    fn decorate(text: &str, edit_line: Option<usize>) -> Vec<Decoration> {
        let tree = SyntaxTree::parse(text);
        let index = LineIndex::new(text);
        let cursor = edit_line.map_or(0, |line| index.line_start(line));
        compute_decorations(text, &tree, Selection::cursor(cursor), edit_line, "/docs")
    }

    fn hidden<'t>(text: &'t str, decorations: &[Decoration]) -> Vec<&'t str> {
        decorations
            .iter()
            .filter_map(|d| match d {
                Decoration::Hide { from, to } => Some(&text[*from..*to]),
                _ => None,
            })
            .collect()
    }

    fn widgets(decorations: &[Decoration]) -> Vec<&Widget> {
        decorations.iter().filter_map(Decoration::widget).collect()
    }

    fn line_marks(decorations: &[Decoration]) -> Vec<(usize, &str)> {
        decorations
            .iter()
            .filter_map(|d| match d {
                Decoration::LineMark {
                    line_start,
                    class_name,
                    ..
                } => Some((*line_start, class_name.as_str())),
                _ => None,
            })
            .collect()
    }

    fn assert_sorted_disjoint(decorations: &[Decoration]) {
        let ranges: Vec<&Decoration> = decorations.iter().filter(|d| d.is_range()).collect();
        for pair in ranges.windows(2) {
            assert!(
                pair[0].to() <= pair[1].from(),
                "overlap: {:?} / {:?}",
                pair[0],
                pair[1]
            );
        }
        for pair in decorations.windows(2) {
            assert!(pair[0].from() <= pair[1].from());
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Headings and Inline Marks
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_heading_hides_exactly_prefix() {
        let text = "### Title";
        let decorations = decorate(text, None);
        assert_eq!(decorations, vec![Decoration::hide(0, 4)]);
        assert_eq!(hidden(text, &decorations), vec!["### "]);
    }

    #[test]
    fn test_heading_edit_mode_restores_raw() {
        let text = "### Title\n\nbody";
        let decorations = decorate(text, Some(1));
        assert!(decorations.is_empty());
    }

    #[test]
    fn test_setext_heading_not_decorated() {
        assert!(decorate("Title\n=====\n", None).is_empty());
    }

    #[test]
    fn test_emphasis_marks_hidden() {
        let text = "a **bold** and *it* and ~~old~~";
        let decorations = decorate(text, None);
        assert_eq!(
            hidden(text, &decorations),
            vec!["**", "**", "*", "*", "~~", "~~"]
        );
    }

    #[test]
    fn test_emphasis_in_edit_mode_raw() {
        let text = "**bold**\n\n*other*";
        let decorations = decorate(text, Some(1));
        assert_eq!(hidden(text, &decorations), vec!["*", "*"]);
    }

    #[test]
    fn test_inline_code_backticks_hidden() {
        let text = "run `cargo` now";
        let decorations = decorate(text, None);
        assert_eq!(hidden(text, &decorations), vec!["`", "`"]);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Blockquotes
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_triple_blockquote_marks() {
        let text = ">>> text";
        let decorations = decorate(text, None);
        assert_eq!(
            line_marks(&decorations),
            vec![
                (0, "cm-blockquote-line cm-blockquote-level-1 cm-blockquote-start cm-blockquote-end"),
                (0, "cm-blockquote-line cm-blockquote-level-2 cm-blockquote-start cm-blockquote-end"),
                (0, "cm-blockquote-line cm-blockquote-level-3 cm-blockquote-start cm-blockquote-end"),
            ]
        );
        assert_eq!(hidden(text, &decorations), vec![">", ">", "> "]);
    }

    #[test]
    fn test_blockquote_edit_mode_covers_nested() {
        let text = "> outer\n>\n> > inner\n\nafter";
        let decorations = decorate(text, Some(1));
        assert!(line_marks(&decorations).is_empty());
        assert!(hidden(text, &decorations).is_empty());
    }

    #[test]
    fn test_multi_line_blockquote_start_end() {
        let text = "> one\n> two\n";
        let decorations = decorate(text, None);
        let marks = line_marks(&decorations);
        assert_eq!(marks.len(), 2);
        assert!(marks[0].1.contains("cm-blockquote-start"));
        assert!(!marks[0].1.contains("cm-blockquote-end"));
        assert!(marks[1].1.contains("cm-blockquote-end"));
        assert_eq!(hidden(text, &decorations), vec!["> ", "> "]);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lists
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_bullet_replaced_with_glyph() {
        let text = "- item";
        let decorations = decorate(text, None);
        assert_eq!(decorations.len(), 2);
        match &decorations[0] {
            Decoration::LineMark {
                class_name,
                attributes,
                ..
            } => {
                assert_eq!(class_name, "cm-list-item");
                assert_eq!(
                    attributes.get("style").map(String::as_str),
                    Some("padding-left: 2ch; text-indent: -2ch")
                );
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(decorations[1], Decoration::replace(0, 1, Widget::Bullet));
    }

    #[test]
    fn test_bullet_raw_in_edit_mode_keeps_indent() {
        let decorations = decorate("- item", Some(1));
        assert_eq!(decorations.len(), 1);
        assert!(!decorations[0].is_range());
    }

    #[test]
    fn test_ordered_marker_indent_only() {
        let decorations = decorate("10. tenth", None);
        assert_eq!(line_marks(&decorations), vec![(0, "cm-list-item cm-list-item-ordered")]);
        assert!(widgets(&decorations).is_empty());
    }

    #[test]
    fn test_task_item_checkbox() {
        let text = "- [ ] task\n- [x] done";
        let decorations = decorate(text, None);
        let boxes: Vec<&Decoration> = decorations.iter().filter(|d| d.is_range()).collect();
        assert_eq!(
            boxes,
            vec![
                &Decoration::replace(
                    0,
                    5,
                    Widget::Checkbox(CheckboxWidget {
                        checked: false,
                        pos: 2
                    })
                ),
                &Decoration::replace(
                    11,
                    16,
                    Widget::Checkbox(CheckboxWidget {
                        checked: true,
                        pos: 13
                    })
                ),
            ]
        );
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Links and Images
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_link_widget() {
        let text = "see [the **docs**](https://example.com) here";
        let decorations = decorate(text, None);
        assert_eq!(
            decorations,
            vec![Decoration::replace(
                4,
                39,
                Widget::Link(LinkWidget::new("the **docs**", "https://example.com"))
            )]
        );
    }

    #[test]
    fn test_autolink_widget() {
        let text = "mail <https://example.com>";
        let decorations = decorate(text, None);
        assert_eq!(
            widgets(&decorations),
            vec![&Widget::Link(LinkWidget::new(
                "https://example.com",
                "https://example.com"
            ))]
        );
    }

    #[test]
    fn test_bare_url_widgets() {
        assert_eq!(
            decorate("see https://x.org ok", None),
            vec![Decoration::replace(
                4,
                17,
                Widget::Link(LinkWidget::new("https://x.org", "https://x.org"))
            )]
        );
        assert_eq!(
            decorate("www.x.org", None),
            vec![Decoration::replace(
                0,
                9,
                Widget::Link(LinkWidget::new("www.x.org", "http://www.x.org"))
            )]
        );
        assert_eq!(
            decorate("me@x.org", None),
            vec![Decoration::replace(
                0,
                8,
                Widget::Link(LinkWidget::new("me@x.org", "mailto:me@x.org"))
            )]
        );
    }

    #[test]
    fn test_bare_url_on_second_line() {
        let text = "intro
read https://x.org";
        let decorations = decorate(text, None);
        let link = decorations.iter().find(|d| d.is_range()).unwrap();
        assert_eq!(&text[link.from()..link.to()], "https://x.org");
        assert!(decorate(text, Some(2)).iter().all(|d| !d.is_range()));
    }

    #[test]
    fn test_link_edit_mode_shows_inner_marks() {
        let text = "[**a**](u)";
        let decorations = decorate(text, Some(1));
        assert!(decorations.is_empty());
    }

    #[test]
    fn test_image_widget_with_size_title() {
        let text = "![logo](./img/logo.png \"=120x40\")";
        let decorations = decorate(text, None);
        assert_eq!(
            widgets(&decorations),
            vec![&Widget::Image(ImageWidget::new(
                "./img/logo.png",
                "logo",
                Some("=120x40".to_string()),
                "/docs"
            ))]
        );
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Tables
    // ─────────────────────────────────────────────────────────────────────────

    const TABLE: &str = "| A | B |\n| --- | :-: |\n| 1 | |\n| 2 | 3 |\n\nafter";

    fn table_data(decorations: &[Decoration]) -> Option<TableData> {
        widgets(decorations).into_iter().find_map(|w| match w {
            Widget::Table(table) => Some(table.data.clone()),
            _ => None,
        })
    }

    #[test]
    fn test_table_replaced_over_corrected_span() {
        let decorations = decorate(TABLE, None);
        let replace = decorations.iter().find(|d| d.is_range()).unwrap();
        assert_eq!(replace.from(), 0);
        assert_eq!(&TABLE[replace.from()..replace.to()], &TABLE[..TABLE.find("\n\n").unwrap()]);

        let data = table_data(&decorations).unwrap();
        assert_eq!(data.headers, vec!["A", "B"]);
        assert_eq!(data.rows, vec![vec!["1", ""], vec!["2", "3"]]);
    }

    #[test]
    fn test_table_round_trip_through_edit_mode() {
        let before = table_data(&decorate(TABLE, None)).unwrap();
        let editing = decorate(TABLE, Some(3));
        assert!(table_data(&editing).is_none());
        assert!(editing.iter().all(|d| !d.is_range()));
        let after = table_data(&decorate(TABLE, None)).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_table_inside_blockquote_keeps_rows() {
        let text = "> | a | b |\n> |---|---|\n> | 1 | 2 |";
        let decorations = decorate(text, None);
        let data = table_data(&decorations).unwrap();
        assert_eq!(data.headers, vec!["a", "b"]);
        assert_eq!(data.rows, vec![vec!["1", "2"]]);

        let replace = decorations.iter().find(|d| d.widget().is_some()).unwrap();
        assert_eq!((replace.from(), replace.to()), (2, text.len()));
        assert_eq!(hidden(text, &decorations), vec!["> "]);
        assert_sorted_disjoint(&decorations);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Code Blocks
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_fenced_code_widget() {
        let text = "```rust\nfn main() {}\n```\n";
        let decorations = decorate(text, None);
        assert_eq!(
            decorations,
            vec![Decoration::replace(
                0,
                text.len() - 1,
                Widget::CodeBlock(CodeWidget::new("rust", "fn main() {}\n"))
            )]
        );
    }

    #[test]
    fn test_fenced_code_edit_mode_line_marks() {
        let text = "```rust\nlet x = 1;\n```\n";
        let decorations = decorate(text, Some(2));
        assert_eq!(
            line_marks(&decorations),
            vec![
                (0, "cm-codeblock-line cm-codeblock-start"),
                (8, "cm-codeblock-line"),
                (19, "cm-codeblock-line cm-codeblock-end"),
            ]
        );
    }

    #[test]
    fn test_diagram_language() {
        let text = "```mermaid\ngraph TD\n```";
        let decorations = decorate(text, None);
        assert_eq!(
            widgets(&decorations),
            vec![&Widget::Diagram(DiagramWidget::new("mermaid", "graph TD\n"))]
        );
    }

    #[test]
    fn test_indented_code_never_decorated() {
        assert!(decorate("    **not bold**\n", None).is_empty());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // HTML Regions
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_details_widget_shadows_inner_nodes() {
        let text = "<details>\n<summary>More</summary>\n\nHidden **text**\n</details>\n";
        let decorations = decorate(text, None);
        assert_eq!(
            decorations,
            vec![Decoration::replace(
                0,
                text.len() - 1,
                Widget::Details(DetailsWidget::new("More", "Hidden **text**"))
            )]
        );
    }

    #[test]
    fn test_html_block_sanitized() {
        let text = "<div onclick=\"steal()\">hi</div>\n";
        let decorations = decorate(text, None);
        assert_eq!(
            widgets(&decorations),
            vec![&Widget::HtmlBlock(HtmlWidget {
                html: "<div>hi</div>".to_string(),
                inline: false
            })]
        );
    }

    #[test]
    fn test_inline_html_in_emphasis() {
        let text = "**press <kbd>K</kbd>**";
        let decorations = decorate(text, None);
        assert_eq!(hidden(text, &decorations), vec!["**", "**"]);
        assert_eq!(widgets(&decorations).len(), 1);
        assert_sorted_disjoint(&decorations);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Invariants
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_mixed_document_sorted_and_disjoint() {
        let text = "# Title\n\n> quote with **bold** and `code`\n> ```\n> inside\n> ```\n\n\
                    - [ ] task with [link](http://x)\n- ***both*** ![i](a.png)\n\n\
                    | a | b |\n|---|---|\n| `x` | **y** |\n\n<kbd>k</kbd> done\n\n\
                    ```mermaid\ngraph\n```\n";
        for edit_line in [None, Some(1), Some(3), Some(5), Some(8), Some(13), Some(17)] {
            assert_sorted_disjoint(&decorate(text, edit_line));
        }
    }

    #[test]
    fn test_link_text_helper() {
        assert_eq!(link_text("[a [b] c](u)", "u"), Some("a [b] c".to_string()));
        assert_eq!(link_text("[a](u)", "u"), Some("a".to_string()));
        assert_eq!(
            link_text("www.x.org", "http://www.x.org"),
            Some("www.x.org".to_string())
        );
        assert_eq!(link_text("garbage", "http://other"), None);
    }

    #[test]
    fn test_list_marker_parse() {
        let marker = ListMarker::parse("  * item", 0, 8).unwrap();
        assert_eq!((marker.from, marker.to, marker.content_start), (2, 3, 4));
        assert!(marker.bullet);
        let ordered = ListMarker::parse("3) x", 0, 4).unwrap();
        assert!(!ordered.bullet);
        assert_eq!(ordered.content_start, 3);
        assert!(ListMarker::parse("x. no", 0, 5).is_none());
    }
}
