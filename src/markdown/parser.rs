//! Markdown parser implementation using comrak
//!
//! This module wraps comrak's parser and converts its arena AST into an owned
//! `SyntaxTree` whose nodes carry byte offsets into the document text. The
//! decoration pass only ever sees this tree, never comrak types.

use comrak::{
    markdown_to_html,
    nodes::{AstNode, ListType as ComrakListType, NodeValue, TableAlignment as ComrakTableAlignment},
    parse_document, Arena, Options,
};

use log::debug;

use crate::text::{safe_slice, LineIndex};

// ─────────────────────────────────────────────────────────────────────────────
// Public Types
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration options for markdown parsing.
#[derive(Debug, Clone)]
pub struct MarkdownOptions {
    /// Enable GitHub Flavored Markdown tables
    pub tables: bool,
    /// Enable strikethrough syntax (~~text~~)
    pub strikethrough: bool,
    /// Enable autolink URLs and emails
    pub autolink: bool,
    /// Enable task lists (- [ ] and - [x])
    pub tasklist: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            tables: true,
            strikethrough: true,
            autolink: true,
            tasklist: true,
        }
    }
}

impl MarkdownOptions {
    /// Convert to comrak Options.
    fn to_comrak_options(&self) -> Options {
        let mut options = Options::default();

        options.extension.strikethrough = self.strikethrough;
        options.extension.table = self.tables;
        options.extension.autolink = self.autolink;
        options.extension.tasklist = self.tasklist;

        options
    }
}

/// Table cell alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableAlignment {
    #[default]
    None,
    Left,
    Center,
    Right,
}

impl TableAlignment {
    /// CSS `text-align` value; unaligned columns render left.
    pub fn css(&self) -> &'static str {
        match self {
            TableAlignment::None | TableAlignment::Left => "left",
            TableAlignment::Center => "center",
            TableAlignment::Right => "right",
        }
    }
}

impl From<ComrakTableAlignment> for TableAlignment {
    fn from(align: ComrakTableAlignment) -> Self {
        match align {
            ComrakTableAlignment::None => TableAlignment::None,
            ComrakTableAlignment::Left => TableAlignment::Left,
            ComrakTableAlignment::Center => TableAlignment::Center,
            ComrakTableAlignment::Right => TableAlignment::Right,
        }
    }
}

/// Represents the kind of a syntax node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Root document node
    Document,
    /// Block quote (>)
    BlockQuote,
    /// List container
    List { ordered: bool },
    /// List item
    Item { ordered: bool },
    /// List item carrying a task marker (`[ ]` / `[x]`)
    TaskItem { ordered: bool, checked: bool },
    /// Paragraph
    Paragraph,
    /// Heading (H1-H6)
    Heading { level: u8, setext: bool },
    /// Thematic break (horizontal rule)
    ThematicBreak,
    /// Fenced or indented code block
    CodeBlock {
        fenced: bool,
        info: String,
        literal: String,
    },
    /// Raw HTML block
    HtmlBlock,
    /// Table
    Table { alignments: Vec<TableAlignment> },
    /// Table row
    TableRow { header: bool },
    /// Table cell
    TableCell,
    /// Inline text content
    Text,
    /// Soft line break
    SoftBreak,
    /// Hard line break
    LineBreak,
    /// Inline code
    Code,
    /// Inline HTML
    HtmlInline,
    /// Emphasis (italic)
    Emphasis,
    /// Strong emphasis (bold)
    Strong,
    /// Strikethrough
    Strikethrough,
    /// Link, autolink or bare URL
    Link { url: String, title: String },
    /// Image
    Image { url: String, title: String },
    /// Anything the decoration pass has no rule for
    Other,
}

impl NodeKind {
    /// Short name used in debug logging.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Document => "document",
            NodeKind::BlockQuote => "blockquote",
            NodeKind::List { .. } => "list",
            NodeKind::Item { .. } => "item",
            NodeKind::TaskItem { .. } => "task_item",
            NodeKind::Paragraph => "paragraph",
            NodeKind::Heading { .. } => "heading",
            NodeKind::ThematicBreak => "thematic_break",
            NodeKind::CodeBlock { .. } => "code_block",
            NodeKind::HtmlBlock => "html_block",
            NodeKind::Table { .. } => "table",
            NodeKind::TableRow { .. } => "table_row",
            NodeKind::TableCell => "table_cell",
            NodeKind::Text => "text",
            NodeKind::SoftBreak => "soft_break",
            NodeKind::LineBreak => "line_break",
            NodeKind::Code => "code",
            NodeKind::HtmlInline => "html_inline",
            NodeKind::Emphasis => "emphasis",
            NodeKind::Strong => "strong",
            NodeKind::Strikethrough => "strikethrough",
            NodeKind::Link { .. } => "link",
            NodeKind::Image { .. } => "image",
            NodeKind::Other => "other",
        }
    }
}

/// A read-only node of the syntax tree with byte-offset positions.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxNode {
    /// The kind of this node
    pub kind: NodeKind,
    /// Start byte offset (inclusive)
    pub from: usize,
    /// End byte offset (exclusive, never includes the trailing newline)
    pub to: usize,
    /// Start line in source (1-indexed)
    pub start_line: usize,
    /// End line in source (1-indexed)
    pub end_line: usize,
    /// Child nodes
    pub children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    /// Visit this node and every descendant in pre-order.
    pub fn for_each<'a>(&'a self, f: &mut impl FnMut(&'a SyntaxNode)) {
        f(self);
        for child in &self.children {
            child.for_each(f);
        }
    }
}

/// A parsed document revision.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    /// Root node of the tree
    pub root: SyntaxNode,
}

impl SyntaxTree {
    /// Parse with the default GFM options.
    pub fn parse(text: &str) -> Self {
        Self::parse_with_options(text, &MarkdownOptions::default())
    }

    /// Parse markdown text with custom options.
    pub fn parse_with_options(text: &str, options: &MarkdownOptions) -> Self {
        let arena = Arena::new();
        let comrak_options = options.to_comrak_options();
        let root = parse_document(&arena, text, &comrak_options);

        let index = LineIndex::new(text);
        let mut converted = convert_node(root, &index, false);
        converted.from = 0;
        converted.to = text.len();
        converted.start_line = 1;
        converted.end_line = index.line_count();
        repair_autolinks(&mut converted, text, &index);

        Self { root: converted }
    }

    /// All nodes of the tree in pre-order.
    pub fn nodes(&self) -> Vec<&SyntaxNode> {
        let mut nodes = Vec::new();
        self.root.for_each(&mut |n| nodes.push(n));
        nodes
    }
}

/// Render a markdown fragment to HTML with the default GFM extensions.
///
/// Raw HTML in the fragment is omitted by comrak's safe mode.
pub fn render_fragment_html(markdown: &str) -> String {
    markdown_to_html(markdown, &MarkdownOptions::default().to_comrak_options())
}

// ─────────────────────────────────────────────────────────────────────────────
// Internal Conversion Functions
// ─────────────────────────────────────────────────────────────────────────────

/// Convert a comrak AST node to our SyntaxNode structure.
fn convert_node<'a>(node: &'a AstNode<'a>, index: &LineIndex, in_ordered_list: bool) -> SyntaxNode {
    let ast = node.data.borrow();
    let sourcepos = ast.sourcepos;

    let kind = convert_node_value(&ast.value, in_ordered_list);
    let ordered_children = match &kind {
        NodeKind::List { ordered } => *ordered,
        _ => in_ordered_list,
    };

    let from = index.offset_of(sourcepos.start.line, sourcepos.start.column);
    let to = index
        .end_offset_of(sourcepos.end.line, sourcepos.end.column)
        .max(from);

    let children = node
        .children()
        .map(|child| convert_node(child, index, ordered_children))
        .collect();

    SyntaxNode {
        kind,
        from,
        to,
        start_line: sourcepos.start.line,
        end_line: sourcepos.end.line.max(sourcepos.start.line),
        children,
    }
}

/// Give extension autolinks (bare URLs, `www.` links, emails) their real
/// span. comrak reports them at a placeholder position at the start of the
/// enclosing block, so the literal is searched for in the parent's range,
/// left to right after the previous sibling.
fn repair_autolinks(node: &mut SyntaxNode, text: &str, index: &LineIndex) {
    let mut cursor = node.from;
    let end = node.to;
    for child in &mut node.children {
        if let NodeKind::Link { url, .. } = &child.kind {
            let url = url.clone();
            if !link_span_matches(safe_slice(text, child.from, child.to), &url) {
                match find_autolink(text, cursor, end, &url) {
                    Some((from, to)) => {
                        debug!(
                            "Autolink {} moved from {}..{} to {}..{}",
                            url, child.from, child.to, from, to
                        );
                        place(child, from, to, index);
                    }
                    None => debug!("Autolink {} not found in its block", url),
                }
            }
            cursor = cursor.max(child.to);
        } else if !matches!(child.kind, NodeKind::Text | NodeKind::SoftBreak) {
            cursor = cursor.max(child.to);
        }
        repair_autolinks(child, text, index);
    }
}

/// Whether a link node's source slice is the link itself.
fn link_span_matches(slice: &str, url: &str) -> bool {
    let bracketed = slice.len() > 1
        && slice.starts_with('[')
        && (slice.ends_with(')') || slice.ends_with(']'));
    let angled = slice.len() > 2 && slice.starts_with('<') && slice.ends_with('>');
    bracketed || angled || autolink_literals(url).any(|literal| literal == slice)
}

/// Source texts comrak turns into `url`: the URL itself, a `www.` link
/// without the added scheme, an email without `mailto:`.
fn autolink_literals(url: &str) -> impl Iterator<Item = &str> {
    let stripped = url
        .strip_prefix("mailto:")
        .or_else(|| url.strip_prefix("http://").filter(|rest| rest.starts_with("www.")));
    std::iter::once(url).chain(stripped)
}

/// Earliest occurrence of any literal form of `url` within `from..to`.
fn find_autolink(text: &str, from: usize, to: usize, url: &str) -> Option<(usize, usize)> {
    let haystack = safe_slice(text, from, to);
    autolink_literals(url)
        .filter(|literal| !literal.is_empty())
        .filter_map(|literal| haystack.find(literal).map(|at| (from + at, from + at + literal.len())))
        .min_by_key(|(start, _)| *start)
}

/// Move a node and its descendants onto `from..to`.
fn place(node: &mut SyntaxNode, from: usize, to: usize, index: &LineIndex) {
    node.from = from;
    node.to = to;
    node.start_line = index.line_of(from);
    node.end_line = index.line_of(to);
    for child in &mut node.children {
        place(child, from, to, index);
    }
}

/// Convert a comrak NodeValue to our NodeKind.
fn convert_node_value(value: &NodeValue, in_ordered_list: bool) -> NodeKind {
    match value {
        NodeValue::Document => NodeKind::Document,
        NodeValue::BlockQuote => NodeKind::BlockQuote,
        NodeValue::List(list) => NodeKind::List {
            ordered: matches!(list.list_type, ComrakListType::Ordered),
        },
        NodeValue::Item(list) => NodeKind::Item {
            ordered: matches!(list.list_type, ComrakListType::Ordered),
        },
        NodeValue::TaskItem(checked) => NodeKind::TaskItem {
            ordered: in_ordered_list,
            checked: checked.map(|c| c == 'x' || c == 'X').unwrap_or(false),
        },
        NodeValue::CodeBlock(code) => NodeKind::CodeBlock {
            fenced: code.fenced,
            info: code.info.clone(),
            literal: code.literal.clone(),
        },
        NodeValue::HtmlBlock(_) => NodeKind::HtmlBlock,
        NodeValue::Paragraph => NodeKind::Paragraph,
        NodeValue::Heading(heading) => NodeKind::Heading {
            level: heading.level,
            setext: heading.setext,
        },
        NodeValue::ThematicBreak => NodeKind::ThematicBreak,
        NodeValue::Table(table) => NodeKind::Table {
            alignments: table
                .alignments
                .iter()
                .map(|a| TableAlignment::from(*a))
                .collect(),
        },
        NodeValue::TableRow(header) => NodeKind::TableRow { header: *header },
        NodeValue::TableCell => NodeKind::TableCell,
        NodeValue::Text(_) => NodeKind::Text,
        NodeValue::SoftBreak => NodeKind::SoftBreak,
        NodeValue::LineBreak => NodeKind::LineBreak,
        NodeValue::Code(_) => NodeKind::Code,
        NodeValue::HtmlInline(_) => NodeKind::HtmlInline,
        NodeValue::Emph => NodeKind::Emphasis,
        NodeValue::Strong => NodeKind::Strong,
        NodeValue::Strikethrough => NodeKind::Strikethrough,
        NodeValue::Link(link) => NodeKind::Link {
            url: link.url.clone(),
            title: link.title.clone(),
        },
        NodeValue::Image(image) => NodeKind::Image {
            url: image.url.clone(),
            title: image.title.clone(),
        },
        // Footnotes, front matter and other extensions are not decorated
        _ => NodeKind::Other,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn find<'a>(tree: &'a SyntaxTree, pred: impl Fn(&NodeKind) -> bool) -> Option<&'a SyntaxNode> {
        tree.nodes().into_iter().find(|n| pred(&n.kind))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Basic Parsing Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_parse_empty_document() {
        let tree = SyntaxTree::parse("");
        assert!(tree.root.children.is_empty());
        assert_eq!(tree.root.from, 0);
        assert_eq!(tree.root.to, 0);
    }

    #[test]
    fn test_parse_heading_offsets() {
        let text = "intro\n\n### Title\n";
        let tree = SyntaxTree::parse(text);
        let heading = find(&tree, |k| matches!(k, NodeKind::Heading { .. })).unwrap();
        assert_eq!(heading.kind, NodeKind::Heading { level: 3, setext: false });
        assert_eq!(&text[heading.from..heading.to], "### Title");
        assert_eq!(heading.start_line, 3);
    }

    #[test]
    fn test_parse_setext_heading_flag() {
        let tree = SyntaxTree::parse("Title\n=====\n");
        let heading = find(&tree, |k| matches!(k, NodeKind::Heading { .. })).unwrap();
        assert_eq!(heading.kind, NodeKind::Heading { level: 1, setext: true });
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Inline Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_parse_strong_span() {
        let text = "a **bold** b";
        let tree = SyntaxTree::parse(text);
        let strong = find(&tree, |k| *k == NodeKind::Strong).unwrap();
        assert_eq!(&text[strong.from..strong.to], "**bold**");
    }

    #[test]
    fn test_parse_link_url() {
        let text = "see [docs](https://example.com)";
        let tree = SyntaxTree::parse(text);
        let link = find(&tree, |k| matches!(k, NodeKind::Link { .. })).unwrap();
        match &link.kind {
            NodeKind::Link { url, .. } => assert_eq!(url, "https://example.com"),
            _ => unreachable!(),
        }
    }

    fn link_spans(text: &str) -> Vec<&str> {
        SyntaxTree::parse(text)
            .nodes()
            .into_iter()
            .filter(|n| matches!(n.kind, NodeKind::Link { .. }))
            .map(|n| &text[n.from..n.to])
            .collect()
    }

    #[test]
    fn test_bare_autolink_spans() {
        assert_eq!(link_spans("see https://example.com ok"), vec!["https://example.com"]);
        assert_eq!(link_spans("visit www.example.com now"), vec!["www.example.com"]);
        assert_eq!(link_spans("mail me@x.org"), vec!["me@x.org"]);
        assert_eq!(link_spans("first line
then https://x.org"), vec!["https://x.org"]);
    }

    #[test]
    fn test_repeated_autolinks_in_order() {
        let text = "www.x.org and http://www.x.org";
        let tree = SyntaxTree::parse(text);
        let spans: Vec<(usize, usize)> = tree
            .nodes()
            .into_iter()
            .filter(|n| matches!(n.kind, NodeKind::Link { .. }))
            .map(|n| (n.from, n.to))
            .collect();
        assert_eq!(spans, vec![(0, 9), (14, 30)]);
    }

    #[test]
    fn test_inline_link_span_untouched() {
        assert_eq!(link_spans("a [b](https://x.org) c"), vec!["[b](https://x.org)"]);
    }

    #[test]
    fn test_parse_strikethrough() {
        let tree = SyntaxTree::parse("~~gone~~");
        assert!(find(&tree, |k| *k == NodeKind::Strikethrough).is_some());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Block Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_parse_task_item() {
        let tree = SyntaxTree::parse("- [x] done\n- [ ] todo\n");
        let items: Vec<_> = tree
            .nodes()
            .into_iter()
            .filter(|n| matches!(n.kind, NodeKind::TaskItem { .. }))
            .collect();
        assert_eq!(items.len(), 2);
        assert_eq!(
            items[0].kind,
            NodeKind::TaskItem {
                ordered: false,
                checked: true
            }
        );
    }

    #[test]
    fn test_parse_ordered_item() {
        let tree = SyntaxTree::parse("1. one\n2. two\n");
        assert!(find(&tree, |k| *k == NodeKind::Item { ordered: true }).is_some());
    }

    #[test]
    fn test_parse_fenced_code() {
        let text = "```rust\nfn main() {}\n```\n";
        let tree = SyntaxTree::parse(text);
        let code = find(&tree, |k| matches!(k, NodeKind::CodeBlock { .. })).unwrap();
        match &code.kind {
            NodeKind::CodeBlock {
                fenced,
                info,
                literal,
            } => {
                assert!(*fenced);
                assert_eq!(info, "rust");
                assert_eq!(literal, "fn main() {}\n");
            }
            _ => unreachable!(),
        }
        assert_eq!(code.start_line, 1);
        assert_eq!(code.end_line, 3);
    }

    #[test]
    fn test_parse_table_alignments() {
        let tree = SyntaxTree::parse("| a | b |\n|:--|--:|\n| 1 | 2 |\n");
        let table = find(&tree, |k| matches!(k, NodeKind::Table { .. })).unwrap();
        assert_eq!(
            table.kind,
            NodeKind::Table {
                alignments: vec![TableAlignment::Left, TableAlignment::Right]
            }
        );
    }

    #[test]
    fn test_parse_nested_blockquote() {
        let tree = SyntaxTree::parse(">>> deep\n");
        let depth = tree
            .nodes()
            .into_iter()
            .filter(|n| n.kind == NodeKind::BlockQuote)
            .count();
        assert_eq!(depth, 3);
    }

    #[test]
    fn test_offsets_never_exceed_text() {
        let text = "# Hei på deg\n\n> sitat 中文\n\n- [ ] 🎉 task\n";
        let tree = SyntaxTree::parse(text);
        for node in tree.nodes() {
            assert!(node.from <= node.to, "{:?}", node.kind);
            assert!(node.to <= text.len(), "{:?}", node.kind);
        }
    }

    #[test]
    fn test_render_fragment_html() {
        let html = render_fragment_html("**hi**");
        assert!(html.contains("<strong>hi</strong>"));
    }
}
