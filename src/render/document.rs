//! Hybrid view assembly
//!
//! Lays the decoration list over the source text: one `cm-line` element per
//! source line carrying its line marks, hidden ranges left out, replaced
//! ranges swapped for their widget views. A replacement spanning several
//! lines renders once, inside the element of its first line.

use std::collections::BTreeMap;

use html_escape::{encode_double_quoted_attribute as attr, encode_text};

use super::HtmlView;
use crate::decoration::Decoration;
use crate::text::{safe_slice, LineIndex};
use crate::theme::{stylesheet, ThemeColors};

/// Classes and attributes gathered from the line marks of one line.
#[derive(Debug, Default)]
struct LineAttributes {
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
}

impl LineAttributes {
    fn open_tag(&self) -> String {
        let mut tag = String::from("<div class=\"cm-line");
        for class in &self.classes {
            tag.push(' ');
            tag.push_str(&attr(class));
        }
        tag.push('"');
        for (key, value) in &self.attributes {
            tag.push_str(&format!(" {}=\"{}\"", key, attr(value)));
        }
        tag.push('>');
        tag
    }
}

/// Render `text` under `decorations`. `views` holds one view per `Replace`
/// decoration, in list order (see `ViewCache::reconcile`).
pub fn render_hybrid(text: &str, decorations: &[Decoration], views: &[HtmlView]) -> String {
    let index = LineIndex::new(text);

    let mut marks: BTreeMap<usize, LineAttributes> = BTreeMap::new();
    let mut ranges: Vec<(usize, usize, Option<String>)> = Vec::new();
    let mut next_view = views.iter();
    for decoration in decorations {
        match decoration {
            Decoration::LineMark {
                line_start,
                class_name,
                attributes,
            } => {
                let entry = marks.entry(*line_start).or_default();
                entry
                    .classes
                    .extend(class_name.split_whitespace().map(str::to_string));
                entry
                    .attributes
                    .extend(attributes.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
            Decoration::Hide { from, to } => ranges.push((*from, *to, None)),
            Decoration::Replace { from, to, .. } => {
                let html = next_view.next().map(HtmlView::html).unwrap_or_default();
                ranges.push((*from, *to, Some(html)));
            }
        }
    }

    let mut out = String::with_capacity(text.len() * 2);
    let mut ranges = ranges.into_iter().peekable();
    let mut line = 1;
    while line <= index.line_count() {
        let start = index.line_start(line);
        let mut end = index.line_end(line);
        let mut pos = start;

        match marks.get(&start) {
            Some(attributes) => out.push_str(&attributes.open_tag()),
            None => out.push_str("<div class=\"cm-line\">"),
        }

        while let Some((from, to, _)) = ranges.peek() {
            if *from > end || (*from == end && *to == *from) {
                break;
            }
            let (from, to, html) = match ranges.next() {
                Some(range) => range,
                None => break,
            };
            if from < pos {
                continue;
            }
            out.push_str(&encode_text(safe_slice(text, pos, from)));
            if let Some(html) = html {
                out.push_str(&html);
            }
            pos = to;
            if to > end {
                line = index.line_of(to);
                end = index.line_end(line);
                pos = pos.min(end);
            }
        }

        out.push_str(&encode_text(safe_slice(text, pos, end)));
        out.push_str("</div>\n");
        line += 1;
    }
    out
}

/// Wrap rendered lines in a complete HTML document with the theme stylesheet.
pub fn standalone_document(title: &str, body: &str, colors: &ThemeColors) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <meta name="generator" content="hybridmark">
    <title>{title}</title>
    <style>
{css}
    </style>
</head>
<body>
    <article class="hm-editor">
{body}    </article>
</body>
</html>"#,
        title = encode_text(title),
        css = stylesheet(colors),
        body = body,
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widgets::Widget;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_hidden_marks_left_out() {
        let html = render_hybrid("### Title", &[Decoration::hide(0, 4)], &[]);
        assert_eq!(html, "<div class=\"cm-line\">Title</div>\n");
    }

    #[test]
    fn test_text_is_escaped() {
        let html = render_hybrid("a < b\n", &[], &[]);
        assert_eq!(
            html,
            "<div class=\"cm-line\">a &lt; b</div>\n<div class=\"cm-line\"></div>\n"
        );
    }

    #[test]
    fn test_line_marks_merge() {
        let decorations = vec![
            Decoration::line_mark(0, "cm-blockquote-line cm-blockquote-level-1")
                .with_attribute("data-level", "1"),
            Decoration::line_mark(0, "cm-blockquote-start"),
            Decoration::hide(0, 2),
        ];
        let html = render_hybrid("> quote", &decorations, &[]);
        assert_eq!(
            html,
            "<div class=\"cm-line cm-blockquote-line cm-blockquote-level-1 cm-blockquote-start\" \
             data-level=\"1\">quote</div>\n"
        );
    }

    #[test]
    fn test_multi_line_replace_renders_once() {
        let text = "before\n```\ncode\n```\nafter";
        let decorations = vec![Decoration::replace(7, 19, Widget::Bullet)];
        let views = vec![HtmlView::new("<pre>code</pre>")];
        let html = render_hybrid(text, &decorations, &views);
        assert_eq!(
            html,
            "<div class=\"cm-line\">before</div>\n\
             <div class=\"cm-line\"><pre>code</pre></div>\n\
             <div class=\"cm-line\">after</div>\n"
        );
    }

    #[test]
    fn test_inline_replace_keeps_surrounding_text() {
        let text = "see [x](u) now";
        let decorations = vec![Decoration::replace(4, 10, Widget::Bullet)];
        let views = vec![HtmlView::new("<a>x</a>")];
        assert_eq!(
            render_hybrid(text, &decorations, &views),
            "<div class=\"cm-line\">see <a>x</a> now</div>\n"
        );
    }

    #[test]
    fn test_standalone_document() {
        let doc = standalone_document("notes <1>", "<div class=\"cm-line\">x</div>\n", &ThemeColors::dark());
        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains("<title>notes &lt;1&gt;</title>"));
        assert!(doc.contains("color-scheme: dark"));
        assert!(doc.contains("<div class=\"cm-line\">x</div>"));
    }
}
