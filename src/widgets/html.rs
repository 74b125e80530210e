//! Collapsible sections and raw HTML widgets

use crate::markdown::parser::render_fragment_html;
use crate::markdown::sanitize::sanitize_html;

/// `<details><summary>…</summary>…</details>`, with the body rendered as
/// Markdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailsWidget {
    pub summary: String,
    pub content: String,
}

impl DetailsWidget {
    pub fn new(summary: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            content: content.into(),
        }
    }

    /// Summary as plain escaped text.
    pub fn summary_html(&self) -> String {
        html_escape::encode_text(&self.summary).into_owned()
    }

    /// Body rendered from Markdown, then sanitized.
    pub fn content_html(&self) -> String {
        sanitize_html(&render_fragment_html(&self.content))
    }
}

/// Allow-listed raw HTML; `html` is sanitized on construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlWidget {
    pub html: String,
    pub inline: bool,
}

impl HtmlWidget {
    pub fn new(raw: &str, inline: bool) -> Self {
        Self {
            html: sanitize_html(raw),
            inline,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_details_content_rendered() {
        let details = DetailsWidget::new("More <b>info</b>", "Some **bold** text");
        assert_eq!(details.summary_html(), "More &lt;b&gt;info&lt;/b&gt;");
        assert!(details.content_html().contains("<strong>bold</strong>"));
    }

    #[test]
    fn test_details_content_drops_raw_script() {
        let details = DetailsWidget::new("s", "<script>alert(1)</script>\n\ntext");
        let html = details.content_html();
        assert!(!html.contains("script"));
        assert!(html.contains("text"));
    }

    #[test]
    fn test_html_widget_sanitizes() {
        let widget = HtmlWidget::new("<span onmouseover=\"x()\">hi</span>", true);
        assert_eq!(widget.html, "<span>hi</span>");
        assert!(widget.inline);
    }
}
