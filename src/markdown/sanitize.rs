//! Allow-list HTML sanitizer for raw HTML blocks
//!
//! Raw HTML found in the document is rendered inside widgets only after it
//! passes through here. Everything not explicitly allowed is stripped:
//! unknown tags lose their markup (text kept), dangerous containers lose
//! their content too, event handlers and scriptable URLs are dropped, and
//! `data:` URLs survive only as image sources.

use std::sync::OnceLock;

use log::debug;
use regex::Regex;

/// Tags whose markup is kept.
const ALLOWED_TAGS: &[&str] = &[
    "a", "abbr", "article", "aside", "b", "blockquote", "br", "center", "code", "dd", "del",
    "details", "div", "dl", "dt", "em", "figcaption", "figure", "footer", "h1", "h2", "h3", "h4",
    "h5", "h6", "header", "hr", "i", "img", "ins", "kbd", "li", "mark", "nav", "ol", "p", "pre",
    "s", "section", "small", "span", "strong", "sub", "summary", "sup", "table", "tbody", "td",
    "tfoot", "th", "thead", "tr", "u", "ul",
];

/// Tags removed together with everything inside them.
const DROP_WITH_CONTENT: &[&str] = &[
    "script", "style", "iframe", "object", "embed", "noscript", "template", "textarea", "title",
];

/// Attributes kept on any allowed tag.
const ALLOWED_ATTRIBUTES: &[&str] = &[
    "align", "alt", "class", "colspan", "dir", "height", "id", "lang", "open", "rowspan", "start",
    "title", "width",
];

/// Where a URL attribute appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlContext {
    /// `href` on a link
    Link,
    /// `src` on an image
    Image,
}

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?s)<!--.*?-->|<[!?][^>]*>|<(/?)([a-zA-Z][a-zA-Z0-9-]*)((?:[^>"']|"[^"]*"|'[^']*')*)>"#)
            .expect("valid tag regex")
    })
}

fn attribute_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"([a-zA-Z_:][-a-zA-Z0-9_:.]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
            .expect("valid attribute regex")
    })
}

/// Whether a URL may be emitted in the given context.
pub fn is_safe_url(url: &str, context: UrlContext) -> bool {
    let decoded = html_escape::decode_html_entities(url);
    let normalized: String = decoded
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();

    if normalized.starts_with("javascript:") || normalized.starts_with("vbscript:") {
        return false;
    }
    if normalized.starts_with("data:") {
        return context == UrlContext::Image && normalized.starts_with("data:image/");
    }
    true
}

/// Sanitize an HTML fragment against the allow-list.
pub fn sanitize_html(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut last = 0;
    // Name and nesting depth of a dropped container we are inside
    let mut dropping: Option<(String, usize)> = None;
    let mut stripped = 0usize;

    for caps in tag_regex().captures_iter(html) {
        let Some(whole) = caps.get(0) else { continue };
        if dropping.is_none() {
            push_text(&mut out, &html[last..whole.start()]);
        }
        last = whole.end();

        let Some(name) = caps.get(2) else {
            // Comment, doctype or processing instruction
            stripped += 1;
            continue;
        };
        let name = name.as_str().to_ascii_lowercase();
        let closing = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
        let attrs = caps.get(3).map(|m| m.as_str()).unwrap_or("");
        let self_closing = attrs.trim_end().ends_with('/');

        if let Some((drop_name, depth)) = dropping.as_mut() {
            if *drop_name == name {
                if closing {
                    *depth -= 1;
                    if *depth == 0 {
                        dropping = None;
                    }
                } else if !self_closing {
                    *depth += 1;
                }
            }
            continue;
        }

        if DROP_WITH_CONTENT.contains(&name.as_str()) {
            stripped += 1;
            if !closing && !self_closing {
                dropping = Some((name, 1));
            }
            continue;
        }

        if !ALLOWED_TAGS.contains(&name.as_str()) {
            stripped += 1;
            continue;
        }

        if closing {
            out.push_str("</");
            out.push_str(&name);
            out.push('>');
        } else {
            out.push('<');
            out.push_str(&name);
            stripped += push_attributes(&mut out, &name, attrs);
            out.push('>');
        }
    }

    if dropping.is_none() {
        push_text(&mut out, &html[last..]);
    }

    if stripped > 0 {
        debug!("Sanitizer stripped {} tag(s)/attribute(s)", stripped);
    }
    out
}

/// Text between tags: neutralize stray angle brackets, keep entities.
fn push_text(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

/// Emit allowed attributes; returns how many were dropped.
fn push_attributes(out: &mut String, tag: &str, attrs: &str) -> usize {
    let mut dropped = 0;
    for caps in attribute_regex().captures_iter(attrs) {
        let Some(name) = caps.get(1) else { continue };
        let name = name.as_str().to_ascii_lowercase();
        let value = caps
            .get(2)
            .or_else(|| caps.get(3))
            .or_else(|| caps.get(4))
            .map(|m| m.as_str());

        let allowed = match (tag, name.as_str()) {
            (_, n) if n.starts_with("on") => false,
            ("a", "href") => value.is_some_and(|v| is_safe_url(v, UrlContext::Link)),
            ("img", "src") => value.is_some_and(|v| is_safe_url(v, UrlContext::Image)),
            (_, n) => ALLOWED_ATTRIBUTES.contains(&n),
        };
        if !allowed {
            dropped += 1;
            continue;
        }

        out.push(' ');
        out.push_str(&name);
        if let Some(value) = value {
            let decoded = html_escape::decode_html_entities(value);
            out.push_str("=\"");
            out.push_str(&html_escape::encode_double_quoted_attribute(&decoded));
            out.push('"');
        }
    }
    dropped
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_markup_passes() {
        assert_eq!(
            sanitize_html(r#"<div class="note"><b>hi</b></div>"#),
            r#"<div class="note"><b>hi</b></div>"#
        );
    }

    #[test]
    fn test_script_removed_with_content() {
        assert_eq!(
            sanitize_html("<p>a<script>alert(1)</script>b</p>"),
            "<p>ab</p>"
        );
    }

    #[test]
    fn test_unknown_tag_keeps_text() {
        assert_eq!(sanitize_html("<blink>text</blink>"), "text");
    }

    #[test]
    fn test_event_handlers_dropped() {
        assert_eq!(
            sanitize_html(r#"<span onclick="evil()" title="t">x</span>"#),
            r#"<span title="t">x</span>"#
        );
    }

    #[test]
    fn test_javascript_href_dropped() {
        assert_eq!(
            sanitize_html(r#"<a href="javascript:alert(1)">x</a>"#),
            "<a>x</a>"
        );
        assert_eq!(
            sanitize_html(r#"<a href="jav&#x61;script:alert(1)">x</a>"#),
            "<a>x</a>"
        );
    }

    #[test]
    fn test_data_url_only_for_images() {
        let img = sanitize_html(r#"<img src="data:image/png;base64,AAAA" alt="a">"#);
        assert!(img.contains("src=\"data:image/png;base64,AAAA\""));

        let link = sanitize_html(r#"<a href="data:text/html,hi">x</a>"#);
        assert_eq!(link, "<a>x</a>");
    }

    #[test]
    fn test_comments_removed() {
        assert_eq!(sanitize_html("a<!-- hidden -->b"), "ab");
    }

    #[test]
    fn test_stray_brackets_escaped() {
        assert_eq!(sanitize_html("1 < 2 &amp; 3"), "1 &lt; 2 &amp; 3");
    }

    #[test]
    fn test_nested_drop_container() {
        assert_eq!(
            sanitize_html("<style>a</style>ok<iframe><iframe></iframe>x</iframe>!"),
            "ok!"
        );
    }

    #[test]
    fn test_is_safe_url() {
        assert!(is_safe_url("https://example.com", UrlContext::Link));
        assert!(is_safe_url("./img.png", UrlContext::Image));
        assert!(!is_safe_url(" JavaScript:void(0)", UrlContext::Link));
        assert!(!is_safe_url("data:image/png;base64,", UrlContext::Link));
        assert!(is_safe_url("data:image/png;base64,", UrlContext::Image));
    }
}
