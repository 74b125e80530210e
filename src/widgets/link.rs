//! Link widget

use std::sync::OnceLock;

use log::debug;
use regex::Regex;

use crate::editor::EditorCommand;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkWidget {
    pub text: String,
    pub url: String,
}

/// What following a link does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    /// `#heading` inside this document
    Anchor(String),
    /// URL with a scheme, opened externally
    External(String),
    /// Anything else (relative file paths)
    Relative(String),
}

fn scheme_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Two or more scheme characters so `C:` paths are not schemes
    RE.get_or_init(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.-]+:").expect("valid scheme regex"))
}

impl LinkWidget {
    pub fn new(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            url: url.into(),
        }
    }

    /// Text shown for the link; an empty label falls back to the URL.
    pub fn display_text(&self) -> &str {
        if self.text.trim().is_empty() {
            &self.url
        } else {
            &self.text
        }
    }

    pub fn target(&self) -> LinkTarget {
        if let Some(anchor) = self.url.strip_prefix('#') {
            LinkTarget::Anchor(anchor.to_string())
        } else if scheme_regex().is_match(&self.url) {
            LinkTarget::External(self.url.clone())
        } else {
            LinkTarget::Relative(self.url.clone())
        }
    }

    /// Plain clicks stay with the text editor; modifier clicks follow.
    pub fn on_click(&self, modifier: bool) -> Option<EditorCommand> {
        if !modifier {
            return None;
        }
        match self.target() {
            LinkTarget::Anchor(anchor_id) => Some(EditorCommand::ScrollToAnchor { anchor_id }),
            LinkTarget::External(url) => Some(EditorCommand::OpenExternal { url }),
            LinkTarget::Relative(url) => {
                debug!("Relative link '{}' is not followed", url);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_targets() {
        assert_eq!(
            LinkWidget::new("a", "#intro").target(),
            LinkTarget::Anchor("intro".to_string())
        );
        assert_eq!(
            LinkWidget::new("a", "mailto:me@x.org").target(),
            LinkTarget::External("mailto:me@x.org".to_string())
        );
        assert_eq!(
            LinkWidget::new("a", "C:\\notes\\b.md").target(),
            LinkTarget::Relative("C:\\notes\\b.md".to_string())
        );
    }

    #[test]
    fn test_modifier_click_commands() {
        let anchor = LinkWidget::new("Intro", "#getting-started");
        assert_eq!(
            anchor.on_click(true),
            Some(EditorCommand::ScrollToAnchor {
                anchor_id: "getting-started".to_string()
            })
        );
        assert_eq!(anchor.on_click(false), None);

        let external = LinkWidget::new("site", "https://example.com");
        assert_eq!(
            external.on_click(true),
            Some(EditorCommand::OpenExternal {
                url: "https://example.com".to_string()
            })
        );
        assert_eq!(LinkWidget::new("b", "other.md").on_click(true), None);
    }

    #[test]
    fn test_display_text_fallback() {
        assert_eq!(LinkWidget::new("", "https://x.org").display_text(), "https://x.org");
        assert_eq!(LinkWidget::new("X", "https://x.org").display_text(), "X");
    }
}
