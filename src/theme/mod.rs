//! Theme System for hybridmark
//!
//! Color palettes for the light and dark themes and the stylesheet that
//! styles the hybrid view: line marks, widgets and code coloring. The theme
//! is passed explicitly to every render call; nothing here reads global
//! state.
//!
//! # Usage
//!
//! ```ignore
//! use crate::theme::{stylesheet, ThemeColors};
//! use crate::config::Theme;
//!
//! let colors = ThemeColors::from_theme(Theme::Dark, false);
//! let css = stylesheet(&colors);
//! ```

use crate::config::Theme;

// ─────────────────────────────────────────────────────────────────────────────
// Color
// ─────────────────────────────────────────────────────────────────────────────

/// An opaque sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn to_css(self) -> String {
        format!("rgb({}, {}, {})", self.0, self.1, self.2)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Theme Colors
// ─────────────────────────────────────────────────────────────────────────────

/// Every color the hybrid view uses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThemeColors {
    pub dark: bool,
    pub background: Rgb,
    pub text: Rgb,
    pub muted: Rgb,
    pub link: Rgb,
    pub code_bg: Rgb,
    pub code_border: Rgb,
    pub blockquote_border: Rgb,
    pub blockquote_text: Rgb,
    pub list_marker: Rgb,
    pub checkbox: Rgb,
    pub table_border: Rgb,
    pub table_header_bg: Rgb,
    pub keyword: Rgb,
    pub string: Rgb,
    pub number: Rgb,
    pub comment: Rgb,
    pub success: Rgb,
    pub error: Rgb,
}

impl ThemeColors {
    /// Palette for a configured theme; `System` follows the host appearance.
    pub fn from_theme(theme: Theme, system_prefers_dark: bool) -> Self {
        if theme.is_dark(system_prefers_dark) {
            Self::dark()
        } else {
            Self::light()
        }
    }

    pub fn light() -> Self {
        Self {
            dark: false,
            background: Rgb(255, 255, 255),
            text: Rgb(30, 30, 30),
            muted: Rgb(120, 120, 120),
            link: Rgb(0, 100, 180),
            code_bg: Rgb(233, 236, 239),
            code_border: Rgb(195, 202, 210),
            blockquote_border: Rgb(200, 200, 200),
            blockquote_text: Rgb(100, 100, 100),
            list_marker: Rgb(100, 100, 100),
            checkbox: Rgb(0, 100, 180),
            table_border: Rgb(200, 205, 210),
            table_header_bg: Rgb(240, 242, 245),
            keyword: Rgb(175, 0, 175),
            string: Rgb(0, 128, 0),
            number: Rgb(0, 128, 128),
            comment: Rgb(128, 128, 128),
            success: Rgb(40, 167, 69),
            error: Rgb(220, 53, 69),
        }
    }

    pub fn dark() -> Self {
        Self {
            dark: true,
            background: Rgb(30, 30, 30),
            text: Rgb(220, 220, 220),
            muted: Rgb(140, 140, 140),
            link: Rgb(100, 180, 255),
            code_bg: Rgb(35, 39, 46),
            code_border: Rgb(55, 60, 68),
            blockquote_border: Rgb(80, 80, 80),
            blockquote_text: Rgb(180, 180, 180),
            list_marker: Rgb(150, 150, 150),
            checkbox: Rgb(100, 180, 255),
            table_border: Rgb(60, 65, 75),
            table_header_bg: Rgb(45, 50, 60),
            keyword: Rgb(198, 120, 221),
            string: Rgb(152, 195, 121),
            number: Rgb(209, 154, 102),
            comment: Rgb(92, 99, 112),
            success: Rgb(80, 200, 120),
            error: Rgb(240, 90, 100),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Stylesheet
// ─────────────────────────────────────────────────────────────────────────────

const BASE_CSS: &str = r#"
body {
    margin: 0;
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', 'Noto Sans', Helvetica, Arial, sans-serif;
    font-size: 16px;
    line-height: 1.6;
}

.hm-editor {
    max-width: 900px;
    margin: 0 auto;
    padding: 32px 24px;
    white-space: pre-wrap;
}

.cm-line { min-height: 1.6em; }
.cm-blockquote-line { border-left: 3px solid; padding-left: 12px; }
.cm-blockquote-level-2 { margin-left: 15px; }
.cm-blockquote-level-3 { margin-left: 30px; }
.cm-codeblock-line { font-family: monospace; padding: 0 12px; }
.hm-codeblock pre, .hm-diagram pre { margin: 0; padding: 12px; overflow-x: auto; }
.hm-copy { float: right; font-size: 12px; }
.hm-table { border-collapse: collapse; white-space: normal; }
.hm-table th, .hm-table td { border: 1px solid; padding: 4px 10px; }
.hm-image { max-width: 100%; }
.hm-render-error { font-family: monospace; font-size: 13px; }
"#;

/// Theme stylesheet for the hybrid view.
pub fn stylesheet(colors: &ThemeColors) -> String {
    format!(
        r#"{base}
:root {{ color-scheme: {scheme}; }}
body {{ background-color: {bg}; color: {text}; }}
.hm-link {{ color: {link}; cursor: pointer; }}
.cm-blockquote-line {{ border-left-color: {quote_border}; color: {quote_text}; }}
.cm-codeblock-line, .hm-codeblock, .hm-diagram {{ background-color: {code_bg}; }}
.hm-codeblock, .hm-diagram {{ border: 1px solid {code_border}; }}
.hm-bullet {{ color: {marker}; }}
.hm-checkbox {{ accent-color: {checkbox}; }}
.hm-table th, .hm-table td {{ border-color: {table_border}; }}
.hm-table th {{ background-color: {table_header_bg}; }}
.hm-loading {{ color: {muted}; }}
.hm-render-error, .hm-load-error {{ color: {error}; }}
.hm-copy[data-status="copied"] {{ color: {success}; }}
.hm-copy[data-status="failed"] {{ color: {error}; }}
.hm-tok-keyword {{ color: {keyword}; }}
.hm-tok-string {{ color: {string}; }}
.hm-tok-number {{ color: {number}; }}
.hm-tok-comment {{ color: {comment}; font-style: italic; }}
"#,
        base = BASE_CSS,
        scheme = if colors.dark { "dark" } else { "light" },
        bg = colors.background.to_css(),
        text = colors.text.to_css(),
        link = colors.link.to_css(),
        quote_border = colors.blockquote_border.to_css(),
        quote_text = colors.blockquote_text.to_css(),
        code_bg = colors.code_bg.to_css(),
        code_border = colors.code_border.to_css(),
        marker = colors.list_marker.to_css(),
        checkbox = colors.checkbox.to_css(),
        table_border = colors.table_border.to_css(),
        table_header_bg = colors.table_header_bg.to_css(),
        muted = colors.muted.to_css(),
        error = colors.error.to_css(),
        success = colors.success.to_css(),
        keyword = colors.keyword.to_css(),
        string = colors.string.to_css(),
        number = colors.number.to_css(),
        comment = colors.comment.to_css(),
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_theme() {
        assert_eq!(ThemeColors::from_theme(Theme::Dark, false), ThemeColors::dark());
        assert_eq!(ThemeColors::from_theme(Theme::Light, true), ThemeColors::light());
        assert_eq!(ThemeColors::from_theme(Theme::System, true), ThemeColors::dark());
    }

    #[test]
    fn test_rgb_to_css() {
        assert_eq!(Rgb(255, 128, 0).to_css(), "rgb(255, 128, 0)");
    }

    #[test]
    fn test_stylesheet_light() {
        let css = stylesheet(&ThemeColors::light());
        assert!(css.contains("color-scheme: light"));
        assert!(css.contains("background-color: rgb(255, 255, 255)"));
        assert!(css.contains(".hm-tok-keyword { color: rgb(175, 0, 175); }"));
    }

    #[test]
    fn test_stylesheet_dark() {
        let css = stylesheet(&ThemeColors::dark());
        assert!(css.contains("color-scheme: dark"));
        assert!(css.contains("background-color: rgb(30, 30, 30)"));
    }
}
