//! Image widget: source resolution and size hints

use std::sync::OnceLock;

use regex::Regex;

/// `![alt](url "title")` as found in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageWidget {
    pub url: String,
    pub alt: String,
    pub title: Option<String>,
    /// Directory relative paths resolve against
    pub base_dir: String,
}

/// Explicit display size from a `=WIDTHxHEIGHT` hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSize {
    pub width: u32,
    pub height: Option<u32>,
}

/// Where the image bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Used as-is by the view (http, https, data)
    Remote(String),
    /// Local file read asynchronously through the asset reader
    Local(String),
}

fn title_size_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^=(\d+)(?:x(\d+))?$").expect("valid title size regex"))
}

fn url_size_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s=(\d+)(?:x(\d+))?$").expect("valid url size regex"))
}

fn drive_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-zA-Z]:").expect("valid drive regex"))
}

fn parse_size(caps: &regex::Captures) -> Option<ImageSize> {
    let width = caps.get(1)?.as_str().parse().ok()?;
    let height = caps.get(2).and_then(|m| m.as_str().parse().ok());
    Some(ImageSize { width, height })
}

impl ImageWidget {
    pub fn new(
        url: impl Into<String>,
        alt: impl Into<String>,
        title: Option<String>,
        base_dir: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            alt: alt.into(),
            title,
            base_dir: base_dir.into(),
        }
    }

    /// Size hint; trailing URL text wins over the title.
    pub fn size(&self) -> Option<ImageSize> {
        if let Some(caps) = url_size_regex().captures(&self.url) {
            return parse_size(&caps);
        }
        self.title
            .as_deref()
            .and_then(|t| title_size_regex().captures(t))
            .and_then(|caps| parse_size(&caps))
    }

    /// The URL without a trailing size hint.
    pub fn source_url(&self) -> &str {
        match url_size_regex().find(&self.url) {
            Some(m) => &self.url[..m.start()],
            None => &self.url,
        }
    }

    /// Title shown as a tooltip; a title used as size hint is not shown.
    pub fn display_title(&self) -> Option<&str> {
        match self.size() {
            Some(_) => None,
            None => self.title.as_deref(),
        }
    }

    pub fn source(&self) -> ImageSource {
        let src = self.source_url();
        if src.starts_with("http://") || src.starts_with("https://") || src.starts_with("data:") {
            ImageSource::Remote(src.to_string())
        } else {
            ImageSource::Local(resolve_image_path(src, &self.base_dir))
        }
    }

    /// Alt text while a local file is loading.
    pub fn loading_alt(&self) -> String {
        format!("{} (loading...)", self.alt)
    }

    /// Alt text after a failed load.
    pub fn error_alt(&self) -> String {
        format!("{} (load error)", self.alt)
    }
}

/// Resolve a local image path against the document directory.
///
/// Absolute paths (`/…` or a drive letter) are kept. The separator used for
/// joining is sniffed from `base_dir`.
pub fn resolve_image_path(src: &str, base_dir: &str) -> String {
    let is_absolute = src.starts_with('/') || drive_regex().is_match(src);
    if is_absolute || base_dir.is_empty() {
        return src.to_string();
    }
    let separator = if base_dir.contains('\\') { '\\' } else { '/' };
    let relative = src.strip_prefix("./").unwrap_or(src);
    let base = base_dir.strip_suffix(separator).unwrap_or(base_dir);
    format!("{}{}{}", base, separator, relative)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
