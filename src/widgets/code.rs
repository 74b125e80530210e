//! Code block and diagram widgets

/// Fence languages rendered as diagrams.
pub const DIAGRAM_LANGUAGES: &[&str] = &["mermaid"];

pub fn is_diagram_language(language: &str) -> bool {
    DIAGRAM_LANGUAGES
        .iter()
        .any(|l| l.eq_ignore_ascii_case(language))
}

/// A fenced code block shown with syntax coloring and a copy control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeWidget {
    /// First word of the info string, may be empty
    pub language: String,
    pub code: String,
}

impl CodeWidget {
    pub fn new(language: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            code: code.into(),
        }
    }
}

/// A fenced block in a diagram language, rendered asynchronously.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramWidget {
    pub language: String,
    pub source: String,
}

impl DiagramWidget {
    pub fn new(language: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            source: source.into(),
        }
    }
}

/// Transient feedback shown on the copy control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyStatus {
    Copied,
    Failed,
}

impl CopyStatus {
    /// Value of the copy control's `data-status` attribute.
    pub fn id(&self) -> &'static str {
        match self {
            CopyStatus::Copied => "copied",
            CopyStatus::Failed => "failed",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CopyStatus::Copied => "Copied!",
            CopyStatus::Failed => "Copy failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagram_languages() {
        assert!(is_diagram_language("mermaid"));
        assert!(is_diagram_language("Mermaid"));
        assert!(!is_diagram_language("rust"));
        assert!(!is_diagram_language(""));
    }

    #[test]
    fn test_copy_labels() {
        assert_eq!(CopyStatus::Copied.label(), "Copied!");
        assert_eq!(CopyStatus::Failed.label(), "Copy failed");
        assert_eq!(CopyStatus::Failed.id(), "failed");
    }
}
