//! Syntax Highlighting Module
//!
//! Code block coloring from a fixed per-language table of keyword, string,
//! comment and number patterns. Each language compiles to one alternation
//! regex; the highlighter scans the whole block once so block comments and
//! multi-line strings keep their color across lines.
//!
//! # Example
//! ```ignore
//! use crate::markdown::syntax::highlight_to_html;
//!
//! let html = highlight_to_html("fn main() {}", "rust");
//! ```

use std::sync::OnceLock;

use log::{debug, warn};
use regex::Regex;

// ─────────────────────────────────────────────────────────────────────────────
// Language Table
// ─────────────────────────────────────────────────────────────────────────────

/// Token patterns for one language family.
struct LanguageSpec {
    name: &'static str,
    keywords: &'static [&'static str],
    /// Regex alternatives matching comments
    comment: &'static str,
    /// Regex alternatives matching string and char literals
    string: &'static str,
    case_insensitive_keywords: bool,
}

const C_COMMENT: &str = r"//[^\n]*|/\*[\s\S]*?\*/";
const HASH_COMMENT: &str = r"#[^\n]*";
const DOUBLE_QUOTED: &str = r#""(?:\\.|[^"\\])*""#;
const QUOTED: &str = r#""(?:\\.|[^"\\])*"|'(?:\\.|[^'\\\n])*'"#;

const LANGUAGES: &[LanguageSpec] = &[
    LanguageSpec {
        name: "rust",
        keywords: &[
            "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else",
            "enum", "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match",
            "mod", "move", "mut", "pub", "ref", "return", "self", "Self", "static", "struct",
            "super", "trait", "true", "type", "unsafe", "use", "where", "while",
        ],
        comment: C_COMMENT,
        string: r#""(?:\\.|[^"\\])*"|'(?:\\.|[^'\\])'"#,
        case_insensitive_keywords: false,
    },
    LanguageSpec {
        name: "python",
        keywords: &[
            "and", "as", "assert", "async", "await", "break", "class", "continue", "def",
            "del", "elif", "else", "except", "False", "finally", "for", "from", "global", "if",
            "import", "in", "is", "lambda", "None", "nonlocal", "not", "or", "pass", "raise",
            "return", "True", "try", "while", "with", "yield",
        ],
        comment: HASH_COMMENT,
        string: r#""""[\s\S]*?"""|'''[\s\S]*?'''|"(?:\\.|[^"\\\n])*"|'(?:\\.|[^'\\\n])*'"#,
        case_insensitive_keywords: false,
    },
    LanguageSpec {
        name: "javascript",
        keywords: &[
            "async", "await", "break", "case", "catch", "class", "const", "continue",
            "default", "delete", "do", "else", "export", "extends", "false", "finally", "for",
            "from", "function", "if", "import", "in", "instanceof", "interface", "let", "new",
            "null", "of", "return", "switch", "this", "throw", "true", "try", "type", "typeof",
            "undefined", "var", "void", "while", "yield",
        ],
        comment: C_COMMENT,
        string: r#""(?:\\.|[^"\\])*"|'(?:\\.|[^'\\\n])*'|`(?:\\.|[^`\\])*`"#,
        case_insensitive_keywords: false,
    },
    LanguageSpec {
        name: "go",
        keywords: &[
            "break", "case", "chan", "const", "continue", "default", "defer", "else",
            "fallthrough", "false", "for", "func", "go", "goto", "if", "import", "interface",
            "map", "nil", "package", "range", "return", "select", "struct", "switch", "true",
            "type", "var",
        ],
        comment: C_COMMENT,
        string: r#""(?:\\.|[^"\\])*"|`[^`]*`|'(?:\\.|[^'\\])'"#,
        case_insensitive_keywords: false,
    },
    LanguageSpec {
        name: "c",
        keywords: &[
            "auto", "bool", "break", "case", "char", "class", "const", "continue", "default",
            "delete", "do", "double", "else", "enum", "extern", "false", "float", "for", "if",
            "int", "long", "namespace", "new", "nullptr", "private", "protected", "public",
            "return", "short", "signed", "sizeof", "static", "struct", "switch", "template",
            "true", "typedef", "union", "unsigned", "using", "virtual", "void", "while",
        ],
        comment: C_COMMENT,
        string: QUOTED,
        case_insensitive_keywords: false,
    },
    LanguageSpec {
        name: "java",
        keywords: &[
            "abstract", "boolean", "break", "case", "catch", "class", "continue", "default",
            "do", "double", "else", "enum", "extends", "false", "final", "finally", "float",
            "for", "fun", "if", "implements", "import", "int", "interface", "long", "new",
            "null", "override", "package", "private", "protected", "public", "return",
            "static", "super", "switch", "this", "throw", "throws", "true", "try", "val", "var",
            "void", "when", "while",
        ],
        comment: C_COMMENT,
        string: QUOTED,
        case_insensitive_keywords: false,
    },
    LanguageSpec {
        name: "shell",
        keywords: &[
            "case", "do", "done", "echo", "elif", "else", "esac", "exit", "export", "fi", "for",
            "function", "if", "in", "local", "return", "then", "until", "while",
        ],
        comment: HASH_COMMENT,
        string: QUOTED,
        case_insensitive_keywords: false,
    },
    LanguageSpec {
        name: "sql",
        keywords: &[
            "and", "as", "by", "create", "delete", "drop", "from", "group", "having", "insert",
            "into", "join", "left", "limit", "not", "null", "on", "or", "order", "select", "set",
            "table", "update", "values", "where",
        ],
        comment: r"--[^\n]*|/\*[\s\S]*?\*/",
        string: r"'(?:''|[^'])*'",
        case_insensitive_keywords: true,
    },
    LanguageSpec {
        name: "json",
        keywords: &["true", "false", "null"],
        comment: r"//[^\n]*",
        string: DOUBLE_QUOTED,
        case_insensitive_keywords: false,
    },
    LanguageSpec {
        name: "toml",
        keywords: &["true", "false"],
        comment: HASH_COMMENT,
        string: QUOTED,
        case_insensitive_keywords: false,
    },
    LanguageSpec {
        name: "yaml",
        keywords: &["true", "false", "null", "yes", "no"],
        comment: HASH_COMMENT,
        string: QUOTED,
        case_insensitive_keywords: false,
    },
];

/// Map a fence info word to a language family in the table.
pub fn normalize_language(language: &str) -> Option<&'static str> {
    let family = match language.trim().to_lowercase().as_str() {
        "rust" | "rs" => "rust",
        "python" | "py" | "python3" => "python",
        "javascript" | "js" | "jsx" | "typescript" | "ts" | "tsx" | "mjs" => "javascript",
        "go" | "golang" => "go",
        "c" | "h" | "cpp" | "c++" | "cxx" | "hpp" | "csharp" | "c#" | "cs" => "c",
        "java" | "kotlin" | "kt" | "scala" => "java",
        "shell" | "sh" | "bash" | "zsh" | "console" => "shell",
        "sql" => "sql",
        "json" | "jsonc" => "json",
        "toml" => "toml",
        "yaml" | "yml" => "yaml",
        _ => return None,
    };
    Some(family)
}

// ─────────────────────────────────────────────────────────────────────────────
// Highlighted Segment
// ─────────────────────────────────────────────────────────────────────────────

/// Token class of a highlighted segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Keyword,
    String,
    Comment,
    Number,
    Plain,
}

impl TokenKind {
    /// CSS class for the token, `None` for plain text.
    pub fn css_class(&self) -> Option<&'static str> {
        match self {
            TokenKind::Keyword => Some("hm-tok-keyword"),
            TokenKind::String => Some("hm-tok-string"),
            TokenKind::Comment => Some("hm-tok-comment"),
            TokenKind::Number => Some("hm-tok-number"),
            TokenKind::Plain => None,
        }
    }
}

/// A run of text with one token class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightedSegment {
    pub text: String,
    pub kind: TokenKind,
}

impl HighlightedSegment {
    pub fn new(text: impl Into<String>, kind: TokenKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }

    /// Escaped text, wrapped in a span when the token has a class.
    pub fn to_html(&self) -> String {
        let text = html_escape::encode_text(&self.text);
        match self.kind.css_class() {
            Some(class) => format!("<span class=\"{}\">{}</span>", class, text),
            None => text.into_owned(),
        }
    }
}

/// One source line of highlighted segments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighlightedLine {
    pub segments: Vec<HighlightedSegment>,
}

impl HighlightedLine {
    pub fn plain(text: &str) -> Self {
        let mut line = Self::default();
        line.push(text, TokenKind::Plain);
        line
    }

    pub fn is_empty(&self) -> bool {
        self.segments.iter().all(|s| s.text.is_empty())
    }

    pub fn to_html(&self) -> String {
        self.segments.iter().map(HighlightedSegment::to_html).collect()
    }

    fn push(&mut self, text: &str, kind: TokenKind) {
        if !text.is_empty() {
            self.segments.push(HighlightedSegment::new(text, kind));
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Syntax Highlighter
// ─────────────────────────────────────────────────────────────────────────────

struct CompiledLanguage {
    name: &'static str,
    pattern: Regex,
}

/// Holds the compiled pattern of every language in the table.
pub struct SyntaxHighlighter {
    languages: Vec<CompiledLanguage>,
}

impl Default for SyntaxHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntaxHighlighter {
    /// Compile the language table. A pattern that fails to compile leaves
    /// its language uncolored.
    pub fn new() -> Self {
        let languages: Vec<CompiledLanguage> = LANGUAGES
            .iter()
            .filter_map(|spec| match Regex::new(&language_pattern(spec)) {
                Ok(pattern) => Some(CompiledLanguage {
                    name: spec.name,
                    pattern,
                }),
                Err(e) => {
                    warn!("Syntax pattern for '{}' failed to compile: {}", spec.name, e);
                    None
                }
            })
            .collect();
        debug!("Compiled {} syntax languages", languages.len());
        Self { languages }
    }

    /// Names of the supported language families.
    pub fn languages(&self) -> Vec<&'static str> {
        self.languages.iter().map(|l| l.name).collect()
    }

    /// Split `code` into highlighted lines. Unknown languages come back as
    /// plain text.
    pub fn highlight_code(&self, code: &str, language: &str) -> Vec<HighlightedLine> {
        let compiled = normalize_language(language)
            .and_then(|family| self.languages.iter().find(|l| l.name == family));
        let Some(compiled) = compiled else {
            if !language.is_empty() {
                debug!("No syntax found for language: {}", language);
            }
            return split_lines(code, vec![HighlightedSegment::new(code, TokenKind::Plain)]);
        };

        let mut segments = Vec::new();
        let mut last = 0;
        for caps in compiled.pattern.captures_iter(code) {
            let (kind, m) = if let Some(m) = caps.name("comment") {
                (TokenKind::Comment, m)
            } else if let Some(m) = caps.name("string") {
                (TokenKind::String, m)
            } else if let Some(m) = caps.name("number") {
                (TokenKind::Number, m)
            } else if let Some(m) = caps.name("keyword") {
                (TokenKind::Keyword, m)
            } else {
                continue;
            };
            if m.start() > last {
                segments.push(HighlightedSegment::new(&code[last..m.start()], TokenKind::Plain));
            }
            segments.push(HighlightedSegment::new(m.as_str(), kind));
            last = m.end();
        }
        if last < code.len() {
            segments.push(HighlightedSegment::new(&code[last..], TokenKind::Plain));
        }

        split_lines(code, segments)
    }
}

fn language_pattern(spec: &LanguageSpec) -> String {
    let keywords: Vec<String> = spec.keywords.iter().map(|k| regex::escape(k)).collect();
    let flags = if spec.case_insensitive_keywords { "(?i)" } else { "" };
    format!(
        r"(?P<comment>{})|(?P<string>{})|(?P<number>\b(?:0[xX][0-9a-fA-F]+|\d+(?:\.\d+)?)\b)|(?P<keyword>{}\b(?:{})\b)",
        spec.comment,
        spec.string,
        flags,
        keywords.join("|")
    )
}

/// Break segments at newlines. A trailing newline does not open a line.
fn split_lines(code: &str, segments: Vec<HighlightedSegment>) -> Vec<HighlightedLine> {
    let mut lines = vec![HighlightedLine::default()];
    for segment in segments {
        let mut parts = segment.text.split('\n');
        if let Some(first) = parts.next() {
            if let Some(line) = lines.last_mut() {
                line.push(first, segment.kind);
            }
        }
        for part in parts {
            let mut line = HighlightedLine::default();
            line.push(part, segment.kind);
            lines.push(line);
        }
    }
    if code.ends_with('\n') && lines.last().is_some_and(HighlightedLine::is_empty) {
        lines.pop();
    }
    lines
}

// ─────────────────────────────────────────────────────────────────────────────
// Global Highlighter
// ─────────────────────────────────────────────────────────────────────────────

static HIGHLIGHTER: OnceLock<SyntaxHighlighter> = OnceLock::new();

/// The shared highlighter, compiled on first use.
pub fn get_highlighter() -> &'static SyntaxHighlighter {
    HIGHLIGHTER.get_or_init(SyntaxHighlighter::new)
}

/// Highlight with the shared highlighter.
pub fn highlight_code(code: &str, language: &str) -> Vec<HighlightedLine> {
    get_highlighter().highlight_code(code, language)
}

/// Highlighted code as HTML lines joined by newlines.
pub fn highlight_to_html(code: &str, language: &str) -> String {
    highlight_code(code, language)
        .iter()
        .map(HighlightedLine::to_html)
        .collect::<Vec<_>>()
        .join("\n")
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
