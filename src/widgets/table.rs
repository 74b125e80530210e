//! Table widget: cell formatting and context-menu commands

use std::sync::OnceLock;

use regex::Regex;

use crate::editor::EditorCommand;
use crate::markdown::table::{TableData, TableOperation};

/// A rendered pipe table.
///
/// Equality looks at content only; the source span moves with every edit
/// above the table and is re-resolved when a command is applied.
#[derive(Debug, Clone)]
pub struct TableWidget {
    pub data: TableData,
}

impl PartialEq for TableWidget {
    fn eq(&self, other: &Self) -> bool {
        self.data.same_content(&other.data)
    }
}

impl TableWidget {
    /// Command for a context-menu entry on cell (`row_index`, `col_index`).
    pub fn command(&self, op: TableOperation, row_index: i32, col_index: usize) -> EditorCommand {
        EditorCommand::TableOperation {
            op,
            row_index,
            col_index,
            source_from: self.data.source_from,
            source_to: self.data.source_to,
        }
    }
}

struct CellRule {
    pattern: &'static str,
    replacement: &'static str,
}

/// Applied in order to already-escaped cell text.
const CELL_RULES: &[CellRule] = &[
    CellRule {
        pattern: r"`([^`]+)`",
        replacement: "<code>$1</code>",
    },
    CellRule {
        pattern: r"\*\*(.+?)\*\*",
        replacement: "<strong>$1</strong>",
    },
    CellRule {
        pattern: r"__(.+?)__",
        replacement: "<strong>$1</strong>",
    },
    CellRule {
        pattern: r"~~(.+?)~~",
        replacement: "<del>$1</del>",
    },
    CellRule {
        pattern: r"\*([^*]+)\*",
        replacement: "<em>$1</em>",
    },
    CellRule {
        pattern: r"(?i)&lt;br\s*/?&gt;",
        replacement: "<br>",
    },
];

fn cell_rules() -> &'static [(Regex, &'static str)] {
    static RULES: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    RULES.get_or_init(|| {
        CELL_RULES
            .iter()
            .map(|rule| {
                (
                    Regex::new(rule.pattern).expect("valid cell rule"),
                    rule.replacement,
                )
            })
            .collect()
    })
}

/// Escape a cell and re-wrap the small inline subset tables support.
pub fn format_cell(text: &str) -> String {
    let mut html = html_escape::encode_text(text).into_owned();
    for (regex, replacement) in cell_rules() {
        html = regex.replace_all(&html, *replacement).into_owned();
    }
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::table::parse_table_source;

    #[test]
    fn test_format_cell_subset() {
        assert_eq!(format_cell("**b** and *i*"), "<strong>b</strong> and <em>i</em>");
        assert_eq!(format_cell("~~x~~ `y`"), "<del>x</del> <code>y</code>");
        assert_eq!(format_cell("a<br>b"), "a<br>b");
        assert_eq!(format_cell("a<BR/>b"), "a<br>b");
    }

    #[test]
    fn test_format_cell_escapes_markup() {
        assert_eq!(
            format_cell("<script>x</script> & y"),
            "&lt;script&gt;x&lt;/script&gt; &amp; y"
        );
    }

    #[test]
    fn test_equality_ignores_span() {
        let a = TableWidget {
            data: parse_table_source("| a |\n|---|\n| 1 |", 0),
        };
        let b = TableWidget {
            data: parse_table_source("| a |\n|---|\n| 1 |", 50),
        };
        let c = TableWidget {
            data: parse_table_source("| a |\n|---|\n| 2 |", 0),
        };
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
