//! Spreadsheet paste normalization
//!
//! Tab-separated clipboard text (Excel, LibreOffice, Google Sheets) becomes
//! a Markdown pipe table before it is inserted.

/// Share of lines that must contain a tab for multi-line text to convert.
const TAB_LINE_RATIO: f64 = 0.5;

/// Whether pasted text looks like tab-separated rows.
pub fn is_tabular(text: &str) -> bool {
    let lines: Vec<&str> = text.trim().split('\n').collect();
    let with_tabs = lines.iter().filter(|line| line.contains('\t')).count();
    if with_tabs == 0 {
        return false;
    }
    if lines.len() == 1 {
        return true;
    }
    with_tabs as f64 / lines.len() as f64 >= TAB_LINE_RATIO
}

/// Convert tab-separated text to a Markdown table.
///
/// Returns `None` when the text is not tabular and should be pasted as-is.
/// Empty cells become `-` and short rows are padded to the widest row.
pub fn normalize_paste(text: &str) -> Option<String> {
    if !is_tabular(text) {
        return None;
    }

    let mut rows: Vec<Vec<String>> = text
        .trim()
        .split('\n')
        .map(|line| {
            line.split('\t')
                .map(|cell| match cell.trim() {
                    "" => "-".to_string(),
                    trimmed => trimmed.to_string(),
                })
                .collect()
        })
        .collect();

    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut lines = Vec::with_capacity(rows.len() + 1);

    for (i, row) in rows.iter_mut().enumerate() {
        row.resize(columns, "-".to_string());
        lines.push(format!("| {} |", row.join(" | ")));
        if i == 0 {
            lines.push(format!("| {} |", vec!["---"; columns].join(" | ")));
        }
    }

    Some(lines.join("\n"))
}
