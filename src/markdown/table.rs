//! Pipe-table model
//!
//! Tables are read back from their raw source lines rather than from the
//! parser's cell nodes, because the parser drops empty cells. Structural
//! edits (add/delete row/column) also work on raw lines so that untouched
//! rows keep their exact formatting.

use log::debug;

use crate::markdown::parser::{SyntaxNode, TableAlignment};
use crate::text::{safe_slice, LineIndex};

/// Smallest and largest table the insert-table feature produces.
pub const TEMPLATE_MAX_ROWS: usize = 50;
pub const TEMPLATE_MAX_COLUMNS: usize = 20;

// ─────────────────────────────────────────────────────────────────────────────
// TableData
// ─────────────────────────────────────────────────────────────────────────────

/// Structured view of one pipe table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableData {
    /// Header cells, empty strings preserved
    pub headers: Vec<String>,
    /// Data rows; a row may be shorter than `headers`
    pub rows: Vec<Vec<String>>,
    /// One entry per header cell
    pub alignments: Vec<TableAlignment>,
    /// Corrected source span start (byte offset)
    pub source_from: usize,
    /// Corrected source span end (byte offset, exclusive)
    pub source_to: usize,
}

impl TableData {
    /// Number of columns (the header width).
    pub fn num_columns(&self) -> usize {
        self.headers.len()
    }

    /// Cell text for rendering; missing cells come back as `None`.
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col).map(String::as_str)
    }

    /// Compare headers, rows and alignments, ignoring the source span.
    pub fn same_content(&self, other: &TableData) -> bool {
        self.headers.len() == other.headers.len()
            && self.rows.len() == other.rows.len()
            && self.headers == other.headers
            && self.rows == other.rows
            && self.alignments == other.alignments
    }
}

fn join_row(cells: &[String]) -> String {
    let mut line = String::from("|");
    for cell in cells {
        line.push(' ');
        line.push_str(cell);
        line.push_str(" |");
    }
    line
}

// ─────────────────────────────────────────────────────────────────────────────
// Parsing
// ─────────────────────────────────────────────────────────────────────────────

/// Whether a line looks like a pipe-table row (or delimiter row).
pub fn looks_like_row(line: &str) -> bool {
    line.trim_start().starts_with('|')
}

/// Split a table row on unescaped pipes.
///
/// One leading and one trailing pipe are stripped; cells are trimmed and
/// empty cells are kept.
pub fn split_cells(line: &str) -> Vec<String> {
    let mut body = line.trim();
    if let Some(rest) = body.strip_prefix('|') {
        body = rest;
    }
    if body.ends_with('|') && !body.ends_with("\\|") {
        body = &body[..body.len() - 1];
    }

    let mut cells = Vec::new();
    let mut current = String::new();
    let mut escaped = false;
    for c in body.chars() {
        if escaped {
            current.push(c);
            escaped = false;
            continue;
        }
        match c {
            '\\' => {
                current.push(c);
                escaped = true;
            }
            '|' => {
                cells.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    cells.push(current.trim().to_string());
    cells
}

/// Alignment of one delimiter-row segment.
pub fn parse_alignment(segment: &str) -> TableAlignment {
    let s = segment.trim();
    let left = s.starts_with(':');
    let right = s.ends_with(':');
    match (left, right) {
        (true, true) if s.len() > 1 => TableAlignment::Center,
        (_, true) => TableAlignment::Right,
        (true, false) => TableAlignment::Left,
        _ => TableAlignment::None,
    }
}

/// Byte length of `depth` leading blockquote markers (`>` with the blanks
/// around it), or `None` when the line carries fewer.
fn quote_prefix_len(line: &str, depth: usize) -> Option<usize> {
    let bytes = line.as_bytes();
    let mut pos = 0;
    for _ in 0..depth {
        while pos < bytes.len() && (bytes[pos] == b' ' || bytes[pos] == b'\t') {
            pos += 1;
        }
        if bytes.get(pos) != Some(&b'>') {
            return None;
        }
        pos += 1;
        if bytes.get(pos) == Some(&b' ') {
            pos += 1;
        }
    }
    Some(pos)
}

/// Number of blockquote markers a line starts with.
fn quote_depth(line: &str) -> usize {
    let mut depth = 0;
    while quote_prefix_len(line, depth + 1).is_some() {
        depth += 1;
    }
    depth
}

/// Split a raw line of a table nested `depth` quotes deep into its
/// container prefix and row text.
fn split_container(line: &str, depth: usize) -> Option<(&str, &str)> {
    quote_prefix_len(line, depth).map(|len| line.split_at(len))
}

/// Row text of every raw line after the first, prefixes removed. Lines
/// missing the container prefix are not part of the table.
fn row_bodies(source: &str) -> impl Iterator<Item = &str> {
    let mut lines = source.lines();
    let header = lines.next();
    let rest: Vec<&str> = lines.collect();
    let depth = rest.first().map_or(0, |line| quote_depth(line));
    let bodies = rest
        .into_iter()
        .filter_map(move |line| split_container(line, depth).map(|(_, body)| body));
    header.into_iter().chain(bodies)
}

/// Corrected `(from, to)` span of a table node.
///
/// The parser's end is extended forward while following lines look like
/// rows, then clamped back to the last row-looking line, but never above the
/// delimiter line. Inside a blockquote each line is tested without its
/// quote markers.
pub fn table_span(text: &str, index: &LineIndex, node: &SyntaxNode) -> (usize, usize) {
    let start_line = index.line_of(node.from);
    let reported_end = index.line_of(node.to.max(node.from));
    let mut end_line = reported_end.max(start_line);

    let depth = quote_depth(safe_slice(text, index.line_start(start_line), node.from));
    let is_row = |line: usize| {
        split_container(index.line_text(text, line), depth)
            .is_some_and(|(_, body)| looks_like_row(body))
    };

    while end_line < index.line_count() && is_row(end_line + 1) {
        end_line += 1;
    }
    let floor = (start_line + 1).min(index.line_count());
    while end_line > floor && !is_row(end_line) {
        end_line -= 1;
    }

    (node.from, index.line_end(end_line).max(node.from))
}

/// Build `TableData` for a table node, reading cells from the raw text.
pub fn parse_table(node: &SyntaxNode, text: &str, index: &LineIndex) -> TableData {
    let (from, to) = table_span(text, index, node);
    parse_table_source(safe_slice(text, from, to), from)
}

/// Parse raw table text starting at byte offset `from`.
///
/// The first line starts at the header row; later lines may carry the
/// blockquote markers of an enclosing quote.
pub fn parse_table_source(source: &str, from: usize) -> TableData {
    let mut lines = row_bodies(source);
    let headers = lines.next().map(split_cells).unwrap_or_default();

    let mut alignments: Vec<TableAlignment> = lines
        .next()
        .map(|line| split_cells(line).iter().map(|s| parse_alignment(s)).collect())
        .unwrap_or_default();
    alignments.resize(headers.len(), TableAlignment::None);

    let rows = lines
        .filter(|line| looks_like_row(line))
        .map(split_cells)
        .collect();

    TableData {
        headers,
        rows,
        alignments,
        source_from: from,
        source_to: from + source.len(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Structural Operations
// ─────────────────────────────────────────────────────────────────────────────

/// Structural edit offered by the table context menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableOperation {
    AddRowAbove,
    AddRowBelow,
    AddColumnLeft,
    AddColumnRight,
    DeleteRow,
    DeleteColumn,
}

impl TableOperation {
    /// All operations in context-menu order.
    pub fn all() -> &'static [TableOperation] {
        &[
            TableOperation::AddRowAbove,
            TableOperation::AddRowBelow,
            TableOperation::AddColumnLeft,
            TableOperation::AddColumnRight,
            TableOperation::DeleteRow,
            TableOperation::DeleteColumn,
        ]
    }

    /// Menu label.
    pub fn label(&self) -> &'static str {
        match self {
            TableOperation::AddRowAbove => "Add row above",
            TableOperation::AddRowBelow => "Add row below",
            TableOperation::AddColumnLeft => "Add column left",
            TableOperation::AddColumnRight => "Add column right",
            TableOperation::DeleteRow => "Delete row",
            TableOperation::DeleteColumn => "Delete column",
        }
    }

    /// Stable identifier used in rendered markup.
    pub fn id(&self) -> &'static str {
        match self {
            TableOperation::AddRowAbove => "add-row-above",
            TableOperation::AddRowBelow => "add-row-below",
            TableOperation::AddColumnLeft => "add-column-left",
            TableOperation::AddColumnRight => "add-column-right",
            TableOperation::DeleteRow => "delete-row",
            TableOperation::DeleteColumn => "delete-column",
        }
    }
}

/// Index of the delimiter line within a table's raw lines.
const DELIMITER_LINE: usize = 1;
/// First data row line.
const FIRST_ROW_LINE: usize = 2;
/// Row deletion is refused at or below this many data rows.
const MIN_ROWS_FOR_DELETE: usize = 2;

/// Apply a structural edit to raw table text.
///
/// `row_index == -1` addresses the header row. Returns the source unchanged
/// when the operation is refused: deleting the header, deleting a row from
/// a table with two data rows or fewer, or deleting the last column.
/// Blockquote markers in front of the rows are kept, and new rows get the
/// same markers as the delimiter line.
pub fn apply_table_operation(
    op: TableOperation,
    row_index: i32,
    col_index: usize,
    source: &str,
) -> String {
    let trailing_newline = source.ends_with('\n');
    let raw: Vec<&str> = source.lines().collect();
    if raw.len() <= DELIMITER_LINE {
        debug!("Table operation {:?} ignored: no delimiter line", op);
        return source.to_string();
    }

    let depth = quote_depth(raw[DELIMITER_LINE]);
    let row_prefix = split_container(raw[DELIMITER_LINE], depth)
        .map_or("", |(prefix, _)| prefix)
        .to_string();
    let mut lines: Vec<(String, String)> = raw
        .iter()
        .enumerate()
        .map(|(i, line)| match split_container(line, depth) {
            Some((prefix, body)) if i > 0 => (prefix.to_string(), body.to_string()),
            _ => (String::new(), line.to_string()),
        })
        .collect();

    let columns = split_cells(&lines[0].1).len().max(1);
    let data_rows = lines.len() - FIRST_ROW_LINE;

    match op {
        TableOperation::AddRowAbove | TableOperation::AddRowBelow => {
            let at = if row_index < 0 {
                FIRST_ROW_LINE
            } else if op == TableOperation::AddRowAbove {
                FIRST_ROW_LINE + row_index as usize
            } else {
                FIRST_ROW_LINE + 1 + row_index as usize
            };
            let at = at.min(lines.len());
            lines.insert(at, (row_prefix, placeholder_row(columns)));
        }
        TableOperation::DeleteRow => {
            if row_index < 0 || data_rows <= MIN_ROWS_FOR_DELETE {
                debug!(
                    "Delete row refused (row {}, {} data rows)",
                    row_index, data_rows
                );
                return source.to_string();
            }
            let at = FIRST_ROW_LINE + row_index as usize;
            if at >= lines.len() {
                return source.to_string();
            }
            lines.remove(at);
        }
        TableOperation::AddColumnLeft | TableOperation::AddColumnRight => {
            let at = if op == TableOperation::AddColumnLeft {
                col_index
            } else {
                col_index + 1
            };
            let at = at.min(columns);
            for (i, (_, body)) in lines.iter_mut().enumerate() {
                let filler = if i == DELIMITER_LINE { "---" } else { "" };
                *body = insert_cell(body, at, filler);
            }
        }
        TableOperation::DeleteColumn => {
            if columns <= 1 || col_index >= columns {
                debug!(
                    "Delete column refused (column {}, {} columns)",
                    col_index, columns
                );
                return source.to_string();
            }
            for (_, body) in lines.iter_mut() {
                *body = remove_cell(body, col_index);
            }
        }
    }

    let mut result = lines
        .iter()
        .map(|(prefix, body)| format!("{}{}", prefix, body))
        .collect::<Vec<_>>()
        .join("\n");
    if trailing_newline {
        result.push('\n');
    }
    result
}

/// A blank data row with `columns` cells.
fn placeholder_row(columns: usize) -> String {
    let mut row = String::from("|");
    for _ in 0..columns {
        row.push_str("   |");
    }
    row
}

/// Byte offsets of the unescaped pipes in a line.
fn pipe_positions(line: &str) -> Vec<usize> {
    let mut positions = Vec::new();
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '|' => positions.push(i),
            _ => {}
        }
    }
    positions
}

/// Insert a cell before column `at`, keeping the rest of the line verbatim.
fn insert_cell(line: &str, at: usize, filler: &str) -> String {
    if !looks_like_row(line) {
        let mut cells = split_cells(line);
        cells.insert(at.min(cells.len()), filler.to_string());
        return join_row(&cells);
    }

    let pipes = pipe_positions(line);
    let cell = if filler.is_empty() {
        "   |".to_string()
    } else {
        format!(" {} |", filler)
    };

    match pipes.get(at) {
        Some(&pos) => {
            let mut out = String::with_capacity(line.len() + cell.len());
            out.push_str(&line[..=pos]);
            out.push_str(&cell);
            out.push_str(&line[pos + 1..]);
            out
        }
        None => {
            // Short row: pad out to the insertion point
            let mut out = line.trim_end().to_string();
            if !out.ends_with('|') {
                out.push_str(" |");
            }
            out.push_str(&cell);
            out
        }
    }
}

/// Remove column `col`, keeping the rest of the line verbatim.
fn remove_cell(line: &str, col: usize) -> String {
    if !looks_like_row(line) {
        let mut cells = split_cells(line);
        if col < cells.len() {
            cells.remove(col);
        }
        return join_row(&cells);
    }

    let pipes = pipe_positions(line);
    match (pipes.get(col), pipes.get(col + 1)) {
        (Some(&start), Some(&end)) => format!("{}{}", &line[..=start], &line[end + 1..]),
        (Some(&start), None) => line[..=start].to_string(),
        _ => line.to_string(),
    }
}

/// Fresh table skeleton for the insert-table feature.
///
/// `rows` counts data rows; both dimensions are clamped to the supported range.
pub fn table_template(rows: usize, cols: usize) -> String {
    let rows = rows.clamp(1, TEMPLATE_MAX_ROWS);
    let cols = cols.clamp(1, TEMPLATE_MAX_COLUMNS);

    let headers: Vec<String> = (1..=cols).map(|i| format!("Header {}", i)).collect();
    let mut lines = vec![join_row(&headers), join_row(&vec!["---".to_string(); cols])];
    for _ in 0..rows {
        lines.push(placeholder_row(cols));
    }
    lines.join("\n")
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
