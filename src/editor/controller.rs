//! Hybrid editor controller
//!
//! Owns the document and everything derived from it. Every input, selection
//! change, widget command and configuration change ends in `recompute`, which
//! reparses the text and rebuilds the decoration list synchronously.

use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use super::clipboard::{ClipboardProvider, SystemClipboard};
use super::command::{CommandChannel, EditorCommand, EditorEvent};
use super::document::{Document, Selection, Transaction};
use super::edit_mode::{EditInput, KeyDisposition};
use super::opener::{ExternalOpener, SystemOpener};
use super::outline::{extract_outline, DocumentOutline};
use super::paste::normalize_paste;
use crate::config::EditorConfig;
use crate::decoration::{compute_decorations, Decoration};
use crate::error::Result;
use crate::markdown::parser::{NodeKind, SyntaxNode, SyntaxTree};
use crate::markdown::table::{apply_table_operation, table_span, TableOperation};
use crate::text::LineIndex;
use crate::widgets::{toggle_replacement, CopyStatus, WidgetAction};

/// Identity of a table command for duplicate suppression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TableCommandKey {
    op: TableOperation,
    row_index: i32,
    col_index: usize,
    source_from: usize,
}

/// The hybrid Markdown editor core.
pub struct HybridEditor {
    document: Document,
    config: EditorConfig,
    tree: SyntaxTree,
    decorations: Vec<Decoration>,
    commands: CommandChannel,
    events: Vec<EditorEvent>,
    last_table_command: Option<(TableCommandKey, Instant)>,
    clipboard: Box<dyn ClipboardProvider>,
    opener: Box<dyn ExternalOpener>,
    copy_status: Option<CopyStatus>,
}

impl HybridEditor {
    pub fn new(text: impl Into<String>, mut config: EditorConfig) -> Self {
        config.sanitize();
        let document = Document::new(text);
        let tree = SyntaxTree::parse(document.text());
        let mut editor = Self {
            document,
            config,
            tree,
            decorations: Vec::new(),
            commands: CommandChannel::default(),
            events: Vec::new(),
            last_table_command: None,
            clipboard: Box::new(SystemClipboard),
            opener: Box::new(SystemOpener),
            copy_status: None,
        };
        editor.recompute();
        info!(
            "Hybrid editor ready ({} bytes, base dir '{}')",
            editor.document.text().len(),
            editor.config.base_dir_str()
        );
        editor
    }

    pub fn with_clipboard(mut self, clipboard: impl ClipboardProvider + 'static) -> Self {
        self.clipboard = Box::new(clipboard);
        self
    }

    pub fn with_opener(mut self, opener: impl ExternalOpener + 'static) -> Self {
        self.opener = Box::new(opener);
        self
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn text(&self) -> &str {
        self.document.text()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    pub fn decorations(&self) -> &[Decoration] {
        &self.decorations
    }

    pub fn selection(&self) -> Selection {
        self.document.selection()
    }

    pub fn edit_line(&self) -> Option<usize> {
        self.document.edit_mode.edit_line
    }

    /// Feedback from the most recent copy, if any.
    pub fn copy_status(&self) -> Option<CopyStatus> {
        self.copy_status
    }

    /// Clear the copy feedback once the host has shown it.
    pub fn clear_copy_status(&mut self) {
        self.copy_status = None;
    }

    /// Sender for views that dispatch widget commands.
    pub fn command_sender(&self) -> Sender<EditorCommand> {
        self.commands.sender()
    }

    /// Events produced since the last call.
    pub fn take_events(&mut self) -> Vec<EditorEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn outline(&self) -> DocumentOutline {
        extract_outline(self.document.text())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Input
    // ─────────────────────────────────────────────────────────────────────────

    /// Feed a keyboard or mouse input through the edit-mode state machine and
    /// run the default handling for inputs it passes through.
    pub fn handle_input(&mut self, input: EditInput) -> KeyDisposition {
        let index = self.document.line_index();
        let cursor = self.document.selection().head;
        let disposition = self.document.edit_mode.handle(input, &index, cursor);

        if disposition == KeyDisposition::PassThrough {
            let result = match input {
                EditInput::Enter => self.insert_text("\n"),
                EditInput::TypedChar { ch, modifiers } if !modifiers.any() && !ch.is_control() => {
                    self.insert_text(ch.encode_utf8(&mut [0; 4]))
                }
                EditInput::Click { pos } | EditInput::DoubleClick { pos } => {
                    self.document.set_selection(Selection::cursor(pos));
                    Ok(())
                }
                EditInput::SelectionChanged { head } => {
                    let anchor = self.document.selection().anchor;
                    self.document.set_selection(Selection::new(anchor, head));
                    Ok(())
                }
                _ => Ok(()),
            };
            if let Err(e) = result {
                warn!("Input {:?} could not be applied: {}", input, e);
            }
        }

        self.recompute();
        disposition
    }

    /// Replace the selection with `text`.
    pub fn insert_text(&mut self, text: &str) -> Result<()> {
        let selection = self.document.selection();
        self.apply(Transaction::Replace {
            from: selection.from(),
            to: selection.to(),
            text: text.to_string(),
        })
    }

    /// Paste clipboard text, converting tab-separated data to a table.
    pub fn paste(&mut self, text: &str) -> Result<()> {
        let Some(table) = normalize_paste(text) else {
            return self.insert_text(text);
        };
        debug!("Paste converted to a {}-line table", table.lines().count());
        let from = self.document.selection().from();
        let end = from + table.len();
        self.insert_text(&table)?;
        self.document.set_selection(Selection::cursor(end));
        self.recompute();
        Ok(())
    }

    /// Set the selection as reported by the host.
    pub fn set_selection(&mut self, selection: Selection) {
        self.document.set_selection(selection);
        let line = self.document.cursor_line();
        self.document.edit_mode.follow(line);
        self.recompute();
    }

    /// Replace the document wholesale (file switch).
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.document.replace_all(text);
        self.last_table_command = None;
        self.recompute();
    }

    pub fn set_config(&mut self, mut config: EditorConfig) {
        config.sanitize();
        self.config = config;
        self.recompute();
    }

    pub fn set_base_dir(&mut self, base_dir: impl Into<PathBuf>) {
        self.config.base_dir = base_dir.into();
        self.recompute();
    }

    /// Move the cursor to the start of a 1-based line and ask the host to
    /// scroll there.
    pub fn navigate_to_line(&mut self, line: usize) {
        let index = self.document.line_index();
        let line = line.clamp(1, index.line_count());
        self.document
            .set_selection(Selection::cursor(index.line_start(line)));
        self.document.edit_mode.follow(line);
        self.events.push(EditorEvent::NavigateToLine(line));
        self.recompute();
    }

    /// Follow an in-document anchor. Returns the heading line when found.
    pub fn scroll_to_anchor(&mut self, anchor_id: &str) -> Option<usize> {
        self.events.push(EditorEvent::ScrollToAnchor {
            anchor_id: anchor_id.to_string(),
        });
        let line = self.outline().find_anchor(anchor_id).map(|item| item.line);
        match line {
            Some(line) => self.navigate_to_line(line),
            None => debug!("No heading matches anchor '{}'", anchor_id),
        }
        line
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Widget Commands
    // ─────────────────────────────────────────────────────────────────────────

    /// Dispatch an action on the widget replacing the range that starts at
    /// `at`. Returns whether a command was queued.
    pub fn widget_action(&mut self, at: usize, action: WidgetAction) -> bool {
        let command = self
            .decorations
            .iter()
            .find_map(|d| match d {
                Decoration::Replace { from, widget, .. } if *from == at => {
                    widget.on_action(action, *from)
                }
                _ => None,
            });
        match command {
            Some(command) => self.commands.sender().send(command).is_ok(),
            None => false,
        }
    }

    /// Apply every queued widget command. Returns how many were processed.
    pub fn poll_commands(&mut self) -> usize {
        let commands = self.commands.drain();
        let count = commands.len();
        for command in commands {
            if let Err(e) = self.handle_command(command) {
                warn!("Editor command failed: {}", e);
            }
        }
        count
    }

    pub fn handle_command(&mut self, command: EditorCommand) -> Result<()> {
        debug!("Handling {:?}", command);
        match command {
            EditorCommand::TableOperation {
                op,
                row_index,
                col_index,
                source_from,
                source_to,
            } => self.apply_table_command(
                TableCommandKey {
                    op,
                    row_index,
                    col_index,
                    source_from,
                },
                source_to,
            ),
            EditorCommand::ToggleCheckbox { pos, checked } => {
                match toggle_replacement(self.document.text(), pos, checked) {
                    Some(replacement) => self.apply(Transaction::Replace {
                        from: pos,
                        to: pos + 3,
                        text: replacement.to_string(),
                    }),
                    None => {
                        warn!("Checkbox at {} no longer matches the document", pos);
                        Ok(())
                    }
                }
            }
            EditorCommand::ScrollToAnchor { anchor_id } => {
                self.scroll_to_anchor(&anchor_id);
                Ok(())
            }
            EditorCommand::OpenExternal { url } => self.opener.open(&url),
            EditorCommand::CopyToClipboard { text } => {
                let status = match self.clipboard.set_text(&text) {
                    Ok(()) => CopyStatus::Copied,
                    Err(e) => {
                        warn!("Copy failed: {}", e);
                        CopyStatus::Failed
                    }
                };
                self.copy_status = Some(status);
                Ok(())
            }
            EditorCommand::EnterEditMode { pos } => {
                let line = self.document.line_index().line_of(pos);
                self.document.set_selection(Selection::cursor(pos));
                self.document.edit_mode.edit_line = Some(line);
                self.recompute();
                Ok(())
            }
        }
    }

    fn apply_table_command(&mut self, key: TableCommandKey, source_to: usize) -> Result<()> {
        let now = Instant::now();
        let window = Duration::from_millis(self.config.table_debounce_ms);
        if let Some((last, at)) = self.last_table_command {
            if last == key && now.duration_since(at) < window {
                debug!("Duplicate table command {:?} dropped", key.op);
                return Ok(());
            }
        }
        self.last_table_command = Some((key, now));

        // Re-resolve the span against the current text
        let text = self.document.text();
        let index = LineIndex::new(text);
        let Some(node) = find_table(&self.tree, key.source_from, source_to) else {
            warn!("No table at {} for {:?}", key.source_from, key.op);
            return Ok(());
        };
        let (from, to) = table_span(text, &index, node);
        let source = &text[from..to];
        let updated = apply_table_operation(key.op, key.row_index, key.col_index, source);
        if updated == source {
            debug!("Table operation {:?} refused", key.op);
            return Ok(());
        }

        self.apply(Transaction::Replace {
            from,
            to,
            text: updated,
        })?;
        self.events.push(EditorEvent::TableOperation {
            op: key.op,
            row_index: key.row_index,
            col_index: key.col_index,
            source_from: from,
            source_to: to,
        });
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal
    // ─────────────────────────────────────────────────────────────────────────

    fn apply(&mut self, transaction: Transaction) -> Result<()> {
        self.document.apply(transaction)?;
        let line = self.document.cursor_line();
        self.document.edit_mode.follow(line);
        self.events
            .push(EditorEvent::Changed(self.document.text().to_string()));
        self.recompute();
        Ok(())
    }

    fn recompute(&mut self) {
        let text = self.document.text();
        self.tree = SyntaxTree::parse(text);
        if self.config.plain_text_mode {
            self.decorations.clear();
            return;
        }
        self.decorations = compute_decorations(
            text,
            &self.tree,
            self.document.selection(),
            self.document.edit_mode.edit_line,
            &self.config.base_dir_str(),
        );
    }
}

/// The table a command was issued against: same start, else overlapping.
fn find_table(tree: &SyntaxTree, from: usize, to: usize) -> Option<&SyntaxNode> {
    let tables: Vec<&SyntaxNode> = tree
        .nodes()
        .into_iter()
        .filter(|n| matches!(n.kind, NodeKind::Table { .. }))
        .collect();
    tables
        .iter()
        .find(|n| n.from == from)
        .or_else(|| tables.iter().find(|n| n.from < to.max(from + 1) && from < n.to))
        .copied()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
