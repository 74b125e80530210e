//! Widget descriptors
//!
//! Every construct rendered in view mode is described by a `Widget` value.
//! Descriptors hold only the data they were built from, compare by value so
//! the view layer can reuse unchanged views, and translate user actions into
//! typed `EditorCommand`s. They never touch the document themselves.

mod checkbox;
mod code;
mod html;
mod image;
mod link;
mod table;

pub use checkbox::{toggle_replacement, CheckboxWidget};
pub use code::{is_diagram_language, CodeWidget, CopyStatus, DiagramWidget, DIAGRAM_LANGUAGES};
pub use html::{DetailsWidget, HtmlWidget};
pub use image::{resolve_image_path, ImageSize, ImageSource, ImageWidget};
pub use link::{LinkTarget, LinkWidget};
pub use table::{format_cell, TableWidget};

use crate::editor::EditorCommand;
use crate::error::{Error, Result};
use crate::markdown::table::{TableData, TableOperation};

/// Glyph substituted for bullet list markers.
pub const BULLET_GLYPH: &str = "•";

/// A renderable replacement for a source range.
#[derive(Debug, Clone, PartialEq)]
pub enum Widget {
    Image(ImageWidget),
    Link(LinkWidget),
    Table(TableWidget),
    CodeBlock(CodeWidget),
    Diagram(DiagramWidget),
    Details(DetailsWidget),
    /// Sanitized raw HTML, block or inline
    HtmlBlock(HtmlWidget),
    Checkbox(CheckboxWidget),
    Bullet,
    /// Shown in place of a construct whose widget could not be built
    RenderError { message: String },
}

/// A user interaction with a rendered widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetAction {
    /// Primary click; `modifier` is Ctrl (Cmd on macOS)
    Click { modifier: bool },
    /// Checkbox toggled
    Toggle,
    /// Table context menu entry chosen on a cell (`row_index == -1` is the header)
    TableMenu {
        op: TableOperation,
        row_index: i32,
        col_index: usize,
    },
    /// Copy control pressed
    Copy,
    /// Click inside a block widget's body
    ContentClick,
}

impl Widget {
    /// Build a table widget, rejecting tables without a header row.
    pub fn table(data: TableData) -> Result<Self> {
        if data.headers.is_empty() {
            return Err(Error::render("table", "missing header row"));
        }
        Ok(Widget::Table(TableWidget { data }))
    }

    pub fn render_error(message: impl Into<String>) -> Self {
        Widget::RenderError {
            message: message.into(),
        }
    }

    /// Short name used in logs and markup.
    pub fn name(&self) -> &'static str {
        match self {
            Widget::Image(_) => "image",
            Widget::Link(_) => "link",
            Widget::Table(_) => "table",
            Widget::CodeBlock(_) => "code",
            Widget::Diagram(_) => "diagram",
            Widget::Details(_) => "details",
            Widget::HtmlBlock(_) => "html",
            Widget::Checkbox(_) => "checkbox",
            Widget::Bullet => "bullet",
            Widget::RenderError { .. } => "render-error",
        }
    }

    /// Whether clicking the widget body should reveal its source.
    pub fn is_block(&self) -> bool {
        !matches!(
            self,
            Widget::Link(_) | Widget::Checkbox(_) | Widget::Bullet
        )
    }

    /// Translate an action on this widget (replacing the range starting at
    /// `span_from`) into a command for the controller.
    pub fn on_action(&self, action: WidgetAction, span_from: usize) -> Option<EditorCommand> {
        match (self, action) {
            (Widget::Link(link), WidgetAction::Click { modifier }) => link.on_click(modifier),
            (Widget::Checkbox(checkbox), WidgetAction::Toggle) => Some(checkbox.toggle_command()),
            (
                Widget::Table(table),
                WidgetAction::TableMenu {
                    op,
                    row_index,
                    col_index,
                },
            ) => Some(table.command(op, row_index, col_index)),
            (Widget::CodeBlock(code), WidgetAction::Copy) => Some(EditorCommand::CopyToClipboard {
                text: code.code.clone(),
            }),
            (Widget::Diagram(diagram), WidgetAction::Copy) => {
                Some(EditorCommand::CopyToClipboard {
                    text: diagram.source.clone(),
                })
            }
            (widget, WidgetAction::ContentClick) if widget.is_block() => {
                Some(EditorCommand::EnterEditMode { pos: span_from })
            }
            _ => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::table::parse_table_source;

    #[test]
    fn test_table_without_header_is_error() {
        let err = Widget::table(TableData::default()).unwrap_err();
        assert!(err.to_string().contains("table"));
    }

    #[test]
    fn test_checkbox_toggle_action() {
        let widget = Widget::Checkbox(CheckboxWidget {
            checked: false,
            pos: 2,
        });
        assert_eq!(
            widget.on_action(WidgetAction::Toggle, 0),
            Some(EditorCommand::ToggleCheckbox {
                pos: 2,
                checked: false
            })
        );
        assert_eq!(widget.on_action(WidgetAction::ContentClick, 0), None);
    }

    #[test]
    fn test_table_menu_action_carries_span() {
        let data = parse_table_source("| a |\n|---|\n| 1 |", 12);
        let widget = Widget::table(data).unwrap();
        let command = widget.on_action(
            WidgetAction::TableMenu {
                op: TableOperation::AddRowBelow,
                row_index: 0,
                col_index: 0,
            },
            12,
        );
        assert_eq!(
            command,
            Some(EditorCommand::TableOperation {
                op: TableOperation::AddRowBelow,
                row_index: 0,
                col_index: 0,
                source_from: 12,
                source_to: 29,
            })
        );
    }

    #[test]
    fn test_content_click_enters_edit_mode() {
        let widget = Widget::CodeBlock(CodeWidget::new("rust", "x"));
        assert_eq!(
            widget.on_action(WidgetAction::ContentClick, 40),
            Some(EditorCommand::EnterEditMode { pos: 40 })
        );
        assert_eq!(
            widget.on_action(WidgetAction::Copy, 40),
            Some(EditorCommand::CopyToClipboard {
                text: "x".to_string()
            })
        );
    }

    #[test]
    fn test_plain_link_click_inert() {
        let widget = Widget::Link(LinkWidget::new("docs", "https://example.com"));
        assert_eq!(widget.on_action(WidgetAction::Click { modifier: false }, 0), None);
        assert!(!widget.is_block());
    }
}
