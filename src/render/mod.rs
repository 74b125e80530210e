//! Widget rendering
//!
//! `WidgetRenderer` is the seam between the toolkit-independent widget
//! descriptors and a concrete view toolkit. This crate ships one target,
//! `HtmlRenderer`, whose views are shared HTML strings that deferred tasks
//! fill in later.

mod cache;
mod document;
mod tasks;

pub use cache::{ReconcileStats, ViewCache};
pub use document::{render_hybrid, standalone_document};
pub use tasks::{ClientSideDiagramRenderer, DiagramRenderer, RenderTask, TaskQueue, ViewTarget};

use std::cell::RefCell;
use std::rc::Rc;

use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use log::warn;

use crate::error::{Error, Result};
use crate::markdown::sanitize::{is_safe_url, UrlContext};
use crate::markdown::syntax::highlight_to_html;
use crate::markdown::table::TableOperation;
use crate::widgets::{
    format_cell, CheckboxWidget, CodeWidget, CopyStatus, DetailsWidget, DiagramWidget, HtmlWidget,
    ImageSource, ImageWidget, LinkWidget, TableWidget, Widget, BULLET_GLYPH,
};

// ─────────────────────────────────────────────────────────────────────────────
// Render Context
// ─────────────────────────────────────────────────────────────────────────────

/// Per-pass render state: the theme and the deferred work queue.
#[derive(Debug, Default)]
pub struct RenderContext {
    pub dark_mode: bool,
    pub tasks: TaskQueue,
    next_instance: u64,
}

impl RenderContext {
    pub fn new(dark_mode: bool) -> Self {
        Self {
            dark_mode,
            ..Self::default()
        }
    }

    /// A document-unique id for a diagram instance.
    pub fn next_instance_id(&mut self) -> String {
        self.next_instance += 1;
        format!("hm-diagram-{}", self.next_instance)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Renderer Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Turns widget descriptors into views of one toolkit.
pub trait WidgetRenderer {
    type View;

    fn render(&self, widget: &Widget, ctx: &mut RenderContext) -> Result<Self::View>;

    /// View shown in place of a widget that failed to build.
    fn placeholder(&self, message: &str) -> Self::View;

    /// Render, degrading to the placeholder on failure.
    fn render_or_placeholder(&self, widget: &Widget, ctx: &mut RenderContext) -> Self::View {
        match self.render(widget, ctx) {
            Ok(view) => view,
            Err(e) => {
                warn!("Widget '{}' failed to render: {}", widget.name(), e);
                self.placeholder(&e.to_string())
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// HTML Target
// ─────────────────────────────────────────────────────────────────────────────

/// Markup of one rendered widget. Clones share the same markup so a
/// deferred task can update a view already handed out.
#[derive(Debug, Clone, Default)]
pub struct HtmlView {
    html: Rc<RefCell<String>>,
}

impl HtmlView {
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            html: Rc::new(RefCell::new(html.into())),
        }
    }

    pub fn html(&self) -> String {
        self.html.borrow().clone()
    }

    /// Weak handle for deferred tasks.
    pub fn target(&self) -> ViewTarget {
        Rc::downgrade(&self.html)
    }

    /// Swap the copy control's label for transient feedback, or back to
    /// its resting state with `None`. Returns false when the view has no
    /// copy control.
    pub fn set_copy_status(&self, status: Option<CopyStatus>) -> bool {
        let mut html = self.html.borrow_mut();
        let Some(start) = html.find(COPY_BUTTON_OPEN) else {
            return false;
        };
        let Some(len) = html[start..].find("</button>") else {
            return false;
        };
        html.replace_range(start..start + len + "</button>".len(), &copy_button(status));
        true
    }

    /// Whether two views share markup.
    pub fn same_view(&self, other: &HtmlView) -> bool {
        Rc::ptr_eq(&self.html, &other.html)
    }
}

/// Renders widgets as HTML fragments.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlRenderer;

impl WidgetRenderer for HtmlRenderer {
    type View = HtmlView;

    fn render(&self, widget: &Widget, ctx: &mut RenderContext) -> Result<HtmlView> {
        match widget {
            Widget::Image(image) => render_image(image, ctx),
            Widget::Link(link) => Ok(HtmlView::new(render_link(link))),
            Widget::Table(table) => render_table(table).map(HtmlView::new),
            Widget::CodeBlock(code) => Ok(HtmlView::new(render_code(code))),
            Widget::Diagram(diagram) => Ok(render_diagram(diagram, ctx)),
            Widget::Details(details) => Ok(HtmlView::new(render_details(details))),
            Widget::HtmlBlock(html) => Ok(HtmlView::new(render_html(html))),
            Widget::Checkbox(checkbox) => Ok(HtmlView::new(render_checkbox(checkbox))),
            Widget::Bullet => Ok(HtmlView::new(format!(
                "<span class=\"hm-bullet\">{}</span>",
                BULLET_GLYPH
            ))),
            Widget::RenderError { message } => Ok(self.placeholder(message)),
        }
    }

    fn placeholder(&self, message: &str) -> HtmlView {
        HtmlView::new(format!(
            "<span class=\"hm-render-error\">Render error: {}</span>",
            text(message)
        ))
    }
}

fn render_image(image: &ImageWidget, ctx: &mut RenderContext) -> Result<HtmlView> {
    if image.source_url().trim().is_empty() {
        return Err(Error::render("image", "empty image source"));
    }
    let title = image
        .display_title()
        .map(|t| format!(" title=\"{}\"", attr(t)))
        .unwrap_or_default();

    match image.source() {
        ImageSource::Remote(url) => {
            if !is_safe_url(&url, UrlContext::Image) {
                return Err(Error::render("image", "unsafe image source"));
            }
            let size = match image.size() {
                Some(size) => {
                    let height = size
                        .height
                        .map(|h| format!(" height=\"{}\"", h))
                        .unwrap_or_default();
                    format!(" width=\"{}\"{}", size.width, height)
                }
                None => String::new(),
            };
            Ok(HtmlView::new(format!(
                "<img class=\"hm-image\" src=\"{}\" alt=\"{}\"{}{}>",
                attr(&url),
                attr(&image.alt),
                title,
                size
            )))
        }
        ImageSource::Local(path) => {
            let view = HtmlView::new(format!(
                "<span class=\"hm-image hm-loading\"{}>{}</span>",
                title,
                text(&image.loading_alt())
            ));
            ctx.tasks.push(RenderTask::LoadImage {
                path,
                alt: image.alt.clone(),
                title: image.display_title().map(str::to_string),
                size: image.size(),
                error_alt: image.error_alt(),
                target: view.target(),
            });
            Ok(view)
        }
    }
}

fn render_link(link: &LinkWidget) -> String {
    let label = text(link.display_text());
    if !is_safe_url(&link.url, UrlContext::Link) {
        return format!("<span class=\"hm-link hm-link-unsafe\">{}</span>", label);
    }
    format!(
        "<a class=\"hm-link\" href=\"{url}\" title=\"{url}\">{}</a>",
        label,
        url = attr(&link.url)
    )
}

fn render_table(table: &TableWidget) -> Result<String> {
    let data = &table.data;
    if data.headers.is_empty() {
        return Err(Error::render("table", "missing header row"));
    }
    let ops: Vec<&str> = TableOperation::all().iter().map(|op| op.id()).collect();

    let mut html = format!(
        "<table class=\"hm-table\" data-operations=\"{}\"><thead><tr>",
        ops.join(" ")
    );
    for (col, header) in data.headers.iter().enumerate() {
        html.push_str(&format!(
            "<th style=\"text-align: {}\" data-row=\"-1\" data-col=\"{}\">{}</th>",
            data.alignments.get(col).copied().unwrap_or_default().css(),
            col,
            format_cell(header)
        ));
    }
    html.push_str("</tr></thead><tbody>");
    for row in 0..data.rows.len() {
        html.push_str("<tr>");
        for col in 0..data.num_columns() {
            let cell = match data.cell(row, col) {
                Some(cell) if !cell.is_empty() => format_cell(cell),
                _ => "&nbsp;".to_string(),
            };
            html.push_str(&format!(
                "<td style=\"text-align: {}\" data-row=\"{}\" data-col=\"{}\">{}</td>",
                data.alignments.get(col).copied().unwrap_or_default().css(),
                row,
                col,
                cell
            ));
        }
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table>");
    Ok(html)
}

const COPY_BUTTON_OPEN: &str = "<button class=\"hm-copy\"";

fn copy_button(status: Option<CopyStatus>) -> String {
    match status {
        Some(status) => format!(
            "{} data-action=\"copy\" data-status=\"{}\">{}</button>",
            COPY_BUTTON_OPEN,
            status.id(),
            status.label()
        ),
        None => format!("{} data-action=\"copy\">Copy</button>", COPY_BUTTON_OPEN),
    }
}

fn render_code(code: &CodeWidget) -> String {
    format!(
        "<div class=\"hm-codeblock\" data-language=\"{}\">{}<pre><code>{}</code></pre></div>",
        attr(&code.language),
        copy_button(None),
        highlight_to_html(&code.code, &code.language)
    )
}

fn render_diagram(diagram: &DiagramWidget, ctx: &mut RenderContext) -> HtmlView {
    let instance_id = ctx.next_instance_id();
    let view = HtmlView::new(format!(
        "<pre class=\"hm-diagram-pending\" id=\"{}\">{}</pre>",
        instance_id,
        text(&diagram.source)
    ));
    ctx.tasks.push(RenderTask::RenderDiagram {
        language: diagram.language.clone(),
        source: diagram.source.clone(),
        dark_mode: ctx.dark_mode,
        instance_id,
        target: view.target(),
    });
    view
}

fn render_details(details: &DetailsWidget) -> String {
    format!(
        "<details class=\"hm-details\"><summary>{}</summary>{}</details>",
        details.summary_html(),
        details.content_html()
    )
}

fn render_html(html: &HtmlWidget) -> String {
    if html.inline {
        format!("<span class=\"hm-html-inline\">{}</span>", html.html)
    } else {
        format!("<div class=\"hm-html\">{}</div>", html.html)
    }
}

fn render_checkbox(checkbox: &CheckboxWidget) -> String {
    format!(
        "<input type=\"checkbox\" class=\"hm-checkbox\" data-pos=\"{}\"{}>",
        checkbox.pos,
        if checkbox.checked { " checked" } else { "" }
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
