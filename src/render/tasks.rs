//! Deferred render work
//!
//! Image loads and diagram renders never block a render pass. The renderer
//! queues a task holding a weak handle to the view it will fill; the host
//! drains the queue on its event loop. A view dropped by a later recompute
//! turns its task's completion into a no-op.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Weak;

use log::{debug, warn};

use crate::assets::{data_url, image_dimensions, AssetReader};
use crate::error::{Error, Result};
use crate::widgets::ImageSize;

/// Weak handle to a view's markup.
pub type ViewTarget = Weak<RefCell<String>>;

/// One piece of deferred work.
#[derive(Debug)]
pub enum RenderTask {
    LoadImage {
        path: String,
        alt: String,
        title: Option<String>,
        size: Option<ImageSize>,
        /// Alt text shown when the load fails
        error_alt: String,
        target: ViewTarget,
    },
    RenderDiagram {
        language: String,
        source: String,
        dark_mode: bool,
        instance_id: String,
        target: ViewTarget,
    },
}

/// Produces markup for diagram sources.
pub trait DiagramRenderer {
    fn render(&self, language: &str, source: &str, dark_mode: bool, instance_id: &str)
        -> Result<String>;
}

/// Emits the diagram source for a client-side renderer (mermaid.js picks up
/// `<pre class="mermaid">` elements) with the theme chosen explicitly.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClientSideDiagramRenderer;

impl DiagramRenderer for ClientSideDiagramRenderer {
    fn render(
        &self,
        language: &str,
        source: &str,
        dark_mode: bool,
        instance_id: &str,
    ) -> Result<String> {
        if source.trim().is_empty() {
            return Err(Error::render("diagram", "empty diagram source"));
        }
        Ok(format!(
            "<pre class=\"{}\" id=\"{}\" data-theme=\"{}\">{}</pre>",
            html_escape::encode_double_quoted_attribute(&language.to_lowercase()),
            instance_id,
            if dark_mode { "dark" } else { "default" },
            html_escape::encode_text(source)
        ))
    }
}

/// FIFO of pending render tasks.
#[derive(Debug, Default)]
pub struct TaskQueue {
    pending: VecDeque<RenderTask>,
}

impl TaskQueue {
    pub fn push(&mut self, task: RenderTask) {
        self.pending.push_back(task);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Run every pending task. Returns how many results reached a live view.
    pub fn run_pending(&mut self, reader: &dyn AssetReader, diagrams: &dyn DiagramRenderer) -> usize {
        let mut delivered = 0;
        while let Some(task) = self.pending.pop_front() {
            if run_task(task, reader, diagrams) {
                delivered += 1;
            }
        }
        delivered
    }
}

fn run_task(task: RenderTask, reader: &dyn AssetReader, diagrams: &dyn DiagramRenderer) -> bool {
    match task {
        RenderTask::LoadImage {
            path,
            alt,
            title,
            size,
            error_alt,
            target,
        } => {
            if target.strong_count() == 0 {
                debug!("Image view for '{}' dropped before load", path);
                return false;
            }
            let html = match reader.read_asset(&path) {
                Ok(bytes) => image_html(&path, &bytes, &alt, title.as_deref(), size),
                Err(e) => {
                    warn!("Image load failed: {}", e);
                    format!(
                        "<span class=\"hm-image hm-load-error\">{}</span>",
                        html_escape::encode_text(&error_alt)
                    )
                }
            };
            deliver(&target, html)
        }
        RenderTask::RenderDiagram {
            language,
            source,
            dark_mode,
            instance_id,
            target,
        } => {
            if target.strong_count() == 0 {
                debug!("Diagram view {} dropped before render", instance_id);
                return false;
            }
            let html = match diagrams.render(&language, &source, dark_mode, &instance_id) {
                Ok(html) => html,
                Err(e) => {
                    warn!("Diagram {} failed: {}", instance_id, e);
                    format!(
                        "<span class=\"hm-render-error\">{}</span>",
                        html_escape::encode_text(&e.to_string())
                    )
                }
            };
            deliver(&target, html)
        }
    }
}

fn image_html(path: &str, bytes: &[u8], alt: &str, title: Option<&str>, size: Option<ImageSize>) -> String {
    let mut html = format!(
        "<img class=\"hm-image\" src=\"{}\" alt=\"{}\"",
        data_url(path, bytes),
        html_escape::encode_double_quoted_attribute(alt)
    );
    if let Some(title) = title {
        html.push_str(&format!(
            " title=\"{}\"",
            html_escape::encode_double_quoted_attribute(title)
        ));
    }
    match size {
        Some(size) => {
            html.push_str(&format!(" width=\"{}\"", size.width));
            if let Some(height) = size.height {
                html.push_str(&format!(" height=\"{}\"", height));
            }
        }
        None => {
            if let Some((width, height)) = image_dimensions(bytes) {
                html.push_str(&format!(
                    " data-natural-width=\"{}\" data-natural-height=\"{}\"",
                    width, height
                ));
            }
        }
    }
    html.push('>');
    html
}

fn deliver(target: &ViewTarget, html: String) -> bool {
    match target.upgrade() {
        Some(view) => {
            *view.borrow_mut() = html;
            true
        }
        None => false,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::MemoryAssetReader;
    use std::rc::Rc;

    fn image_task(path: &str, target: ViewTarget) -> RenderTask {
        RenderTask::LoadImage {
            path: path.to_string(),
            alt: "cat".to_string(),
            title: None,
            size: Some(ImageSize {
                width: 10,
                height: None,
            }),
            error_alt: "cat (load error)".to_string(),
            target,
        }
    }

    #[test]
    fn test_image_load_fills_view() {
        let view = Rc::new(RefCell::new("cat (loading...)".to_string()));
        let mut queue = TaskQueue::default();
        queue.push(image_task("/d/cat.png", Rc::downgrade(&view)));

        let reader = MemoryAssetReader::new().with_asset("/d/cat.png", b"hi".to_vec());
        assert_eq!(queue.run_pending(&reader, &ClientSideDiagramRenderer), 1);
        assert_eq!(
            *view.borrow(),
            "<img class=\"hm-image\" src=\"data:image/png;base64,aGk=\" alt=\"cat\" width=\"10\">"
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn test_image_failure_shows_error_alt() {
        let view = Rc::new(RefCell::new(String::new()));
        let mut queue = TaskQueue::default();
        queue.push(image_task("/missing.png", Rc::downgrade(&view)));
        queue.run_pending(&MemoryAssetReader::new(), &ClientSideDiagramRenderer);
        assert_eq!(
            *view.borrow(),
            "<span class=\"hm-image hm-load-error\">cat (load error)</span>"
        );
    }

    #[test]
    fn test_dropped_view_is_noop() {
        let view = Rc::new(RefCell::new(String::new()));
        let mut queue = TaskQueue::default();
        queue.push(image_task("/d/cat.png", Rc::downgrade(&view)));
        drop(view);
        let reader = MemoryAssetReader::new().with_asset("/d/cat.png", b"hi".to_vec());
        assert_eq!(queue.run_pending(&reader, &ClientSideDiagramRenderer), 0);
    }

    #[test]
    fn test_diagram_render_and_failure() {
        let ok = Rc::new(RefCell::new(String::new()));
        let bad = Rc::new(RefCell::new(String::new()));
        let mut queue = TaskQueue::default();
        queue.push(RenderTask::RenderDiagram {
            language: "mermaid".to_string(),
            source: "graph TD\nA-->B\n".to_string(),
            dark_mode: true,
            instance_id: "hm-diagram-1".to_string(),
            target: Rc::downgrade(&ok),
        });
        queue.push(RenderTask::RenderDiagram {
            language: "mermaid".to_string(),
            source: "  ".to_string(),
            dark_mode: false,
            instance_id: "hm-diagram-2".to_string(),
            target: Rc::downgrade(&bad),
        });
        assert_eq!(queue.len(), 2);
        queue.run_pending(&MemoryAssetReader::new(), &ClientSideDiagramRenderer);

        assert_eq!(
            *ok.borrow(),
            "<pre class=\"mermaid\" id=\"hm-diagram-1\" data-theme=\"dark\">graph TD\nA--&gt;B\n</pre>"
        );
        assert!(bad.borrow().contains("hm-render-error"));
        assert!(bad.borrow().contains("empty diagram source"));
    }
}
