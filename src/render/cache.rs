//! View reuse across recomputations
//!
//! Every recompute produces a fresh decoration list. Widgets compare by
//! value, so a replaced range whose widget did not change keeps its view
//! (and any pending image or diagram result) instead of being rebuilt.

use log::debug;

use super::{RenderContext, WidgetRenderer};
use crate::decoration::Decoration;
use crate::widgets::Widget;

/// Outcome of one reconcile pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    pub reused: usize,
    pub rendered: usize,
    pub dropped: usize,
}

/// Views of the previous pass keyed by widget value.
pub struct ViewCache<V> {
    entries: Vec<(Widget, V)>,
}

impl<V> Default for ViewCache<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<V: Clone> ViewCache<V> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Produce one view per `Replace` decoration, in order, reusing views
    /// whose widget is equal to one from the previous pass. Views not
    /// reused are dropped.
    pub fn reconcile<R: WidgetRenderer<View = V>>(
        &mut self,
        decorations: &[Decoration],
        renderer: &R,
        ctx: &mut RenderContext,
    ) -> (Vec<V>, ReconcileStats) {
        let mut previous: Vec<Option<(Widget, V)>> =
            std::mem::take(&mut self.entries).into_iter().map(Some).collect();
        let mut stats = ReconcileStats::default();
        let mut views = Vec::new();

        for widget in decorations.iter().filter_map(Decoration::widget) {
            let hit = previous
                .iter_mut()
                .find(|slot| matches!(slot, Some((cached, _)) if cached == widget))
                .and_then(Option::take);
            let view = match hit {
                Some((_, view)) => {
                    stats.reused += 1;
                    view
                }
                None => {
                    stats.rendered += 1;
                    renderer.render_or_placeholder(widget, ctx)
                }
            };
            self.entries.push((widget.clone(), view.clone()));
            views.push(view);
        }

        stats.dropped = previous.iter().filter(|slot| slot.is_some()).count();
        debug!(
            "View cache: {} reused, {} rendered, {} dropped",
            stats.reused, stats.rendered, stats.dropped
        );
        (views, stats)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{HtmlRenderer, HtmlView};
    use crate::widgets::{CodeWidget, DiagramWidget};

    fn code(from: usize, source: &str) -> Decoration {
        Decoration::replace(from, from + 5, Widget::CodeBlock(CodeWidget::new("", source)))
    }

    #[test]
    fn test_unchanged_widgets_keep_views() {
        let mut cache: ViewCache<HtmlView> = ViewCache::default();
        let mut ctx = RenderContext::new(false);
        let first = vec![code(0, "a"), code(10, "b")];
        let (views, stats) = cache.reconcile(&first, &HtmlRenderer, &mut ctx);
        assert_eq!(stats.rendered, 2);

        // Text inserted above shifts offsets, widget values stay equal
        let second = vec![code(3, "a"), code(13, "changed")];
        let (next, stats) = cache.reconcile(&second, &HtmlRenderer, &mut ctx);
        assert_eq!(
            stats,
            ReconcileStats {
                reused: 1,
                rendered: 1,
                dropped: 1
            }
        );
        assert!(next[0].same_view(&views[0]));
        assert!(!next[1].same_view(&views[1]));
    }

    #[test]
    fn test_dropped_view_cancels_pending_task() {
        let mut cache: ViewCache<HtmlView> = ViewCache::default();
        let mut ctx = RenderContext::new(false);
        let diagram = Decoration::replace(
            0,
            20,
            Widget::Diagram(DiagramWidget::new("mermaid", "graph TD\n")),
        );
        let (views, _) = cache.reconcile(&[diagram], &HtmlRenderer, &mut ctx);
        drop(views);
        cache.reconcile(&[], &HtmlRenderer, &mut ctx);
        assert!(cache.is_empty());

        let delivered = ctx.tasks.run_pending(
            &crate::assets::MemoryAssetReader::new(),
            &crate::render::ClientSideDiagramRenderer,
        );
        assert_eq!(delivered, 0);
    }

    #[test]
    fn test_duplicate_widgets_each_get_a_view() {
        let mut cache: ViewCache<HtmlView> = ViewCache::default();
        let mut ctx = RenderContext::new(false);
        let (views, _) = cache.reconcile(&[code(0, "x"), code(10, "x")], &HtmlRenderer, &mut ctx);
        assert!(!views[0].same_view(&views[1]));
        let (next, stats) =
            cache.reconcile(&[code(0, "x"), code(10, "x")], &HtmlRenderer, &mut ctx);
        assert_eq!(stats.reused, 2);
        assert!(next[0].same_view(&views[0]));
        assert!(next[1].same_view(&views[1]));
    }
}
