//! Hybrid decorations
//!
//! A decoration pass turns the current document revision into a flat list of
//! instructions for the view layer: ranges to hide, ranges to replace with a
//! widget, and whole-line annotations. The list is plain data so that the
//! presentation layer can diff successive passes by value.

mod compute;
mod scope;

pub use compute::{compute_decorations, compute_with_prepass};
pub use scope::EditScope;

use std::collections::BTreeMap;

use log::{debug, warn};

use crate::widgets::Widget;

/// One visual instruction for a single render pass.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoration {
    /// Render nothing for `[from, to)`.
    Hide { from: usize, to: usize },
    /// Render `widget` instead of `[from, to)`.
    Replace {
        from: usize,
        to: usize,
        widget: Widget,
    },
    /// Annotate the line starting at `line_start` without replacing text.
    LineMark {
        line_start: usize,
        class_name: String,
        attributes: BTreeMap<String, String>,
    },
}

impl Decoration {
    pub fn hide(from: usize, to: usize) -> Self {
        Decoration::Hide { from, to }
    }

    pub fn replace(from: usize, to: usize, widget: Widget) -> Self {
        Decoration::Replace { from, to, widget }
    }

    pub fn line_mark(line_start: usize, class_name: impl Into<String>) -> Self {
        Decoration::LineMark {
            line_start,
            class_name: class_name.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Add an attribute to a line mark. No-op for other variants.
    pub fn with_attribute(mut self, key: &str, value: impl Into<String>) -> Self {
        if let Decoration::LineMark { attributes, .. } = &mut self {
            attributes.insert(key.to_string(), value.into());
        }
        self
    }

    /// Start offset; a line mark starts at its line.
    pub fn from(&self) -> usize {
        match self {
            Decoration::Hide { from, .. } | Decoration::Replace { from, .. } => *from,
            Decoration::LineMark { line_start, .. } => *line_start,
        }
    }

    /// End offset; a line mark is zero-width.
    pub fn to(&self) -> usize {
        match self {
            Decoration::Hide { to, .. } | Decoration::Replace { to, .. } => *to,
            Decoration::LineMark { line_start, .. } => *line_start,
        }
    }

    /// Hide and Replace claim their range; line marks do not.
    pub fn is_range(&self) -> bool {
        !matches!(self, Decoration::LineMark { .. })
    }

    pub fn widget(&self) -> Option<&Widget> {
        match self {
            Decoration::Replace { widget, .. } => Some(widget),
            _ => None,
        }
    }

    /// Short name used in logging: the widget name for replacements.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Decoration::Hide { .. } => "hide",
            Decoration::Replace { widget, .. } => widget.name(),
            Decoration::LineMark { .. } => "line-mark",
        }
    }
}

/// Sort by start (line marks first at equal offsets) and drop any range that
/// overlaps one already kept.
pub fn finalize(decorations: Vec<Decoration>) -> Vec<Decoration> {
    let (kept, dropped) = finalize_counting(decorations);
    if !dropped.is_empty() {
        for (kind, count) in &dropped {
            debug!("Dropped {} '{}' range(s) over claimed or empty spans", count, kind);
        }
        warn!(
            "Dropped {} overlapping or empty decoration range(s)",
            dropped.values().sum::<usize>()
        );
    }
    kept
}

/// [`finalize`] plus the number of dropped ranges per decoration kind.
fn finalize_counting(
    mut decorations: Vec<Decoration>,
) -> (Vec<Decoration>, BTreeMap<&'static str, usize>) {
    decorations.sort_by_key(|d| (d.from(), d.is_range(), d.to()));

    let mut kept = Vec::with_capacity(decorations.len());
    let mut claimed_to = 0usize;
    let mut dropped: BTreeMap<&'static str, usize> = BTreeMap::new();

    for decoration in decorations {
        if decoration.is_range() {
            if decoration.from() < claimed_to || decoration.to() <= decoration.from() {
                debug!(
                    "Decoration '{}' at {}..{} dropped (claimed up to {})",
                    decoration.kind_name(),
                    decoration.from(),
                    decoration.to(),
                    claimed_to
                );
                *dropped.entry(decoration.kind_name()).or_insert(0) += 1;
                continue;
            }
            claimed_to = decoration.to();
        }
        kept.push(decoration);
    }
    (kept, dropped)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
