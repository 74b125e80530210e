//! hybridmark - hybrid Markdown editing engine
//!
//! Renders Markdown inline while the document stays plain text: every
//! recompute parses the text with comrak, walks the syntax tree and produces
//! a sorted list of decorations (hidden marks, widget replacements, line
//! classes). The line being edited is left raw so its syntax can be changed
//! directly.
//!
//! ```ignore
//! use hybridmark::config::EditorConfig;
//! use hybridmark::editor::HybridEditor;
//!
//! let editor = HybridEditor::new("# Title\n\n- [ ] task", EditorConfig::default());
//! for decoration in editor.decorations() {
//!     println!("{:?}", decoration);
//! }
//! ```

pub mod assets;
pub mod config;
pub mod decoration;
pub mod editor;
pub mod error;
pub mod markdown;
pub mod render;
pub mod text;
pub mod theme;
pub mod widgets;

pub use config::EditorConfig;
pub use decoration::{compute_decorations, Decoration};
pub use editor::{EditorCommand, EditorEvent, HybridEditor, Selection};
pub use error::{Error, Result};
pub use widgets::Widget;
