//! Markdown parsing and structural analysis
//!
//! This module wraps the comrak library (a CommonMark + GFM compatible
//! parser) into a byte-offset syntax tree, and adds the pieces the decoration
//! engine needs on top of it: the pipe-table model, the structural pre-pass
//! that finds code/table spans and raw HTML regions, the HTML sanitizer and
//! regex-based code coloring.
//!
//! # Example
//! ```ignore
//! use crate::markdown::parser::SyntaxTree;
//! use crate::markdown::prepass::StructuralPrepass;
//!
//! let text = "# Hello\n\nThis is **bold** text.";
//! let tree = SyntaxTree::parse(text);
//! let prepass = StructuralPrepass::run(text, &tree);
//! ```

pub mod parser;
pub mod prepass;
pub mod sanitize;
pub mod syntax;
pub mod table;

pub use parser::{render_fragment_html, MarkdownOptions, NodeKind, SyntaxNode, SyntaxTree};
pub use table::{apply_table_operation, parse_table, table_template, TableData, TableOperation};
