//! bypass-core - markdown element tree to styled text runs
//!
//! This crate turns an already-parsed markdown tree into one contiguous
//! string plus a list of presentation attributes (bold, indent, hyperlink,
//! ...) attached to byte ranges of that string. Any rich-text surface can
//! paint the result. The `bypass` crate wraps it with a markdown parser.
//!
//! # Architecture
//!
//! ```text
//!                 ┌──────────────┐
//! Document ──────▶│ Tree render  │──▶ RunBuilder ──▶ StyledText
//!                 └──────────────┘
//!                        ▲
//!                   StylePolicy
//!        (RenderOptions + resolved indents)
//! ```
//!
//! # Example
//!
//! ```rust
//! use bypass_core::{render, Attribute, Document, FontStyle, Node, StylePolicy, Variant};
//!
//! let document = Document::from_nodes([
//!     Node::header(2).with_child(Node::text("Hi")),
//!     Node::new(Variant::Paragraph)
//!         .with_child(Node::text("This is "))
//!         .with_child(Node::new(Variant::DoubleEmphasis).with_child(Node::text("bold"))),
//! ]);
//!
//! let styled = render(&document, &StylePolicy::default()).unwrap();
//! assert_eq!(styled.text, "Hi\nThis is bold\n");
//! assert!(styled
//!     .attributes_at(11)
//!     .any(|a| *a == Attribute::Style(FontStyle::Bold)));
//! ```

mod ast;
mod options;
mod render;
mod runs;

pub use ast::{Document, Element, ElementId, Node, Variant, LEVEL, LINK};
pub use options::{
    Color, DisplayMetrics, Indent, IndentUnit, RenderOptions, StylePolicy, UnitScale,
    HEADER_LEVELS,
};
pub use render::{render, render_iterative};
pub use runs::{Attribute, FontStyle, RunBuilder, Span, StyledText, Typeface};

/// Error type for configuration and rendering
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("header sizes must have 6 elements (h1 through h6), got {found}")]
    HeaderSizes { found: usize },

    #[error("header {element} has no level attribute")]
    MissingHeaderLevel { element: ElementId },

    #[error("header {element} has invalid level {value:?}")]
    InvalidHeaderLevel { element: ElementId, value: String },

    #[error("{variant} {element} has no link attribute")]
    MissingLink { element: ElementId, variant: Variant },

    #[error("element {element} does not belong to this document")]
    UnknownElement { element: ElementId },
}

pub type Result<T> = std::result::Result<T, Error>;
