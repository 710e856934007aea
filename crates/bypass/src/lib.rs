//! # bypass
//!
//! Convert markdown into styled text runs.
//!
//! The output is one contiguous string plus presentation attributes (relative
//! size, bold, indent, hyperlink, quote bar, ...) attached to byte ranges of
//! it, ready to be painted by any rich-text surface.
//!
//! ## Design
//!
//! Parsing and styling are separate steps:
//!
//! - **Parser agnostic**: any parser can build a [`Document`] and hand it to
//!   [`Bypass::render`]
//! - **Bundled parser**: with the default `markdown` feature, pulldown-cmark
//!   turns source text into a Document for [`Bypass::markdown_to_styled`]
//! - **Host units**: indents are given in dip, sp, pt, ... and resolved once
//!   with the host's [`UnitScale`]
//!
//! ## Example (Document-based)
//!
//! ```rust
//! use bypass::{Bypass, Document, Node, Variant};
//!
//! let document = Document::from_nodes([
//!     Node::new(Variant::Paragraph).with_child(Node::text("Hello World")),
//! ]);
//!
//! let styled = Bypass::new().render(&document).unwrap();
//! assert_eq!(styled.text, "Hello World\n");
//! ```
//!
//! ## Example (markdown string)
//!
//! ```rust
//! use bypass::{Attribute, Bypass, FontStyle};
//!
//! let styled = Bypass::new().markdown_to_styled("**Hello** World").unwrap();
//! assert_eq!(styled.text, "Hello World\n");
//! assert_eq!(styled.spans[0].attribute, Attribute::Style(FontStyle::Bold));
//! assert_eq!(styled.spans[0].range, 0..5);
//! ```

#[cfg(feature = "markdown")]
pub mod markdown;
mod service;

#[cfg(feature = "markdown")]
pub use markdown::parse_markdown;
pub use service::Bypass;

pub use bypass_core::{
    Attribute, Color, DisplayMetrics, Document, Element, ElementId, Error, FontStyle, Indent,
    IndentUnit, Node, RenderOptions, Result, Span, StylePolicy, StyledText, Typeface, UnitScale,
    Variant,
};
