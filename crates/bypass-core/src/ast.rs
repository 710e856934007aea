//! Markdown element tree
//!
//! This module defines the parse tree consumed by the renderer. Elements live
//! in a flat arena owned by [`Document`] and refer to each other by
//! [`ElementId`], so the parent link is a plain index rather than a reference.

use std::fmt;

use indexmap::IndexMap;

use crate::{Error, Result};

/// Attribute key holding a header level (`"1"` through `"6"`)
pub const LEVEL: &str = "level";

/// Attribute key holding a link target
pub const LINK: &str = "link";

/// Syntactic kind of an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    // Block variants
    Paragraph,
    Header,
    BlockCode,
    BlockQuote,
    BlockHtml,
    HRule,
    List,
    ListItem,
    Table,
    TableRow,
    TableCell,

    // Inline variants
    /// Plain text leaf
    Text,
    Emphasis,
    DoubleEmphasis,
    TripleEmphasis,
    Strikethrough,
    CodeSpan,
    Link,
    AutoLink,
    Image,
    LineBreak,
    RawHtmlTag,

    /// A kind this crate does not know about; rendered as unstyled inline text
    Unknown,
}

impl Variant {
    /// Map a parser tag name to a variant.
    ///
    /// Matching is case-insensitive and accepts both `snake_case` and
    /// `SCREAMING_SNAKE_CASE` spellings. Unrecognized names map to
    /// [`Variant::Unknown`].
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "paragraph" => Variant::Paragraph,
            "header" | "heading" => Variant::Header,
            "block_code" => Variant::BlockCode,
            "block_quote" => Variant::BlockQuote,
            "block_html" => Variant::BlockHtml,
            "hrule" => Variant::HRule,
            "list" => Variant::List,
            "list_item" => Variant::ListItem,
            "table" => Variant::Table,
            "table_row" => Variant::TableRow,
            "table_cell" => Variant::TableCell,
            "text" | "plain_text" => Variant::Text,
            "emphasis" => Variant::Emphasis,
            "double_emphasis" => Variant::DoubleEmphasis,
            "triple_emphasis" => Variant::TripleEmphasis,
            "strikethrough" => Variant::Strikethrough,
            "code_span" => Variant::CodeSpan,
            "link" => Variant::Link,
            "autolink" => Variant::AutoLink,
            "image" => Variant::Image,
            "linebreak" | "line_break" => Variant::LineBreak,
            "raw_html_tag" => Variant::RawHtmlTag,
            _ => Variant::Unknown,
        }
    }

    /// Block elements occupy their own line in the rendered output
    pub fn is_block(self) -> bool {
        matches!(
            self,
            Variant::Paragraph
                | Variant::Header
                | Variant::BlockCode
                | Variant::BlockQuote
                | Variant::BlockHtml
                | Variant::HRule
                | Variant::List
                | Variant::ListItem
                | Variant::Table
                | Variant::TableRow
                | Variant::TableCell
        )
    }

    /// Stable lowercase name, the inverse of [`Variant::from_name`]
    pub fn name(self) -> &'static str {
        match self {
            Variant::Paragraph => "paragraph",
            Variant::Header => "header",
            Variant::BlockCode => "block_code",
            Variant::BlockQuote => "block_quote",
            Variant::BlockHtml => "block_html",
            Variant::HRule => "hrule",
            Variant::List => "list",
            Variant::ListItem => "list_item",
            Variant::Table => "table",
            Variant::TableRow => "table_row",
            Variant::TableCell => "table_cell",
            Variant::Text => "text",
            Variant::Emphasis => "emphasis",
            Variant::DoubleEmphasis => "double_emphasis",
            Variant::TripleEmphasis => "triple_emphasis",
            Variant::Strikethrough => "strikethrough",
            Variant::CodeSpan => "code_span",
            Variant::Link => "link",
            Variant::AutoLink => "autolink",
            Variant::Image => "image",
            Variant::LineBreak => "linebreak",
            Variant::RawHtmlTag => "raw_html_tag",
            Variant::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Index of an element inside its [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(usize);

impl ElementId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A node of the parse tree.
///
/// Leaves carry `text`, containers carry `children`.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    variant: Variant,
    attributes: IndexMap<String, String>,
    text: String,
    children: Vec<ElementId>,
    parent: Option<ElementId>,
}

impl Element {
    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Get an attribute value by key
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// All attributes in insertion order
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_block(&self) -> bool {
        self.variant.is_block()
    }
}

/// The parse tree root: an arena of elements plus the top-level elements in
/// document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    elements: Vec<Element>,
    roots: Vec<ElementId>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flatten owned node trees into a document, one root per node
    pub fn from_nodes(nodes: impl IntoIterator<Item = Node>) -> Self {
        let mut document = Self::new();
        for node in nodes {
            document.insert_node(None, node);
        }
        document
    }

    /// Append an element under `parent` (or as a new root) and return its id.
    ///
    /// Fails with [`Error::UnknownElement`] if `parent` does not belong to
    /// this document.
    pub fn push(
        &mut self,
        parent: Option<ElementId>,
        variant: Variant,
        text: impl Into<String>,
    ) -> Result<ElementId> {
        self.check_parent(parent)?;
        Ok(self.push_element(parent, variant, text.into(), IndexMap::new()))
    }

    /// Insert an owned node tree under `parent` and return the id of its root
    pub fn insert(&mut self, parent: Option<ElementId>, node: Node) -> Result<ElementId> {
        self.check_parent(parent)?;
        Ok(self.insert_node(parent, node))
    }

    fn check_parent(&self, parent: Option<ElementId>) -> Result<()> {
        match parent {
            Some(id) if id.0 >= self.elements.len() => Err(Error::UnknownElement { element: id }),
            _ => Ok(()),
        }
    }

    /// `parent` must already be checked
    fn push_element(
        &mut self,
        parent: Option<ElementId>,
        variant: Variant,
        text: String,
        attributes: IndexMap<String, String>,
    ) -> ElementId {
        let id = ElementId(self.elements.len());
        self.elements.push(Element {
            variant,
            attributes,
            text,
            children: Vec::new(),
            parent,
        });

        match parent.and_then(|p| self.elements.get_mut(p.0)) {
            Some(parent) => parent.children.push(id),
            None => self.roots.push(id),
        }

        id
    }

    fn insert_node(&mut self, parent: Option<ElementId>, node: Node) -> ElementId {
        let Node {
            variant,
            attributes,
            text,
            children,
        } = node;

        let id = self.push_element(parent, variant, text, attributes);
        for child in children {
            self.insert_node(Some(id), child);
        }
        id
    }

    /// Top-level elements in document order
    pub fn roots(&self) -> &[ElementId] {
        &self.roots
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id.0)
    }

    /// Parent element of `id`, if any
    pub fn parent(&self, id: ElementId) -> Option<&Element> {
        self.get(id)?.parent.and_then(|p| self.get(p))
    }

    /// Child elements of `id` in rendering order
    pub fn children(&self, id: ElementId) -> impl Iterator<Item = &Element> {
        self.get(id)
            .map(|e| e.children.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|c| self.get(*c))
    }

    /// Number of ancestors above `id` (roots have depth 0)
    pub fn depth(&self, id: ElementId) -> usize {
        let mut depth = 0;
        let mut current = self.get(id).and_then(Element::parent);
        while let Some(p) = current {
            depth += 1;
            current = self.get(p).and_then(Element::parent);
        }
        depth
    }

    /// Total number of elements
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// An owned element tree used to assemble documents.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub variant: Variant,
    pub attributes: IndexMap<String, String>,
    pub text: String,
    pub children: Vec<Node>,
}

impl Node {
    /// Create a new container node
    pub fn new(variant: Variant) -> Self {
        Self {
            variant,
            attributes: IndexMap::new(),
            text: String::new(),
            children: Vec::new(),
        }
    }

    /// Create a plain text leaf
    pub fn text(content: &str) -> Self {
        Self::leaf(Variant::Text, content)
    }

    /// Create a leaf node of any variant
    pub fn leaf(variant: Variant, content: &str) -> Self {
        Self {
            text: content.to_string(),
            ..Self::new(variant)
        }
    }

    /// Create a header node with the given level
    pub fn header(level: u8) -> Self {
        Self::new(Variant::Header).with_attr(LEVEL, &level.to_string())
    }

    /// Create a link node pointing at `target`
    pub fn link(target: &str) -> Self {
        Self::new(Variant::Link).with_attr(LINK, target)
    }

    /// Create an autolink node; its visible text is the target itself
    pub fn autolink(target: &str) -> Self {
        Self::new(Variant::AutoLink).with_attr(LINK, target)
    }

    /// Set an attribute, replacing any previous value
    pub fn with_attr(mut self, key: &str, value: &str) -> Self {
        self.attributes.insert(key.to_string(), value.to_string());
        self
    }

    /// Append a child and return self
    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Add a child node
    pub fn add_child(&mut self, child: Node) {
        self.children.push(child);
    }

    /// Concatenated text of this node and its descendants
    pub fn text_content(&self) -> String {
        let mut out = self.text.clone();
        for child in &self.children {
            out.push_str(&child.text_content());
        }
        out
    }
}
