//! Markdown parsing support.
//!
//! This module turns markdown source into the element tree consumed by the
//! renderer, using pulldown-cmark for the actual parsing.

use pulldown_cmark::{Event, HeadingLevel, LinkType, Options, Parser, Tag, TagEnd};

use bypass_core::{Document, Node, Variant};

/// Parse markdown source into a Document.
///
/// Strikethrough and tables are enabled.
///
/// # Example
///
/// ```rust
/// use bypass::{parse_markdown, Bypass};
///
/// let document = parse_markdown("# Hello *World*");
///
/// let bypass = Bypass::new();
/// let styled = bypass.render(&document).unwrap();
/// assert_eq!(styled.text, "Hello World\n");
/// ```
pub fn parse_markdown(markdown: &str) -> Document {
    let parser = Parser::new_ext(markdown, parser_options());
    document_from_events(parser)
}

/// Parser options used by [`parse_markdown`]
pub fn parser_options() -> Options {
    Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES
}

/// Build a Document from a pulldown-cmark event stream
pub fn document_from_events<'a, I>(events: I) -> Document
where
    I: IntoIterator<Item = Event<'a>>,
{
    let mut builder = TreeBuilder::default();
    for event in events {
        builder.event(event);
    }
    let document = Document::from_nodes(builder.finish());
    tracing::debug!(
        roots = document.roots().len(),
        elements = document.len(),
        "parsed markdown"
    );
    document
}

/// Assembles owned nodes from start/end events
#[derive(Default)]
struct TreeBuilder {
    /// Open containers, innermost last
    stack: Vec<Node>,
    /// Finished top-level nodes
    roots: Vec<Node>,
    /// Nesting depth inside constructs whose content is dropped
    skip_depth: usize,
}

impl TreeBuilder {
    fn event(&mut self, event: Event<'_>) {
        if self.skip_depth > 0 {
            match event {
                Event::Start(_) => self.skip_depth += 1,
                Event::End(_) => self.skip_depth -= 1,
                _ => {}
            }
            return;
        }

        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.push_text(&text),
            Event::Code(code) => self.push(Node::leaf(Variant::CodeSpan, &code)),
            Event::Html(html) => self.push_html(&html),
            Event::InlineHtml(html) => self.push(Node::leaf(Variant::RawHtmlTag, &html)),
            Event::SoftBreak => self.push_text("\n"),
            Event::HardBreak => self.push(Node::new(Variant::LineBreak)),
            Event::Rule => self.push(Node::new(Variant::HRule)),
            Event::TaskListMarker(_)
            | Event::FootnoteReference(_)
            | Event::InlineMath(_)
            | Event::DisplayMath(_) => {
                // Not supported
            }
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        let node = match tag {
            Tag::Paragraph => Node::new(Variant::Paragraph),
            Tag::Heading { level, .. } => Node::header(heading_level_to_num(level)),
            Tag::BlockQuote(_) => Node::new(Variant::BlockQuote),
            Tag::CodeBlock(_) => Node::new(Variant::BlockCode),
            Tag::HtmlBlock => Node::new(Variant::BlockHtml),
            Tag::List(start) => {
                let list = Node::new(Variant::List);
                match start {
                    Some(n) => list.with_attr("start", &n.to_string()),
                    None => list,
                }
            }
            Tag::Item => Node::new(Variant::ListItem),
            Tag::Table(_) => Node::new(Variant::Table),
            Tag::TableHead | Tag::TableRow => Node::new(Variant::TableRow),
            Tag::TableCell => Node::new(Variant::TableCell),
            Tag::Emphasis => Node::new(Variant::Emphasis),
            Tag::Strong => Node::new(Variant::DoubleEmphasis),
            Tag::Strikethrough => Node::new(Variant::Strikethrough),
            Tag::Link {
                link_type: LinkType::Autolink | LinkType::Email,
                dest_url,
                ..
            } => Node::autolink(&dest_url),
            Tag::Link {
                dest_url, title, ..
            } => with_title(Node::link(&dest_url), &title),
            Tag::Image {
                dest_url, title, ..
            } => with_title(Node::new(Variant::Image).with_attr("src", &dest_url), &title),
            Tag::FootnoteDefinition(_) | Tag::MetadataBlock(_) => {
                self.skip_depth = 1;
                return;
            }
            Tag::DefinitionList
            | Tag::DefinitionListTitle
            | Tag::DefinitionListDefinition
            | Tag::Superscript
            | Tag::Subscript => Node::new(Variant::Unknown),
        };
        self.stack.push(node);
    }

    fn end_tag(&mut self, tag: TagEnd) {
        let Some(mut node) = self.stack.pop() else {
            return;
        };

        match tag {
            TagEnd::CodeBlock => {
                // The block itself ends the last line
                if let Some(last) = node.children.last_mut() {
                    strip_final_newline(&mut last.text);
                }
            }
            TagEnd::HtmlBlock => strip_final_newline(&mut node.text),
            TagEnd::Item => wrap_trailing_inlines(&mut node),
            TagEnd::Emphasis | TagEnd::Strong => collapse_triple_emphasis(&mut node),
            TagEnd::Link => {
                // An autolink shows its target instead of its content
                if node.variant == Variant::AutoLink {
                    node.children.clear();
                }
            }
            _ => {}
        }

        self.push(node);
    }

    /// Attach a finished node to the innermost open container
    fn push(&mut self, node: Node) {
        match self.stack.last_mut() {
            Some(parent) => parent.add_child(node),
            None => self.roots.push(node),
        }
    }

    /// Append text, merging with a preceding text leaf
    fn push_text(&mut self, text: &str) {
        let previous = match self.stack.last_mut() {
            Some(parent) => parent.children.last_mut(),
            None => self.roots.last_mut(),
        };

        match previous {
            Some(leaf) if leaf.variant == Variant::Text && leaf.children.is_empty() => {
                leaf.text.push_str(text);
            }
            _ => self.push(Node::text(text)),
        }
    }

    fn push_html(&mut self, html: &str) {
        match self.stack.last_mut() {
            Some(block) if block.variant == Variant::BlockHtml => block.text.push_str(html),
            _ => self.push(Node::leaf(Variant::RawHtmlTag, html)),
        }
    }

    fn finish(mut self) -> Vec<Node> {
        // Close anything left open by a truncated event stream
        while let Some(node) = self.stack.pop() {
            self.push(node);
        }
        self.roots
    }
}

/// Convert heading level enum to number (1-6).
fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn with_title(node: Node, title: &str) -> Node {
    if title.is_empty() {
        node
    } else {
        node.with_attr("title", title)
    }
}

fn strip_final_newline(text: &mut String) {
    if text.ends_with('\n') {
        text.pop();
    }
}

/// Merge `***text***` into a single triple emphasis node
fn collapse_triple_emphasis(node: &mut Node) {
    let inner = match node.variant {
        Variant::Emphasis => Variant::DoubleEmphasis,
        Variant::DoubleEmphasis => Variant::Emphasis,
        _ => return,
    };

    if let [only] = node.children.as_mut_slice() {
        if only.variant == inner {
            node.children = std::mem::take(&mut only.children);
            node.variant = Variant::TripleEmphasis;
        }
    }
}

/// Give tight list items their own line.
///
/// Inline runs directly inside an item are wrapped in a paragraph unless a
/// nested list follows them; the nested list supplies the line break then.
fn wrap_trailing_inlines(item: &mut Node) {
    let mut children = Vec::with_capacity(item.children.len());
    let mut run: Vec<Node> = Vec::new();

    for child in std::mem::take(&mut item.children) {
        if child.variant.is_block() {
            if !run.is_empty() {
                if child.variant == Variant::List {
                    children.append(&mut run);
                } else {
                    children.push(paragraph(std::mem::take(&mut run)));
                }
            }
            children.push(child);
        } else {
            run.push(child);
        }
    }

    if !run.is_empty() {
        children.push(paragraph(run));
    }

    item.children = children;
}

fn paragraph(children: Vec<Node>) -> Node {
    Node {
        children,
        ..Node::new(Variant::Paragraph)
    }
}
