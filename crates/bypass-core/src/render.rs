//! Element tree rendering
//!
//! Walks a [`Document`] in post-order, linearizing it into plain text and
//! attaching presentation attributes to the range each element produced.

use crate::ast::{Document, Element, ElementId, Variant, LEVEL, LINK};
use crate::options::StylePolicy;
use crate::runs::{Attribute, FontStyle, RunBuilder, StyledText, Typeface};
use crate::{Error, Result};

/// An element's variant with its attributes parsed into typed payloads
#[derive(Debug, Clone, Copy, PartialEq)]
enum Kind<'a> {
    Header { level: u8 },
    List,
    ListItem,
    LineBreak,
    Emphasis,
    DoubleEmphasis,
    TripleEmphasis,
    Strikethrough,
    BlockCode,
    CodeSpan,
    BlockQuote,
    Link { target: &'a str },
    AutoLink { target: &'a str },
    /// Rendered as text with no attribute
    Plain,
}

impl<'a> Kind<'a> {
    fn resolve(id: ElementId, element: &'a Element) -> Result<Self> {
        let kind = match element.variant() {
            Variant::Header => {
                let value = element
                    .attribute(LEVEL)
                    .ok_or(Error::MissingHeaderLevel { element: id })?;
                let level = value
                    .parse::<u8>()
                    .ok()
                    .filter(|l| (1..=6).contains(l))
                    .ok_or_else(|| Error::InvalidHeaderLevel {
                        element: id,
                        value: value.to_string(),
                    })?;
                Kind::Header { level }
            }
            Variant::Link => Kind::Link {
                target: link_target(id, element)?,
            },
            Variant::AutoLink => Kind::AutoLink {
                target: link_target(id, element)?,
            },
            Variant::List => Kind::List,
            Variant::ListItem => Kind::ListItem,
            Variant::LineBreak => Kind::LineBreak,
            Variant::Emphasis => Kind::Emphasis,
            Variant::DoubleEmphasis => Kind::DoubleEmphasis,
            Variant::TripleEmphasis => Kind::TripleEmphasis,
            Variant::Strikethrough => Kind::Strikethrough,
            Variant::BlockCode => Kind::BlockCode,
            Variant::CodeSpan => Kind::CodeSpan,
            Variant::BlockQuote => Kind::BlockQuote,
            Variant::Paragraph
            | Variant::BlockHtml
            | Variant::HRule
            | Variant::Table
            | Variant::TableRow
            | Variant::TableCell
            | Variant::Text
            | Variant::Image
            | Variant::RawHtmlTag => Kind::Plain,
            Variant::Unknown => {
                tracing::trace!(element = %id, "unknown variant rendered as plain text");
                Kind::Plain
            }
        };
        Ok(kind)
    }
}

fn link_target(id: ElementId, element: &Element) -> Result<&str> {
    element.attribute(LINK).ok_or(Error::MissingLink {
        element: id,
        variant: element.variant(),
    })
}

/// Render a document to styled text.
///
/// Root elements are rendered independently and concatenated in document
/// order. A malformed element aborts the whole render.
pub fn render(document: &Document, policy: &StylePolicy) -> Result<StyledText> {
    tracing::debug!(
        roots = document.roots().len(),
        elements = document.len(),
        "rendering document"
    );

    let mut out = RunBuilder::new();
    for &root in document.roots() {
        render_element(document, root, policy, &mut out).inspect_err(log_abort)?;
    }

    Ok(finish(out))
}

/// Render a document with an explicit stack instead of recursion.
///
/// Produces exactly the same output as [`render`]; stack usage no longer
/// grows with the nesting depth of the tree.
pub fn render_iterative(document: &Document, policy: &StylePolicy) -> Result<StyledText> {
    enum Frame<'a> {
        Enter(ElementId),
        Exit {
            element: &'a Element,
            kind: Kind<'a>,
            start: usize,
        },
    }

    tracing::debug!(
        roots = document.roots().len(),
        elements = document.len(),
        "rendering document iteratively"
    );

    let mut out = RunBuilder::new();
    let mut stack: Vec<Frame<'_>> = document
        .roots()
        .iter()
        .rev()
        .map(|&id| Frame::Enter(id))
        .collect();

    while let Some(frame) = stack.pop() {
        match frame {
            Frame::Enter(id) => {
                let Some(element) = document.get(id) else {
                    continue;
                };
                let (kind, start) =
                    open(document, id, element, policy, &mut out).inspect_err(log_abort)?;
                stack.push(Frame::Exit {
                    element,
                    kind,
                    start,
                });
                stack.extend(element.children().iter().rev().map(|&c| Frame::Enter(c)));
            }
            Frame::Exit {
                element,
                kind,
                start,
            } => close(document, element, kind, start, policy, &mut out),
        }
    }

    Ok(finish(out))
}

fn render_element(
    document: &Document,
    id: ElementId,
    policy: &StylePolicy,
    out: &mut RunBuilder,
) -> Result<()> {
    let Some(element) = document.get(id) else {
        return Ok(());
    };

    let (kind, start) = open(document, id, element, policy, out)?;
    for &child in element.children() {
        render_element(document, child, policy, out)?;
    }
    close(document, element, kind, start, policy, out);

    Ok(())
}

/// Emit the prefix and leaf text of an element and return where it starts
fn open<'a>(
    document: &Document,
    id: ElementId,
    element: &'a Element,
    policy: &StylePolicy,
    out: &mut RunBuilder,
) -> Result<(Kind<'a>, usize)> {
    let kind = Kind::resolve(id, element)?;
    let parent = document.parent(id);

    let prefix = match kind {
        Kind::List if parent.is_some_and(|p| p.variant() == Variant::ListItem) => "\n",
        Kind::LineBreak => "\n",
        Kind::ListItem => policy.options().list_item(),
        Kind::AutoLink { target } => target,
        _ => "",
    };

    let start = out.append(prefix);

    // Leaf text is reflowed unless it is code
    let reflow = element.is_leaf()
        && element.variant() != Variant::BlockCode
        && parent.is_some_and(|p| p.variant() != Variant::BlockCode);
    if reflow && element.text().contains('\n') {
        out.append(&element.text().replace('\n', " "));
    } else {
        out.append(element.text());
    }

    Ok((kind, start))
}

/// Terminate a block element and attach its attributes
fn close(
    document: &Document,
    element: &Element,
    kind: Kind<'_>,
    start: usize,
    policy: &StylePolicy,
    out: &mut RunBuilder,
) {
    // List items rely on their List for line breaks
    if element.is_block() && element.variant() != Variant::ListItem {
        out.append("\n");
    }

    match kind {
        Kind::Header { level } => {
            if let Some(size) = policy.options().header_size(level) {
                out.attach_from(Attribute::RelativeSize(size), start);
            }
            out.attach_from(Attribute::Style(FontStyle::Bold), start);
        }
        Kind::ListItem => {
            let nested = element
                .parent()
                .and_then(|p| document.get(p))
                .and_then(Element::parent)
                .is_some();
            if nested {
                out.attach_from(Attribute::LeadingMargin(policy.list_item_indent()), start);
            }
        }
        Kind::Emphasis => out.attach_from(Attribute::Style(FontStyle::Italic), start),
        Kind::DoubleEmphasis => out.attach_from(Attribute::Style(FontStyle::Bold), start),
        Kind::TripleEmphasis => out.attach_from(Attribute::Style(FontStyle::BoldItalic), start),
        Kind::BlockCode => {
            out.attach_from(Attribute::LeadingMargin(policy.code_block_indent()), start);
            out.attach_from(Attribute::Typeface(Typeface::Monospace), start);
        }
        Kind::CodeSpan => out.attach_from(Attribute::Typeface(Typeface::Monospace), start),
        Kind::Link { target } | Kind::AutoLink { target } => {
            out.attach_from(Attribute::Url(target.to_string()), start);
        }
        Kind::BlockQuote => {
            out.attach_from(Attribute::Quote(policy.options().block_quote_color()), start);
            out.attach_from(Attribute::LeadingMargin(policy.block_quote_indent()), start);
            out.attach_from(Attribute::Style(FontStyle::Italic), start);
        }
        Kind::Strikethrough => out.attach_from(Attribute::Strikethrough, start),
        Kind::List | Kind::LineBreak | Kind::Plain => {}
    }
}

fn finish(out: RunBuilder) -> StyledText {
    let styled = out.finish();
    tracing::debug!(
        bytes = styled.text.len(),
        spans = styled.spans.len(),
        "rendered document"
    );
    styled
}

fn log_abort(error: &Error) {
    tracing::debug!(%error, "render aborted on malformed element");
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::ast::Node;
    use crate::options::{Color, IndentUnit, RenderOptions};
    use crate::runs::Span;

    fn policy() -> StylePolicy {
        StylePolicy::default()
    }

    fn render_nodes(nodes: Vec<Node>) -> StyledText {
        render(&Document::from_nodes(nodes), &policy()).unwrap()
    }

    fn span(attribute: Attribute, range: std::ops::Range<usize>) -> Span {
        Span { attribute, range }
    }

    fn paragraph(children: Vec<Node>) -> Node {
        Node {
            children,
            ..Node::new(Variant::Paragraph)
        }
    }

    fn wrap(variant: Variant, text: &str) -> Node {
        Node::new(variant).with_child(Node::text(text))
    }

    /// Nested list: one item containing a sublist with one item
    fn nested_list() -> Node {
        Node::new(Variant::List).with_child(
            Node::new(Variant::ListItem)
                .with_child(Node::text("one"))
                .with_child(Node::new(Variant::List).with_child(wrap(Variant::ListItem, "two"))),
        )
    }

    #[test]
    fn test_header() {
        let result = render_nodes(vec![wrap(Variant::Header, "Hi").with_attr(LEVEL, "2")]);

        assert_eq!(result.text, "Hi\n");
        assert_eq!(
            result.spans,
            vec![
                span(Attribute::RelativeSize(1.4), 0..3),
                span(Attribute::Style(FontStyle::Bold), 0..3),
            ]
        );
    }

    #[test]
    fn test_header_uses_configured_size() {
        let options = RenderOptions::new()
            .with_header_sizes(&[3.0, 2.5, 2.0, 1.5, 1.25, 1.0])
            .unwrap();
        let policy = StylePolicy::new(options, &crate::options::DisplayMetrics::default());
        let doc = Document::from_nodes([Node::header(1).with_child(Node::text("Top"))]);

        let result = render(&doc, &policy).unwrap();
        assert_eq!(result.spans[0], span(Attribute::RelativeSize(3.0), 0..4));
    }

    #[test]
    fn test_paragraph_folds_newlines() {
        let result = render_nodes(vec![paragraph(vec![Node::text("a\nb")])]);
        assert_eq!(result.text, "a b\n");
        assert!(result.spans.is_empty());
    }

    #[test]
    fn test_block_code_keeps_newlines() {
        let result = render_nodes(vec![wrap(Variant::BlockCode, "a\nb")]);

        assert_eq!(result.text, "a\nb\n");
        assert_eq!(
            result.spans,
            vec![
                span(Attribute::LeadingMargin(10), 0..4),
                span(Attribute::Typeface(Typeface::Monospace), 0..4),
            ]
        );
    }

    #[test]
    fn test_nested_block_code_leaf_keeps_newlines() {
        let code = || Node::leaf(Variant::BlockCode, "a\nb");
        let cases = [
            (
                Node::new(Variant::BlockQuote).with_child(code()),
                "a\nb\n\n",
                0..4,
            ),
            (
                Node::new(Variant::List).with_child(Node::new(Variant::ListItem).with_child(code())),
                "\u{2022}a\nb\n\n",
                3..7,
            ),
        ];

        for (node, text, code_range) in cases {
            let doc = Document::from_nodes([node]);
            let result = render(&doc, &policy()).unwrap();

            assert_eq!(result.text, text);
            assert!(result
                .spans
                .contains(&span(Attribute::Typeface(Typeface::Monospace), code_range)));
            assert_eq!(render_iterative(&doc, &policy()).unwrap(), result);
        }
    }

    #[test]
    fn test_root_leaf_is_not_reflowed() {
        let result = render_nodes(vec![Node::text("a\nb")]);
        assert_eq!(result.text, "a\nb");
    }

    #[test]
    fn test_inline_styles() {
        let result = render_nodes(vec![paragraph(vec![
            wrap(Variant::Emphasis, "i"),
            wrap(Variant::DoubleEmphasis, "b"),
            wrap(Variant::TripleEmphasis, "bi"),
            wrap(Variant::Strikethrough, "s"),
            Node::leaf(Variant::CodeSpan, "c"),
        ])]);

        assert_eq!(result.text, "ibbisc\n");
        assert_eq!(
            result.spans,
            vec![
                span(Attribute::Style(FontStyle::Italic), 0..1),
                span(Attribute::Style(FontStyle::Bold), 1..2),
                span(Attribute::Style(FontStyle::BoldItalic), 2..4),
                span(Attribute::Strikethrough, 4..5),
                span(Attribute::Typeface(Typeface::Monospace), 5..6),
            ]
        );
    }

    #[test]
    fn test_link() {
        let result = render_nodes(vec![paragraph(vec![
            Node::text("see "),
            Node::link("https://example.com").with_child(Node::text("here")),
        ])]);

        assert_eq!(result.text, "see here\n");
        assert_eq!(
            result.spans,
            vec![span(Attribute::Url("https://example.com".to_string()), 4..8)]
        );
    }

    #[test]
    fn test_autolink_shows_target() {
        let result = render_nodes(vec![paragraph(vec![Node::autolink("https://example.com")])]);

        assert_eq!(result.text, "https://example.com\n");
        assert_eq!(
            result.spans,
            vec![span(Attribute::Url("https://example.com".to_string()), 0..19)]
        );
    }

    #[test]
    fn test_line_break() {
        let result = render_nodes(vec![paragraph(vec![
            Node::text("a"),
            Node::new(Variant::LineBreak),
            Node::text("b"),
        ])]);
        assert_eq!(result.text, "a\nb\n");
    }

    #[test]
    fn test_block_quote_has_three_attributes() {
        let result = render_nodes(vec![Node::new(Variant::BlockQuote)
            .with_child(paragraph(vec![Node::text("quote")]))]);

        assert_eq!(result.text, "quote\n\n");
        assert_eq!(
            result.spans,
            vec![
                span(Attribute::Quote(Color(0xff0000ff)), 0..7),
                span(Attribute::LeadingMargin(10), 0..7),
                span(Attribute::Style(FontStyle::Italic), 0..7),
            ]
        );
    }

    #[test]
    fn test_top_level_list() {
        let result = render_nodes(vec![Node::new(Variant::List)
            .with_child(wrap(Variant::ListItem, "one"))
            .with_child(wrap(Variant::ListItem, "two"))]);

        assert_eq!(result.text, "\u{2022}one\u{2022}two\n");
        assert!(result.spans.is_empty());
    }

    #[test]
    fn test_nested_list() {
        let result = render_nodes(vec![nested_list()]);

        assert_eq!(result.text, "\u{2022}one\n\u{2022}two\n\n");
        // Only the inner item is indented
        assert_eq!(result.spans, vec![span(Attribute::LeadingMargin(10), 7..13)]);
        assert_eq!(result.char_range(&result.spans[0]), 5..9);
    }

    #[test]
    fn test_custom_bullet_and_indent() {
        let options = RenderOptions::new()
            .with_list_item("- ")
            .with_list_item_indent(IndentUnit::Px, 24.0);
        let policy = StylePolicy::new(options, &crate::options::DisplayMetrics::default());

        let result = render(&Document::from_nodes([nested_list()]), &policy).unwrap();
        assert_eq!(result.text, "- one\n- two\n\n");
        assert_eq!(result.spans, vec![span(Attribute::LeadingMargin(24), 6..11)]);
    }

    #[test]
    fn test_root_list_item_has_no_indent() {
        let result = render_nodes(vec![wrap(Variant::ListItem, "lonely")]);
        assert_eq!(result.text, "\u{2022}lonely");
        assert!(result.spans.is_empty());
    }

    #[test]
    fn test_unknown_variant_is_plain_inline() {
        let result = render_nodes(vec![paragraph(vec![
            Node::leaf(Variant::Unknown, "x"),
            Node::text("y"),
        ])]);
        assert_eq!(result.text, "xy\n");
        assert!(result.spans.is_empty());
    }

    #[test]
    fn test_roots_concatenate() {
        let result = render_nodes(vec![
            Node::header(1).with_child(Node::text("Title")),
            paragraph(vec![Node::text("Body")]),
            Node::new(Variant::HRule),
        ]);
        assert_eq!(result.text, "Title\nBody\n\n");
    }

    #[test]
    fn test_missing_header_level() {
        let doc = Document::from_nodes([wrap(Variant::Header, "Hi")]);
        let err = render(&doc, &policy()).unwrap_err();
        assert!(matches!(err, Error::MissingHeaderLevel { .. }));
    }

    #[test]
    fn test_invalid_header_level() {
        for level in ["seven", "0", "7", "", " 2 "] {
            let doc = Document::from_nodes([wrap(Variant::Header, "Hi").with_attr(LEVEL, level)]);
            let err = render(&doc, &policy()).unwrap_err();
            assert!(
                matches!(err, Error::InvalidHeaderLevel { ref value, .. } if value == level),
                "level {level:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_missing_link_aborts_render() {
        let doc = Document::from_nodes([
            paragraph(vec![Node::text("fine")]),
            paragraph(vec![wrap(Variant::Link, "broken")]),
        ]);
        let err = render(&doc, &policy()).unwrap_err();
        assert!(matches!(
            err,
            Error::MissingLink {
                variant: Variant::Link,
                ..
            }
        ));

        let doc = Document::from_nodes([Node::new(Variant::AutoLink)]);
        assert!(render_iterative(&doc, &policy()).is_err());
    }

    fn kitchen_sink() -> Document {
        Document::from_nodes([
            Node::header(1).with_child(Node::text("Title")),
            paragraph(vec![
                Node::text("Some "),
                wrap(Variant::Emphasis, "soft\ntext"),
                Node::new(Variant::LineBreak),
                Node::link("https://example.com").with_child(wrap(Variant::DoubleEmphasis, "link")),
            ]),
            nested_list(),
            Node::new(Variant::BlockQuote).with_child(paragraph(vec![
                Node::text("quoted "),
                Node::leaf(Variant::CodeSpan, "code"),
            ])),
            wrap(Variant::BlockCode, "fn main() {\n}"),
        ])
    }

    #[test]
    fn test_spans_within_text() {
        let result = render(&kitchen_sink(), &policy()).unwrap();
        for s in &result.spans {
            assert!(s.range.start <= s.range.end);
            assert!(s.range.end <= result.text.len());
            assert!(result.text.is_char_boundary(s.range.start));
            assert!(result.text.is_char_boundary(s.range.end));
        }
    }

    #[test]
    fn test_render_is_idempotent() {
        let doc = kitchen_sink();
        let policy = policy();
        assert_eq!(render(&doc, &policy).unwrap(), render(&doc, &policy).unwrap());
    }

    #[test]
    fn test_iterative_matches_recursive() {
        let doc = kitchen_sink();
        let policy = policy();
        assert_eq!(
            render_iterative(&doc, &policy).unwrap(),
            render(&doc, &policy).unwrap()
        );
    }

    #[test]
    fn test_iterative_handles_deep_nesting() {
        let mut doc = Document::new();
        let mut parent = doc.push(None, Variant::Paragraph, "").unwrap();
        for _ in 0..10_000 {
            parent = doc.push(Some(parent), Variant::Emphasis, "").unwrap();
        }
        doc.push(Some(parent), Variant::Text, "deep").unwrap();

        let result = render_iterative(&doc, &policy()).unwrap();
        assert_eq!(result.text, "deep\n");
        assert_eq!(result.spans.len(), 10_000);
    }
}
