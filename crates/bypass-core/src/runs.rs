//! Styled text runs
//!
//! [`RunBuilder`] accumulates the linear text of a render pass and the
//! presentation attributes attached to ranges of it. Ranges may overlap and
//! nest freely; a consumer applies every attribute whose range covers a
//! character.

use std::ops::Range;

use crate::options::Color;

/// Font style of a range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FontStyle {
    Bold,
    Italic,
    BoldItalic,
}

/// Typeface family of a range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Typeface {
    Monospace,
}

impl Typeface {
    pub fn family(self) -> &'static str {
        match self {
            Typeface::Monospace => "monospace",
        }
    }
}

/// A presentation directive attached to a range of rendered text
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Attribute {
    /// Text size relative to the surface's base size
    RelativeSize(f32),
    Style(FontStyle),
    /// Indent every line of the range by this many device pixels
    LeadingMargin(i32),
    Typeface(Typeface),
    /// Hyperlink target
    Url(String),
    /// Quote bar drawn beside the range
    Quote(Color),
    Strikethrough,
}

/// An attribute and the half-open byte range of the text it covers
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    pub attribute: Attribute,
    pub range: Range<usize>,
}

/// The output of a render: linear text plus every attached attribute
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StyledText {
    pub text: String,
    /// Spans in the order they were attached
    pub spans: Vec<Span>,
}

impl StyledText {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Text covered by a span
    pub fn slice(&self, span: &Span) -> &str {
        self.text.get(span.range.clone()).unwrap_or_default()
    }

    /// Every attribute whose range covers the byte at `offset`
    pub fn attributes_at(&self, offset: usize) -> impl Iterator<Item = &Attribute> {
        self.spans
            .iter()
            .filter(move |s| s.range.contains(&offset))
            .map(|s| &s.attribute)
    }

    /// Convert a span's byte range into a range of Unicode scalar values
    pub fn char_range(&self, span: &Span) -> Range<usize> {
        let to_chars = |byte: usize| {
            self.text
                .get(..byte)
                .map_or_else(|| self.text.chars().count(), |s| s.chars().count())
        };
        to_chars(span.range.start)..to_chars(span.range.end)
    }
}

/// Accumulates text and attribute ranges for a single render pass
#[derive(Debug, Default)]
pub struct RunBuilder {
    text: String,
    spans: Vec<Span>,
}

impl RunBuilder {
    pub fn new() -> Self {
        Self {
            text: String::with_capacity(1024),
            spans: Vec::new(),
        }
    }

    /// Append text and return the offset where it starts
    pub fn append(&mut self, text: &str) -> usize {
        let start = self.text.len();
        self.text.push_str(text);
        start
    }

    /// Current length of the buffer in bytes
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Record that `attribute` applies to `start..end` of the buffer
    pub fn attach(&mut self, attribute: Attribute, start: usize, end: usize) {
        debug_assert!(start <= end && end <= self.text.len());
        self.spans.push(Span {
            attribute,
            range: start..end,
        });
    }

    /// Attach `attribute` to everything appended since `start`
    pub fn attach_from(&mut self, attribute: Attribute, start: usize) {
        let end = self.text.len();
        self.attach(attribute, start, end);
    }

    pub fn finish(self) -> StyledText {
        StyledText {
            text: self.text,
            spans: self.spans,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_returns_start() {
        let mut builder = RunBuilder::new();
        assert_eq!(builder.append("Hello"), 0);
        assert_eq!(builder.append(", "), 5);
        assert_eq!(builder.append("World"), 7);
        assert_eq!(builder.len(), 12);
    }

    #[test]
    fn test_overlapping_spans_are_kept() {
        let mut builder = RunBuilder::new();
        let start = builder.append("Title\n");
        builder.attach_from(Attribute::RelativeSize(1.5), start);
        builder.attach_from(Attribute::Style(FontStyle::Bold), start);
        builder.attach(Attribute::Style(FontStyle::Italic), 0, 3);

        let styled = builder.finish();
        assert_eq!(styled.text, "Title\n");
        assert_eq!(styled.spans.len(), 3);
        assert_eq!(styled.attributes_at(1).count(), 3);
        assert_eq!(styled.attributes_at(4).count(), 2);
        assert_eq!(styled.spans[0].range, 0..6);
    }

    #[test]
    fn test_char_range() {
        let mut builder = RunBuilder::new();
        builder.append("\u{2022}");
        let start = builder.append("item");
        builder.attach_from(Attribute::Style(FontStyle::Bold), start);

        let styled = builder.finish();
        let span = &styled.spans[0];
        assert_eq!(span.range, 3..7);
        assert_eq!(styled.char_range(span), 1..5);
        assert_eq!(styled.slice(span), "item");
    }

    #[test]
    fn test_empty_builder() {
        let styled = RunBuilder::new().finish();
        assert!(styled.is_empty());
        assert!(styled.spans.is_empty());
    }
}
