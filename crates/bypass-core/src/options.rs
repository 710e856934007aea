//! Configuration options for styling rendered markdown

use std::fmt;

use crate::{Error, Result};

/// Number of header levels (h1 through h6)
pub const HEADER_LEVELS: usize = 6;

/// Unit of an indent magnitude
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum IndentUnit {
    /// Raw device pixels
    Px,
    /// Device-independent pixels
    #[default]
    Dip,
    /// Scaled pixels (dip adjusted by the user's font scale)
    Sp,
    /// Points, 1/72 of an inch
    Pt,
    /// Inches
    In,
    /// Millimeters
    Mm,
}

/// An indent expressed as a magnitude in some unit
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Indent {
    pub unit: IndentUnit,
    pub size: f32,
}

impl Indent {
    pub const fn new(unit: IndentUnit, size: f32) -> Self {
        Self { unit, size }
    }

    /// Resolve to whole device pixels, truncating toward zero
    pub fn resolve(&self, scale: &impl UnitScale) -> i32 {
        scale.to_pixels(self.unit, self.size) as i32
    }
}

impl Default for Indent {
    fn default() -> Self {
        Self::new(IndentUnit::Dip, 10.0)
    }
}

/// A 32-bit ARGB color
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Color(pub u32);

impl Color {
    pub const fn argb(self) -> u32 {
        self.0
    }

    pub const fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub const fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn blue(self) -> u8 {
        self.0 as u8
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Color(#{:08x})", self.0)
    }
}

/// Host-supplied conversion from an indent unit to device pixels
pub trait UnitScale {
    fn to_pixels(&self, unit: IndentUnit, size: f32) -> f32;
}

impl<F> UnitScale for F
where
    F: Fn(IndentUnit, f32) -> f32,
{
    fn to_pixels(&self, unit: IndentUnit, size: f32) -> f32 {
        self(unit, size)
    }
}

/// Screen metrics used to convert indent units to pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayMetrics {
    /// Logical density: pixels per dip
    pub density: f32,
    /// Density adjusted by the user's font scale: pixels per sp
    pub scaled_density: f32,
    /// Physical pixels per inch along the x axis
    pub xdpi: f32,
}

impl Default for DisplayMetrics {
    /// Baseline 160 dpi screen where one dip is one pixel
    fn default() -> Self {
        Self {
            density: 1.0,
            scaled_density: 1.0,
            xdpi: 160.0,
        }
    }
}

impl UnitScale for DisplayMetrics {
    fn to_pixels(&self, unit: IndentUnit, size: f32) -> f32 {
        match unit {
            IndentUnit::Px => size,
            IndentUnit::Dip => size * self.density,
            IndentUnit::Sp => size * self.scaled_density,
            IndentUnit::Pt => size * self.xdpi / 72.0,
            IndentUnit::In => size * self.xdpi,
            IndentUnit::Mm => size * self.xdpi / 25.4,
        }
    }
}

/// Options controlling which presentation attributes and layout text
/// each element receives
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RenderOptions {
    header_sizes: [f32; HEADER_LEVELS],
    list_item: String,
    list_item_indent: Indent,
    block_quote_color: Color,
    block_quote_indent: Indent,
    code_block_indent: Indent,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            header_sizes: [
                1.5, // h1
                1.4, // h2
                1.3, // h3
                1.2, // h4
                1.1, // h5
                1.0, // h6
            ],
            list_item: "\u{2022}".to_string(),
            list_item_indent: Indent::default(),
            block_quote_color: Color(0xff00_00ff),
            block_quote_indent: Indent::default(),
            code_block_indent: Indent::default(),
        }
    }
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the relative size multipliers for h1 through h6.
    ///
    /// Exactly six values are required.
    pub fn with_header_sizes(mut self, sizes: &[f32]) -> Result<Self> {
        self.header_sizes = sizes
            .try_into()
            .map_err(|_| Error::HeaderSizes { found: sizes.len() })?;
        Ok(self)
    }

    /// Set the text inserted before every list item (may be empty)
    pub fn with_list_item(mut self, bullet: impl Into<String>) -> Self {
        self.list_item = bullet.into();
        self
    }

    pub fn with_list_item_indent(mut self, unit: IndentUnit, size: f32) -> Self {
        self.list_item_indent = Indent::new(unit, size);
        self
    }

    pub fn with_block_quote_color(mut self, color: Color) -> Self {
        self.block_quote_color = color;
        self
    }

    pub fn with_block_quote_indent(mut self, unit: IndentUnit, size: f32) -> Self {
        self.block_quote_indent = Indent::new(unit, size);
        self
    }

    pub fn with_code_block_indent(mut self, unit: IndentUnit, size: f32) -> Self {
        self.code_block_indent = Indent::new(unit, size);
        self
    }

    pub fn header_sizes(&self) -> &[f32; HEADER_LEVELS] {
        &self.header_sizes
    }

    /// Size multiplier for a header level in `1..=6`
    pub fn header_size(&self, level: u8) -> Option<f32> {
        let index = usize::from(level).checked_sub(1)?;
        self.header_sizes.get(index).copied()
    }

    pub fn list_item(&self) -> &str {
        &self.list_item
    }

    pub fn list_item_indent(&self) -> Indent {
        self.list_item_indent
    }

    pub fn block_quote_color(&self) -> Color {
        self.block_quote_color
    }

    pub fn block_quote_indent(&self) -> Indent {
        self.block_quote_indent
    }

    pub fn code_block_indent(&self) -> Indent {
        self.code_block_indent
    }
}

/// Render options with every indent resolved to device pixels.
///
/// Built once per host configuration and shared read-only by any number of
/// render calls.
#[derive(Debug, Clone, PartialEq)]
pub struct StylePolicy {
    options: RenderOptions,
    list_item_indent: i32,
    block_quote_indent: i32,
    code_block_indent: i32,
}

impl StylePolicy {
    /// Resolve `options` with the host's unit conversion
    pub fn new(options: RenderOptions, scale: &impl UnitScale) -> Self {
        Self {
            list_item_indent: options.list_item_indent.resolve(scale),
            block_quote_indent: options.block_quote_indent.resolve(scale),
            code_block_indent: options.code_block_indent.resolve(scale),
            options,
        }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn list_item_indent(&self) -> i32 {
        self.list_item_indent
    }

    pub fn block_quote_indent(&self) -> i32 {
        self.block_quote_indent
    }

    pub fn code_block_indent(&self) -> i32 {
        self.code_block_indent
    }
}

impl Default for StylePolicy {
    fn default() -> Self {
        Self::new(RenderOptions::default(), &DisplayMetrics::default())
    }
}
