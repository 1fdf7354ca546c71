use std::fmt;
use std::io::Write;
use std::str::FromStr;

use serde::Serialize;

use super::appearance::Transformation;
use crate::prelude::{ParseResult, ValueError, WriteResult, XmlEntity};
use crate::telemetry::{Diagnostics, Site};
use crate::xml::scalar::{format_bool, format_float, parse_bool, parse_float};
use crate::xml::{Attr, ElementStart, MetadataWriter, Parsed, Tag, XmlCursor};

const DISPLAY_TEXT_READ: Site = Site::new("DisplayText", "read");

/// 32-bit ARGB overlay color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DisplayColor {
    pub a: u8,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl DisplayColor {
    pub fn new(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self { a, r, g, b }
    }

    /// Fully opaque color.
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(0xFF, r, g, b)
    }

    pub fn from_argb(argb: u32) -> Self {
        let [a, r, g, b] = argb.to_be_bytes();
        Self { a, r, g, b }
    }

    pub fn to_argb(self) -> u32 {
        u32::from_be_bytes([self.a, self.r, self.g, self.b])
    }

    /// Strict parse of a wire literal; a malformed literal means "no color".
    pub(crate) fn parse_or_warn(text: &str, diagnostics: &Diagnostics, site: Site) -> Option<Self> {
        match text.parse() {
            Ok(color) => Some(color),
            Err(err) => {
                diagnostics.report(site, false, || "ignoring color".to_string(), Some(&err));
                None
            }
        }
    }
}

impl FromStr for DisplayColor {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix('#')
            .filter(|digits| digits.len() == 8 && digits.bytes().all(|b| b.is_ascii_hexdigit()))
            .ok_or_else(|| ValueError::InvalidColor(s.to_string()))?;
        u32::from_str_radix(digits, 16)
            .map(Self::from_argb)
            .map_err(|_| ValueError::InvalidColor(s.to_string()))
    }
}

impl fmt::Display for DisplayColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:08X}", self.to_argb())
    }
}

/// Caption overlaid on the video next to an object.
///
/// An empty `value` and no `value` are the same caption: both are written as
/// an element without text, and equality treats them alike.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DisplayText {
    pub center_x: Option<f64>,
    pub center_y: Option<f64>,
    pub bold: bool,
    pub italic: bool,
    pub font_family: Option<String>,
    pub size: Option<f64>,
    pub color: Option<DisplayColor>,
    pub value: Option<String>,
}

impl DisplayText {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            ..Default::default()
        }
    }

    /// The caption text, if it has any.
    pub fn caption(&self) -> Option<&str> {
        self.value.as_deref().filter(|value| !value.is_empty())
    }

    /// Scales, then translates, the center point. Unset coordinates stay unset.
    pub fn apply(&mut self, transformation: &Transformation) {
        if let Some(scale) = transformation.scale {
            self.center_x = self.center_x.map(|x| x * scale.x);
            self.center_y = self.center_y.map(|y| y * scale.y);
        }
        if let Some(translate) = transformation.translate {
            self.center_x = self.center_x.map(|x| x + translate.x);
            self.center_y = self.center_y.map(|y| y + translate.y);
        }
    }
}

impl PartialEq for DisplayText {
    fn eq(&self, other: &Self) -> bool {
        self.center_x == other.center_x
            && self.center_y == other.center_y
            && self.bold == other.bold
            && self.italic == other.italic
            && self.font_family == other.font_family
            && self.size == other.size
            && self.color == other.color
            && self.caption() == other.caption()
    }
}

fn optional_attribute<T>(
    cursor: &XmlCursor<'_>,
    attr: Attr,
    parse: fn(&str) -> Option<T>,
) -> ParseResult<Option<T>> {
    Ok(match cursor.parsed_attribute(attr, parse)? {
        Parsed::Value(value) => Some(value),
        Parsed::Missing => None,
        invalid => {
            cursor.diagnostics().warn(DISPLAY_TEXT_READ, || {
                format!("ignoring {}: {}", attr.name(), invalid.describe())
            });
            None
        }
    })
}

impl XmlEntity for DisplayText {
    fn read(cursor: &mut XmlCursor<'_>) -> ParseResult<Self> {
        let color = cursor.attribute(Attr::Color)?.and_then(|raw| {
            DisplayColor::parse_or_warn(&raw, cursor.diagnostics(), DISPLAY_TEXT_READ)
        });
        let text = DisplayText {
            center_x: optional_attribute(cursor, Attr::CenterX, parse_float)?,
            center_y: optional_attribute(cursor, Attr::CenterY, parse_float)?,
            bold: optional_attribute(cursor, Attr::Bold, parse_bool)?.unwrap_or(false),
            italic: optional_attribute(cursor, Attr::Italic, parse_bool)?.unwrap_or(false),
            font_family: cursor
                .attribute(Attr::FontFamily)?
                .filter(|family| !family.trim().is_empty()),
            size: optional_attribute(cursor, Attr::Size, parse_float)?,
            color,
            value: Some(cursor.read_text()?).filter(|value| !value.is_empty()),
        };
        Ok(text)
    }

    fn write<W: Write>(&self, writer: &mut MetadataWriter<W>, tag: Tag) -> WriteResult<()> {
        let start = ElementStart::new(tag)
            .attr_opt(Attr::CenterX, self.center_x, format_float)
            .attr_opt(Attr::CenterY, self.center_y, format_float)
            .attr(Attr::Bold, format_bool(self.bold))
            .attr(Attr::Italic, format_bool(self.italic))
            .attr_opt(Attr::FontFamily, self.font_family.as_deref(), str::to_string)
            .attr_opt(Attr::Size, self.size, format_float)
            .attr_opt(Attr::Color, self.color, |color| color.to_string());
        match self.caption() {
            Some(value) => writer.text_element(start, value),
            None => writer.empty(start),
        }
    }
}
