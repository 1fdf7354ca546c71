use std::io::Write;

use serde::Serialize;

use super::appearance::Transformation;
use super::display::DisplayColor;
use crate::prelude::{ParseResult, WriteResult, XmlEntity};
use crate::telemetry::Site;
use crate::xml::scalar::{format_float, parse_float, parse_unsigned};
use crate::xml::{Attr, ElementStart, MetadataWriter, Namespace, Parsed, Tag, XmlCursor};

const RECTANGLE_READ: Site = Site::new("Rectangle", "read");

/// A 2-D point. `complete` is false when either coordinate was missing or
/// unparseable on the wire; owners discard incomplete vectors. Equality
/// compares coordinates only.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
    #[serde(skip)]
    complete: bool,
}

impl Vector {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            complete: true,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Scales, then translates, each axis independently.
    pub fn apply(&mut self, transformation: &Transformation) {
        if let Some(scale) = transformation.scale {
            self.x *= scale.x;
            self.y *= scale.y;
        }
        if let Some(translate) = transformation.translate {
            self.x += translate.x;
            self.y += translate.y;
        }
    }

    /// Reads the vector under the cursor and keeps it only when complete.
    pub(crate) fn read_complete(
        cursor: &mut XmlCursor<'_>,
        site: Site,
        tag: Tag,
    ) -> ParseResult<Option<Vector>> {
        let vector = Vector::read(cursor)?;
        if vector.complete {
            Ok(Some(vector))
        } else {
            cursor.diagnostics().warn(site, || {
                format!("discarding {} with missing or invalid coordinates", tag.local_name())
            });
            Ok(None)
        }
    }
}

impl PartialEq for Vector {
    fn eq(&self, other: &Self) -> bool {
        self.x == other.x && self.y == other.y
    }
}

impl XmlEntity for Vector {
    fn read(cursor: &mut XmlCursor<'_>) -> ParseResult<Self> {
        let (x, has_x) = cursor.parsed_attribute(Attr::X, parse_float)?.or_default();
        let (y, has_y) = cursor.parsed_attribute(Attr::Y, parse_float)?.or_default();
        Ok(Self {
            x,
            y,
            complete: has_x && has_y,
        })
    }

    fn write<W: Write>(&self, writer: &mut MetadataWriter<W>, tag: Tag) -> WriteResult<()> {
        writer.empty(
            ElementStart::new(tag)
                .attr(Attr::X, format_float(self.x))
                .attr(Attr::Y, format_float(self.y)),
        )
    }
}

/// Bounding box plus the presentational styling carried in its extension.
#[derive(Debug, Clone, Serialize)]
pub struct Rectangle {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
    pub line_color: Option<DisplayColor>,
    pub line_thickness: Option<u32>,
    pub fill_color: Option<DisplayColor>,
    #[serde(skip)]
    complete: bool,
}

impl Rectangle {
    pub fn new(top: f64, bottom: f64, left: f64, right: f64) -> Self {
        Self {
            top,
            bottom,
            left,
            right,
            line_color: None,
            line_thickness: None,
            fill_color: None,
            complete: true,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    pub fn has_styling(&self) -> bool {
        self.line_color.is_some() || self.line_thickness.is_some() || self.fill_color.is_some()
    }

    /// Scales, then translates, each axis independently.
    pub fn apply(&mut self, transformation: &Transformation) {
        if let Some(scale) = transformation.scale {
            self.left *= scale.x;
            self.right *= scale.x;
            self.top *= scale.y;
            self.bottom *= scale.y;
        }
        if let Some(translate) = transformation.translate {
            self.left += translate.x;
            self.right += translate.x;
            self.top += translate.y;
            self.bottom += translate.y;
        }
    }

    fn read_styling(&mut self, cursor: &mut XmlCursor<'_>) -> ParseResult<()> {
        cursor.for_each_child(Namespace::None, |cursor, tag| {
            match tag {
                Tag::FillColor => {
                    let text = cursor.read_text()?;
                    self.fill_color =
                        DisplayColor::parse_or_warn(&text, cursor.diagnostics(), RECTANGLE_READ);
                }
                Tag::LineColor => {
                    let text = cursor.read_text()?;
                    self.line_color =
                        DisplayColor::parse_or_warn(&text, cursor.diagnostics(), RECTANGLE_READ);
                }
                Tag::LineThickness => match cursor.parsed_text(parse_unsigned)? {
                    Parsed::Value(thickness) => self.line_thickness = Some(thickness),
                    invalid => cursor.diagnostics().warn(RECTANGLE_READ, || {
                        format!("ignoring LineThickness: {}", invalid.describe())
                    }),
                },
                _ => {}
            }
            Ok(())
        })
    }
}

impl PartialEq for Rectangle {
    fn eq(&self, other: &Self) -> bool {
        self.top == other.top
            && self.bottom == other.bottom
            && self.left == other.left
            && self.right == other.right
            && self.line_color == other.line_color
            && self.line_thickness == other.line_thickness
            && self.fill_color == other.fill_color
    }
}

impl XmlEntity for Rectangle {
    fn read(cursor: &mut XmlCursor<'_>) -> ParseResult<Self> {
        let (left, has_left) = cursor.parsed_attribute(Attr::Left, parse_float)?.or_default();
        let (top, has_top) = cursor.parsed_attribute(Attr::Top, parse_float)?.or_default();
        let (right, has_right) = cursor.parsed_attribute(Attr::Right, parse_float)?.or_default();
        let (bottom, has_bottom) =
            cursor.parsed_attribute(Attr::Bottom, parse_float)?.or_default();

        let mut rectangle = Rectangle::new(top, bottom, left, right);
        rectangle.complete = has_left && has_top && has_right && has_bottom;

        cursor.for_each_child(Namespace::Schema, |cursor, tag| {
            if tag == Tag::Extension {
                rectangle.read_styling(cursor)?;
            }
            Ok(())
        })?;
        Ok(rectangle)
    }

    fn write<W: Write>(&self, writer: &mut MetadataWriter<W>, tag: Tag) -> WriteResult<()> {
        let start = ElementStart::new(tag)
            .attr(Attr::Left, format_float(self.left))
            .attr(Attr::Top, format_float(self.top))
            .attr(Attr::Right, format_float(self.right))
            .attr(Attr::Bottom, format_float(self.bottom));
        if !self.has_styling() {
            return writer.empty(start);
        }

        writer.open(start)?;
        writer.open(ElementStart::new(Tag::Extension))?;
        if let Some(color) = self.fill_color {
            writer.text(Tag::FillColor, &color.to_string())?;
        }
        if let Some(color) = self.line_color {
            writer.text(Tag::LineColor, &color.to_string())?;
        }
        if let Some(thickness) = self.line_thickness {
            writer.text(Tag::LineThickness, &thickness.to_string())?;
        }
        writer.close(Tag::Extension)?;
        writer.close(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::testing::{read_fragment, write_fragment};

    #[test]
    fn vector_tracks_completeness() {
        let (vector, _) = read_fragment::<Vector>(r#"<tt:Translate x="0.5" y="-1"/>"#);
        assert_eq!(vector, Vector::new(0.5, -1.0));

        let (partial, _) = read_fragment::<Vector>(r#"<tt:Translate x="0.5"/>"#);
        assert!(!partial.is_complete());
        assert_eq!(partial, Vector::new(0.5, 0.0));

        let (garbage, _) = read_fragment::<Vector>(r#"<tt:Translate x="0,5" y="1"/>"#);
        assert!(!garbage.is_complete());
    }

    #[test]
    fn rectangle_reads_extension_styling() {
        let (rectangle, messages) = read_fragment::<Rectangle>(
            r##"<tt:BoundingBox left="1" top="2" right="3" bottom="4">
                  <tt:Extension>
                    <FillColor>#80FF0000</FillColor>
                    <LineColor>#FF00FF00</LineColor>
                    <LineThickness>2</LineThickness>
                  </tt:Extension>
                </tt:BoundingBox>"##,
        );
        assert!(rectangle.is_complete());
        assert_eq!(
            (rectangle.left, rectangle.top, rectangle.right, rectangle.bottom),
            (1.0, 2.0, 3.0, 4.0)
        );
        assert_eq!(rectangle.fill_color, Some(DisplayColor::new(0x80, 0xFF, 0, 0)));
        assert_eq!(rectangle.line_color, Some(DisplayColor::new(0xFF, 0, 0xFF, 0)));
        assert_eq!(rectangle.line_thickness, Some(2));
        assert!(messages.is_empty());
    }

    #[test]
    fn rectangle_drops_bad_styling_only() {
        let (rectangle, messages) = read_fragment::<Rectangle>(
            r#"<tt:BoundingBox left="1" top="2" right="3" bottom="4">
                  <tt:Extension>
                    <FillColor>red</FillColor><LineThickness>-1</LineThickness>
                  </tt:Extension>
                </tt:BoundingBox>"#,
        );
        assert!(rectangle.is_complete());
        assert_eq!(rectangle.fill_color, None);
        assert_eq!(rectangle.line_thickness, None);
        // both failures share one site, so only the first gets through
        assert_eq!(messages.len(), 1);
    }

    #[test]
    fn rectangle_missing_attribute_is_incomplete() {
        let (rectangle, _) =
            read_fragment::<Rectangle>(r#"<tt:BoundingBox left="0" top="0" bottom="10"/>"#);
        assert!(!rectangle.is_complete());
        assert_eq!(rectangle, Rectangle::new(0.0, 10.0, 0.0, 0.0));
    }

    #[test]
    fn apply_scales_then_translates() {
        let transformation = Transformation {
            translate: Some(Vector::new(1.0, -1.0)),
            scale: Some(Vector::new(2.0, 0.5)),
        };
        let mut rectangle = Rectangle::new(2.0, 4.0, 1.0, 3.0);
        rectangle.apply(&transformation);
        assert_eq!((rectangle.left, rectangle.right), (3.0, 7.0));
        assert_eq!((rectangle.top, rectangle.bottom), (0.0, 1.0));

        let mut point = Vector::new(1.0, 1.0);
        point.apply(&Transformation {
            translate: Some(Vector::new(1.0, 1.0)),
            scale: None,
        });
        assert_eq!(point, Vector::new(2.0, 2.0));
    }

    #[test]
    fn rectangle_without_styling_is_self_closing() {
        let written = write_fragment(&Rectangle::new(0.0, 10.0, 0.0, 5.0), Tag::BoundingBox);
        assert_eq!(written, r#"<tt:BoundingBox left="0" top="0" right="5" bottom="10"/>"#);
    }
}
