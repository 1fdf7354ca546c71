use std::io::Write;

use serde::Serialize;

use super::classification::OnvifClass;
use super::display::DisplayText;
use super::geometry::{Rectangle, Vector};
use crate::prelude::{ParseResult, WriteResult, XmlEntity};
use crate::telemetry::Site;
use crate::xml::{ElementStart, MetadataWriter, Namespace, Tag, XmlCursor};

const TRANSFORMATION_READ: Site = Site::new("Transformation", "read");
const SHAPE_READ: Site = Site::new("Shape", "read");
const SHAPE_INVALID: Site = Site::new("Shape", "validate");

/// Affine adjustment: scale, then translate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Transformation {
    pub translate: Option<Vector>,
    pub scale: Option<Vector>,
}

impl XmlEntity for Transformation {
    fn read(cursor: &mut XmlCursor<'_>) -> ParseResult<Self> {
        let mut transformation = Transformation::default();
        cursor.for_each_child(Namespace::Schema, |cursor, tag| {
            match tag {
                Tag::Translate => {
                    transformation.translate =
                        Vector::read_complete(cursor, TRANSFORMATION_READ, tag)?
                }
                Tag::Scale => {
                    transformation.scale = Vector::read_complete(cursor, TRANSFORMATION_READ, tag)?
                }
                _ => {}
            }
            Ok(())
        })?;
        Ok(transformation)
    }

    fn write<W: Write>(&self, writer: &mut MetadataWriter<W>, tag: Tag) -> WriteResult<()> {
        writer.open(ElementStart::new(tag))?;
        if let Some(translate) = &self.translate {
            translate.write(writer, Tag::Translate)?;
        }
        if let Some(scale) = &self.scale {
            scale.write(writer, Tag::Scale)?;
        }
        writer.close(tag)
    }
}

/// Object geometry. Only complete bounding boxes and centers survive a read.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Shape {
    pub bounding_box: Option<Rectangle>,
    pub center_of_gravity: Option<Vector>,
}

impl Shape {
    pub fn new(bounding_box: Rectangle) -> Self {
        Self {
            bounding_box: Some(bounding_box),
            center_of_gravity: None,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.bounding_box.is_some()
    }

    pub fn apply(&mut self, transformation: &Transformation) {
        if let Some(bounding_box) = &mut self.bounding_box {
            bounding_box.apply(transformation);
        }
        if let Some(center) = &mut self.center_of_gravity {
            center.apply(transformation);
        }
    }
}

impl XmlEntity for Shape {
    fn read(cursor: &mut XmlCursor<'_>) -> ParseResult<Self> {
        let mut shape = Shape::default();
        cursor.for_each_child(Namespace::Schema, |cursor, tag| {
            match tag {
                Tag::BoundingBox => {
                    let rectangle = Rectangle::read(cursor)?;
                    if rectangle.is_complete() {
                        shape.bounding_box = Some(rectangle);
                    } else {
                        cursor.diagnostics().warn(SHAPE_READ, || {
                            "discarding BoundingBox with missing or invalid edges".to_string()
                        });
                    }
                }
                Tag::CenterOfGravity => {
                    shape.center_of_gravity = Vector::read_complete(cursor, SHAPE_READ, tag)?
                }
                _ => {}
            }
            Ok(())
        })?;
        if !shape.is_valid() {
            cursor
                .diagnostics()
                .warn(SHAPE_INVALID, || "shape has no valid BoundingBox".to_string());
        }
        Ok(shape)
    }

    fn write<W: Write>(&self, writer: &mut MetadataWriter<W>, tag: Tag) -> WriteResult<()> {
        writer.open(ElementStart::new(tag))?;
        if let Some(bounding_box) = &self.bounding_box {
            bounding_box.write(writer, Tag::BoundingBox)?;
        }
        if let Some(center) = &self.center_of_gravity {
            center.write(writer, Tag::CenterOfGravity)?;
        }
        writer.close(tag)
    }
}

/// How an object looks in a frame. The description travels inside the
/// appearance's extension element.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Appearance {
    pub transformation: Option<Transformation>,
    pub shape: Option<Shape>,
    pub class: Option<OnvifClass>,
    pub description: Option<DisplayText>,
}

impl XmlEntity for Appearance {
    fn read(cursor: &mut XmlCursor<'_>) -> ParseResult<Self> {
        let mut appearance = Appearance::default();
        cursor.for_each_child(Namespace::Schema, |cursor, tag| {
            match tag {
                Tag::Transformation => {
                    appearance.transformation = Some(Transformation::read(cursor)?)
                }
                Tag::Shape => appearance.shape = Some(Shape::read(cursor)?),
                Tag::Class => appearance.class = Some(OnvifClass::read(cursor)?),
                Tag::Extension => cursor.for_each_child(Namespace::None, |cursor, tag| {
                    if tag == Tag::Description {
                        appearance.description = Some(DisplayText::read(cursor)?);
                    }
                    Ok(())
                })?,
                _ => {}
            }
            Ok(())
        })?;
        Ok(appearance)
    }

    fn write<W: Write>(&self, writer: &mut MetadataWriter<W>, tag: Tag) -> WriteResult<()> {
        writer.open(ElementStart::new(tag))?;
        if let Some(transformation) = &self.transformation {
            transformation.write(writer, Tag::Transformation)?;
        }
        if let Some(shape) = &self.shape {
            shape.write(writer, Tag::Shape)?;
        }
        if let Some(class) = &self.class {
            class.write(writer, Tag::Class)?;
        }
        if let Some(description) = &self.description {
            writer.open(ElementStart::new(Tag::Extension))?;
            description.write(writer, Tag::Description)?;
            writer.close(Tag::Extension)?;
        }
        writer.close(tag)
    }
}
