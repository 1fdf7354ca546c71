use std::io::Write;

use serde::Serialize;

use super::appearance::Appearance;
use super::behaviour::Behaviour;
use crate::prelude::{ParseResult, WriteResult, XmlEntity};
use crate::telemetry::Site;
use crate::xml::scalar::parse_int;
use crate::xml::{Attr, ElementStart, MetadataWriter, Namespace, Parsed, Tag, XmlCursor};

const OBJECT_READ: Site = Site::new("OnvifObject", "read");

/// A detected object in one frame. Identity across frames is only the
/// numeric `object_id`; nothing links objects between frames.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OnvifObject {
    pub object_id: i32,
    pub appearance: Option<Appearance>,
    pub behaviour: Option<Behaviour>,
}

impl OnvifObject {
    pub fn new(object_id: i32) -> Self {
        Self {
            object_id,
            ..Default::default()
        }
    }
}

impl XmlEntity for OnvifObject {
    fn read(cursor: &mut XmlCursor<'_>) -> ParseResult<Self> {
        let object_id = match cursor.parsed_attribute(Attr::ObjectId, parse_int)? {
            Parsed::Value(id) => id,
            failed => {
                cursor.diagnostics().warn(OBJECT_READ, || {
                    format!("ObjectId {}, defaulting to 0", failed.describe())
                });
                0
            }
        };

        let mut object = OnvifObject::new(object_id);
        cursor.for_each_child(Namespace::Schema, |cursor, tag| {
            match tag {
                Tag::Appearance => object.appearance = Some(Appearance::read(cursor)?),
                // an element without markers is the same as no element
                Tag::Behaviour => {
                    object.behaviour =
                        Some(Behaviour::read(cursor)?).filter(Behaviour::has_behaviours)
                }
                _ => {}
            }
            Ok(())
        })?;
        Ok(object)
    }

    fn write<W: Write>(&self, writer: &mut MetadataWriter<W>, tag: Tag) -> WriteResult<()> {
        writer.open(ElementStart::new(tag).attr(Attr::ObjectId, self.object_id.to_string()))?;
        if let Some(appearance) = &self.appearance {
            appearance.write(writer, Tag::Appearance)?;
        }
        if let Some(behaviour) = &self.behaviour {
            behaviour.write(writer, Tag::Behaviour)?;
        }
        writer.close(tag)
    }
}
