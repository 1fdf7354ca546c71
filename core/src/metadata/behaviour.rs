use std::io::Write;

use serde::Serialize;

use crate::prelude::{ParseResult, WriteResult, XmlEntity};
use crate::xml::{ElementStart, MetadataWriter, Namespace, Tag, XmlCursor};

/// Behaviour flags of an object; each flag is an empty marker element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Behaviour {
    pub is_idle: bool,
    pub is_removed: bool,
}

impl Behaviour {
    pub fn has_behaviours(&self) -> bool {
        self.is_idle || self.is_removed
    }
}

impl XmlEntity for Behaviour {
    fn read(cursor: &mut XmlCursor<'_>) -> ParseResult<Self> {
        let mut behaviour = Behaviour::default();
        cursor.for_each_child(Namespace::Schema, |_, tag| {
            match tag {
                Tag::Idle => behaviour.is_idle = true,
                Tag::Removed => behaviour.is_removed = true,
                _ => {}
            }
            Ok(())
        })?;
        Ok(behaviour)
    }

    /// Writes nothing when no flag is set.
    fn write<W: Write>(&self, writer: &mut MetadataWriter<W>, tag: Tag) -> WriteResult<()> {
        if !self.has_behaviours() {
            return Ok(());
        }
        writer.open(ElementStart::new(tag))?;
        if self.is_removed {
            writer.empty(ElementStart::new(Tag::Removed))?;
        }
        if self.is_idle {
            writer.empty(ElementStart::new(Tag::Idle))?;
        }
        writer.close(tag)
    }
}
