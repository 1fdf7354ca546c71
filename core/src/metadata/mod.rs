//! The metadata entity tree.
//!
//! Every entity reads itself from a cursor resting on its own opening tag
//! and writes itself under the tag its parent chooses. Children that fail
//! validation are dropped by the parent with a throttled diagnostic; only
//! structural failures abort a parse.

pub mod appearance;
pub mod behaviour;
pub mod classification;
pub mod display;
pub mod frame;
pub mod geometry;
pub mod navigation;
pub mod object;
pub mod stream;

pub use appearance::{Appearance, Shape, Transformation};
pub use behaviour::Behaviour;
pub use classification::{ClassCandidate, OnvifClass};
pub use display::{DisplayColor, DisplayText};
pub use frame::{Frame, VideoAnalytics};
pub use geometry::{Rectangle, Vector};
pub use navigation::{NavigationalData, NavigationalVersion};
pub use object::OnvifObject;
pub use stream::MetadataStream;

#[cfg(test)]
pub(crate) mod testing {
    use crate::prelude::XmlEntity;
    use crate::telemetry::testing::recording;
    use crate::xml::{MetadataWriter, Tag, XmlCursor, SCHEMA_NAMESPACE};

    /// Reads `fragment` as `T` inside a wrapper that binds the `tt` prefix,
    /// returning the entity and every diagnostic emitted.
    pub fn read_fragment<T: XmlEntity>(fragment: &str) -> (T, Vec<String>) {
        let document = format!(r#"<wrapper xmlns:tt="{SCHEMA_NAMESPACE}">{fragment}</wrapper>"#);
        let (diagnostics, sink) = recording();
        let mut cursor = XmlCursor::new(&document, &diagnostics);
        cursor.advance().unwrap();
        cursor.advance().unwrap();
        let value = T::read(&mut cursor).unwrap();
        (value, sink.messages())
    }

    pub fn write_fragment<T: XmlEntity>(value: &T, tag: Tag) -> String {
        let mut writer = MetadataWriter::new(Vec::new());
        value.write(&mut writer, tag).unwrap();
        String::from_utf8(writer.into_inner()).unwrap()
    }
}
