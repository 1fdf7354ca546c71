use std::io::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::appearance::Transformation;
use super::object::OnvifObject;
use crate::prelude::{ParseResult, WriteError, WriteResult, XmlEntity};
use crate::telemetry::Site;
use crate::xml::scalar::{format_utc, parse_utc};
use crate::xml::{Attr, ElementStart, MetadataWriter, Namespace, Tag, XmlCursor};

const ANALYTICS_READ: Site = Site::new("VideoAnalytics", "read");

/// Objects observed at one instant.
#[derive(Debug, Clone, Serialize)]
pub struct Frame {
    pub utc_time: DateTime<Utc>,
    pub transformation: Option<Transformation>,
    pub objects: Vec<OnvifObject>,
    #[serde(skip)]
    timestamp_was_present: bool,
}

impl Frame {
    pub fn new(utc_time: DateTime<Utc>) -> Self {
        Self {
            utc_time,
            transformation: None,
            objects: Vec::new(),
            timestamp_was_present: true,
        }
    }

    /// False when the frame was read without a parseable `UtcTime`; such a
    /// frame is blank and its owner discards it.
    pub fn timestamp_was_present(&self) -> bool {
        self.timestamp_was_present
    }

    pub fn objects(&self) -> &[OnvifObject] {
        &self.objects
    }

    /// First object carrying `object_id`.
    pub fn object(&self, object_id: i32) -> Option<&OnvifObject> {
        self.objects
            .iter()
            .find(|object| object.object_id == object_id)
    }
}

impl PartialEq for Frame {
    fn eq(&self, other: &Self) -> bool {
        self.utc_time == other.utc_time
            && self.transformation == other.transformation
            && self.objects == other.objects
    }
}

impl XmlEntity for Frame {
    fn read(cursor: &mut XmlCursor<'_>) -> ParseResult<Self> {
        let Some(utc_time) = cursor.parsed_attribute(Attr::UtcTime, parse_utc)?.value() else {
            return Ok(Frame {
                timestamp_was_present: false,
                ..Frame::new(DateTime::<Utc>::default())
            });
        };

        let mut frame = Frame::new(utc_time);
        cursor.for_each_child(Namespace::Schema, |cursor, tag| {
            match tag {
                Tag::Transformation => {
                    frame.transformation = Some(Transformation::read(cursor)?)
                }
                Tag::Object => frame.objects.push(OnvifObject::read(cursor)?),
                _ => {}
            }
            Ok(())
        })?;
        Ok(frame)
    }

    fn write<W: Write>(&self, writer: &mut MetadataWriter<W>, tag: Tag) -> WriteResult<()> {
        let utc_time = format_utc(&self.utc_time)
            .ok_or(WriteError::TimestampOutOfRange(self.utc_time))?;
        writer.open(ElementStart::new(tag).attr(Attr::UtcTime, utc_time))?;
        if let Some(transformation) = &self.transformation {
            transformation.write(writer, Tag::Transformation)?;
        }
        for object in &self.objects {
            object.write(writer, Tag::Object)?;
        }
        writer.close(tag)
    }
}

/// One analytics section: an ordered run of timestamped frames.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VideoAnalytics {
    pub frames: Vec<Frame>,
}

impl VideoAnalytics {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self { frames }
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn first_frame(&self) -> Option<&Frame> {
        self.frames.first()
    }
}

impl XmlEntity for VideoAnalytics {
    fn read(cursor: &mut XmlCursor<'_>) -> ParseResult<Self> {
        let mut analytics = VideoAnalytics::default();
        cursor.for_each_child(Namespace::Schema, |cursor, tag| {
            if tag != Tag::Frame {
                return Ok(());
            }
            let frame = Frame::read(cursor)?;
            if frame.timestamp_was_present() {
                analytics.frames.push(frame);
            } else {
                let diagnostics = cursor.diagnostics();
                diagnostics.warn(ANALYTICS_READ, || {
                    format!("dropping Frame without a valid UtcTime at {}", cursor.position())
                });
            }
            Ok(())
        })?;
        Ok(analytics)
    }

    fn write<W: Write>(&self, writer: &mut MetadataWriter<W>, tag: Tag) -> WriteResult<()> {
        writer.open(ElementStart::new(tag))?;
        for frame in &self.frames {
            frame.write(writer, Tag::Frame)?;
        }
        writer.close(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::testing::read_fragment;
    use chrono::TimeZone;

    #[test]
    fn frame_without_timestamp_is_blank() {
        let (frame, _) = read_fragment::<Frame>(
            r#"<tt:Frame UtcTime="noon"><tt:Object ObjectId="1"/></tt:Frame>"#,
        );
        assert!(!frame.timestamp_was_present());
        assert!(frame.objects.is_empty());
    }

    #[test]
    fn equality_ignores_timestamp_flag() {
        let (blank, _) = read_fragment::<Frame>(r#"<tt:Frame UtcTime="noon"/>"#);
        assert_eq!(blank, Frame::new(DateTime::<Utc>::default()));
        assert!(!blank.timestamp_was_present());
    }

    #[test]
    fn five_digit_year_is_not_written() {
        let frame = Frame::new(Utc.with_ymd_and_hms(12000, 1, 1, 0, 0, 0).unwrap());
        let mut writer = MetadataWriter::new(Vec::new());
        let err = frame.write(&mut writer, Tag::Frame).unwrap_err();
        assert!(matches!(err, WriteError::TimestampOutOfRange(time) if time == frame.utc_time));
    }

    #[test]
    fn analytics_drops_frames_without_timestamp() {
        let (analytics, messages) = read_fragment::<VideoAnalytics>(
            r#"<tt:VideoAnalytics>
                 <tt:Frame UtcTime="2024-01-01T00:00:00Z"><tt:Object ObjectId="1"/></tt:Frame>
                 <tt:Frame><tt:Object ObjectId="2"/></tt:Frame>
                 <tt:Frame UtcTime="2024-01-01T00:00:01Z"/>
               </tt:VideoAnalytics>"#,
        );
        assert_eq!(analytics.frames.len(), 2);
        assert_eq!(analytics.first_frame().unwrap().objects[0].object_id, 1);
        assert!(analytics.frames.iter().all(Frame::timestamp_was_present));
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("line 3"));
    }

    #[test]
    fn shared_object_id_does_not_merge_objects() {
        let (analytics, _) = read_fragment::<VideoAnalytics>(
            r#"<tt:VideoAnalytics>
                 <tt:Frame UtcTime="2024-01-01T00:00:00Z">
                   <tt:Object ObjectId="5"><tt:Behaviour><tt:Idle/></tt:Behaviour></tt:Object>
                 </tt:Frame>
                 <tt:Frame UtcTime="2024-01-01T00:00:01Z"><tt:Object ObjectId="5"/></tt:Frame>
               </tt:VideoAnalytics>"#,
        );
        let first = analytics.frames[0].object(5).unwrap();
        let second = analytics.frames[1].object(5).unwrap();
        assert_eq!(first.object_id, second.object_id);
        assert_ne!(first, second);
        assert!(second.behaviour.is_none());
    }
}
