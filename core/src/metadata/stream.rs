use std::io::Write;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Serialize;

use super::frame::{Frame, VideoAnalytics};
use super::navigation::NavigationalData;
use crate::prelude::{ParseResult, WriteResult, XmlEntity};
use crate::telemetry::Site;
use crate::xml::{ElementStart, MetadataWriter, Namespace, Tag, XmlCursor};

const STREAM_READ: Site = Site::new("MetadataStream", "read");

/// Root of a metadata document.
///
/// `original_data` holds the decoded bytes of the source payload the
/// metadata was derived from; an empty buffer means none was attached.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetadataStream {
    pub video_analytics: Vec<VideoAnalytics>,
    pub navigational_data: Option<NavigationalData>,
    #[serde(skip)]
    pub original_data: Vec<u8>,
}

impl MetadataStream {
    pub fn new(video_analytics: Vec<VideoAnalytics>) -> Self {
        Self {
            video_analytics,
            ..Default::default()
        }
    }

    /// Every frame of every analytics section, in document order.
    pub fn frames(&self) -> impl Iterator<Item = &Frame> + '_ {
        self.video_analytics
            .iter()
            .flat_map(|analytics| analytics.frames.iter())
    }

    pub fn first_frame(&self) -> Option<&Frame> {
        self.frames().next()
    }

    fn has_extension(&self) -> bool {
        self.navigational_data.is_some() || !self.original_data.is_empty()
    }

    /// Reads the children of an already-matched root element.
    pub(crate) fn read_content(cursor: &mut XmlCursor<'_>) -> ParseResult<Self> {
        let mut stream = MetadataStream::default();
        cursor.for_each_child(Namespace::Schema, |cursor, tag| {
            match tag {
                Tag::VideoAnalytics => stream.video_analytics.push(VideoAnalytics::read(cursor)?),
                Tag::Extension => stream.read_extension(cursor)?,
                _ => {}
            }
            Ok(())
        })?;
        Ok(stream)
    }

    fn read_extension(&mut self, cursor: &mut XmlCursor<'_>) -> ParseResult<()> {
        cursor.for_each_child(Namespace::None, |cursor, tag| {
            match tag {
                Tag::OriginalData => {
                    let text = cursor.read_text()?;
                    let encoded: String = text.chars().filter(|c| !c.is_whitespace()).collect();
                    match STANDARD.decode(encoded) {
                        Ok(bytes) => self.original_data = bytes,
                        Err(err) => cursor.diagnostics().report(
                            STREAM_READ,
                            false,
                            || "ignoring OriginalData that is not valid base64".to_string(),
                            Some(&err),
                        ),
                    }
                }
                Tag::NavigationalData => {
                    self.navigational_data = Some(NavigationalData::read(cursor)?)
                }
                _ => {}
            }
            Ok(())
        })
    }

    /// Writes the children of the root element.
    pub(crate) fn write_content<W: Write>(
        &self,
        writer: &mut MetadataWriter<W>,
    ) -> WriteResult<()> {
        for analytics in &self.video_analytics {
            analytics.write(writer, Tag::VideoAnalytics)?;
        }
        if self.has_extension() {
            writer.open(ElementStart::new(Tag::Extension))?;
            if !self.original_data.is_empty() {
                writer.text(Tag::OriginalData, &STANDARD.encode(&self.original_data))?;
            }
            if let Some(navigation) = &self.navigational_data {
                navigation.write(writer, Tag::NavigationalData)?;
            }
            writer.close(Tag::Extension)?;
        }
        Ok(())
    }
}
