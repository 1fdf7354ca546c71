//! Document-level entry points: locate the root, hand its children to the
//! entity tree, and emit the envelope on the way back out.

use std::io::Write;

use crate::metadata::MetadataStream;
use crate::prelude::{ParseError, ParseResult, WriteResult};
use crate::telemetry::Diagnostics;
use crate::xml::cursor::Node;
use crate::xml::{
    ElementStart, MetadataWriter, Namespace, Tag, XmlCursor, SCHEMA_NAMESPACE, SCHEMA_PREFIX,
};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Output layout for the writer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// Two-space indentation instead of a single line.
    pub indent: bool,
}

impl WriteOptions {
    pub fn indented() -> Self {
        Self { indent: true }
    }
}

/// Parses a document using the process-wide diagnostics.
pub fn parse_str(input: &str) -> ParseResult<MetadataStream> {
    parse_str_with(input, Diagnostics::global())
}

/// Parses UTF-8 bytes using the process-wide diagnostics. A leading
/// byte-order mark is tolerated.
pub fn parse_bytes(input: &[u8]) -> ParseResult<MetadataStream> {
    parse_bytes_with(input, Diagnostics::global())
}

pub fn parse_bytes_with(input: &[u8], diagnostics: &Diagnostics) -> ParseResult<MetadataStream> {
    let input = input.strip_prefix(UTF8_BOM).unwrap_or(input);
    let text = std::str::from_utf8(input).map_err(|err| ParseError::Encoding(err.to_string()))?;
    parse_str_with(text, diagnostics)
}

pub fn parse_str_with(input: &str, diagnostics: &Diagnostics) -> ParseResult<MetadataStream> {
    let mut cursor = XmlCursor::new(input, diagnostics);
    cursor.advance()?;
    match cursor.node() {
        Node::Element {
            namespace: Namespace::Schema,
            tag: Some(Tag::MetadataStream),
            depth: 0,
            ..
        } => {}
        Node::Element { .. } => {
            return Err(ParseError::UnexpectedRoot {
                name: cursor.element_name(),
                position: cursor.position(),
            })
        }
        Node::Eof => return Err(ParseError::MissingRoot),
        _ => {
            return Err(ParseError::Malformed {
                message: "content before the root element".to_string(),
                position: cursor.position(),
            })
        }
    }

    let stream = MetadataStream::read_content(&mut cursor)
        .map_err(|err| ParseError::Stream(Box::new(err)))?;

    // Only comments, processing instructions and whitespace may follow the root.
    loop {
        cursor.advance()?;
        match cursor.node() {
            Node::Eof => return Ok(stream),
            Node::Element { .. } | Node::EndElement { .. } | Node::Text { .. } => {
                return Err(ParseError::Malformed {
                    message: "content after the root element".to_string(),
                    position: cursor.position(),
                })
            }
            Node::Start => {}
        }
    }
}

/// Writes `stream` as a complete document: prologue, root element with the
/// schema namespace bound to `tt`, content, closing tag.
pub fn write_to<W: Write>(output: W, stream: &MetadataStream) -> WriteResult<W> {
    write_to_with(output, stream, WriteOptions::default())
}

pub fn write_to_with<W: Write>(
    output: W,
    stream: &MetadataStream,
    options: WriteOptions,
) -> WriteResult<W> {
    let mut writer = if options.indent {
        MetadataWriter::indented(output)
    } else {
        MetadataWriter::new(output)
    };
    writer.declaration()?;
    let xmlns = format!("xmlns:{SCHEMA_PREFIX}");
    writer.open(ElementStart::new(Tag::MetadataStream).raw_attr(&xmlns, SCHEMA_NAMESPACE))?;
    stream.write_content(&mut writer)?;
    writer.close(Tag::MetadataStream)?;
    Ok(writer.into_inner())
}

pub fn write_bytes(stream: &MetadataStream, options: WriteOptions) -> WriteResult<Vec<u8>> {
    write_to_with(Vec::new(), stream, options)
}

pub fn write_string(stream: &MetadataStream, options: WriteOptions) -> WriteResult<String> {
    Ok(String::from_utf8(write_bytes(stream, options)?)?)
}
