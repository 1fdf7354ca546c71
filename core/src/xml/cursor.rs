use std::fmt::Display;

use quick_xml::events::{BytesStart, Event};
use quick_xml::NsReader;

use super::scalar::Parsed;
use super::vocabulary::{Attr, Namespace, Tag};
use crate::prelude::{ParseError, ParseResult, Position};
use crate::telemetry::Diagnostics;

/// The node the cursor currently rests on.
#[derive(Debug)]
pub(crate) enum Node<'a> {
    Start,
    Element {
        namespace: Namespace,
        tag: Option<Tag>,
        depth: usize,
        offset: usize,
        start: BytesStart<'a>,
    },
    EndElement {
        depth: usize,
    },
    Text {
        depth: usize,
        content: String,
    },
    Eof,
}

/// Forward-only, depth-tracked, namespace-aware cursor over a document.
///
/// Comments, processing instructions and declarations are consumed internally
/// and never surface as nodes. Whitespace-only text is only seen by
/// [`XmlCursor::read_text`]. The root element has
/// depth 0; a closing tag reports the depth of the element it closes.
pub struct XmlCursor<'a> {
    reader: NsReader<&'a [u8]>,
    input: &'a str,
    depth: usize,
    node: Node<'a>,
    diagnostics: &'a Diagnostics,
}

impl<'a> XmlCursor<'a> {
    pub fn new(input: &'a str, diagnostics: &'a Diagnostics) -> Self {
        let mut reader = NsReader::from_str(input);
        reader.config_mut().expand_empty_elements = true;
        Self {
            reader,
            input,
            depth: 0,
            node: Node::Start,
            diagnostics,
        }
    }

    pub fn diagnostics(&self) -> &'a Diagnostics {
        self.diagnostics
    }

    pub(crate) fn node(&self) -> &Node<'a> {
        &self.node
    }

    /// Moves to the next significant node.
    pub(crate) fn advance(&mut self) -> ParseResult<()> {
        self.next_node(false)
    }

    fn next_node(&mut self, keep_blank_text: bool) -> ParseResult<()> {
        loop {
            let offset = self.reader.buffer_position() as usize;
            let (namespace, event) = match self.reader.read_resolved_event() {
                Ok((resolved, event)) => (Namespace::classify(&resolved), event),
                Err(err) => {
                    let message = err.to_string();
                    return Err(self.malformed(message));
                }
            };
            match event {
                Event::Start(start) => {
                    let tag = Tag::from_local(start.local_name().as_ref());
                    self.node = Node::Element {
                        namespace,
                        tag,
                        depth: self.depth,
                        offset,
                        start,
                    };
                    self.depth += 1;
                }
                Event::End(_) => {
                    self.depth = self.depth.saturating_sub(1);
                    self.node = Node::EndElement { depth: self.depth };
                }
                Event::Text(text) => {
                    let content = text.unescape().map_err(|err| self.malformed(err))?;
                    if !keep_blank_text && content.trim().is_empty() {
                        continue;
                    }
                    self.node = Node::Text {
                        depth: self.depth,
                        content: content.into_owned(),
                    };
                }
                Event::CData(data) => {
                    let content = String::from_utf8_lossy(&data).into_owned();
                    if !keep_blank_text && content.trim().is_empty() {
                        continue;
                    }
                    self.node = Node::Text {
                        depth: self.depth,
                        content,
                    };
                }
                Event::Eof => self.node = Node::Eof,
                _ => continue,
            }
            return Ok(());
        }
    }

    /// Depth of the element the cursor rests on.
    fn element_depth(&self) -> ParseResult<usize> {
        match &self.node {
            Node::Element { depth, .. } => Ok(*depth),
            _ => Err(self.malformed("cursor is not positioned on an element")),
        }
    }

    /// Visits every immediate child element of the current element that lives
    /// in `namespace` and has a known name. Foreign, unknown and deeper nodes
    /// are skipped. Returns with the cursor on the current element's closing
    /// tag, whatever the visitor consumed.
    pub fn for_each_child<F>(&mut self, namespace: Namespace, mut visit: F) -> ParseResult<()>
    where
        F: FnMut(&mut XmlCursor<'a>, Tag) -> ParseResult<()>,
    {
        let depth = self.element_depth()?;
        loop {
            self.advance()?;
            let child = match &self.node {
                Node::EndElement { depth: closed } if *closed == depth => return Ok(()),
                Node::Eof => return Err(self.unexpected_eof()),
                Node::Element {
                    namespace: ns,
                    tag: Some(tag),
                    depth: child_depth,
                    ..
                } if *child_depth == depth + 1 && *ns == namespace => Some(*tag),
                _ => None,
            };
            if let Some(tag) = child {
                visit(self, tag)?;
                self.skip_to_end(depth + 1)?;
            }
        }
    }

    fn skip_to_end(&mut self, depth: usize) -> ParseResult<()> {
        loop {
            match &self.node {
                Node::EndElement { depth: closed } if *closed == depth => return Ok(()),
                Node::Eof => return Err(self.unexpected_eof()),
                _ => self.advance()?,
            }
        }
    }

    /// Concatenated direct text content of the current element, whitespace
    /// included. Child elements are skipped; the cursor ends on the closing tag.
    pub fn read_text(&mut self) -> ParseResult<String> {
        let depth = self.element_depth()?;
        let mut text = String::new();
        loop {
            self.next_node(true)?;
            match &self.node {
                Node::Text {
                    depth: text_depth,
                    content,
                } if *text_depth == depth + 1 => text.push_str(content),
                Node::EndElement { depth: closed } if *closed == depth => return Ok(text),
                Node::Eof => return Err(self.unexpected_eof()),
                _ => {}
            }
        }
    }

    /// Raw value of an unqualified attribute on the current element.
    pub fn attribute(&self, attr: Attr) -> ParseResult<Option<String>> {
        let Node::Element { start, .. } = &self.node else {
            return Ok(None);
        };
        match start.try_get_attribute(attr.name()) {
            Ok(Some(attribute)) => attribute
                .unescape_value()
                .map(|value| Some(value.into_owned()))
                .map_err(|err| self.malformed(err)),
            Ok(None) => Ok(None),
            Err(err) => Err(self.malformed(err)),
        }
    }

    /// Attribute converted with `parse`, reporting whether it was present and valid.
    pub fn parsed_attribute<T>(
        &self,
        attr: Attr,
        parse: fn(&str) -> Option<T>,
    ) -> ParseResult<Parsed<T>> {
        Ok(Parsed::from_raw(self.attribute(attr)?, parse))
    }

    /// Text content converted with `parse`.
    pub fn parsed_text<T>(&mut self, parse: fn(&str) -> Option<T>) -> ParseResult<Parsed<T>> {
        let text = self.read_text()?;
        Ok(Parsed::from_raw(Some(text), parse))
    }

    /// Name of the current element as written, for error messages.
    pub(crate) fn element_name(&self) -> String {
        match &self.node {
            Node::Element { start, .. } => {
                String::from_utf8_lossy(start.name().as_ref()).into_owned()
            }
            _ => String::new(),
        }
    }

    pub(crate) fn position_at(&self, offset: usize) -> Position {
        let bytes = self.input.as_bytes();
        let prefix = &bytes[..offset.min(bytes.len())];
        let line = prefix.iter().filter(|&&b| b == b'\n').count() + 1;
        let line_start = prefix
            .iter()
            .rposition(|&b| b == b'\n')
            .map_or(0, |idx| idx + 1);
        let column = String::from_utf8_lossy(&prefix[line_start..]).chars().count() + 1;
        Position { line, column }
    }

    pub(crate) fn position(&self) -> Position {
        match &self.node {
            Node::Element { offset, .. } => self.position_at(*offset),
            _ => self.position_at(self.reader.buffer_position() as usize),
        }
    }

    fn malformed<E: Display>(&self, err: E) -> ParseError {
        ParseError::Malformed {
            message: err.to_string(),
            position: self.position_at(self.reader.buffer_position() as usize),
        }
    }

    fn unexpected_eof(&self) -> ParseError {
        ParseError::UnexpectedEof {
            position: self.position_at(self.input.len()),
        }
    }
}
