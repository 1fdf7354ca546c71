use std::io::Write;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use super::vocabulary::{Attr, Tag};
use crate::prelude::WriteResult;

/// Opening tag under construction.
pub struct ElementStart {
    tag: Tag,
    start: BytesStart<'static>,
}

impl ElementStart {
    pub fn new(tag: Tag) -> Self {
        Self {
            tag,
            start: BytesStart::new(tag.qualified_name()),
        }
    }

    pub fn attr(mut self, attr: Attr, value: impl AsRef<str>) -> Self {
        self.start.push_attribute((attr.name(), value.as_ref()));
        self
    }

    pub fn attr_opt<T>(
        self,
        attr: Attr,
        value: Option<T>,
        format: impl FnOnce(T) -> String,
    ) -> Self {
        match value {
            Some(value) => self.attr(attr, format(value)),
            None => self,
        }
    }

    /// Raw attribute, used for namespace declarations on the root.
    pub fn raw_attr(mut self, name: &str, value: &str) -> Self {
        self.start.push_attribute((name, value));
        self
    }
}

/// Element-level writer over a quick-xml `Writer`.
pub struct MetadataWriter<W: Write> {
    inner: Writer<W>,
}

impl<W: Write> MetadataWriter<W> {
    pub fn new(output: W) -> Self {
        Self {
            inner: Writer::new(output),
        }
    }

    pub fn indented(output: W) -> Self {
        Self {
            inner: Writer::new_with_indent(output, b' ', 2),
        }
    }

    pub fn into_inner(self) -> W {
        self.inner.into_inner()
    }

    pub fn declaration(&mut self) -> WriteResult<()> {
        self.inner
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
        Ok(())
    }

    pub fn open(&mut self, element: ElementStart) -> WriteResult<()> {
        self.inner.write_event(Event::Start(element.start))?;
        Ok(())
    }

    pub fn close(&mut self, tag: Tag) -> WriteResult<()> {
        self.inner
            .write_event(Event::End(BytesEnd::new(tag.qualified_name())))?;
        Ok(())
    }

    /// Self-closing element carrying only attributes.
    pub fn empty(&mut self, element: ElementStart) -> WriteResult<()> {
        self.inner.write_event(Event::Empty(element.start))?;
        Ok(())
    }

    /// Element whose only content is escaped text.
    pub fn text_element(&mut self, element: ElementStart, text: &str) -> WriteResult<()> {
        let tag = element.tag;
        self.open(element)?;
        self.inner.write_event(Event::Text(BytesText::new(text)))?;
        self.close(tag)
    }

    pub fn text(&mut self, tag: Tag, text: &str) -> WriteResult<()> {
        self.text_element(ElementStart::new(tag), text)
    }
}
