use std::io::Write;

use serde::Serialize;

use crate::prelude::{ParseResult, WriteResult, XmlEntity};
use crate::telemetry::Site;
use crate::xml::scalar::{format_float, parse_float};
use crate::xml::{ElementStart, MetadataWriter, Namespace, Tag, XmlCursor};

const CLASS_READ: Site = Site::new("OnvifClass", "read");

/// One classification hypothesis for an object.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClassCandidate {
    #[serde(rename = "type")]
    pub class_type: Option<String>,
    pub likelihood: f64,
}

impl ClassCandidate {
    pub fn new(class_type: impl Into<String>, likelihood: f64) -> Self {
        Self {
            class_type: Some(class_type.into()),
            likelihood,
        }
    }

    /// A named type with likelihood in (0, 1].
    pub fn is_valid(&self) -> bool {
        let named = self
            .class_type
            .as_deref()
            .is_some_and(|name| !name.trim().is_empty());
        named && self.likelihood > 0.0 && self.likelihood <= 1.0
    }
}

impl XmlEntity for ClassCandidate {
    fn read(cursor: &mut XmlCursor<'_>) -> ParseResult<Self> {
        let mut candidate = ClassCandidate::default();
        cursor.for_each_child(Namespace::Schema, |cursor, tag| {
            match tag {
                Tag::Type => candidate.class_type = Some(cursor.read_text()?),
                // an unparseable likelihood stays 0 and fails validation
                Tag::Likelihood => {
                    candidate.likelihood = cursor.parsed_text(parse_float)?.value().unwrap_or(0.0)
                }
                _ => {}
            }
            Ok(())
        })?;
        Ok(candidate)
    }

    fn write<W: Write>(&self, writer: &mut MetadataWriter<W>, tag: Tag) -> WriteResult<()> {
        writer.open(ElementStart::new(tag))?;
        if let Some(class_type) = &self.class_type {
            writer.text(Tag::Type, class_type)?;
        }
        writer.text(Tag::Likelihood, &format_float(self.likelihood))?;
        writer.close(tag)
    }
}

/// Ordered classification candidates; only valid candidates are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OnvifClass {
    pub candidates: Vec<ClassCandidate>,
}

impl OnvifClass {
    pub fn new(candidates: Vec<ClassCandidate>) -> Self {
        Self { candidates }
    }

    /// Candidate with the highest likelihood; the earliest wins ties.
    pub fn best(&self) -> Option<&ClassCandidate> {
        self.candidates.iter().fold(None, |best, candidate| match best {
            Some(current) if current.likelihood >= candidate.likelihood => Some(current),
            _ => Some(candidate),
        })
    }
}

impl XmlEntity for OnvifClass {
    fn read(cursor: &mut XmlCursor<'_>) -> ParseResult<Self> {
        let mut class = OnvifClass::default();
        cursor.for_each_child(Namespace::Schema, |cursor, tag| {
            if tag != Tag::ClassCandidate {
                return Ok(());
            }
            let candidate = ClassCandidate::read(cursor)?;
            if candidate.is_valid() {
                class.candidates.push(candidate);
            } else {
                cursor.diagnostics().warn(CLASS_READ, || {
                    format!(
                        "dropping invalid ClassCandidate (type {:?}, likelihood {})",
                        candidate.class_type, candidate.likelihood
                    )
                });
            }
            Ok(())
        })?;
        Ok(class)
    }

    fn write<W: Write>(&self, writer: &mut MetadataWriter<W>, tag: Tag) -> WriteResult<()> {
        writer.open(ElementStart::new(tag))?;
        for candidate in &self.candidates {
            candidate.write(writer, Tag::ClassCandidate)?;
        }
        writer.close(tag)
    }
}
