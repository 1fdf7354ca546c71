use std::fmt;
use std::io::Write;

use crate::xml::{MetadataWriter, Tag, XmlCursor};

/// Line/column location inside a parsed document (both 1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Structural failure that aborts a whole parse call.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("document contains no root element")]
    MissingRoot,
    #[error(
        "unexpected root element `{name}` at {position}, expected `MetadataStream` in the ONVIF schema namespace"
    )]
    UnexpectedRoot { name: String, position: Position },
    #[error("malformed markup at {position}: {message}")]
    Malformed { message: String, position: Position },
    #[error("unexpected end of document at {position}")]
    UnexpectedEof { position: Position },
    #[error("input is not valid UTF-8: {0}")]
    Encoding(String),
    #[error("failed to read metadata stream: {0}")]
    Stream(Box<ParseError>),
}

impl ParseError {
    /// Location of the failure when the parser knew it.
    pub fn position(&self) -> Option<Position> {
        match self {
            ParseError::UnexpectedRoot { position, .. }
            | ParseError::Malformed { position, .. }
            | ParseError::UnexpectedEof { position } => Some(*position),
            ParseError::Stream(inner) => inner.position(),
            ParseError::MissingRoot | ParseError::Encoding(_) => None,
        }
    }
}

/// Failure while emitting a document.
#[derive(thiserror::Error, Debug)]
pub enum WriteError {
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("markup failure: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("timestamp {0} is outside years 0000-9999")]
    TimestampOutOfRange(chrono::DateTime<chrono::Utc>),
}

/// Domain error raised when a value is rejected at assignment or conversion time.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValueError {
    #[error("{field} must be {expected}, got {value}")]
    OutOfRange {
        field: &'static str,
        expected: &'static str,
        value: f64,
    },
    #[error("invalid color literal `{0}`, expected #AARRGGBB")]
    InvalidColor(String),
    #[error("invalid version tag `{0}`, expected MAJOR.MINOR")]
    InvalidVersion(String),
}

pub type ParseResult<T> = Result<T, ParseError>;
pub type WriteResult<T> = Result<T, WriteError>;

/// An entity of the metadata tree that owns one element on the wire.
///
/// `read` is entered with the cursor positioned on the entity's opening tag. It
/// may return anywhere inside the element; the parent's child iteration skips
/// to the closing tag. It only fails on structural problems: element-level
/// problems yield a best-effort value and a throttled diagnostic, leaving the
/// keep/discard decision to the parent.
pub trait XmlEntity: Sized {
    fn read(cursor: &mut XmlCursor<'_>) -> ParseResult<Self>;

    /// Writes the entity as element `tag`.
    fn write<W: Write>(&self, writer: &mut MetadataWriter<W>, tag: Tag) -> WriteResult<()>;
}
