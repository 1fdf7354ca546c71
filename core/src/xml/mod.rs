pub mod cursor;
pub mod scalar;
pub mod vocabulary;
pub mod writer;

pub use cursor::XmlCursor;
pub use scalar::Parsed;
pub use vocabulary::{Attr, Namespace, Tag, SCHEMA_NAMESPACE, SCHEMA_PREFIX};
pub use writer::{ElementStart, MetadataWriter};
