//! Codec for ONVIF-style video-analytics metadata streams.
//!
//! Documents are read through a forward-only, namespace-aware cursor into an
//! owned entity tree and written back in a fixed element order. Malformed
//! sub-elements are dropped individually with rate-limited diagnostics; only
//! structural problems fail a parse.

pub mod codec;
pub mod content;
pub mod metadata;
pub mod prelude;
pub mod telemetry;
pub mod xml;

pub use codec::{
    parse_bytes, parse_bytes_with, parse_str, parse_str_with, write_bytes, write_string, write_to,
    write_to_with, WriteOptions,
};
pub use content::MetadataContent;
pub use metadata::MetadataStream;
pub use prelude::{ParseError, Position, ValueError, WriteError, XmlEntity};
pub use telemetry::{DiagnosticSink, Diagnostics, DiagnosticsConfig};
