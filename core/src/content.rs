use once_cell::sync::OnceCell;

use crate::codec::{self, WriteOptions};
use crate::metadata::MetadataStream;
use crate::prelude::{ParseError, WriteResult};
use crate::telemetry::Diagnostics;

/// Raw metadata text paired with its parsed tree.
///
/// The tree is computed at most once, on first access. Concurrent first
/// readers block until the single parse finishes and then share its
/// result; a failed parse is cached the same way.
#[derive(Debug)]
pub struct MetadataContent {
    raw: String,
    parsed: OnceCell<Result<MetadataStream, ParseError>>,
}

impl MetadataContent {
    pub fn new(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            parsed: OnceCell::new(),
        }
    }

    /// Serializes `stream` and seeds the cache with it.
    pub fn from_stream(stream: MetadataStream) -> WriteResult<Self> {
        let raw = codec::write_string(&stream, WriteOptions::default())?;
        Ok(Self {
            raw,
            parsed: OnceCell::with_value(Ok(stream)),
        })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn is_parsed(&self) -> bool {
        self.parsed.get().is_some()
    }

    /// The parsed tree, using the process-wide diagnostics.
    pub fn metadata(&self) -> Result<&MetadataStream, ParseError> {
        self.metadata_with(Diagnostics::global())
    }

    /// The parsed tree. `diagnostics` only matters for the call that
    /// performs the parse.
    pub fn metadata_with(&self, diagnostics: &Diagnostics) -> Result<&MetadataStream, ParseError> {
        self.parsed
            .get_or_init(|| codec::parse_str_with(&self.raw, diagnostics))
            .as_ref()
            .map_err(Clone::clone)
    }
}

#[cfg(test)]
mod tests {
    use std::ptr;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;

    use super::*;
    use crate::telemetry::testing::recording;
    use crate::telemetry::{DiagnosticSink, DiagnosticsConfig};

    const DOCUMENT: &str = r#"<tt:MetadataStream xmlns:tt="http://www.onvif.org/ver10/schema">
  <tt:VideoAnalytics>
    <tt:Frame UtcTime="2024-01-01T00:00:00Z"/>
    <tt:Frame/>
  </tt:VideoAnalytics>
</tt:MetadataStream>"#;

    #[derive(Default)]
    struct CountingSink {
        reports: AtomicUsize,
    }

    impl DiagnosticSink for CountingSink {
        fn report(
            &self,
            _source: &str,
            _is_fatal: bool,
            _operation: &str,
            _message: &str,
            _cause: Option<&(dyn std::error::Error + 'static)>,
        ) {
            self.reports.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn concurrent_first_access_parses_once() {
        let sink = Arc::new(CountingSink::default());
        // A zero interval lets every parse report its dropped frame.
        let config = DiagnosticsConfig {
            throttle_interval_secs: 0,
        };
        let diagnostics = Diagnostics::new(&config, sink.clone());
        let content = MetadataContent::new(DOCUMENT);

        let seen: Vec<usize> = thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    scope.spawn(|| {
                        let stream = content.metadata_with(&diagnostics).unwrap();
                        stream as *const MetadataStream as usize
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let cached = content.metadata_with(&diagnostics).unwrap();
        assert!(seen
            .iter()
            .all(|&addr| ptr::eq(addr as *const MetadataStream, cached)));
        assert_eq!(sink.reports.load(Ordering::SeqCst), 1);
        assert!(content.is_parsed());
    }

    #[test]
    fn failed_parse_is_cached() {
        let (diagnostics, _) = recording();
        let content = MetadataContent::new("<tt:Wrong xmlns:tt=\"urn:x\"/>");
        assert!(!content.is_parsed());
        let first = content.metadata_with(&diagnostics).unwrap_err();
        let second = content.metadata_with(&diagnostics).unwrap_err();
        assert_eq!(first, second);
        assert_eq!(content.raw(), "<tt:Wrong xmlns:tt=\"urn:x\"/>");
    }

    #[test]
    fn from_stream_is_already_parsed() {
        let (diagnostics, _) = recording();
        let stream = codec::parse_str_with(DOCUMENT, &diagnostics).unwrap();
        let content = MetadataContent::from_stream(stream.clone()).unwrap();
        assert!(content.is_parsed());
        assert_eq!(content.metadata_with(&diagnostics).unwrap(), &stream);
        assert_eq!(codec::parse_str_with(content.raw(), &diagnostics).unwrap(), stream);
    }
}
