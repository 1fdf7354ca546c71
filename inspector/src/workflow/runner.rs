use crate::workflow::config::WorkflowConfig;
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use vametacore::telemetry::LogManager;
use vametacore::{parse_bytes_with, write_string, Diagnostics, MetadataStream, WriteOptions};

/// Summary of one parsed document.
#[derive(Debug, Clone, Serialize)]
pub struct InspectionReport {
    pub analytics_sections: usize,
    pub frame_count: usize,
    pub object_count: usize,
    pub first_frame: Option<DateTime<Utc>>,
    pub last_frame: Option<DateTime<Utc>>,
    /// Objects per best-ranked class label.
    pub classes: BTreeMap<String, usize>,
    pub idle_objects: usize,
    pub removed_objects: usize,
    pub has_navigation: bool,
    pub original_data_bytes: usize,
    pub diagnostics_emitted: usize,
    pub diagnostics_suppressed: usize,
}

pub struct Runner {
    config: WorkflowConfig,
    diagnostics: Diagnostics,
    logger: LogManager,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        let diagnostics =
            Diagnostics::new(&config.to_diagnostics_config(), Arc::new(LogManager::new()));
        Self {
            config,
            diagnostics,
            logger: LogManager::new(),
        }
    }

    pub fn parse(&self, raw: &[u8]) -> anyhow::Result<MetadataStream> {
        let stream = parse_bytes_with(raw, &self.diagnostics).context("parsing metadata stream")?;
        self.logger.record(&format!(
            "parsed {} bytes into {} frames",
            raw.len(),
            stream.frames().count()
        ));
        Ok(stream)
    }

    pub fn inspect(&self, raw: &[u8]) -> anyhow::Result<InspectionReport> {
        let stream = self.parse(raw)?;
        Ok(self.summarize(&stream))
    }

    /// Parses and re-writes a document in canonical element order.
    pub fn normalize(&self, raw: &[u8]) -> anyhow::Result<String> {
        let stream = self.parse(raw)?;
        self.render(&stream)
    }

    pub fn render(&self, stream: &MetadataStream) -> anyhow::Result<String> {
        let options = WriteOptions {
            indent: self.config.pretty,
        };
        write_string(stream, options).context("writing metadata stream")
    }

    pub fn summarize(&self, stream: &MetadataStream) -> InspectionReport {
        let mut classes = BTreeMap::new();
        let mut object_count = 0;
        let mut idle_objects = 0;
        let mut removed_objects = 0;
        for object in stream.frames().flat_map(|frame| frame.objects()) {
            object_count += 1;
            let label = object
                .appearance
                .as_ref()
                .and_then(|appearance| appearance.class.as_ref())
                .and_then(|class| class.best())
                .and_then(|candidate| candidate.class_type.clone())
                .unwrap_or_else(|| "unclassified".to_string());
            *classes.entry(label).or_insert(0) += 1;
            if let Some(behaviour) = object.behaviour {
                idle_objects += usize::from(behaviour.is_idle);
                removed_objects += usize::from(behaviour.is_removed);
            }
        }

        let (diagnostics_emitted, diagnostics_suppressed) = self.diagnostics.throttle().snapshot();
        InspectionReport {
            analytics_sections: stream.video_analytics.len(),
            frame_count: stream.frames().count(),
            object_count,
            first_frame: stream.first_frame().map(|frame| frame.utc_time),
            last_frame: stream.frames().last().map(|frame| frame.utc_time),
            classes,
            idle_objects,
            removed_objects,
            has_navigation: stream.navigational_data.is_some(),
            original_data_bytes: stream.original_data.len(),
            diagnostics_emitted,
            diagnostics_suppressed,
        }
    }
}
