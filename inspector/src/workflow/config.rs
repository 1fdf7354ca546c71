use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use vametacore::telemetry::{DiagnosticsConfig, DEFAULT_THROTTLE_INTERVAL};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Minimum seconds between two diagnostics from the same failure site.
    pub throttle_interval_secs: u64,
    /// Indent written documents.
    pub pretty: bool,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            throttle_interval_secs: DEFAULT_THROTTLE_INTERVAL.as_secs(),
            pretty: false,
        }
    }
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(throttle_interval_secs: u64, pretty: bool) -> Self {
        Self {
            throttle_interval_secs,
            pretty,
        }
    }

    pub fn to_diagnostics_config(&self) -> DiagnosticsConfig {
        DiagnosticsConfig {
            throttle_interval_secs: self.throttle_interval_secs,
        }
    }
}
