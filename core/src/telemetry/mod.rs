pub mod log;
pub mod throttle;

use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

pub use self::log::LogManager;
pub use throttle::{Clock, DiagnosticThrottle, Site, SystemClock};

pub const DEFAULT_THROTTLE_INTERVAL: Duration = Duration::from_secs(60);

/// Receiver for element-level diagnostics. Implementations must not panic.
pub trait DiagnosticSink: Send + Sync {
    fn report(
        &self,
        source: &str,
        is_fatal: bool,
        operation: &str,
        message: &str,
        cause: Option<&(dyn std::error::Error + 'static)>,
    );
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    pub throttle_interval_secs: u64,
}

impl DiagnosticsConfig {
    pub fn throttle_interval(&self) -> Duration {
        Duration::from_secs(self.throttle_interval_secs)
    }
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            throttle_interval_secs: DEFAULT_THROTTLE_INTERVAL.as_secs(),
        }
    }
}

static GLOBAL: OnceCell<Diagnostics> = OnceCell::new();

/// Throttled diagnostic emission shared by every parser that is handed it.
pub struct Diagnostics {
    throttle: DiagnosticThrottle,
    sink: Arc<dyn DiagnosticSink>,
}

impl Diagnostics {
    pub fn new(config: &DiagnosticsConfig, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            throttle: DiagnosticThrottle::new(config.throttle_interval()),
            sink,
        }
    }

    pub fn with_clock(
        config: &DiagnosticsConfig,
        sink: Arc<dyn DiagnosticSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            throttle: DiagnosticThrottle::with_clock(config.throttle_interval(), clock),
            sink,
        }
    }

    /// The process-wide instance. Falls back to a `LogManager` sink with the
    /// default interval unless `install_global` ran first.
    pub fn global() -> &'static Diagnostics {
        GLOBAL.get_or_init(|| {
            Diagnostics::new(&DiagnosticsConfig::default(), Arc::new(LogManager::new()))
        })
    }

    /// Installs the process-wide instance. Fails, handing the value back, once
    /// the global has been installed or lazily created.
    pub fn install_global(diagnostics: Diagnostics) -> Result<(), Diagnostics> {
        GLOBAL.set(diagnostics)
    }

    pub fn throttle(&self) -> &DiagnosticThrottle {
        &self.throttle
    }

    /// Emits a non-fatal diagnostic for `site` unless one went out within the
    /// current interval. The message is only built when it will be emitted.
    pub fn warn<F>(&self, site: Site, message: F)
    where
        F: FnOnce() -> String,
    {
        self.report(site, false, message, None);
    }

    pub fn report<F>(
        &self,
        site: Site,
        is_fatal: bool,
        message: F,
        cause: Option<&(dyn std::error::Error + 'static)>,
    ) where
        F: FnOnce() -> String,
    {
        if self.throttle.permit(site) {
            self.sink
                .report(site.source, is_fatal, site.operation, &message(), cause);
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::recording;
    use super::*;

    #[test]
    fn warn_builds_message_only_when_permitted() {
        let (diagnostics, sink) = recording();
        let site = Site::new("Frame", "read");
        let mut built = 0;
        for _ in 0..3 {
            diagnostics.warn(site, || {
                built += 1;
                "missing UtcTime".to_string()
            });
        }
        assert_eq!(built, 1);
        assert_eq!(sink.messages(), vec!["Frame::read: missing UtcTime"]);
    }

    #[test]
    fn config_default_is_one_minute() {
        assert_eq!(
            DiagnosticsConfig::default().throttle_interval(),
            Duration::from_secs(60)
        );
    }
}
