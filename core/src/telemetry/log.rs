use log::{error, info, warn};

use super::DiagnosticSink;

/// Diagnostic sink backed by the `log` facade.
pub struct LogManager;

impl LogManager {
    pub fn new() -> Self {
        Self
    }

    pub fn record(&self, message: &str) {
        info!("{}", message);
    }
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagnosticSink for LogManager {
    fn report(
        &self,
        source: &str,
        is_fatal: bool,
        operation: &str,
        message: &str,
        cause: Option<&(dyn std::error::Error + 'static)>,
    ) {
        match (is_fatal, cause) {
            (true, Some(cause)) => error!("{}::{}: {} ({})", source, operation, message, cause),
            (true, None) => error!("{}::{}: {}", source, operation, message),
            (false, Some(cause)) => warn!("{}::{}: {} ({})", source, operation, message, cause),
            (false, None) => warn!("{}::{}: {}", source, operation, message),
        }
    }
}
