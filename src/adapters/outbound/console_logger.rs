use crate::domains::logger::DomainLogger;
use std::sync::Arc;

/// Routes domain log lines into `tracing` so they share the subscriber
/// configured by the binary.
struct TracingBridge;

impl DomainLogger for TracingBridge {
    fn info(&self, msg: &str) { tracing::info!(target: "transit_sim::domain", "{}", msg); }
    fn warn(&self, msg: &str) { tracing::warn!(target: "transit_sim::domain", "{}", msg); }
    fn error(&self, msg: &str) { tracing::error!(target: "transit_sim::domain", "{}", msg); }
}

/// Console-backed DomainLogger, also the fallback when no log file is configured.
pub fn init_console_logger() -> Arc<dyn DomainLogger> {
    Arc::new(TracingBridge {})
}
