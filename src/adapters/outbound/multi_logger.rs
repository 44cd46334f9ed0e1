use crate::domains::logger::DomainLogger;
use std::sync::Arc;

/// Forwards to a primary logger and optionally a secondary one.
pub struct MultiLogger {
    primary: Arc<dyn DomainLogger>,
    secondary: Option<Arc<dyn DomainLogger>>,
}

impl MultiLogger {
    pub fn new(primary: Arc<dyn DomainLogger>, secondary: Option<Arc<dyn DomainLogger>>) -> Self {
        Self { primary, secondary }
    }
}

impl DomainLogger for MultiLogger {
    fn info(&self, msg: &str) {
        self.primary.info(msg);
        if let Some(sec) = &self.secondary {
            sec.info(msg);
        }
    }

    fn warn(&self, msg: &str) {
        self.primary.warn(msg);
        if let Some(sec) = &self.secondary {
            sec.warn(msg);
        }
    }

    fn error(&self, msg: &str) {
        self.primary.error(msg);
        if let Some(sec) = &self.secondary {
            sec.error(msg);
        }
    }
}

/// Domain logger for the binaries: file (via fast_log) plus tracing console
/// when `file` is set and fast_log starts, tracing console alone otherwise.
pub fn init_domain_logger(file: Option<&str>) -> Arc<dyn DomainLogger> {
    let console = crate::adapters::outbound::init_console_logger();
    let Some(path) = file else {
        return console;
    };
    match crate::adapters::outbound::file_logger::init_file_logger(path) {
        Ok(file_logger) => {
            Arc::new(MultiLogger::new(file_logger, Some(console))) as Arc<dyn DomainLogger>
        }
        Err(e) => {
            console.warn(&format!("{}; logging to console only", e));
            console
        }
    }
}
