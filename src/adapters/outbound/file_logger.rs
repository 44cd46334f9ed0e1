use crate::domains::logger::{DomainLogger, FileLogger};
use std::sync::Arc;

/// Initialize fast_log on `path` and hand back the logger to inject into services.
pub fn init_file_logger(path: &str) -> Result<Arc<dyn DomainLogger>, String> {
    FileLogger::init(path, log::LevelFilter::Info)
        .map_err(|e| format!("Failed to initialize fast_log: {}", e))?;
    Ok(Arc::new(FileLogger))
}
