//! Error-log collaborator handed to the router at startup.

use tracing::error;

/// Fire-and-forget sink for the mapper's error lines.
pub trait ErrorLog: Send + Sync {
    fn log_error(&self, message: &str);
}

/// Forwards every line to `tracing` at ERROR, message untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingErrorLog;

impl ErrorLog for TracingErrorLog {
    fn log_error(&self, message: &str) {
        error!("{message}");
    }
}
