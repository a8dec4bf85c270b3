//! Status events emitted by a pipeline run

use tracing::{error, info};

/// Receives the discrete status events of a run. Nothing in the pipeline
/// depends on what the sink does with them.
pub trait StatusLog: Send + Sync {
    fn info(&self, message: &str);
    fn error(&self, message: &str);
}

/// Forwards status events to `tracing` under the `status` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingStatus;

impl StatusLog for TracingStatus {
    fn info(&self, message: &str) {
        info!(target: "status", "{}", message);
    }

    fn error(&self, message: &str) {
        error!(target: "status", "{}", message);
    }
}
