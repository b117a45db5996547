//! Error types for worker lifecycle operations.

use thiserror::Error;

/// Errors raised while launching a stream worker.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// The start request carried no stream URL and no default is configured.
    #[error("no stream URL supplied and no default configured")]
    NoUrlConfigured,

    /// The worker executable could not be found on this host.
    #[error("worker executable not found: {0}")]
    ExecutableNotFound(String),

    /// The OS refused to spawn the worker process.
    #[error("failed to spawn worker: {0}")]
    SpawnFailed(#[source] std::io::Error),
}

/// Errors raised while stopping a stream worker.
#[derive(Debug, Error)]
pub enum StopError {
    /// The pid does not belong to a live worker started by this service.
    #[error("no running worker with that pid")]
    NotFound,

    /// The termination signal could not be dispatched.
    #[error("failed to signal worker: {0}")]
    SignalFailed(#[source] std::io::Error),
}
