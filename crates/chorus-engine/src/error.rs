//! Dispatch-blocking engine errors.
//!
//! Per-asset and per-job failures never surface here; they are recorded in
//! stage reports. An [`EngineError`] stops the run before the affected stage
//! dispatches anything.

use std::path::PathBuf;

use chorus_spec::{BackendError, ScheduleError};
use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that prevent a stage from being dispatched.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Invalid generation bounds.
    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    /// The worker pool could not be created.
    #[error("failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    /// A stage output directory could not be created.
    #[error("failed to create stage directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BackendError for EngineError {
    fn code(&self) -> &'static str {
        match self {
            EngineError::Schedule(e) => e.code(),
            EngineError::WorkerPool(_) => "ENGINE_001",
            EngineError::CreateDir { .. } => "ENGINE_002",
        }
    }

    fn category(&self) -> &'static str {
        match self {
            EngineError::Schedule(_) => "schedule",
            _ => "engine",
        }
    }
}
