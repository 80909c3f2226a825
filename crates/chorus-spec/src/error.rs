//! Error types shared by the engine and its backends.
//!
//! Errors fall into two groups. Schedule errors are dispatch-blocking: they are
//! raised while validating configuration or generating schedules, before any
//! job exists. Probe, transform and script errors are scoped to one asset or
//! one job and are collected into batch results instead of aborting the run.

use std::path::PathBuf;
use thiserror::Error;

/// Common interface for errors that end up in a batch report.
///
/// # Example
///
/// ```
/// use chorus_spec::error::{BackendError, ScheduleError};
///
/// fn describe<E: BackendError>(err: &E) -> String {
///     format!("[{}] {}", err.code(), err.message())
/// }
///
/// let err = ScheduleError::EmptySchedule;
/// assert!(describe(&err).starts_with("[SCHEDULE_"));
/// ```
pub trait BackendError: std::error::Error {
    /// Stable code for programmatic handling, e.g. "PROBE_002".
    fn code(&self) -> &'static str;

    /// Human-readable message. Defaults to the `Display` output.
    fn message(&self) -> String {
        self.to_string()
    }

    /// Category used to group related errors ("schedule", "probe", ...).
    fn category(&self) -> &'static str;
}

/// Invalid generation bounds or an inconsistent schedule.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScheduleError {
    /// A parameter that must be finite was NaN or infinite.
    #[error("{name} must be finite, got {value}")]
    NotFinite { name: &'static str, value: f64 },

    /// A parameter that must be strictly positive was not.
    #[error("{name} must be positive, got {value}")]
    NotPositive { name: &'static str, value: f64 },

    /// A parameter was outside its allowed range.
    #[error("{name} must be in [{min}, {max}], got {value}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// The lower bound of a pair exceeded the upper bound.
    #[error("{lower_name} ({lower}) must not exceed {upper_name} ({upper})")]
    InvertedBounds {
        lower_name: &'static str,
        lower: f64,
        upper_name: &'static str,
        upper: f64,
    },

    /// A schedule with no segments cannot be automated.
    #[error("schedule contains no segments")]
    EmptySchedule,

    /// Segment and gain sequences must pair one-to-one.
    #[error("schedule has {segments} segments but {gains} gain points")]
    LengthMismatch { segments: usize, gains: usize },

    /// A gain point had the wrong number of channels.
    #[error("gain point {index} has {actual} channels, expected {expected}")]
    ChannelMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },
}

impl BackendError for ScheduleError {
    fn code(&self) -> &'static str {
        match self {
            ScheduleError::NotFinite { .. } => "SCHEDULE_001",
            ScheduleError::NotPositive { .. } => "SCHEDULE_002",
            ScheduleError::OutOfRange { .. } => "SCHEDULE_003",
            ScheduleError::InvertedBounds { .. } => "SCHEDULE_004",
            ScheduleError::EmptySchedule => "SCHEDULE_005",
            ScheduleError::LengthMismatch { .. } => "SCHEDULE_006",
            ScheduleError::ChannelMismatch { .. } => "SCHEDULE_007",
        }
    }

    fn category(&self) -> &'static str {
        "schedule"
    }
}

/// Failure to read duration information for an asset.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The probe executable could not be located.
    #[error("probe executable not found; install ffprobe or set CHORUS_FFMPEG_DIR")]
    ProbeNotFound,

    /// The probe process could not be started.
    #[error("failed to spawn probe for {path}: {source}")]
    SpawnFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The probe process exited with a non-zero status.
    #[error("probe exited with status {exit_code} for {path}: {stderr}")]
    ProcessFailed {
        path: PathBuf,
        exit_code: i32,
        stderr: String,
    },

    /// The asset has no audio stream.
    #[error("no audio stream in {path}")]
    NoAudioStream { path: PathBuf },

    /// The probe output could not be understood.
    #[error("malformed probe output for {path}: {message}")]
    Malformed { path: PathBuf, message: String },
}

impl ProbeError {
    /// Creates a malformed-output error.
    pub fn malformed(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Malformed {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl BackendError for ProbeError {
    fn code(&self) -> &'static str {
        match self {
            ProbeError::ProbeNotFound => "PROBE_001",
            ProbeError::SpawnFailed { .. } => "PROBE_002",
            ProbeError::ProcessFailed { .. } => "PROBE_003",
            ProbeError::NoAudioStream { .. } => "PROBE_004",
            ProbeError::Malformed { .. } => "PROBE_005",
        }
    }

    fn category(&self) -> &'static str {
        "probe"
    }
}

/// Unable to persist an out-of-band script artifact.
#[derive(Debug, Error)]
#[error("failed to write script artifact {path}: {source}")]
pub struct ScriptWriteError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

impl BackendError for ScriptWriteError {
    fn code(&self) -> &'static str {
        "SCRIPT_001"
    }

    fn category(&self) -> &'static str {
        "script"
    }
}

/// Failure of the external engine for one job.
#[derive(Debug, Error)]
pub enum TransformError {
    /// The engine executable could not be located.
    #[error("engine executable not found; install ffmpeg or set CHORUS_FFMPEG_DIR")]
    EngineNotFound,

    /// The engine process could not be started.
    #[error("failed to spawn engine: {0}")]
    SpawnFailed(#[source] std::io::Error),

    /// The engine ran longer than the configured timeout and was killed.
    #[error("engine timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// The engine exited with a non-zero status.
    #[error("engine exited with status {exit_code}: {stderr}")]
    ProcessFailed { exit_code: i32, stderr: String },

    /// The script artifact for the job could not be written.
    #[error(transparent)]
    ScriptWrite(#[from] ScriptWriteError),

    /// The finished output could not be moved onto its destination.
    #[error("failed to move output into place at {path}: {source}")]
    PersistFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The job was not started because the executor was shut down.
    #[error("job cancelled before it started")]
    Cancelled,

    /// Any other IO failure while preparing the job.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransformError {
    /// Creates a new process failed error.
    pub fn process_failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self::ProcessFailed {
            exit_code,
            stderr: stderr.into(),
        }
    }
}

impl BackendError for TransformError {
    fn code(&self) -> &'static str {
        match self {
            TransformError::EngineNotFound => "TRANSFORM_001",
            TransformError::SpawnFailed(_) => "TRANSFORM_002",
            TransformError::Timeout { .. } => "TRANSFORM_003",
            TransformError::ProcessFailed { .. } => "TRANSFORM_004",
            TransformError::ScriptWrite(e) => e.code(),
            TransformError::PersistFailed { .. } => "TRANSFORM_005",
            TransformError::Cancelled => "TRANSFORM_006",
            TransformError::Io(_) => "TRANSFORM_007",
        }
    }

    fn category(&self) -> &'static str {
        match self {
            TransformError::ScriptWrite(_) => "script",
            _ => "transform",
        }
    }
}

/// Failure to load a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file was not valid configuration JSON.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// The configuration parsed but holds invalid bounds.
    #[error("invalid config: {0}")]
    Invalid(#[from] ScheduleError),
}

impl BackendError for ConfigError {
    fn code(&self) -> &'static str {
        match self {
            ConfigError::Read { .. } => "CONFIG_001",
            ConfigError::Parse(_) => "CONFIG_002",
            ConfigError::Invalid(e) => e.code(),
        }
    }

    fn category(&self) -> &'static str {
        "config"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_error_display() {
        let err = ScheduleError::InvertedBounds {
            lower_name: "min_segment_secs",
            lower: 5.0,
            upper_name: "max_segment_secs",
            upper: 2.0,
        };
        assert!(err.to_string().contains("min_segment_secs (5)"));
        assert_eq!(err.code(), "SCHEDULE_004");
        assert_eq!(err.category(), "schedule");
    }

    #[test]
    fn test_transform_error_wraps_script_write() {
        let err: TransformError = ScriptWriteError {
            path: PathBuf::from("/tmp/abc.graph"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        }
        .into();
        assert_eq!(err.code(), "SCRIPT_001");
        assert_eq!(err.category(), "script");
        assert!(err.to_string().contains("abc.graph"));
    }

    #[test]
    fn test_process_failed_message() {
        let err = TransformError::process_failed(1, "Invalid argument");
        assert!(err.to_string().contains("status 1"));
        assert!(err.message().contains("Invalid argument"));
    }
}
