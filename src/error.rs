use std::path::PathBuf;
use thiserror::Error;

/// Teleoperation error types
#[derive(Error, Debug)]
pub enum TeleopError {
    /// Operation repeated while its effect already holds (no-op)
    #[error("Redundant action: {0}")]
    RedundantAction(String),

    #[error("Invalid sample: {0}")]
    InvalidSample(String),

    #[error("Log I/O failed on {path}: {source}")]
    LogIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Drone link error: {0}")]
    Link(String),
}

impl TeleopError {
    pub fn log_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TeleopError::LogIo {
            path: path.into(),
            source,
        }
    }

    /// Whether the error only signals a repeated request.
    pub fn is_redundant(&self) -> bool {
        matches!(self, TeleopError::RedundantAction(_))
    }
}

/// Result type for teleoperation operations
pub type TeleopResult<T> = Result<T, TeleopError>;
