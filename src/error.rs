use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NavigationError {
    #[error("cycle {index} is out of range ({limit} positions available)")]
    OutOfRange { index: usize, limit: usize },
}

/// Which half of the external run a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    Build,
    Execute,
}

impl std::fmt::Display for RunStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStage::Build => f.write_str("build"),
            RunStage::Execute => f.write_str("execute"),
        }
    }
}

/// The external build or execute step did not produce a trace.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("cannot split {stage} command: {command}")]
    InvalidCommand { stage: RunStage, command: String },
    #[error("failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("build failed")]
    BuildFailed { log: String },
    #[error("{stage} step timed out after {after:?}")]
    Timeout { stage: RunStage, after: Duration },
    #[error("run cancelled")]
    Cancelled,
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl RunError {
    /// Text to show the user verbatim.
    pub fn log(&self) -> String {
        match self {
            RunError::BuildFailed { log } => log.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("cannot read {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot write {path}: {source}")]
    Save {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("missing or invalid Content-Length header")]
    MissingLength,
    #[error("message of {length} bytes exceeds the size limit")]
    TooLarge { length: usize },
    #[error("malformed message: {0}")]
    Json(#[from] serde_json::Error),
}
