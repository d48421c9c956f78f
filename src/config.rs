//! Settings for the external build and run step.
//!
//! Every field has a default matching the stock simulator layout, so an
//! absent config file, or one that names only a few keys, is fine.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

mod defaults {
    pub const PROGRAM_PATH: &str = "program.txt";
    pub const SIMULATOR_SOURCE: &str = "main.c";
    pub const BINARY: &str = "cpu_simulation";
    pub const BUILD_COMMAND: &str = "gcc {source} -o {binary}";
    pub const RUN_COMMAND: &str = "./{binary}";
    pub const TRACE_PATH: &str = "cycledata.txt";
    pub const ERROR_LOG_PATH: &str = "errorlog.txt";
    pub const TIMEOUT_SECS: u64 = 30;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub working_dir: PathBuf,
    pub program_path: PathBuf,
    pub simulator_source: PathBuf,
    pub binary: PathBuf,
    /// Split with shell word rules after `{source}`, `{binary}` and `{program}` substitution.
    pub build_command: String,
    pub run_command: String,
    /// `None` reads the trace from the simulator's stdout instead of a file.
    pub trace_path: Option<PathBuf>,
    pub error_log_path: Option<PathBuf>,
    pub timeout_secs: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            working_dir: PathBuf::from("."),
            program_path: PathBuf::from(defaults::PROGRAM_PATH),
            simulator_source: PathBuf::from(defaults::SIMULATOR_SOURCE),
            binary: PathBuf::from(defaults::BINARY),
            build_command: defaults::BUILD_COMMAND.to_string(),
            run_command: defaults::RUN_COMMAND.to_string(),
            trace_path: Some(PathBuf::from(defaults::TRACE_PATH)),
            error_log_path: Some(PathBuf::from(defaults::ERROR_LOG_PATH)),
            timeout_secs: defaults::TIMEOUT_SECS,
        }
    }
}

impl RunnerConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded runner config");
        Ok(config)
    }

    /// `load` when a path is given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Resolve a configured path against `working_dir`.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.working_dir.join(path)
        }
    }

    /// Substitute placeholders into a command template.
    pub fn expand(&self, template: &str) -> String {
        template
            .replace("{source}", &self.simulator_source.to_string_lossy())
            .replace("{binary}", &self.binary.to_string_lossy())
            .replace("{program}", &self.program_path.to_string_lossy())
    }
}
