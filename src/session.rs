use std::fs;
use std::io;
use std::path::Path;

use serde::Serialize;

use crate::error::{NavigationError, RunError, SessionError};
use crate::navigator::Navigator;
use crate::runner::Orchestrator;
use crate::source::{assemble, tokenize, validate, Assembly, Token, Validation, Warning};
use crate::trace::{self, Trace};

/// Highlighting and validation of one source snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis<'a> {
    pub tokens: Vec<Token<'a>>,
    pub validation: Validation,
    pub warning: Option<Warning>,
    pub assembly: Assembly,
}

/// How the last run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RunStatus {
    Succeeded,
    /// The simulator ran but reported failure; its trace is still shown.
    Failed,
    /// Nothing was simulated; only the error log is meaningful.
    Aborted,
}

/// One editing/inspection session: the source buffer, the current trace and
/// the error log of the last run.
///
/// Every operation runs to completion before the next one starts, so a
/// tokenizing pass always sees a single snapshot of the buffer.
#[derive(Debug, Default)]
pub struct IdeSession {
    source: String,
    navigator: Navigator,
    error_log: String,
    last_run: Option<RunStatus>,
}

impl IdeSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn set_source(&mut self, text: impl Into<String>) {
        self.source = text.into();
    }

    /// Replace the buffer with a file's contents. A missing file leaves the
    /// buffer empty.
    pub fn load_source(&mut self, path: &Path) -> Result<(), SessionError> {
        match fs::read_to_string(path) {
            Ok(text) => {
                tracing::info!(path = %path.display(), bytes = text.len(), "loaded program");
                self.source = text;
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "no program file, starting empty");
                self.source.clear();
                Ok(())
            }
            Err(source) => Err(SessionError::Load {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn save_source(&self, path: &Path) -> Result<(), SessionError> {
        fs::write(path, &self.source).map_err(|source| SessionError::Save {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), bytes = self.source.len(), "saved program");
        Ok(())
    }

    /// Tokenize, validate and check the current buffer.
    pub fn analyze(&self) -> Analysis<'_> {
        let tokens: Vec<Token<'_>> = tokenize(&self.source).collect();
        let validation = validate(&tokens);
        let warning = validation.warning();
        if let Some(w) = &warning {
            tracing::warn!(occurrences = w.occurrences, "{w}");
        }
        Analysis {
            tokens,
            validation,
            warning,
            assembly: assemble(&self.source),
        }
    }

    /// Parse trace text as if a run had just produced it.
    pub fn load_trace(&mut self, text: &str) -> &Trace {
        self.navigator.reset(trace::parse(text));
        self.navigator.trace()
    }

    /// Hand the buffer to the orchestrator and install the resulting trace.
    ///
    /// On failure the previous trace is dropped and only the error log is kept.
    pub fn run(&mut self, orchestrator: &mut dyn Orchestrator) -> Result<RunStatus, RunError> {
        match orchestrator.run(&self.source) {
            Ok(output) => {
                self.error_log = output.errors;
                self.load_trace(&output.trace);
                let status = if output.success {
                    RunStatus::Succeeded
                } else {
                    RunStatus::Failed
                };
                tracing::info!(
                    ?status,
                    cycles = self.navigator.cycle_count(),
                    "run complete"
                );
                self.last_run = Some(status);
                Ok(status)
            }
            Err(e) => {
                tracing::warn!(error = %e, "run failed");
                self.error_log = e.log();
                self.navigator.reset(Trace::default());
                self.last_run = Some(RunStatus::Aborted);
                Err(e)
            }
        }
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn next(&mut self) -> bool {
        self.navigator.next()
    }

    pub fn previous(&mut self) -> bool {
        self.navigator.previous()
    }

    pub fn go_to(&mut self, index: usize) -> Result<(), NavigationError> {
        self.navigator.go_to(index)
    }

    pub fn current(&self) -> &str {
        self.navigator.current()
    }

    pub fn error_log(&self) -> &str {
        &self.error_log
    }

    pub fn last_run(&self) -> Option<RunStatus> {
        self.last_run
    }
}
