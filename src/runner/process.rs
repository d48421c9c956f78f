use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use super::{Orchestrator, RunOutput};
use crate::config::RunnerConfig;
use crate::error::{RunError, RunStage};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Aborts an in-flight run from another thread.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

struct Captured {
    status: ExitStatus,
    stdout: String,
    stderr: String,
}

/// Runs the configured build and run commands as child processes.
#[derive(Debug)]
pub struct ProcessOrchestrator {
    config: RunnerConfig,
    cancel: CancelHandle,
}

impl ProcessOrchestrator {
    pub fn new(config: RunnerConfig) -> Self {
        Self {
            config,
            cancel: CancelHandle::default(),
        }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    fn persist(&self, source: &str) -> io::Result<()> {
        let path = self.config.resolve(&self.config.program_path);
        fs::write(&path, source)?;
        tracing::debug!(path = %path.display(), bytes = source.len(), "saved program");
        Ok(())
    }

    /// Truncate output files so a failed run cannot surface the previous run's output.
    fn clear_outputs(&self) -> io::Result<()> {
        for path in [&self.config.trace_path, &self.config.error_log_path]
            .into_iter()
            .flatten()
        {
            fs::write(self.config.resolve(path), "")?;
        }
        Ok(())
    }

    fn execute(&self, stage: RunStage, template: &str) -> Result<Captured, RunError> {
        let line = self.config.expand(template);
        let argv = shlex::split(&line).unwrap_or_default();
        let Some((program, args)) = argv.split_first() else {
            return Err(RunError::InvalidCommand {
                stage,
                command: line,
            });
        };

        tracing::info!(%stage, command = %line, "starting");

        let mut child = Command::new(self.program_path(program))
            .args(args)
            .current_dir(&self.config.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| RunError::Spawn {
                command: line.clone(),
                source,
            })?;

        let deadline = Instant::now() + self.config.timeout();
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());
        let status = self.wait(&mut child, stage, deadline)?;

        // pipes stay open while any grandchild holds them, so the deadline covers collection too
        let captured = Captured {
            status,
            stdout: self.collect(stdout, stage, deadline)?,
            stderr: self.collect(stderr, stage, deadline)?,
        };
        tracing::info!(%stage, code = ?captured.status.code(), "finished");
        Ok(captured)
    }

    fn wait(
        &self,
        child: &mut Child,
        stage: RunStage,
        deadline: Instant,
    ) -> Result<ExitStatus, RunError> {
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(status);
            }
            if self.cancel.is_cancelled() {
                tracing::warn!(%stage, "run cancelled, killing child");
                kill(child);
                return Err(RunError::Cancelled);
            }
            if Instant::now() >= deadline {
                tracing::warn!(%stage, "timed out, killing child");
                kill(child);
                return Err(self.timed_out(stage));
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    /// Wait for a drained pipe, giving up at the stage deadline.
    fn collect(
        &self,
        output: Option<Receiver<String>>,
        stage: RunStage,
        deadline: Instant,
    ) -> Result<String, RunError> {
        let Some(rx) = output else {
            return Ok(String::new());
        };
        loop {
            if self.cancel.is_cancelled() {
                return Err(RunError::Cancelled);
            }
            let left = deadline.saturating_duration_since(Instant::now());
            if left.is_zero() {
                tracing::warn!(%stage, "output still open at deadline");
                return Err(self.timed_out(stage));
            }
            match rx.recv_timeout(left.min(POLL_INTERVAL)) {
                Ok(text) => return Ok(text),
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => return Ok(String::new()),
            }
        }
    }

    fn timed_out(&self, stage: RunStage) -> RunError {
        RunError::Timeout {
            stage,
            after: self.config.timeout(),
        }
    }

    /// A relative program with a directory part is taken relative to `working_dir`.
    fn program_path(&self, program: &str) -> PathBuf {
        let path = Path::new(program);
        if path.is_relative() && path.components().count() > 1 {
            self.config.resolve(path)
        } else {
            path.to_path_buf()
        }
    }

    fn read_output(&self, path: &Path) -> io::Result<String> {
        match fs::read(self.config.resolve(path)) {
            Ok(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(e),
        }
    }
}

impl Orchestrator for ProcessOrchestrator {
    fn run(&mut self, source: &str) -> Result<RunOutput, RunError> {
        self.cancel.reset();
        self.persist(source)?;
        self.clear_outputs()?;

        let build = self.execute(RunStage::Build, &self.config.build_command)?;
        if !build.status.success() {
            let mut log = build.stderr;
            log.push_str(&build.stdout);
            return Err(RunError::BuildFailed { log });
        }

        let run = self.execute(RunStage::Execute, &self.config.run_command)?;

        let trace = match &self.config.trace_path {
            Some(path) => self.read_output(path)?,
            None => run.stdout,
        };
        let mut errors = match &self.config.error_log_path {
            Some(path) => self.read_output(path)?,
            None => String::new(),
        };
        errors.push_str(&run.stderr);

        Ok(RunOutput {
            trace,
            errors,
            success: run.status.success(),
        })
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<Receiver<String>> {
    pipe.map(|mut pipe| {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            let _ = tx.send(String::from_utf8_lossy(&buf).into_owned());
        });
        rx
    })
}

fn kill(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}
