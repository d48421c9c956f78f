use std::fs;
use std::io::Cursor;
use std::path::PathBuf;
use std::time::Duration;

use pipeline_inspector::console::{report_run, run_console};
use pipeline_inspector::error::{ConfigError, RunStage};
use pipeline_inspector::runner::{Orchestrator, RunOutput};
use pipeline_inspector::{IdeSession, RunError, RunnerConfig};
use pretty_assertions::assert_eq;

#[test]
fn test_partial_config_keeps_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("runner.json");
    fs::write(&path, r#"{ "timeout_secs": 5, "trace_path": null }"#).unwrap();

    let config = RunnerConfig::load(&path).unwrap();
    assert_eq!(config.timeout_secs, 5);
    assert_eq!(config.trace_path, None);
    assert_eq!(config.program_path, PathBuf::from("program.txt"));
    assert_eq!(config.build_command, "gcc {source} -o {binary}");
}

#[test]
fn test_malformed_config_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("runner.json");
    fs::write(&path, "{ timeout_secs: ").unwrap();

    assert!(matches!(
        RunnerConfig::load(&path),
        Err(ConfigError::Parse { .. })
    ));
    assert!(matches!(
        RunnerConfig::load(&dir.path().join("missing.json")),
        Err(ConfigError::Read { .. })
    ));
}

#[test]
fn test_command_expansion() {
    let config = RunnerConfig::default();
    assert_eq!(
        config.expand(&config.build_command),
        "gcc main.c -o cpu_simulation"
    );
    assert_eq!(config.expand(&config.run_command), "./cpu_simulation");
}

#[test]
fn test_console_walks_trace() {
    let mut session = IdeSession::new();
    session.load_trace(
        "### START OF CYCLE 1\nPC=0\n### END OF CYCLE 1\nFinal CPU State:\nR1=5\n",
    );

    let input = Cursor::new("n\nn\ng 9\np\nr\nq\n");
    let mut out = Vec::new();
    run_console(&mut session, None, input, &mut out).unwrap();
    let out = String::from_utf8(out).unwrap();

    assert!(out.contains("=== Cycle 1 of 1 ==="));
    assert!(out.contains("=== Final state ==="));
    assert!(out.contains("Already at the end of the trace"));
    assert!(out.contains("out of range"));
    assert!(out.contains("No simulator configured"));
    assert_eq!(session.navigator().position(), Some(0));
}

/// Fails every run with a fixed error.
struct FailingOrchestrator(Option<RunError>);

impl Orchestrator for FailingOrchestrator {
    fn run(&mut self, _source: &str) -> Result<RunOutput, RunError> {
        Err(self.0.take().unwrap_or(RunError::Cancelled))
    }
}

#[test]
fn test_run_timeout_is_reported_once() {
    let mut session = IdeSession::new();
    let mut orch = FailingOrchestrator(Some(RunError::Timeout {
        stage: RunStage::Execute,
        after: Duration::from_secs(1),
    }));
    let result = session.run(&mut orch);

    let mut out = Vec::new();
    report_run(&result, &session, &mut out).unwrap();
    let out = String::from_utf8(out).unwrap();

    assert_eq!(out.matches("timed out").count(), 1);
    assert!(out.contains("execute step timed out after 1s"));
}

#[test]
fn test_build_failure_log_is_echoed() {
    let mut session = IdeSession::new();
    let mut orch = FailingOrchestrator(Some(RunError::BuildFailed {
        log: "main.c:3: error: expected ';'".to_string(),
    }));

    let input = Cursor::new("r\nq\n");
    let mut out = Vec::new();
    let orch: &mut dyn Orchestrator = &mut orch;
    run_console(&mut session, Some(orch), input, &mut out).unwrap();
    let out = String::from_utf8(out).unwrap();

    assert!(out.contains("❌ Run failed: build failed"));
    assert_eq!(out.matches("expected ';'").count(), 1);
}
