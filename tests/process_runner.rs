#![cfg(unix)]

use std::fs;
use std::path::Path;

use pipeline_inspector::runner::{Orchestrator, ProcessOrchestrator};
use pipeline_inspector::{RunError, RunnerConfig};

fn config_in(dir: &Path) -> RunnerConfig {
    RunnerConfig {
        working_dir: dir.to_path_buf(),
        build_command: "true".to_string(),
        run_command: "sh simulate.sh".to_string(),
        timeout_secs: 10,
        ..RunnerConfig::default()
    }
}

fn write_script(dir: &Path, body: &str) {
    fs::write(dir.join("simulate.sh"), body).unwrap();
}

#[test]
fn test_run_reads_trace_and_error_files() {
    let dir = tempfile::tempdir().unwrap();
    write_script(
        dir.path(),
        "printf '### START OF CYCLE 1\\nPC=0\\n### END OF CYCLE 1\\n' > cycledata.txt\n\
         echo 'warning: R0 written' > errorlog.txt\n",
    );

    let mut orch = ProcessOrchestrator::new(config_in(dir.path()));
    let output = orch.run("ADD R1 R2\n").unwrap();

    assert!(output.success);
    assert_eq!(
        output.trace,
        "### START OF CYCLE 1\nPC=0\n### END OF CYCLE 1\n"
    );
    assert_eq!(output.errors, "warning: R0 written\n");
    assert_eq!(
        fs::read_to_string(dir.path().join("program.txt")).unwrap(),
        "ADD R1 R2\n"
    );
}

#[test]
fn test_stale_outputs_are_cleared() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("cycledata.txt"), "### START OF CYCLE 9\n### END OF CYCLE 9\n").unwrap();
    write_script(dir.path(), "exit 0\n");

    let mut orch = ProcessOrchestrator::new(config_in(dir.path()));
    let output = orch.run("").unwrap();
    assert_eq!(output.trace, "");
}

#[test]
fn test_trace_from_stdout() {
    let dir = tempfile::tempdir().unwrap();
    write_script(
        dir.path(),
        "echo '### START OF CYCLE 1'\necho '### END OF CYCLE 1'\necho oops >&2\nexit 3\n",
    );

    let mut config = config_in(dir.path());
    config.trace_path = None;
    config.error_log_path = None;

    let mut orch = ProcessOrchestrator::new(config);
    let output = orch.run("").unwrap();

    assert!(!output.success);
    assert_eq!(output.trace, "### START OF CYCLE 1\n### END OF CYCLE 1\n");
    assert_eq!(output.errors, "oops\n");
}

#[test]
fn test_build_failure_carries_log() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.build_command = "sh -c 'echo \"main.c:3: error\" >&2; exit 1'".to_string();

    let mut orch = ProcessOrchestrator::new(config);
    match orch.run("") {
        Err(RunError::BuildFailed { log }) => assert!(log.contains("main.c:3: error")),
        other => panic!("expected build failure, got {other:?}"),
    }
}

#[test]
fn test_timeout_is_a_run_failure() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.run_command = "sleep 5".to_string();
    config.timeout_secs = 1;

    let mut orch = ProcessOrchestrator::new(config);
    assert!(matches!(orch.run(""), Err(RunError::Timeout { .. })));
}

#[test]
fn test_timeout_covers_background_children_holding_output() {
    let dir = tempfile::tempdir().unwrap();
    write_script(dir.path(), "sleep 6 &\nexit 0\n");
    let mut config = config_in(dir.path());
    config.timeout_secs = 1;

    let mut orch = ProcessOrchestrator::new(config);
    let start = std::time::Instant::now();
    let result = orch.run("");

    assert!(matches!(result, Err(RunError::Timeout { .. })), "{result:?}");
    assert!(start.elapsed() < std::time::Duration::from_secs(4));
}

#[test]
fn test_cancel_aborts_run() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.run_command = "sleep 5".to_string();

    let mut orch = ProcessOrchestrator::new(config);
    let handle = orch.cancel_handle();
    let canceller = std::thread::spawn(move || {
        std::thread::sleep(std::time::Duration::from_millis(200));
        handle.cancel();
    });

    assert!(matches!(orch.run(""), Err(RunError::Cancelled)));
    canceller.join().unwrap();
}

#[test]
fn test_missing_program_is_spawn_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.build_command = "definitely-not-a-real-compiler-xyz".to_string();

    let mut orch = ProcessOrchestrator::new(config);
    assert!(matches!(orch.run(""), Err(RunError::Spawn { .. })));
}

#[test]
fn test_empty_command_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.build_command = "   ".to_string();

    let mut orch = ProcessOrchestrator::new(config);
    assert!(matches!(orch.run(""), Err(RunError::InvalidCommand { .. })));
}
