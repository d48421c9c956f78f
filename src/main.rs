use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pipeline_inspector::console::{report_run, run_console};
use pipeline_inspector::protocol;
use pipeline_inspector::runner::{Orchestrator, ProcessOrchestrator};
use pipeline_inspector::{IdeSession, RunnerConfig};

#[derive(Parser, Debug)]
#[command(name = "pipeline-inspector", version, about = "Browse pipeline simulator traces and check programs")]
struct Cli {
    /// Log filter (e.g. `info`, `pipeline_inspector=debug`); overrides RUST_LOG.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// JSON file with build/run settings.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Tokenize, validate and check a program file.
    Check { file: PathBuf },
    /// Browse a saved trace file.
    View { trace: PathBuf },
    /// Build and run the simulator, then browse its trace.
    Run {
        /// Program to run; defaults to the configured program path.
        #[arg(short, long)]
        program: Option<PathBuf>,
    },
    /// Serve the front-end protocol on stdin/stdout.
    Serve,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());

    match dispatch(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(level: Option<&str>) {
    let filter = match level {
        Some(l) => EnvFilter::new(l),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn dispatch(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let config = RunnerConfig::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Command::Check { file } => {
            let mut session = IdeSession::new();
            session.load_source(&file)?;
            let analysis = session.analyze();

            if let Some(w) = &analysis.warning {
                println!("warning: {w}");
            }
            for d in &analysis.assembly.diagnostics {
                println!("{}: {d}", file.display());
            }
            println!(
                "{} instruction words, {} diagnostics",
                analysis.assembly.words.len(),
                analysis.assembly.diagnostics.len()
            );

            Ok(if analysis.assembly.is_clean() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::View { trace } => {
            let text = fs::read_to_string(&trace)?;
            let mut session = IdeSession::new();
            session.load_trace(&text);

            let stdin = io::stdin();
            run_console(&mut session, None, stdin.lock(), &mut io::stdout())?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Run { program } => {
            let program = program.unwrap_or_else(|| config.resolve(&config.program_path));
            let mut session = IdeSession::new();
            session.load_source(&program)?;

            if let Some(w) = session.analyze().warning {
                eprintln!("warning: {w}");
            }

            let mut orchestrator = ProcessOrchestrator::new(config);
            let result = session.run(&mut orchestrator);
            report_run(&result, &session, &mut io::stderr())?;

            let stdin = io::stdin();
            let orch: &mut dyn Orchestrator = &mut orchestrator;
            run_console(&mut session, Some(orch), stdin.lock(), &mut io::stdout())?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Serve => {
            let mut session = IdeSession::new();
            session.load_source(&config.resolve(&config.program_path))?;
            protocol::run_stdio(session, Some(Box::new(ProcessOrchestrator::new(config))))?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
