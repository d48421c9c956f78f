use std::io::{self, BufRead, Write};

use crate::error::RunError;
use crate::navigator::NavState;
use crate::runner::Orchestrator;
use crate::session::{IdeSession, RunStatus};

const HELP: &str =
    "Commands: (n)ext, (p)revious, (g)oto <index>, (c)urrent, (r)un, (e)rrors, (q)uit";

/// Interactive cycle browser. Reads commands line by line until `q` or end of input.
pub fn run_console<R: BufRead, W: Write>(
    session: &mut IdeSession,
    mut orchestrator: Option<&mut dyn Orchestrator>,
    input: R,
    out: &mut W,
) -> io::Result<()> {
    show(session, out)?;

    let mut lines = input.lines();
    loop {
        writeln!(out, "\n{HELP} [{}]", session.navigator().next_label())?;
        write!(out, "> ")?;
        out.flush()?;

        let Some(line) = lines.next() else { break };
        let line = line?;
        let mut words = line.split_whitespace();
        let cmd = words.next().unwrap_or("");

        match cmd {
            "n" | "next" | "" => {
                if session.next() {
                    show(session, out)?;
                } else {
                    writeln!(out, "Already at the end of the trace")?;
                }
            }
            "p" | "prev" | "previous" => {
                if session.previous() {
                    show(session, out)?;
                } else {
                    writeln!(out, "Already at the first cycle")?;
                }
            }
            "g" | "goto" => match words.next().map(str::parse::<usize>) {
                Some(Ok(index)) => match session.go_to(index) {
                    Ok(()) => show(session, out)?,
                    Err(e) => writeln!(out, "❌ {e}")?,
                },
                _ => writeln!(out, "❌ Invalid cycle index")?,
            },
            "c" | "current" => show(session, out)?,
            "r" | "run" => match orchestrator.as_deref_mut() {
                Some(orch) => {
                    let result = session.run(orch);
                    report_run(&result, session, out)?;
                    show(session, out)?;
                }
                None => writeln!(out, "❌ No simulator configured in this mode")?,
            },
            "e" | "errors" => {
                if session.error_log().trim().is_empty() {
                    writeln!(out, "(error log is empty)")?;
                } else {
                    writeln!(out, "{}", session.error_log())?;
                }
            }
            "q" | "quit" => break,
            other => writeln!(out, "❓ Unknown command: {other}")?,
        }
    }

    Ok(())
}

/// Prints the outcome of a run. The error log is only echoed when it holds
/// something the error message does not already say: simulator stderr after
/// a finished run, or the compiler output of a failed build.
pub fn report_run<W: Write>(
    result: &Result<RunStatus, RunError>,
    session: &IdeSession,
    out: &mut W,
) -> io::Result<()> {
    let echo_log = match result {
        Ok(status) => {
            writeln!(out, "Run finished: {status:?}")?;
            true
        }
        Err(e @ RunError::BuildFailed { .. }) => {
            writeln!(out, "❌ Run failed: {e}")?;
            true
        }
        Err(e) => {
            writeln!(out, "❌ Run failed: {e}")?;
            false
        }
    };
    if echo_log && !session.error_log().trim().is_empty() {
        writeln!(out, "{}", session.error_log())?;
    }
    Ok(())
}

fn show<W: Write>(session: &IdeSession, out: &mut W) -> io::Result<()> {
    let nav = session.navigator();
    match nav.state() {
        NavState::Empty => writeln!(out, "\n=== No cycles to display ===")?,
        NavState::Browsing(i) => writeln!(
            out,
            "\n=== Cycle {} of {} ===",
            i + 1,
            nav.cycle_count()
        )?,
        NavState::ViewingFinal => writeln!(out, "\n=== Final state ===")?,
    }
    if !session.current().is_empty() {
        writeln!(out, "{}", session.current())?;
    }
    Ok(())
}
