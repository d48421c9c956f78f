use super::markers::{classify, LineKind};
use super::types::{CycleRecord, FinalState, Trace};

/// Split raw simulator output into cycle records and the optional final state.
///
/// Never fails. Lines outside a START/END span are dropped unless they begin
/// the final-state section, and a START without a matching END contributes
/// nothing. When the final-state header shows up more than once, the last
/// occurrence wins.
pub fn parse(text: &str) -> Trace {
    let lines: Vec<&str> = text.lines().collect();

    let mut cycles = Vec::new();
    let mut cycle_data: Vec<&str> = Vec::new();
    let mut recording = false;
    let mut final_start: Option<usize> = None;

    for (i, &line) in lines.iter().enumerate() {
        match classify(line) {
            LineKind::CycleStart => {
                if recording && !cycle_data.is_empty() {
                    tracing::debug!(line = i + 1, "cycle restarted before its end marker");
                }
                cycle_data.clear();
                cycle_data.push(line);
                recording = true;
            }
            LineKind::CycleEnd if recording => {
                cycle_data.push(line);
                cycles.push(CycleRecord {
                    index: cycles.len(),
                    body: cycle_data.join("\n"),
                });
                cycle_data.clear();
                recording = false;
            }
            _ if recording => cycle_data.push(line),
            LineKind::FinalState => final_start = Some(i),
            // END without START, or producer noise
            _ => {}
        }
    }

    if recording {
        tracing::debug!(
            lines = cycle_data.len(),
            "dropping unterminated cycle at end of trace"
        );
    }

    let final_state = final_start.map(|start| FinalState {
        body: lines[start..].join("\n"),
    });

    tracing::debug!(
        cycles = cycles.len(),
        has_final = final_state.is_some(),
        "parsed trace"
    );

    Trace {
        cycles,
        final_state,
    }
}
