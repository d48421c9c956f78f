pub const CYCLE_START: &str = "### START OF CYCLE";
pub const CYCLE_END: &str = "### END OF CYCLE";
pub const FINAL_STATE: &str = "Final CPU State:";

/// How a single trace line affects the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    CycleStart,
    CycleEnd,
    FinalState,
    Content,
}

/// Classify a line by literal prefix. Trailing text after a marker is ignored here
/// and kept verbatim by the caller.
pub fn classify(line: &str) -> LineKind {
    if line.starts_with(CYCLE_START) {
        LineKind::CycleStart
    } else if line.starts_with(CYCLE_END) {
        LineKind::CycleEnd
    } else if line.starts_with(FINAL_STATE) {
        LineKind::FinalState
    } else {
        LineKind::Content
    }
}
