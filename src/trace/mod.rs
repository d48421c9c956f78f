mod markers;
mod parser;
mod types;

pub use markers::{classify, LineKind, CYCLE_END, CYCLE_START, FINAL_STATE};
pub use parser::parse;
pub use types::{CycleRecord, FinalState, Trace};
