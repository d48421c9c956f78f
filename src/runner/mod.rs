//! Boundary to the external build + simulate step.
//!
//! The core never sees partial output: a run either hands back the complete
//! trace and error text, or fails as a whole.

mod process;

use serde::Serialize;

use crate::error::RunError;

pub use process::{CancelHandle, ProcessOrchestrator};

/// Everything a finished run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunOutput {
    pub trace: String,
    pub errors: String,
    pub success: bool,
}

/// Persists the program, builds and executes the simulator.
pub trait Orchestrator {
    fn run(&mut self, source: &str) -> Result<RunOutput, RunError>;
}
