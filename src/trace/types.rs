use serde::Serialize;

/// One simulated clock cycle: the raw lines between a START and an END marker, inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleRecord {
    /// Position in emission order. The cycle number embedded in the marker is not consulted.
    pub index: usize,
    pub body: String,
}

impl CycleRecord {
    /// The START marker line, including whatever the producer put after the prefix.
    pub fn heading(&self) -> &str {
        self.body.lines().next().unwrap_or("")
    }
}

/// Terminal summary emitted after the last cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinalState {
    pub body: String,
}

/// Parsed output of one simulator run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Trace {
    pub cycles: Vec<CycleRecord>,
    #[serde(rename = "final")]
    pub final_state: Option<FinalState>,
}

impl Trace {
    pub fn is_empty(&self) -> bool {
        self.cycles.is_empty() && self.final_state.is_none()
    }

    pub fn has_final(&self) -> bool {
        self.final_state.is_some()
    }
}
