use serde::Serialize;

/// Where the cursor sits within a trace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "position", rename_all = "camelCase")]
pub enum NavState {
    /// No cycles to show (nothing parsed yet, or the trace had none).
    #[default]
    Empty,
    /// Showing the cycle at this index.
    Browsing(usize),
    /// Showing the final state; logically position `cycles.len()`.
    ViewingFinal,
}

impl NavState {
    pub fn is_final(self) -> bool {
        matches!(self, NavState::ViewingFinal)
    }
}
