use super::state::NavState;
use crate::error::NavigationError;
use crate::trace::Trace;

pub const NEXT_LABEL: &str = "Next Cycle";
pub const FINAL_LABEL: &str = "FINAL OUT";

/// Cursor over one parsed trace.
///
/// Moves clamp at both ends; `go_to` rejects out-of-range indices without
/// touching the current position.
#[derive(Debug, Clone, Default)]
pub struct Navigator {
    trace: Trace,
    state: NavState,
}

impl Navigator {
    pub fn new(trace: Trace) -> Self {
        let state = if trace.cycles.is_empty() {
            NavState::Empty
        } else {
            NavState::Browsing(0)
        };
        Self { trace, state }
    }

    /// Replace the trace and start over from the first cycle.
    pub fn reset(&mut self, trace: Trace) {
        *self = Self::new(trace);
    }

    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    pub fn state(&self) -> NavState {
        self.state
    }

    pub fn cycle_count(&self) -> usize {
        self.trace.cycles.len()
    }

    /// Numeric position, `cycle_count()` meaning the final state.
    pub fn position(&self) -> Option<usize> {
        match self.state {
            NavState::Empty => None,
            NavState::Browsing(i) => Some(i),
            NavState::ViewingFinal => Some(self.cycle_count()),
        }
    }

    /// Advance one step. Returns whether the cursor moved.
    pub fn next(&mut self) -> bool {
        let len = self.cycle_count();
        let has_final = self.trace.has_final();

        let next = match self.state {
            NavState::Browsing(i) if i + 1 < len => NavState::Browsing(i + 1),
            NavState::Browsing(_) | NavState::Empty if has_final => NavState::ViewingFinal,
            _ => return false,
        };
        self.move_to(next);
        true
    }

    /// Step back one position. Returns whether the cursor moved.
    pub fn previous(&mut self) -> bool {
        let len = self.cycle_count();

        let prev = match self.state {
            NavState::Browsing(i) if i > 0 => NavState::Browsing(i - 1),
            NavState::ViewingFinal if len > 0 => NavState::Browsing(len - 1),
            _ => return false,
        };
        self.move_to(prev);
        true
    }

    /// Absolute jump to `index`; `cycle_count()` addresses the final state.
    pub fn go_to(&mut self, index: usize) -> Result<(), NavigationError> {
        let len = self.cycle_count();
        let target = if index < len {
            NavState::Browsing(index)
        } else if index == len && self.trace.has_final() {
            NavState::ViewingFinal
        } else {
            let limit = len + usize::from(self.trace.has_final());
            tracing::warn!(index, limit, "rejected out-of-range cycle jump");
            return Err(NavigationError::OutOfRange { index, limit });
        };
        self.move_to(target);
        Ok(())
    }

    /// Text to display for the current position; empty when there is nothing to show.
    pub fn current(&self) -> &str {
        match self.state {
            NavState::Empty => "",
            NavState::Browsing(i) => &self.trace.cycles[i].body,
            NavState::ViewingFinal => self
                .trace
                .final_state
                .as_ref()
                .map_or("", |f| f.body.as_str()),
        }
    }

    /// Caption for the forward button: announces the final state when the
    /// next step (or the current view) is the final state.
    pub fn next_label(&self) -> &'static str {
        let len = self.cycle_count();
        let final_is_next = match self.state {
            NavState::ViewingFinal => true,
            NavState::Browsing(i) => i + 1 == len && self.trace.has_final(),
            NavState::Empty => self.trace.has_final(),
        };
        if final_is_next {
            FINAL_LABEL
        } else {
            NEXT_LABEL
        }
    }

    /// True when `next()` would be a no-op.
    pub fn at_end(&self) -> bool {
        let has_final = self.trace.has_final();
        match self.state {
            NavState::ViewingFinal => true,
            NavState::Browsing(i) => i + 1 >= self.cycle_count() && !has_final,
            NavState::Empty => !has_final,
        }
    }

    fn move_to(&mut self, state: NavState) {
        tracing::debug!(from = ?self.state, to = ?state, "navigate");
        self.state = state;
    }
}
