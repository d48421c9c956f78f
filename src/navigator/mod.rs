mod cursor;
mod state;

pub use cursor::{Navigator, FINAL_LABEL, NEXT_LABEL};
pub use state::NavState;
