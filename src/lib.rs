//! Trace inspection and source checking for a pipelined CPU simulator.
//!
//! Raw simulator output is split into per-cycle records ([`trace::parse`]) and
//! browsed with a [`navigator::Navigator`]. Program source is tokenized for
//! highlighting and checked for the reserved register ([`source`]). The
//! simulator itself runs behind the [`runner::Orchestrator`] boundary.

pub mod config;
pub mod console;
pub mod error;
pub mod navigator;
pub mod protocol;
pub mod runner;
pub mod session;
pub mod source;
pub mod trace;

pub use config::RunnerConfig;
pub use error::{NavigationError, RunError};
pub use navigator::{NavState, Navigator};
pub use session::IdeSession;
