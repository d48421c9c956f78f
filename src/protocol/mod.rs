//! Stdio protocol for a graphical front-end.
//!
//! Framing follows the debug adapter convention: a `Content-Length` header,
//! a blank line, then one JSON message.

mod message;
mod server;

use std::io;

use crate::error::ProtocolError;
use crate::runner::Orchestrator;
use crate::session::IdeSession;

pub use message::{Message, MessageContent};
pub use server::{Server, MAX_MESSAGE_BYTES};

/// Serve the protocol on the process's stdin/stdout.
pub fn run_stdio(
    session: IdeSession,
    orchestrator: Option<Box<dyn Orchestrator>>,
) -> Result<(), ProtocolError> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut server = Server::new(stdin.lock(), stdout.lock(), session);
    if let Some(orch) = orchestrator {
        server = server.with_orchestrator(orch);
    }
    server.serve()
}
