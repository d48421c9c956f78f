use std::io::{BufRead, Write};
use std::path::PathBuf;

use serde_json::{json, Value};

use super::message::{Message, MessageContent};
use crate::error::ProtocolError;
use crate::runner::Orchestrator;
use crate::session::IdeSession;
use crate::source::Warning;

const HEADER: &str = "Content-Length:";

/// Largest message body accepted from the peer.
pub const MAX_MESSAGE_BYTES: usize = 16 * 1024 * 1024;

type Handled = Result<Option<Value>, String>;

/// Drives an [`IdeSession`] from Content-Length framed JSON requests.
pub struct Server<R, W> {
    reader: R,
    writer: W,
    seq: u64,
    session: IdeSession,
    orchestrator: Option<Box<dyn Orchestrator>>,
    pending_warning: Option<Warning>,
}

impl<R: BufRead, W: Write> Server<R, W> {
    pub fn new(reader: R, writer: W, session: IdeSession) -> Self {
        Self {
            reader,
            writer,
            seq: 0,
            session,
            orchestrator: None,
            pending_warning: None,
        }
    }

    pub fn with_orchestrator(mut self, orchestrator: Box<dyn Orchestrator>) -> Self {
        self.orchestrator = Some(orchestrator);
        self
    }

    pub fn session(&self) -> &IdeSession {
        &self.session
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    /// Serve requests until `disconnect` or end of input.
    pub fn serve(&mut self) -> Result<(), ProtocolError> {
        tracing::info!("protocol server started");
        while let Some(msg) = self.read_message()? {
            let MessageContent::Request { command, arguments } = msg.content else {
                tracing::debug!(seq = msg.seq, "ignoring non-request message");
                continue;
            };
            tracing::debug!(seq = msg.seq, %command, "request");

            if command == "disconnect" {
                self.send_response(msg.seq, command, Ok(None))?;
                break;
            }

            let result = self.dispatch(&command, arguments.as_ref());
            let initialize = command == "initialize";
            self.send_response(msg.seq, command, result)?;

            if initialize {
                self.send_event("initialized", None)?;
            }
            if let Some(w) = self.pending_warning.take() {
                self.send_event("warning", Some(serde_json::to_value(w)?))?;
            }
        }
        tracing::info!("protocol server exiting");
        Ok(())
    }

    /// Read one framed message; `None` at end of input.
    pub fn read_message(&mut self) -> Result<Option<Message>, ProtocolError> {
        let mut content_length: Option<usize> = None;
        let mut saw_header = false;

        loop {
            let mut line = String::new();
            if self.reader.read_line(&mut line)? == 0 {
                if saw_header {
                    return Err(ProtocolError::MissingLength);
                }
                return Ok(None);
            }
            let line = line.trim_end_matches(['\r', '\n']);
            if line.is_empty() {
                if saw_header {
                    break;
                }
                continue;
            }
            saw_header = true;
            if let Some(len) = line.strip_prefix(HEADER) {
                content_length = len.trim().parse().ok();
            }
        }

        let len = content_length.ok_or(ProtocolError::MissingLength)?;
        if len > MAX_MESSAGE_BYTES {
            return Err(ProtocolError::TooLarge { length: len });
        }
        let mut buffer = vec![0u8; len];
        self.reader.read_exact(&mut buffer)?;
        Ok(Some(serde_json::from_slice(&buffer)?))
    }

    fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }

    fn send_response(
        &mut self,
        request_seq: u64,
        command: String,
        result: Handled,
    ) -> Result<(), ProtocolError> {
        let (success, message, body) = match result {
            Ok(body) => (true, None, body),
            Err(message) => (false, Some(message), None),
        };
        let msg = Message {
            seq: self.next_seq(),
            content: MessageContent::Response {
                request_seq,
                success,
                command,
                message,
                body,
            },
        };
        self.send_message(&msg)
    }

    fn send_event(&mut self, event: &str, body: Option<Value>) -> Result<(), ProtocolError> {
        let msg = Message {
            seq: self.next_seq(),
            content: MessageContent::Event {
                event: event.to_string(),
                body,
            },
        };
        self.send_message(&msg)
    }

    fn send_message(&mut self, msg: &Message) -> Result<(), ProtocolError> {
        let json = serde_json::to_string(msg)?;
        write!(self.writer, "{HEADER} {}\r\n\r\n{json}", json.len())?;
        self.writer.flush()?;
        tracing::trace!(bytes = json.len(), "sent message");
        Ok(())
    }

    fn dispatch(&mut self, command: &str, args: Option<&Value>) -> Handled {
        match command {
            "initialize" => Ok(Some(json!({
                "supportsRun": self.orchestrator.is_some(),
                "supportsGoto": true,
                "supportsStepBack": true,
            }))),
            "setSource" => {
                let text = str_arg(args, "text")?;
                self.session.set_source(text);
                self.analysis_body()
            }
            "analyze" => self.analysis_body(),
            "loadSource" => {
                let path = PathBuf::from(str_arg(args, "path")?);
                self.session.load_source(&path).map_err(|e| e.to_string())?;
                self.analysis_body()
            }
            "saveSource" => {
                let path = PathBuf::from(str_arg(args, "path")?);
                self.session.save_source(&path).map_err(|e| e.to_string())?;
                Ok(None)
            }
            "loadTrace" => {
                let text = match (str_arg(args, "text"), str_arg(args, "path")) {
                    (Ok(text), _) => text.to_string(),
                    (_, Ok(path)) => std::fs::read_to_string(path).map_err(|e| e.to_string())?,
                    _ => return Err("loadTrace needs `text` or `path`".to_string()),
                };
                self.session.load_trace(&text);
                Ok(Some(self.navigation_body()))
            }
            "run" => self.handle_run(),
            "next" => {
                self.session.next();
                Ok(Some(self.navigation_body()))
            }
            "previous" => {
                self.session.previous();
                Ok(Some(self.navigation_body()))
            }
            "goto" => {
                let index = args
                    .and_then(|a| a.get("index"))
                    .and_then(Value::as_u64)
                    .ok_or_else(|| "goto needs a non-negative `index`".to_string())?;
                let index = usize::try_from(index).map_err(|e| e.to_string())?;
                self.session.go_to(index).map_err(|e| e.to_string())?;
                Ok(Some(self.navigation_body()))
            }
            "current" => Ok(Some(self.navigation_body())),
            other => {
                tracing::warn!(command = other, "unhandled command");
                Err(format!("unknown command: {other}"))
            }
        }
    }

    fn handle_run(&mut self) -> Handled {
        let Some(orchestrator) = self.orchestrator.as_deref_mut() else {
            return Err("no simulator configured".to_string());
        };
        match self.session.run(orchestrator) {
            Ok(status) => {
                let mut body = self.navigation_body();
                body["status"] = json!(status);
                body["errors"] = json!(self.session.error_log());
                Ok(Some(body))
            }
            Err(e) => Err(e.log()),
        }
    }

    /// Analyze the buffer and queue its warning; one event per pass, never one per occurrence.
    fn analysis_body(&mut self) -> Handled {
        let analysis = self.session.analyze();
        self.pending_warning = analysis.warning.clone();
        serde_json::to_value(&analysis)
            .map(Some)
            .map_err(|e| e.to_string())
    }

    fn navigation_body(&self) -> Value {
        let nav = self.session.navigator();
        json!({
            "position": nav.position(),
            "state": nav.state(),
            "content": nav.current(),
            "nextLabel": nav.next_label(),
            "cycleCount": nav.cycle_count(),
            "hasFinal": nav.trace().has_final(),
        })
    }
}

fn str_arg<'v>(args: Option<&'v Value>, key: &str) -> Result<&'v str, String> {
    args.and_then(|a| a.get(key))
        .and_then(Value::as_str)
        .ok_or_else(|| format!("missing string argument `{key}`"))
}
