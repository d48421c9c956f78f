//! Line-level check of a program against the simulator's loader.
//!
//! One instruction per line, operands separated by whitespace or commas.
//! Words are `opcode(4) | rd(6) | operand(6)`.

use std::fmt;

use serde::Serialize;

use super::vocab::{register_number, Mnemonic, OperandShape};

/// Capacity of the simulated instruction memory, in 16-bit words.
pub const INSTRUCTION_MEMORY_WORDS: usize = 1024;

const OPERAND_MASK: u16 = 0x3F;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DiagnosticKind {
    UnknownInstruction,
    BadOperands,
    ImmediateOutOfRange,
    ProgramTooLarge,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// 1-based source line.
    pub line: usize,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Assembly {
    pub words: Vec<u16>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Assembly {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Encode every recognised line; report the rest.
pub fn assemble(source: &str) -> Assembly {
    let mut out = Assembly::default();

    for (i, line) in source.lines().enumerate() {
        let fields: Vec<&str> = line
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|f| !f.is_empty())
            .collect();
        if fields.is_empty() {
            continue;
        }

        if out.words.len() >= INSTRUCTION_MEMORY_WORDS {
            out.diagnostics.push(Diagnostic {
                line: i + 1,
                kind: DiagnosticKind::ProgramTooLarge,
                message: format!(
                    "program does not fit in instruction memory ({INSTRUCTION_MEMORY_WORDS} words)"
                ),
            });
            break;
        }

        match encode_line(&fields) {
            Ok(word) => out.words.push(word),
            Err((kind, message)) => {
                tracing::debug!(line = i + 1, %message, "rejected program line");
                out.diagnostics.push(Diagnostic {
                    line: i + 1,
                    kind,
                    message,
                });
            }
        }
    }

    out
}

fn encode_line(fields: &[&str]) -> Result<u16, (DiagnosticKind, String)> {
    let Some(mnemonic) = Mnemonic::lookup(fields[0]) else {
        return Err((
            DiagnosticKind::UnknownInstruction,
            format!("unrecognized instruction `{}`", fields[0]),
        ));
    };
    let operands = &fields[1..];

    let arity_ok = match mnemonic.shape() {
        OperandShape::Branch => (1..=2).contains(&operands.len()),
        _ => operands.len() == 2,
    };
    if !arity_ok {
        let expected = match mnemonic.shape() {
            OperandShape::Branch => "1 or 2",
            _ => "2",
        };
        return Err((
            DiagnosticKind::BadOperands,
            format!(
                "`{mnemonic}` expects {expected} operands, found {}",
                operands.len()
            ),
        ));
    }

    let rd = register(operands[0])?;
    let operand = match mnemonic.shape() {
        OperandShape::Registers => register(operands[1])?,
        OperandShape::Branch => match operands.get(1) {
            Some(rs) => register(rs)?,
            None => 0,
        },
        OperandShape::Immediate { signed } => immediate(operands[1], signed)?,
    };

    Ok((mnemonic.opcode() << 12) | (rd << 6) | (operand & OPERAND_MASK))
}

fn register(field: &str) -> Result<u16, (DiagnosticKind, String)> {
    register_number(field).map(u16::from).ok_or_else(|| {
        (
            DiagnosticKind::BadOperands,
            format!("expected a register R0-R63, found `{field}`"),
        )
    })
}

fn immediate(field: &str, signed: bool) -> Result<u16, (DiagnosticKind, String)> {
    let value: i32 = field.parse().map_err(|_| {
        (
            DiagnosticKind::BadOperands,
            format!("expected an immediate, found `{field}`"),
        )
    })?;

    let (min, max) = if signed { (-32, 31) } else { (0, 63) };
    if !(min..=max).contains(&value) {
        return Err((
            DiagnosticKind::ImmediateOutOfRange,
            format!("immediate {value} does not fit in [{min}, {max}]"),
        ));
    }

    // two's complement, truncated to the operand field by the caller
    Ok(value as u16)
}
