use std::borrow::Borrow;
use std::fmt;

use serde::Serialize;

use super::lexer::Token;
use super::vocab::RESERVED_REGISTER;

/// Result of one validation pass over a token stream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Validation {
    pub has_forbidden_use: bool,
    /// Start offset of every reserved-register token, in source order.
    pub occurrences: Vec<usize>,
}

/// Advisory summary for a pass that found the reserved register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub message: String,
    pub occurrences: usize,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl Validation {
    /// At most one warning per pass, however many occurrences there are.
    pub fn warning(&self) -> Option<Warning> {
        if !self.has_forbidden_use {
            return None;
        }
        let count = self.occurrences.len();
        let noun = if count == 1 { "occurrence" } else { "occurrences" };
        Some(Warning {
            message: format!(
                "register {RESERVED_REGISTER} is reserved and must not be used ({count} {noun})"
            ),
            occurrences: count,
        })
    }
}

/// Collect reserved-register uses from a token stream.
pub fn validate<'a, I>(tokens: I) -> Validation
where
    I: IntoIterator,
    I::Item: Borrow<Token<'a>>,
{
    let occurrences: Vec<usize> = tokens
        .into_iter()
        .filter_map(|t| {
            let t = t.borrow();
            t.is_reserved().then_some(t.start)
        })
        .collect();

    Validation {
        has_forbidden_use: !occurrences.is_empty(),
        occurrences,
    }
}
