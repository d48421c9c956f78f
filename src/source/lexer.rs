//! Tokenizing assembly source for highlighting.
//!
//! The buffer is cut into maximal runs of Unicode word characters (`\w`)
//! and the separators between them, so `ÄR0` is one word, not a register. Only words become [`Token`]s; each word
//! is classified against the instruction vocabulary first, then the register
//! namespace. Separators are walked over but not emitted.

use std::fmt;
use std::ops::Range;

use logos::{Lexer, Logos};
use serde::Serialize;

use super::vocab::{register_number, Mnemonic, RESERVED_REGISTER};

#[derive(Debug, Logos, PartialEq, Eq, Clone, Copy)]
enum Lexeme {
    #[regex(r"\w+")]
    Word,

    #[regex(r"\W+")]
    Gap,
}

/// Highlighting class of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TokenKind {
    Instruction,
    Register,
    /// `R0`. Still a register; see [`TokenKind::is_register`].
    ReservedRegister,
    Other,
}

impl TokenKind {
    pub fn is_register(self) -> bool {
        matches!(self, TokenKind::Register | TokenKind::ReservedRegister)
    }
}

/// A classified word. `start..end` is a byte range into the scanned text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    #[serde(rename = "startOffset")]
    pub start: usize,
    #[serde(rename = "endOffset")]
    pub end: usize,
}

impl Token<'_> {
    pub fn span(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn is_register(&self) -> bool {
        self.kind.is_register()
    }

    pub fn is_reserved(&self) -> bool {
        self.kind == TokenKind::ReservedRegister
    }

    pub fn mnemonic(&self) -> Option<Mnemonic> {
        match self.kind {
            TokenKind::Instruction => Mnemonic::lookup(self.text),
            _ => None,
        }
    }

    pub fn register(&self) -> Option<u8> {
        if self.is_register() {
            register_number(self.text)
        } else {
            None
        }
    }
}

fn classify(word: &str) -> TokenKind {
    if Mnemonic::lookup(word).is_some() {
        TokenKind::Instruction
    } else if register_number(word).is_some() {
        if word == RESERVED_REGISTER {
            TokenKind::ReservedRegister
        } else {
            TokenKind::Register
        }
    } else {
        TokenKind::Other
    }
}

/// Lazy token stream over one snapshot of the source.
///
/// Borrowing the text keeps the buffer from changing underneath the tokens;
/// an edited buffer has to be scanned again.
#[derive(Clone)]
pub struct Tokens<'a> {
    lexer: Lexer<'a, Lexeme>,
}

impl fmt::Debug for Tokens<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tokens")
            .field("offset", &self.lexer.span().end)
            .finish()
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.lexer.next()? {
                Ok(Lexeme::Word) => {
                    let span = self.lexer.span();
                    let text = self.lexer.slice();
                    return Some(Token {
                        kind: classify(text),
                        text,
                        start: span.start,
                        end: span.end,
                    });
                }
                Ok(Lexeme::Gap) | Err(()) => continue,
            }
        }
    }
}

/// Scan `text` left to right into non-overlapping tokens.
pub fn tokenize(text: &str) -> Tokens<'_> {
    Tokens {
        lexer: Lexeme::lexer(text),
    }
}
