mod assembler;
mod lexer;
mod validator;
mod vocab;

pub use assembler::{assemble, Assembly, Diagnostic, DiagnosticKind, INSTRUCTION_MEMORY_WORDS};
pub use lexer::{tokenize, Token, TokenKind, Tokens};
pub use validator::{validate, Validation, Warning};
pub use vocab::{register_number, Mnemonic, OperandShape, REGISTER_COUNT, RESERVED_REGISTER};
