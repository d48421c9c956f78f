use serde::Serialize;

/// Registers `R0` through `R63`.
pub const REGISTER_COUNT: u8 = 64;

/// Lexically valid, but reserved by convention; any use is flagged.
pub const RESERVED_REGISTER: &str = "R0";

/// Operand layout accepted after a mnemonic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandShape {
    /// `Rd Rs`
    Registers,
    /// `Rd IMM`, two's complement in 6 bits when `signed`
    Immediate { signed: bool },
    /// `Rd [Rs]`
    Branch,
}

macro_rules! mnemonics {
    ($($variant:ident => $text:literal, $opcode:literal, $shape:expr;)+) => {
        /// Instruction vocabulary of the simulated CPU.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        pub enum Mnemonic {
            $($variant),+
        }

        impl Mnemonic {
            pub const ALL: &'static [Mnemonic] = &[$(Mnemonic::$variant),+];

            /// Exact, case-sensitive lookup.
            pub fn lookup(word: &str) -> Option<Self> {
                match word {
                    $($text => Some(Mnemonic::$variant),)+
                    _ => None,
                }
            }

            pub fn as_str(self) -> &'static str {
                match self {
                    $(Mnemonic::$variant => $text),+
                }
            }

            pub fn opcode(self) -> u16 {
                match self {
                    $(Mnemonic::$variant => $opcode),+
                }
            }

            pub fn shape(self) -> OperandShape {
                match self {
                    $(Mnemonic::$variant => $shape),+
                }
            }
        }
    };
}

mnemonics! {
    Add  => "ADD",  0x0, OperandShape::Registers;
    Sub  => "SUB",  0x1, OperandShape::Registers;
    Mul  => "MUL",  0x2, OperandShape::Registers;
    Movi => "MOVI", 0x3, OperandShape::Immediate { signed: true };
    Beqz => "BEQZ", 0x4, OperandShape::Immediate { signed: true };
    Andi => "ANDI", 0x5, OperandShape::Immediate { signed: true };
    Eor  => "EOR",  0x6, OperandShape::Registers;
    Br   => "BR",   0x7, OperandShape::Branch;
    Sal  => "SAL",  0x8, OperandShape::Immediate { signed: false };
    Sar  => "SAR",  0x9, OperandShape::Immediate { signed: false };
    Ldr  => "LDR",  0xA, OperandShape::Immediate { signed: false };
    Str  => "STR",  0xB, OperandShape::Immediate { signed: false };
}

impl std::fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Register number for a canonical register name (`R0`..`R63`).
///
/// Leading zeros, signs and lowercase `r` are not register names.
pub fn register_number(word: &str) -> Option<u8> {
    let digits = word.strip_prefix('R')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return None;
    }
    digits.parse::<u8>().ok().filter(|&n| n < REGISTER_COUNT)
}
