use super::hw::Word;
use derive_more::Display;
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use std::str::FromStr;
use strum_macros::{EnumIter, EnumString};

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive, EnumIter, EnumString)]
pub enum Register {
    R1,
    R2,
    R3,
    R4,
    R5,
    R6,
    R7,
    R8,
    R9,
    R10,
    R11,
    R12,
    R13,
    R14,
    R15,
    R16,
    // Remainder of the last DIV
    Q,
    // Result of the last CMP
    Z,
}

impl Register {
    /// Register names are case sensitive.
    pub fn lookup(name: &str) -> Option<Register> {
        Register::from_str(name).ok()
    }

    pub fn encode(self) -> Word {
        self as Word
    }

    pub fn decode(raw: Word) -> Option<Register> {
        Register::from_i64(raw)
    }
}
