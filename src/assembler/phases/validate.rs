use super::encode::Encoded;
use super::types::Located;
use crate::isa::Word;
use log::debug;
use std::fmt::Display;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    InvalidJumpAddress(Word),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidJumpAddress(addr) => write!(f, "invalid jump address: {}", addr),
        }
    }
}

/// Checks that every jump and call lands on the first word of an instruction.
pub fn validate(encoded: Encoded<'_>) -> Result<Vec<Word>, Located<Error>> {
    if let Some(bad) = encoded
        .jumps
        .iter()
        .find(|jump| !encoded.jump_targets.contains(*jump.get()))
    {
        return Err(bad.map(Error::InvalidJumpAddress));
    }

    debug!(
        "validated {} jump(s) over {} word(s)",
        encoded.jumps.len(),
        encoded.words.len()
    );

    Ok(encoded.words)
}
