use crate::isa::hw::{self, Byte, ByteOrder, Word, WORD_BYTES};
use crate::isa::opcode::Form;
use crate::isa::{Opcode, Register, Rule};
use std::convert::TryFrom;
use std::fmt::Display;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    BadWordAlignment(usize),
    InvalidOpcode(usize, Word),
    UnexpectedEndOfStream(usize, Opcode),
    InvalidRegister(usize, Word),
    InvalidCharacter(usize, Word),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::BadWordAlignment(len) => write!(
                f,
                "binary is {} byte(s) long, which is not a multiple of the {} byte word size",
                len, WORD_BYTES
            ),
            Error::InvalidOpcode(addr, raw) => write!(f, "word {}: invalid opcode: {}", addr, raw),
            Error::UnexpectedEndOfStream(addr, op) => write!(
                f,
                "word {}: unexpectedly encountered end of stream while decoding {}",
                addr, op
            ),
            Error::InvalidRegister(addr, raw) => {
                write!(f, "word {}: invalid register index: {}", addr, raw)
            }
            Error::InvalidCharacter(addr, raw) => {
                write!(f, "word {}: invalid character code: {}", addr, raw)
            }
        }
    }
}

impl std::error::Error for Error {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArgKind {
    Reg,
    Immediate,
    Address,
    Char,
}

impl Opcode {
    fn arg_kinds(self) -> &'static [ArgKind] {
        use ArgKind::*;

        match self.form() {
            Form::Public(Rule::NoOperand) => &[],
            Form::Public(Rule::Immediate) => &[Immediate],
            Form::Public(Rule::Register) | Form::Public(Rule::RegisterOrChar(_)) => &[Reg],
            Form::Public(Rule::Address) => &[Address],
            Form::Public(Rule::RegisterAddress) => &[Reg, Address],
            Form::Public(Rule::RegisterImmediate) => &[Reg, Immediate],
            Form::Public(Rule::RegisterOrImmediate(_)) => &[Reg, Reg],
            Form::ImmediateOf(public) => match public.rule() {
                Some(Rule::RegisterOrChar(_)) => &[Char],
                _ => &[Reg, Immediate],
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arg {
    Register(Register),
    Immediate(Word),
    Address(Word),
    Char(char),
}

impl Display for Arg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Arg::Register(reg) => write!(f, "{}", reg),
            Arg::Immediate(val) => write!(f, "${}", val),
            Arg::Address(addr) => write!(f, "{}", addr),
            Arg::Char(c) => write!(f, "'{}'", c),
        }
    }
}

impl Arg {
    fn decode(kind: ArgKind, addr: usize, raw: Word) -> Result<Arg, Error> {
        match kind {
            ArgKind::Reg => Register::decode(raw)
                .map(Arg::Register)
                .ok_or(Error::InvalidRegister(addr, raw)),
            ArgKind::Immediate => Ok(Arg::Immediate(raw)),
            ArgKind::Address => Ok(Arg::Address(raw)),
            ArgKind::Char => u32::try_from(raw)
                .ok()
                .and_then(std::char::from_u32)
                // A line break cannot appear inside a source line.
                .filter(|c| !matches!(c, '\n' | '\r'))
                .map(Arg::Char)
                .ok_or(Error::InvalidCharacter(addr, raw)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisassembledInst {
    pub addr: usize,
    pub opcode: Opcode,
    pub args: Vec<Arg>,
}

impl DisassembledInst {
    pub fn words(&self) -> usize {
        1 + self.args.len()
    }
}

/// Renders the instruction as it would be written in source, so private
/// opcodes come out under their public mnemonic.
impl Display for DisassembledInst {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.opcode.public_form())?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

fn disassemble_one(
    addr: usize,
    raw: Word,
    words: &mut impl Iterator<Item = Word>,
) -> Result<DisassembledInst, Error> {
    let opcode = Opcode::decode(raw).ok_or(Error::InvalidOpcode(addr, raw))?;

    let mut args = Vec::new();
    for (idx, kind) in opcode.arg_kinds().iter().enumerate() {
        let raw = words
            .next()
            .ok_or(Error::UnexpectedEndOfStream(addr, opcode))?;
        args.push(Arg::decode(*kind, addr + 1 + idx, raw)?);
    }

    Ok(DisassembledInst { addr, opcode, args })
}

pub fn disassemble(words: &[Word]) -> Result<Vec<DisassembledInst>, Error> {
    let mut it = words.iter().copied();
    let mut insts = Vec::new();

    let mut addr = 0;
    while let Some(raw) = it.next() {
        let inst = disassemble_one(addr, raw, &mut it)?;
        addr += inst.words();
        insts.push(inst);
    }

    Ok(insts)
}

pub fn disassemble_bytes(bytes: &[Byte], order: ByteOrder) -> Result<Vec<DisassembledInst>, Error> {
    let words = hw::bytes_to_words(bytes, order).ok_or(Error::BadWordAlignment(bytes.len()))?;
    disassemble(&words)
}
