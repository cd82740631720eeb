use super::preprocess::{JumpTargets, Labels, Line, Preprocessed};
use super::tokenize::CHAR_LITERAL_CHAR;
use super::types::Located;
use crate::isa::{InstructionSet, Opcode, Register, Rule, Word};
use itertools::Itertools;
use log::trace;
use std::convert::TryFrom;
use std::fmt::Display;

pub const IMMEDIATE_CHAR: char = '$';

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    UnknownOperation(String),
    InvalidArguments {
        mnemonic: Opcode,
        expected: usize,
        found: usize,
    },
    InvalidInteger(String),
    MalformedValue(String),
    InvalidRegister(String),
    NotRegisterOrChar(String),
    UndefinedLabel(String),
    MalformedAddress(String),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::UnknownOperation(op) => write!(f, "unknown operation: {}", op),
            Error::InvalidArguments {
                mnemonic,
                expected,
                found,
            } => write!(
                f,
                "invalid arguments: {} takes {} operand(s), found {}",
                mnemonic, expected, found
            ),
            Error::InvalidInteger(tok) => {
                write!(f, "invalid arguments: '{}' is not an integer", tok)
            }
            Error::MalformedValue(tok) => write!(f, "malformed value: {}", tok),
            Error::InvalidRegister(tok) => write!(f, "invalid register: {}", tok),
            Error::NotRegisterOrChar(tok) => write!(
                f,
                "print operand must be a register or a single character: {}",
                tok
            ),
            Error::UndefinedLabel(tok) => write!(f, "undefined label: {}", tok),
            Error::MalformedAddress(tok) => write!(f, "malformed address: {}", tok),
        }
    }
}

/// The shape of the last operand of a polymorphic instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Register(Register),
    Immediate(Word),
}

impl Operand {
    pub fn register_or_immediate(tok: &str) -> Result<Operand, Error> {
        if tok.starts_with(IMMEDIATE_CHAR) {
            immediate(tok).map(Operand::Immediate)
        } else {
            register(tok).map(Operand::Register)
        }
    }

    pub fn register_or_char(tok: &str) -> Result<Operand, Error> {
        if let Some(c) = char_literal(tok) {
            return Ok(Operand::Immediate(Word::from(u32::from(c))));
        }

        Register::lookup(tok)
            .map(Operand::Register)
            .ok_or_else(|| Error::NotRegisterOrChar(tok.to_owned()))
    }

    /// Picks `immediate` when the operand is an immediate.
    pub fn select(self, public: Opcode, immediate: Opcode) -> (Opcode, Word) {
        match self {
            Operand::Register(reg) => (public, reg.encode()),
            Operand::Immediate(val) => (immediate, val),
        }
    }
}

pub fn register(tok: &str) -> Result<Register, Error> {
    Register::lookup(tok).ok_or_else(|| Error::InvalidRegister(tok.to_owned()))
}

/// `$value`, a signed decimal.
pub fn immediate(tok: &str) -> Result<Word, Error> {
    let digits = tok
        .strip_prefix(IMMEDIATE_CHAR)
        .ok_or_else(|| Error::MalformedValue(tok.to_owned()))?;

    digits
        .parse::<Word>()
        .map_err(|_| Error::InvalidInteger(tok.to_owned()))
}

/// `'c'` with exactly one character between the quotes.
pub fn char_literal(tok: &str) -> Option<char> {
    let inner = tok
        .strip_prefix(CHAR_LITERAL_CHAR)?
        .strip_suffix(CHAR_LITERAL_CHAR)?;

    let mut chars = inner.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

pub fn is_label_ref(tok: &str) -> bool {
    tok.chars().last().map_or(false, |c| c.is_ascii_uppercase())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedLine {
    pub words: Vec<Word>,
    /// Where this line jumps to, if it is a jump or a call.
    pub jump: Option<Located<Word>>,
}

pub struct Encoder<'p> {
    labels: &'p Labels,
}

impl<'p> Encoder<'p> {
    pub fn new(pre: &'p Preprocessed<'_>) -> Self {
        Encoder {
            labels: pre.labels(),
        }
    }

    /// A label reference or a non-negative decimal literal.
    pub fn address(&self, tok: &str) -> Result<Word, Error> {
        if is_label_ref(tok) {
            return self
                .labels
                .get(tok)
                .ok_or_else(|| Error::UndefinedLabel(tok.to_owned()));
        }

        if tok.is_empty() || !tok.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::MalformedAddress(tok.to_owned()));
        }

        tok.parse::<u64>()
            .ok()
            .and_then(|addr| Word::try_from(addr).ok())
            .ok_or_else(|| Error::MalformedAddress(tok.to_owned()))
    }

    pub fn encode_line(&self, line: &Line<'_>) -> Result<EncodedLine, Located<Error>> {
        let mnemonic = line.mnemonic();
        let (op, rule) = InstructionSet::get()
            .lookup(mnemonic.get())
            .ok_or_else(|| mnemonic.transfer(Error::UnknownOperation(mnemonic.get().to_string())))?;

        let args = line.operands();
        if args.len() != rule.operand_count() {
            return Err(mnemonic.transfer(Error::InvalidArguments {
                mnemonic: op,
                expected: rule.operand_count(),
                found: args.len(),
            }));
        }

        // Each operand's error is reported at that operand.
        let at = |idx: usize| {
            let tok: Located<&str> = args[idx];
            move |err: Error| tok.transfer(err)
        };

        let words = match rule {
            Rule::NoOperand => vec![op.encode()],
            Rule::Immediate => vec![op.encode(), immediate(args[0].get()).map_err(at(0))?],
            Rule::Register => vec![op.encode(), register(args[0].get()).map_err(at(0))?.encode()],
            Rule::Address => vec![op.encode(), self.address(args[0].get()).map_err(at(0))?],
            Rule::RegisterAddress => vec![
                op.encode(),
                register(args[0].get()).map_err(at(0))?.encode(),
                self.address(args[1].get()).map_err(at(1))?,
            ],
            Rule::RegisterImmediate => vec![
                op.encode(),
                register(args[0].get()).map_err(at(0))?.encode(),
                immediate(args[1].get()).map_err(at(1))?,
            ],
            Rule::RegisterOrImmediate(variant) => {
                let dst = register(args[0].get()).map_err(at(0))?;
                let (op, src) = Operand::register_or_immediate(args[1].get())
                    .map_err(at(1))?
                    .select(op, variant);
                vec![op.encode(), dst.encode(), src]
            }
            Rule::RegisterOrChar(variant) => {
                let (op, val) = Operand::register_or_char(args[0].get())
                    .map_err(at(0))?
                    .select(op, variant);
                vec![op.encode(), val]
            }
        };

        let jump = if rule.is_jump() {
            let target = args[args.len() - 1];
            words.last().map(|addr| target.transfer(*addr))
        } else {
            None
        };

        trace!(
            "{:>4}: {} {} -> [{}]",
            line.addr(),
            mnemonic.get(),
            args.iter().map(Located::get).join(" "),
            words.iter().join(", ")
        );

        Ok(EncodedLine { words, jump })
    }
}

/// The finished word stream, still carrying what the validator needs to check it.
#[derive(Debug)]
pub struct Encoded<'p> {
    pub(super) words: Vec<Word>,
    pub(super) jumps: Vec<Located<Word>>,
    pub(super) jump_targets: &'p JumpTargets,
}

impl<'p> Encoded<'p> {
    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn jumps(&self) -> &[Located<Word>] {
        &self.jumps
    }
}

pub fn encode<'p>(pre: &'p Preprocessed<'_>) -> Result<Encoded<'p>, Located<Error>> {
    let encoder = Encoder::new(pre);

    let mut words = Vec::with_capacity(pre.size());
    let mut jumps = Vec::new();
    for line in pre.lines() {
        let encoded = encoder.encode_line(line)?;
        words.extend(encoded.words);
        jumps.extend(encoded.jump);
    }

    Ok(Encoded {
        words,
        jumps,
        jump_targets: pre.jump_targets(),
    })
}

#[cfg(test)]
mod tests {
    use super::super::preprocess::preprocess;
    use super::super::types::Loc;
    use super::*;

    fn encode_src(source: &str) -> Result<Vec<Word>, Located<Error>> {
        let pre = preprocess(source);
        encode(&pre).map(|enc| enc.words().to_vec())
    }

    fn encode_err(source: &str) -> Error {
        encode_src(source).unwrap_err().value()
    }

    #[test]
    fn no_operand() {
        assert_eq!(encode_src("NOP\nPOP\nRET\nSTOP"), Ok(vec![0, 10, 30, 31]));
    }

    #[test]
    fn push_show_stop() {
        assert_eq!(
            encode_src("PUSH $42\nSHOW R1\nSTOP"),
            Ok(vec![1, 42, 13, 0, 31])
        );
    }

    #[test]
    fn signed_immediates() {
        assert_eq!(encode_src("PUSH $-5"), Ok(vec![1, -5]));
        assert_eq!(encode_src("PUSH $+5"), Ok(vec![1, 5]));
        assert_eq!(
            encode_src("PUSH $-9223372036854775808"),
            Ok(vec![1, Word::MIN])
        );
    }

    #[test]
    fn register_only() {
        assert_eq!(
            encode_src("SHOW R16\nLOAD Q\nSTORE Z\nINC R2\nDEC R3"),
            Ok(vec![13, 15, 14, 16, 15, 17, 25, 1, 26, 2])
        );
    }

    #[test]
    fn polymorphic_picks_variant() {
        assert_eq!(encode_src("ADD R1 R2"), Ok(vec![2, 0, 1]));
        assert_eq!(encode_src("ADD R1 $5"), Ok(vec![3, 0, 5]));
        assert_eq!(encode_src("SUB R1 $5"), Ok(vec![5, 0, 5]));
        assert_eq!(encode_src("MULT R4 R5"), Ok(vec![6, 3, 4]));
        assert_eq!(encode_src("DIV R1 $0"), Ok(vec![9, 0, 0]));
        assert_eq!(encode_src("MOV R1 Q"), Ok(vec![11, 0, 16]));
        assert_eq!(encode_src("CMP R1 $-1"), Ok(vec![24, 0, -1]));
    }

    #[test]
    fn print_register_or_char() {
        assert_eq!(encode_src("PRINT 'x'"), Ok(vec![28, 120]));
        assert_eq!(encode_src("PRINT R1"), Ok(vec![27, 0]));
        assert_eq!(encode_src("PRINT ' '"), Ok(vec![28, 32]));
        assert_eq!(encode_src("PRINT 'é'"), Ok(vec![28, 0xe9]));
    }

    #[test]
    fn set_register_immediate() {
        assert_eq!(encode_src("SET R2 $7"), Ok(vec![32, 1, 7]));
        assert_eq!(encode_err("SET R2 R3"), Error::MalformedValue("R3".to_owned()));
    }

    #[test]
    fn labels_resolve_both_ways() {
        assert_eq!(encode_src("!LOOP NOP\nJMP LOOP"), Ok(vec![0, 16, 0]));
        assert_eq!(
            encode_src("JZ R1 END\nNOP\n!END STOP"),
            Ok(vec![17, 0, 4, 0, 31])
        );
        assert_eq!(encode_src("CALL 2\nSTOP"), Ok(vec![29, 2, 31]));
    }

    #[test]
    fn jumps_are_recorded_at_operand() {
        let pre = preprocess("NOP\nJNZ R1 0\nADD R1 $1\nJMP 0");
        let enc = encode(&pre).unwrap();
        assert_eq!(
            enc.jumps(),
            &[
                Located::with_loc(Loc::new(2, 8), 0),
                Located::with_loc(Loc::new(4, 5), 0)
            ][..]
        );
    }

    #[test]
    fn wrong_operand_count() {
        assert_eq!(
            encode_err("NOP R1"),
            Error::InvalidArguments {
                mnemonic: Opcode::NOP,
                expected: 0,
                found: 1
            }
        );
        assert_eq!(
            encode_err("ADD R1"),
            Error::InvalidArguments {
                mnemonic: Opcode::ADD,
                expected: 2,
                found: 1
            }
        );
        assert_eq!(
            encode_err("PRINT 'a' 'b'"),
            Error::InvalidArguments {
                mnemonic: Opcode::PRINT,
                expected: 1,
                found: 2
            }
        );
    }

    #[test]
    fn unknown_operations() {
        assert_eq!(encode_err("FOO R1"), Error::UnknownOperation("FOO".to_owned()));
        assert_eq!(encode_err("ADDV R1 $1"), Error::UnknownOperation("ADDV".to_owned()));
        assert_eq!(encode_err("nop"), Error::UnknownOperation("nop".to_owned()));
    }

    #[test]
    fn bad_operands() {
        assert_eq!(encode_err("ADD R99 R1"), Error::InvalidRegister("R99".to_owned()));
        assert_eq!(encode_err("ADD R1 R0"), Error::InvalidRegister("R0".to_owned()));
        assert_eq!(encode_err("PUSH 42"), Error::MalformedValue("42".to_owned()));
        assert_eq!(encode_err("PUSH $4x"), Error::InvalidInteger("$4x".to_owned()));
        assert_eq!(encode_err("PUSH $"), Error::InvalidInteger("$".to_owned()));
        assert_eq!(encode_err("JMP NOWHERE"), Error::UndefinedLabel("NOWHERE".to_owned()));
        assert_eq!(encode_err("JMP -1"), Error::MalformedAddress("-1".to_owned()));
        assert_eq!(encode_err("JMP +2"), Error::MalformedAddress("+2".to_owned()));
        assert_eq!(encode_err("JNZ R1 +0"), Error::MalformedAddress("+0".to_owned()));
        assert_eq!(
            encode_err("JMP 99999999999999999999"),
            Error::MalformedAddress("99999999999999999999".to_owned())
        );
        assert_eq!(encode_err("JMP loop"), Error::MalformedAddress("loop".to_owned()));
        assert_eq!(encode_err("JZ R1 $3"), Error::MalformedAddress("$3".to_owned()));
        assert_eq!(encode_err("PRINT 'ab'"), Error::NotRegisterOrChar("'ab'".to_owned()));
        assert_eq!(encode_err("PRINT x"), Error::NotRegisterOrChar("x".to_owned()));
    }

    #[test]
    fn error_is_located_at_operand() {
        let err = encode_src("NOP\n\nADD R1 R99").unwrap_err();
        assert_eq!(err.loc(), Loc::new(3, 8));
        assert_eq!(err.to_string(), "line 3: invalid register: R99");
    }

    #[test]
    fn first_error_wins() {
        assert_eq!(
            encode_err("INC R20\nFOO"),
            Error::InvalidRegister("R20".to_owned())
        );
    }

    #[test]
    fn helpers() {
        assert!(is_label_ref("LOOP"));
        assert!(is_label_ref("loopX"));
        assert!(!is_label_ref("LOOP1"));
        assert!(!is_label_ref(""));
        assert_eq!(char_literal("'''"), Some('\''));
        assert_eq!(char_literal("'"), None);
        assert_eq!(char_literal("''"), None);
    }
}
