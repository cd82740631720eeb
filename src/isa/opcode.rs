use super::hw::Word;
use derive_more::Display;
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

static STORAGE: Lazy<InstructionSet> = Lazy::new(InstructionSet::new);

#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive, EnumIter)]
pub enum Opcode {
    NOP = 0,
    PUSH = 1,
    ADD = 2,
    ADDV = 3,
    SUB = 4,
    SUBV = 5,
    MULT = 6,
    MULTV = 7,
    DIV = 8,
    DIVV = 9,
    POP = 10,
    MOV = 11,
    MOVV = 12,
    SHOW = 13,
    LOAD = 14,
    STORE = 15,
    JMP = 16,
    JZ = 17,
    JNZ = 18,
    JE = 19,
    JNE = 20,
    JLT = 21,
    JGT = 22,
    CMP = 23,
    CMPV = 24,
    INC = 25,
    DEC = 26,
    PRINT = 27,
    PRINTV = 28,
    CALL = 29,
    RET = 30,
    STOP = 31,
    SET = 32,
}

/// How the operands of a public mnemonic are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    NoOperand,
    /// `$value`
    Immediate,
    Register,
    /// A label reference or a literal word address.
    Address,
    RegisterAddress,
    RegisterImmediate,
    /// `reg reg`, or `reg $value` which encodes as the carried opcode instead.
    RegisterOrImmediate(Opcode),
    /// `reg`, or `'c'` which encodes as the carried opcode instead.
    RegisterOrChar(Opcode),
}

impl Rule {
    pub fn operand_count(self) -> usize {
        match self {
            Rule::NoOperand => 0,
            Rule::Immediate | Rule::Register | Rule::Address | Rule::RegisterOrChar(_) => 1,
            Rule::RegisterAddress | Rule::RegisterImmediate | Rule::RegisterOrImmediate(_) => 2,
        }
    }

    /// Whether the operand in last position is written to the jump reference list.
    pub fn is_jump(self) -> bool {
        matches!(self, Rule::Address | Rule::RegisterAddress)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Form {
    Public(Rule),
    /// Only ever selected by the assembler, as the immediate-operand variant
    /// of the given public opcode.
    ImmediateOf(Opcode),
}

impl Opcode {
    pub fn form(self) -> Form {
        use Opcode::*;

        match self {
            NOP | POP | RET | STOP => Form::Public(Rule::NoOperand),
            PUSH => Form::Public(Rule::Immediate),
            SHOW | LOAD | STORE | INC | DEC => Form::Public(Rule::Register),
            JMP | JE | JNE | JLT | JGT | CALL => Form::Public(Rule::Address),
            JZ | JNZ => Form::Public(Rule::RegisterAddress),
            SET => Form::Public(Rule::RegisterImmediate),

            ADD => Form::Public(Rule::RegisterOrImmediate(ADDV)),
            SUB => Form::Public(Rule::RegisterOrImmediate(SUBV)),
            MULT => Form::Public(Rule::RegisterOrImmediate(MULTV)),
            DIV => Form::Public(Rule::RegisterOrImmediate(DIVV)),
            MOV => Form::Public(Rule::RegisterOrImmediate(MOVV)),
            CMP => Form::Public(Rule::RegisterOrImmediate(CMPV)),
            PRINT => Form::Public(Rule::RegisterOrChar(PRINTV)),

            ADDV => Form::ImmediateOf(ADD),
            SUBV => Form::ImmediateOf(SUB),
            MULTV => Form::ImmediateOf(MULT),
            DIVV => Form::ImmediateOf(DIV),
            MOVV => Form::ImmediateOf(MOV),
            CMPV => Form::ImmediateOf(CMP),
            PRINTV => Form::ImmediateOf(PRINT),
        }
    }

    /// `None` for private opcodes.
    pub fn rule(self) -> Option<Rule> {
        match self.form() {
            Form::Public(rule) => Some(rule),
            Form::ImmediateOf(_) => None,
        }
    }

    pub fn is_public(self) -> bool {
        self.rule().is_some()
    }

    /// The mnemonic a programmer writes to get this opcode.
    pub fn public_form(self) -> Opcode {
        match self.form() {
            Form::Public(_) => self,
            Form::ImmediateOf(public) => public,
        }
    }

    pub fn encode(self) -> Word {
        self as Word
    }

    pub fn decode(raw: Word) -> Option<Opcode> {
        Opcode::from_i64(raw)
    }
}

/// The mnemonics which may appear in source, and the rule for each.
pub struct InstructionSet {
    mnemonics: HashMap<String, (Opcode, Rule)>,
}

impl InstructionSet {
    fn new() -> Self {
        InstructionSet {
            mnemonics: Opcode::iter()
                .filter_map(|op| op.rule().map(|rule| (op.to_string(), (op, rule))))
                .collect(),
        }
    }

    pub fn get() -> &'static InstructionSet {
        Lazy::force(&STORAGE)
    }

    pub fn lookup(&self, mnemonic: &str) -> Option<(Opcode, Rule)> {
        self.mnemonics.get(mnemonic).copied()
    }

    pub fn len(&self) -> usize {
        self.mnemonics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mnemonics.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn numbering_is_stable() {
        assert_eq!(Opcode::NOP.encode(), 0);
        assert_eq!(Opcode::PUSH.encode(), 1);
        assert_eq!(Opcode::ADDV.encode(), 3);
        assert_eq!(Opcode::SHOW.encode(), 13);
        assert_eq!(Opcode::JMP.encode(), 16);
        assert_eq!(Opcode::PRINTV.encode(), 28);
        assert_eq!(Opcode::STOP.encode(), 31);
        assert_eq!(Opcode::SET.encode(), 32);
    }

    #[test]
    fn opcodes_are_unique_and_decode() {
        let codes: HashSet<Word> = Opcode::iter().map(Opcode::encode).collect();
        assert_eq!(codes.len(), Opcode::iter().count());

        for op in Opcode::iter() {
            assert_eq!(Opcode::decode(op.encode()), Some(op));
        }
        assert_eq!(Opcode::decode(33), None);
        assert_eq!(Opcode::decode(-1), None);
    }

    #[test]
    fn private_mnemonics_are_not_visible() {
        let set = InstructionSet::get();
        for private in &["ADDV", "SUBV", "MULTV", "DIVV", "MOVV", "CMPV", "PRINTV"] {
            assert_eq!(set.lookup(private), None);
        }
        assert_eq!(set.len(), Opcode::iter().filter(|op| op.is_public()).count());
        assert_eq!(set.lookup("add"), None);
        assert_eq!(
            set.lookup("JZ"),
            Some((Opcode::JZ, Rule::RegisterAddress))
        );
    }

    #[test]
    fn immediate_variants_point_both_ways() {
        for op in Opcode::iter() {
            match op.form() {
                Form::Public(Rule::RegisterOrImmediate(variant))
                | Form::Public(Rule::RegisterOrChar(variant)) => {
                    assert!(!variant.is_public());
                    assert_eq!(variant.public_form(), op);
                }
                Form::Public(_) => assert_eq!(op.public_form(), op),
                Form::ImmediateOf(public) => match public.rule() {
                    Some(Rule::RegisterOrImmediate(variant))
                    | Some(Rule::RegisterOrChar(variant)) => assert_eq!(variant, op),
                    rule => panic!("{} is the variant of {} with rule {:?}", op, public, rule),
                },
            }
        }
    }

    #[test]
    fn operand_counts() {
        assert_eq!(Rule::NoOperand.operand_count(), 0);
        assert_eq!(Rule::RegisterOrChar(Opcode::PRINTV).operand_count(), 1);
        assert_eq!(Rule::RegisterOrImmediate(Opcode::ADDV).operand_count(), 2);
        assert!(Rule::RegisterAddress.is_jump());
        assert!(!Rule::RegisterImmediate.is_jump());
    }
}
