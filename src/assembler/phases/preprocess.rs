use super::tokenize;
use super::types::Located;
use crate::isa::Word;
use log::{debug, warn};
use std::collections::HashMap;
use std::collections::HashSet;
use std::convert::TryFrom;

pub const LABEL_CHAR: char = '!';

/// A label-stripped instruction line, as seen by pass 2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line<'a> {
    addr: Word,
    mnemonic: Located<&'a str>,
    operands: Vec<Located<&'a str>>,
}

impl<'a> Line<'a> {
    pub fn addr(&self) -> Word {
        self.addr
    }

    pub fn mnemonic(&self) -> Located<&'a str> {
        self.mnemonic
    }

    pub fn operands(&self) -> &[Located<&'a str>] {
        &self.operands
    }

    /// Every token on the line occupies exactly one word.
    pub fn words(&self) -> usize {
        1 + self.operands.len()
    }
}

#[derive(Debug, Default)]
pub struct Labels {
    table: HashMap<String, Word>,
}

impl Labels {
    pub fn get(&self, name: &str) -> Option<Word> {
        self.table.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    fn bind(&mut self, name: &str, addr: Word) -> Option<Word> {
        self.table.insert(name.to_owned(), addr)
    }
}

/// The addresses at which some instruction begins.
#[derive(Debug, Default)]
pub struct JumpTargets {
    addrs: HashSet<Word>,
}

impl JumpTargets {
    pub fn contains(&self, addr: Word) -> bool {
        self.addrs.contains(&addr)
    }

    pub fn len(&self) -> usize {
        self.addrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addrs.is_empty()
    }

    fn insert(&mut self, addr: Word) {
        self.addrs.insert(addr);
    }
}

#[derive(Debug, Default)]
pub struct Preprocessed<'a> {
    lines: Vec<Line<'a>>,
    labels: Labels,
    jump_targets: JumpTargets,
    size: usize,
}

impl<'a> Preprocessed<'a> {
    pub fn lines(&self) -> &[Line<'a>] {
        &self.lines
    }

    pub fn labels(&self) -> &Labels {
        &self.labels
    }

    pub fn jump_targets(&self) -> &JumpTargets {
        &self.jump_targets
    }

    /// Length in words of the program that pass 2 will emit.
    pub fn size(&self) -> usize {
        self.size
    }

    fn addr(&self) -> Word {
        Word::try_from(self.size).unwrap_or(Word::MAX)
    }

    fn bind_label(&mut self, name: Located<&str>) {
        let addr = self.addr();
        debug!("label '{}' -> {}", name.get(), addr);

        if let Some(prev) = self.labels.bind(name.get(), addr) {
            warn!(
                "{}: label '{}' redeclared (was {}, now {})",
                name.loc(),
                name.get(),
                prev,
                addr
            );
        }
    }

    fn push(&mut self, mnemonic: Located<&'a str>, operands: Vec<Located<&'a str>>) {
        let line = Line {
            addr: self.addr(),
            mnemonic,
            operands,
        };

        self.jump_targets.insert(line.addr);
        self.size += line.words();
        self.lines.push(line);
    }
}

pub fn preprocess(source: &str) -> Preprocessed<'_> {
    let mut pre = Preprocessed::default();

    for tokens in tokenize::tokenize(source) {
        let mut tokens = tokens.into_iter();
        let mut first = match tokens.next() {
            Some(first) => first,
            None => continue,
        };

        let raw: &str = *first.get();
        if let Some(name) = raw.strip_prefix(LABEL_CHAR) {
            pre.bind_label(first.transfer(name));

            first = match tokens.next() {
                Some(next) => next,
                // A label on its own names whatever comes next.
                None => continue,
            };
        }

        pre.push(first, tokens.collect());
    }

    debug!(
        "preprocessed {} instruction(s), {} label(s), {} word(s)",
        pre.lines.len(),
        pre.labels.len(),
        pre.size
    );

    pre
}
