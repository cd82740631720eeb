use super::{encode, validate};
use derive_more::Constructor;
use std::fmt::Display;

/*
    Phases:

        1.  Preprocessing (pass 1): Each line is tokenized at whitespace (comments dropped, character
            literals kept whole). Lines with no tokens take up no address space. Otherwise the current
            word address is recorded as an instruction start, a leading `!LABEL` is bound to it and
            stripped, and the address advances by the number of tokens left on the line.

        2.  Encoding (pass 2): With every label now known, each remaining line is turned into its
            words: the opcode, then one word per operand. Polymorphic mnemonics pick their private
            immediate opcode here if the operand is an immediate. Every address written by a jump
            or call is remembered along with where it came from.

        3.  Validation: Each remembered jump address must be one of the instruction starts found in
            pass 1, otherwise it points into the middle of an instruction or past the end.

    Every phase takes the previous phase's output by value or reference, so they cannot be run out
    of order. The first error stops everything.
*/

#[derive(Debug, PartialEq, Eq, Clone, Copy, Constructor)]
pub struct Loc {
    line: usize,
    col: usize,
}

impl Loc {
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn col(&self) -> usize {
        self.col
    }
}

impl Display for Loc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}", self.line)
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Located<T> {
    loc: Loc,
    val: T,
}

impl<T: Display> Display for Located<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.loc, self.val)
    }
}

impl<T> Located<T> {
    pub fn with_loc(loc: Loc, val: T) -> Self {
        Located { loc, val }
    }

    pub fn loc(&self) -> Loc {
        self.loc
    }

    pub fn get(&self) -> &T {
        &self.val
    }

    pub fn value(self) -> T {
        self.val
    }

    pub fn map<S, F>(self, f: F) -> Located<S>
    where
        F: FnOnce(T) -> S,
    {
        Located::with_loc(self.loc, f(self.val))
    }

    pub fn transfer<S>(&self, s: S) -> Located<S> {
        Located::with_loc(self.loc, s)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    Encode(Located<encode::Error>),
    Validate(Located<validate::Error>),
}

impl Error {
    pub fn loc(&self) -> Loc {
        match self {
            Error::Encode(err) => err.loc(),
            Error::Validate(err) => err.loc(),
        }
    }
}

impl From<Located<encode::Error>> for Error {
    fn from(err: Located<encode::Error>) -> Self {
        Error::Encode(err)
    }
}

impl From<Located<validate::Error>> for Error {
    fn from(err: Located<validate::Error>) -> Self {
        Error::Validate(err)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Encode(err) => write!(f, "{}", err),
            Error::Validate(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for Error {}
