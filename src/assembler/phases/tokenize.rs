use super::types::{Loc, Located};
use std::iter::Peekable;
use std::str::CharIndices;

pub const COMMENT_CHAR: char = '#';
pub const CHAR_LITERAL_CHAR: char = '\'';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SeekMode {
    Name,
    CharLiteral,
}

impl From<char> for SeekMode {
    fn from(c: char) -> Self {
        match c {
            CHAR_LITERAL_CHAR => SeekMode::CharLiteral,
            _ => SeekMode::Name,
        }
    }
}

impl SeekMode {
    fn should_terminate(self, c: char) -> bool {
        match self {
            SeekMode::Name => c.is_whitespace() || c == COMMENT_CHAR,
            // Whitespace and the comment char are literal until the closing quote.
            SeekMode::CharLiteral => false,
        }
    }

    fn advance(self, c: char) -> Self {
        match self {
            SeekMode::CharLiteral if c == CHAR_LITERAL_CHAR => SeekMode::Name,
            mode => mode,
        }
    }
}

/// Nothing here can fail: a token which is malformed (e.g. an unterminated
/// character literal) is still a token, and it is the encoder's job to
/// reject it. This is what lets pass 1 count words without knowing the grammar.
fn consume_one<'a>(
    line_no: usize,
    line: &'a str,
    chars: &mut Peekable<CharIndices<'a>>,
) -> Option<Located<&'a str>> {
    let (start, first) = loop {
        match chars.peek().copied() {
            None | Some((_, COMMENT_CHAR)) => return None,
            Some((_, c)) if c.is_whitespace() => {
                chars.next();
            }
            Some(next) => {
                chars.next();
                break next;
            }
        }
    };

    let mut mode = SeekMode::from(first);
    let end = loop {
        match chars.peek().copied() {
            None => break line.len(),
            Some((idx, c)) if mode.should_terminate(c) => break idx,
            Some((_, c)) => {
                mode = mode.advance(c);
                chars.next();
            }
        }
    };

    let col = line[..start].chars().count() + 1;
    Some(Located::with_loc(
        Loc::new(line_no, col),
        &line[start..end],
    ))
}

pub fn tokenize_line(line_no: usize, line: &str) -> Vec<Located<&str>> {
    let mut chars = line.char_indices().peekable();
    std::iter::from_fn(|| consume_one(line_no, line, &mut chars)).collect()
}

/// One token list per source line, blank and comment lines included (as empty lists),
/// so that line numbers stay 1-based and in step with the file.
pub fn tokenize(source: &str) -> impl Iterator<Item = Vec<Located<&str>>> + '_ {
    source
        .lines()
        .enumerate()
        .map(|(idx, line)| tokenize_line(idx + 1, line))
}
