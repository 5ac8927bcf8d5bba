//! Guards for a byte-oriented lexer.
//!
//! A generated lexer looks at the remaining input `s` as bytes. For every
//! terminal it needs a condition on a prefix of `s` (the [`Guard`]) and how much
//! input to consume once the guard holds (the [`Consume`]). [`lex_cases`]
//! derives both from a [`Terminal`], but doesn't emit any code.
//!
//! Code points beyond ASCII are UTF-8 encoded. A [`Range`] whose lower bound is
//! ASCII and whose upper bound is not, can't be checked by a single comparison
//! and is split at `0x7f`/`0x80`.

mod code_points;

use std::fmt::{
    self,
    Display,
};

use itertools::Itertools;

pub use self::code_points::CodePointSet;
use crate::{
    expr::{
        Bound,
        Range,
    },
    Terminal,
};

/// A condition on the prefix of the remaining input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Guard {
    /// `s[0] == byte`
    Byte(u8),

    /// `s` starts with `bytes`.
    Bytes(Vec<u8>),

    /// `lo <= s[0] <= hi`
    ByteRange { lo: u8, hi: u8 },

    /// `lo <= s[..n] <= hi`, where `lo` and `hi` are UTF-8 encoded code points
    /// and prefixes are compared lexicographically with the respective
    /// encoding's length.
    EncodedRange { lo: Vec<u8>, hi: Vec<u8> },
}

impl Display for Guard {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Byte(b) => write!(f, "s[0] == {b:#04x}"),
            Self::Bytes(bytes) => write!(f, "s[..{}] == [{}]", bytes.len(), hex(bytes)),
            Self::ByteRange { lo, hi } => write!(f, "s[0] >= {lo:#04x} && s[0] <= {hi:#04x}"),
            Self::EncodedRange { lo, hi } => {
                write!(
                    f,
                    "s[..{}] >= [{}] && s[..{}] <= [{}]",
                    lo.len(),
                    hex(lo),
                    hi.len(),
                    hex(hi)
                )
            }
        }
    }
}

fn hex(bytes: &[u8]) -> impl Display + '_ {
    bytes
        .iter()
        .format_with(", ", |b, f| f(&format_args!("{b:#04x}")))
}

/// How much input a matched guard consumes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Consume {
    Bytes(usize),

    /// One UTF-8 encoded code point, however long its encoding is.
    Rune,
}

/// One branch of a lexer dispatch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LexCase {
    /// The leaf terminal this case recognizes.
    pub terminal: Terminal,
    pub guard: Guard,
    /// Human-readable description for the generated code.
    pub comment: String,
    pub consume: Consume,
}

impl LexCase {
    fn new(terminal: &Terminal, guard: Guard, comment: impl Into<String>, consume: Consume) -> Self {
        Self {
            terminal: terminal.clone(),
            guard,
            comment: comment.into(),
            consume,
        }
    }
}

/// Returns the lexer cases for a terminal.
///
/// Certified containers yield the cases of their leaves in order. The empty
/// string consumes nothing and needs no case. Everything else yields one
/// case, except for ranges that mix an ASCII lower bound with a multi-byte
/// upper bound, which yield two.
pub fn lex_cases(terminal: &Terminal) -> Vec<LexCase> {
    let mut cases = vec![];
    push_lex_cases(terminal, &mut cases);
    tracing::trace!("{} lex case(s) for {}", cases.len(), terminal);
    cases
}

fn push_lex_cases(terminal: &Terminal, cases: &mut Vec<LexCase>) {
    match terminal {
        Terminal::Empty => {}
        Terminal::Byte(b) => {
            cases.push(LexCase::new(
                terminal,
                Guard::Byte(*b),
                terminal.to_string(),
                Consume::Bytes(1),
            ))
        }
        Terminal::Rune(c) => {
            cases.push(LexCase::new(
                terminal,
                Guard::Bytes(encode(*c)),
                terminal.to_string(),
                Consume::Rune,
            ))
        }
        Terminal::Token(token) => {
            let bytes = token.as_str().as_bytes().to_vec();
            let n = bytes.len();
            cases.push(LexCase::new(
                terminal,
                Guard::Bytes(bytes),
                terminal.to_string(),
                Consume::Bytes(n),
            ))
        }
        Terminal::Range(range) => push_range_cases(terminal, range, cases),
        Terminal::Alternative(alternative) => {
            for branch in alternative.body() {
                push_lex_cases(branch, cases);
            }
        }
        Terminal::Optional(optional) => push_lex_cases(optional.body(), cases),
        Terminal::Repetition(repetition) => push_lex_cases(repetition.body(), cases),
    }
}

fn push_range_cases(terminal: &Terminal, range: &Range, cases: &mut Vec<LexCase>) {
    match (range.lo(), range.hi()) {
        (Bound::Byte(lo), Bound::Byte(hi)) => {
            cases.push(LexCase::new(
                terminal,
                Guard::ByteRange { lo, hi },
                terminal.to_string(),
                Consume::Bytes(1),
            ))
        }
        (Bound::Rune(lo), Bound::Rune(hi)) => {
            cases.push(LexCase::new(
                terminal,
                Guard::EncodedRange {
                    lo: encode(lo),
                    hi: encode(hi),
                },
                terminal.to_string(),
                Consume::Rune,
            ))
        }
        (Bound::Byte(lo), Bound::Rune(hi)) => {
            cases.push(LexCase::new(
                terminal,
                Guard::ByteRange { lo, hi: 0x7f },
                format!("{} … \"\\x7f\" of {terminal}", range.lo()),
                Consume::Bytes(1),
            ));
            cases.push(LexCase::new(
                terminal,
                Guard::EncodedRange {
                    lo: encode('\u{80}'),
                    hi: encode(hi),
                },
                format!("\"\\u{{80}}\" … {} of {terminal}", range.hi()),
                Consume::Rune,
            ));
        }
        // byte bounds are ASCII and `lo < hi`
        (Bound::Rune(_), Bound::Byte(_)) => unreachable!("range {range} has unordered bounds"),
    }
}

fn encode(c: char) -> Vec<u8> {
    let mut buf = [0; 4];
    c.encode_utf8(&mut buf).as_bytes().to_vec()
}
