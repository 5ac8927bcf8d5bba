use std::{
    fmt::{
        self,
        Display,
    },
    ops::RangeInclusive,
};

use super::{
    Alternative,
    Optional,
    Repetition,
};
use crate::{
    utils::{
        into_single,
        single_char,
    },
    Error,
};

/// An expression that is known to only contain terminal leaves.
///
/// The container variants ([`Terminal::Alternative`], [`Terminal::Optional`]
/// and [`Terminal::Repetition`]) are the certified counterparts of
/// [`Expr::Alternative`], [`Expr::Optional`] and [`Expr::Repetition`]. They are
/// produced by the smart constructors whenever every child is a terminal, so
/// anything holding a `Terminal` can rely on that without scanning the tree.
///
/// [`Expr::Alternative`]: super::Expr::Alternative
/// [`Expr::Optional`]: super::Expr::Optional
/// [`Expr::Repetition`]: super::Expr::Repetition
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub enum Terminal {
    /// Matches only the empty string.
    Empty,

    /// Matches exactly one byte.
    Byte(u8),

    /// Matches exactly one code point that is encoded with more than one byte.
    Rune(char),

    /// Matches a literal of at least two code points.
    Token(Token),

    /// Matches a single code point in a closed interval.
    Range(Range),

    Alternative(Alternative<Terminal>),

    Optional(Optional<Terminal>),

    Repetition(Repetition<Terminal>),
}

impl Terminal {
    /// Classifies a literal into [`Terminal::Empty`], [`Terminal::Byte`],
    /// [`Terminal::Rune`] or [`Terminal::Token`].
    pub fn from_literal(text: &str) -> Self {
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (None, _) => Self::Empty,
            (Some(c), None) => Self::from_char(c),
            _ => Self::Token(Token(text.to_owned())),
        }
    }

    /// A single-byte character becomes a [`Terminal::Byte`], anything else a
    /// [`Terminal::Rune`].
    pub fn from_char(c: char) -> Self {
        Bound::from_char(c).into()
    }

    /// Creates a certified alternative.
    ///
    /// Nested alternatives are flattened and a single element is returned as
    /// is.
    pub fn alternative(body: Vec<Terminal>) -> Result<Self, Error> {
        let mut flat = Vec::with_capacity(body.len());
        for terminal in body {
            match terminal {
                Self::Alternative(alternative) => flat.extend(alternative.into_body()),
                terminal => flat.push(terminal),
            }
        }

        if flat.is_empty() {
            return Err(Error::EmptyAlternative);
        }

        Ok(match into_single(flat) {
            Ok(terminal) => terminal,
            Err(flat) => Self::Alternative(Alternative::new_unchecked(flat)),
        })
    }

    /// Creates a certified optional.
    ///
    /// `[""]` is `""`, and optionals of optionals or repetitions collapse into
    /// their body.
    pub fn optional(body: Terminal) -> Self {
        match body {
            Self::Empty | Self::Optional(_) | Self::Repetition(_) => body,
            body => Self::Optional(Optional::new(body)),
        }
    }

    /// Creates a certified repetition.
    pub fn repetition(body: Terminal) -> Self {
        Self::Repetition(Repetition::new(body))
    }

    /// Whether this terminal is a single leaf, as opposed to a certified
    /// container.
    pub fn is_leaf(&self) -> bool {
        !matches!(
            self,
            Self::Alternative(_) | Self::Optional(_) | Self::Repetition(_)
        )
    }

    /// Whether this terminal matches the empty string.
    pub fn is_nullable(&self) -> bool {
        match self {
            Self::Empty | Self::Optional(_) | Self::Repetition(_) => true,
            Self::Byte(_) | Self::Rune(_) | Self::Token(_) | Self::Range(_) => false,
            Self::Alternative(alternative) => alternative.body().iter().any(Self::is_nullable),
        }
    }
}

impl Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "\"\""),
            Self::Byte(b) => write!(f, "{:?}", char::from(*b).to_string()),
            Self::Rune(c) => write!(f, "{:?}", c.to_string()),
            Self::Token(token) => write!(f, "{token}"),
            Self::Range(range) => write!(f, "{range}"),
            Self::Alternative(alternative) => write!(f, "{alternative}"),
            Self::Optional(optional) => write!(f, "{optional}"),
            Self::Repetition(repetition) => write!(f, "{repetition}"),
        }
    }
}

impl From<Token> for Terminal {
    fn from(value: Token) -> Self {
        Self::Token(value)
    }
}

impl From<Range> for Terminal {
    fn from(value: Range) -> Self {
        Self::Range(value)
    }
}

/// A literal of at least two code points.
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Token(String);

impl Token {
    /// Returns `None` if `text` has less than two code points.
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        (text.chars().nth(1).is_some()).then_some(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

/// A bound of a [`Range`].
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq)]
pub enum Bound {
    Byte(u8),
    Rune(char),
}

impl Bound {
    pub fn from_char(c: char) -> Self {
        if c.is_ascii() {
            Self::Byte(c as u8)
        }
        else {
            Self::Rune(c)
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Self::Byte(b) => char::from(b),
            Self::Rune(c) => c,
        }
    }

    pub fn is_single_byte(self) -> bool {
        matches!(self, Self::Byte(_))
    }
}

impl From<Bound> for Terminal {
    fn from(value: Bound) -> Self {
        match value {
            Bound::Byte(b) => Terminal::Byte(b),
            Bound::Rune(c) => Terminal::Rune(c),
        }
    }
}

impl Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        Terminal::from(*self).fmt(f)
    }
}

/// A closed interval of code points, `lo … hi`.
///
/// Each bound is either a single byte or a multi-byte rune. A range always
/// covers at least two code points; `a … a` is simplified to `a` when it's
/// constructed.
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq)]
pub struct Range {
    lo: Bound,
    hi: Bound,
}

impl Range {
    pub fn new(lo: char, hi: char) -> Result<Terminal, Error> {
        if lo > hi {
            return Err(Error::InvalidRange {
                lo: format!("{lo:?}"),
                hi: format!("{hi:?}"),
            });
        }

        if lo == hi {
            return Ok(Terminal::from_char(lo));
        }

        Ok(Terminal::Range(Self {
            lo: Bound::from_char(lo),
            hi: Bound::from_char(hi),
        }))
    }

    /// Creates a range from the literals of a raw `"lo" … "hi"` expression.
    pub fn from_literals(lo: &str, hi: &str) -> Result<Terminal, Error> {
        let lo = single_char(lo).ok_or_else(|| Error::InvalidRangeBound(lo.to_owned()))?;
        let hi = single_char(hi).ok_or_else(|| Error::InvalidRangeBound(hi.to_owned()))?;
        Self::new(lo, hi)
    }

    pub fn lo(&self) -> Bound {
        self.lo
    }

    pub fn hi(&self) -> Bound {
        self.hi
    }

    /// Iterates over every code point in the range. Surrogates are skipped.
    pub fn chars(&self) -> RangeInclusive<char> {
        self.lo.to_char()..=self.hi.to_char()
    }

    pub fn contains(&self, c: char) -> bool {
        self.chars().contains(&c)
    }
}

impl Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} … {}", self.lo, self.hi)
    }
}
