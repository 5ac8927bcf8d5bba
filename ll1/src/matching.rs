//! Matching single terminals against strings.

use crate::{
    expr::Bound,
    utils::single_char,
    Error,
    Terminal,
};

impl Terminal {
    /// Returns whether `s` is exactly the string this terminal stands for.
    ///
    /// Only leaves can be matched. Certified containers describe more than one
    /// string and result in [`Error::Unexpected`].
    pub fn match_str(&self, s: &str) -> Result<bool, Error> {
        match self {
            Self::Empty => Ok(s.is_empty()),
            Self::Byte(b) => Ok(s.as_bytes() == [*b]),
            Self::Rune(c) => Ok(single_char(s) == Some(*c)),
            Self::Token(token) => Ok(s == token.as_str()),
            Self::Range(range) => {
                let (Some(c), Some(&first)) = (single_char(s), s.as_bytes().first())
                else {
                    return Ok(false);
                };

                let above = match range.lo() {
                    Bound::Byte(lo) => first >= lo,
                    Bound::Rune(lo) => c >= lo,
                };
                let below = match range.hi() {
                    Bound::Byte(hi) => first <= hi,
                    Bound::Rune(hi) => c <= hi,
                };

                Ok(above && below)
            }
            Self::Alternative(_) | Self::Optional(_) | Self::Repetition(_) => {
                Err(Error::Unexpected(format!("can't match {self} against a string")))
            }
        }
    }
}
