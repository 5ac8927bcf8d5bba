//! The EBNF input interface.
//!
//! [`ast`] holds the raw tree that is normalized by [`Expr::from_ebnf`]. With
//! the `reader` feature enabled, [`parse`] reads that tree from text written
//! in the classic notation:
//!
//! ```text
//! Production  = name "=" Expression "." .
//! Expression  = Alternative { "|" Alternative } .
//! Alternative = Term { Term } .
//! Term        = name | token [ "…" token ] | Group | Option | Repetition .
//! Group       = "(" Expression ")" .
//! Option      = "[" Expression "]" .
//! Repetition  = "{" Expression "}" .
//! ```
//!
//! [`Expr::from_ebnf`]: crate::Expr::from_ebnf

pub mod ast;
#[cfg(feature = "reader")]
mod parser;

#[cfg(feature = "reader")]
use crate::Error;

#[cfg_attr(docsrs, doc(cfg(feature = "reader")))]
#[cfg(feature = "reader")]
pub fn parse(input: &str) -> Result<ast::Grammar, Error> {
    match parser::parse_grammar_complete(input) {
        Ok((_, ast)) => Ok(ast),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            Err(Error::Parse(nom::error::convert_error(input, e)))
        }
        Err(nom::Err::Incomplete(_)) => Err(Error::Parse("incomplete input".to_owned())),
    }
}
