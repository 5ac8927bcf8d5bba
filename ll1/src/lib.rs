#![cfg_attr(docsrs, feature(doc_cfg))]

//! Grammar algebra and static analysis for LL(1) lexer/parser synthesis.
//!
//! The pipeline is:
//!
//!  1. A raw EBNF tree ([`ebnf::ast`]) is read by an external reader (or by
//!     [`ebnf::parse`] if the `reader` feature is enabled).
//!  2. The raw tree is normalized into the expression algebra in [`expr`].
//!     The smart constructors apply the simplification laws and certify
//!     containers that only hold terminals as [`Terminal`]s.
//!  3. The normalized productions are collected into a [`Grammar`], which
//!     provides the static analyses: reachable terminals and names, FIRST sets
//!     and nullability.
//!  4. [`lex`] turns every terminal into guard descriptors for a byte-oriented
//!     lexer, and [`analysis`] bundles everything for a start symbol into the
//!     handoff consumed by a code emitter.
//!
//! # Example
//!
//! ```
//! # use ll1::{ebnf, Grammar, Error};
//! # fn main() -> Result<(), Error> {
//! let ast = ebnf::parse(
//!     r#"
//! list   = item { "," item } .
//! item   = digit { digit } | "-" .
//! digit  = "0" … "9" .
//!     "#,
//! )?;
//! let grammar = Grammar::from_ebnf(&ast)?;
//!
//! let first = grammar.first()?;
//! assert_eq!(first.get("list").map(|set| set.len()), Some(2));
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod ebnf;
pub mod expr;
pub mod grammar;
pub mod lex;
pub mod matching;
mod utils;

pub use crate::{
    expr::{
        Expr,
        Name,
        Terminal,
    },
    grammar::{
        Grammar,
        Production,
    },
};

/// The broad category of an [`Error`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input to a constructor or analysis was malformed.
    InvalidArgument,

    /// An internal invariant was violated.
    Unexpected,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("alternative must have at least one element")]
    EmptyAlternative,

    #[error("sequence must have at least one element")]
    EmptySequence,

    #[error("invalid identifier: {0:?}")]
    InvalidName(String),

    #[error("invalid range: {lo} … {hi}")]
    InvalidRange { lo: String, hi: String },

    #[error("invalid range bound {0:?}: must be exactly one character")]
    InvalidRangeBound(String),

    #[error("production '{0}' is undefined")]
    Undefined(String),

    #[error("production '{0}' is defined more than once")]
    Duplicate(String),

    #[error("{0} can't be folded into a code point set")]
    NotEnumerable(String),

    #[cfg(feature = "reader")]
    #[error("parse error:\n{0}")]
    Parse(String),

    #[error("invalid analysis parameters")]
    Parameters(#[from] analysis::CheckError),

    #[error("unexpected expression, this is most likely a bug: {0}")]
    Unexpected(String),

    #[error("invalid production '{name}'")]
    Production {
        name: String,
        #[source]
        source: Box<Error>,
    },

    #[error("invalid element #{index} in {kind}")]
    Element {
        kind: &'static str,
        index: usize,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unexpected(_) => ErrorKind::Unexpected,
            Self::Production { source, .. } | Self::Element { source, .. } => source.kind(),
            _ => ErrorKind::InvalidArgument,
        }
    }

    /// Strips the context wrappers and returns the underlying error.
    pub fn root_cause(&self) -> &Error {
        match self {
            Self::Production { source, .. } | Self::Element { source, .. } => source.root_cause(),
            _ => self,
        }
    }

    pub(crate) fn in_production(self, name: impl Into<String>) -> Self {
        Self::Production {
            name: name.into(),
            source: Box::new(self),
        }
    }

    pub(crate) fn in_element(self, kind: &'static str, index: usize) -> Self {
        Self::Element {
            kind,
            index,
            source: Box::new(self),
        }
    }
}
