//! The grammar expression algebra.
//!
//! Expressions are only built through smart constructors, which simplify
//! eagerly:
//!
//! | input             | result                       |
//! |-------------------|------------------------------|
//! | `(x)`             | `x`                          |
//! | `a` as a 1-list   | `a`                          |
//! | `a \| (b \| c)`   | `a \| b \| c`                |
//! | `[{x}]`           | `{x}`                        |
//! | `[[x]]`           | `[x]`                        |
//! | `[""]`            | `""`                         |
//! | `""`              | [`Terminal::Empty`]          |
//! | `"a"`             | [`Terminal::Byte`]           |
//! | `"λ"`             | [`Terminal::Rune`]           |
//! | `"if"`            | [`Terminal::Token`]          |
//! | `"a" … "a"`       | `"a"`                        |
//!
//! Alternatives, optionals and repetitions of terminals are certified as
//! [`Terminal`]s.

mod container;
mod terminal;

use std::fmt::{
    self,
    Display,
};

pub use self::{
    container::{
        Alternative,
        Optional,
        Repetition,
        Sequence,
    },
    terminal::{
        Bound,
        Range,
        Terminal,
        Token,
    },
};
use crate::{
    ebnf::ast,
    utils::{
        into_single,
        is_identifier,
    },
    Error,
};

/// A reference to a production.
///
/// Identifiers start with a letter or `_`, followed by letters, numbers or `_`.
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, derive_more::Display)]
pub struct Name(String);

impl Name {
    pub fn new(id: impl Into<String>) -> Result<Self, Error> {
        let id = id.into();
        if is_identifier(&id) {
            Ok(Self(id))
        }
        else {
            Err(Error::InvalidName(id))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Name {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Clone, Debug)]
pub enum Expr {
    Terminal(Terminal),
    Name(Name),
    Sequence(Sequence),
    Alternative(Alternative<Expr>),
    Optional(Optional<Expr>),
    Repetition(Repetition<Expr>),
}

impl Expr {
    /// Normalizes a raw EBNF expression.
    pub fn from_ebnf(expression: &ast::Expression) -> Result<Self, Error> {
        match expression {
            ast::Expression::Token(literal) => Ok(Terminal::from_literal(&literal.0).into()),
            ast::Expression::Range { begin, end } => {
                Ok(Range::from_literals(&begin.0, &end.0)?.into())
            }
            ast::Expression::Option(body) => Ok(Self::optional(Self::from_ebnf(body)?)),
            ast::Expression::Repetition(body) => Ok(Self::repetition(Self::from_ebnf(body)?)),
            ast::Expression::Group(body) => Self::from_ebnf(body),
            ast::Expression::Name(name) => Ok(Name::new(&name.0)?.into()),
            ast::Expression::Sequence(elements) => {
                Self::sequence(Self::from_ebnf_list(elements, "sequence")?)
            }
            ast::Expression::Alternative(elements) => {
                Self::alternative(Self::from_ebnf_list(elements, "alternative")?)
            }
        }
    }

    fn from_ebnf_list(
        expressions: &[ast::Expression],
        kind: &'static str,
    ) -> Result<Vec<Self>, Error> {
        expressions
            .iter()
            .enumerate()
            .map(|(index, expression)| {
                Self::from_ebnf(expression).map_err(|e| e.in_element(kind, index))
            })
            .collect()
    }

    /// Creates an alternative.
    ///
    /// Nested alternatives are flattened, a single element is returned as is,
    /// and if all elements are terminals the alternative is certified.
    pub fn alternative(elements: Vec<Expr>) -> Result<Self, Error> {
        let mut flat = Vec::with_capacity(elements.len());
        for element in elements {
            match element {
                Self::Alternative(alternative) => flat.extend(alternative.into_body()),
                Self::Terminal(Terminal::Alternative(alternative)) => {
                    flat.extend(alternative.into_body().into_iter().map(Self::Terminal))
                }
                element => flat.push(element),
            }
        }

        if flat.is_empty() {
            return Err(Error::EmptyAlternative);
        }

        Ok(match into_single(flat) {
            Ok(element) => element,
            Err(flat) => {
                match Alternative::new_unchecked(flat).certify() {
                    Ok(certified) => Self::Terminal(Terminal::Alternative(certified)),
                    Err(plain) => Self::Alternative(plain),
                }
            }
        })
    }

    /// Creates a sequence. A single element is returned as is.
    pub fn sequence(elements: Vec<Expr>) -> Result<Self, Error> {
        if elements.is_empty() {
            return Err(Error::EmptySequence);
        }

        Ok(match into_single(elements) {
            Ok(element) => element,
            Err(elements) => Self::Sequence(Sequence::new_unchecked(elements)),
        })
    }

    /// Creates an optional.
    ///
    /// Optionals of optionals or repetitions collapse into their body, and an
    /// optional terminal is certified.
    pub fn optional(body: Expr) -> Self {
        match body {
            Self::Optional(_) | Self::Repetition(_) => body,
            Self::Terminal(terminal) => Self::Terminal(Terminal::optional(terminal)),
            body => Self::Optional(Optional::new(body)),
        }
    }

    /// Creates a repetition. A repeated terminal is certified.
    pub fn repetition(body: Expr) -> Self {
        match body {
            Self::Terminal(terminal) => Self::Terminal(Terminal::repetition(terminal)),
            body => Self::Repetition(Repetition::new(body)),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminal(_))
    }

    pub fn as_terminal(&self) -> Option<&Terminal> {
        match self {
            Self::Terminal(terminal) => Some(terminal),
            _ => None,
        }
    }

    /// Refines this expression into a [`Terminal`], certifying a plain
    /// container whose children are all terminals.
    pub fn into_terminal(self) -> Result<Terminal, Self> {
        match self {
            Self::Terminal(terminal) => Ok(terminal),
            Self::Alternative(alternative) => {
                alternative
                    .certify()
                    .map(Terminal::Alternative)
                    .map_err(Self::Alternative)
            }
            Self::Optional(optional) => {
                optional
                    .certify()
                    .map(Terminal::Optional)
                    .map_err(Self::Optional)
            }
            Self::Repetition(repetition) => {
                repetition
                    .certify()
                    .map(Terminal::Repetition)
                    .map_err(Self::Repetition)
            }
            expr => Err(expr),
        }
    }

    fn is_alternative(&self) -> bool {
        matches!(
            self,
            Self::Alternative(_) | Self::Terminal(Terminal::Alternative(_))
        )
    }
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Terminal(a), b) => b == a,
            (a, Self::Terminal(b)) => a == b,
            (Self::Name(a), Self::Name(b)) => a == b,
            (Self::Sequence(a), Self::Sequence(b)) => a == b,
            (Self::Alternative(a), Self::Alternative(b)) => a == b,
            (Self::Optional(a), Self::Optional(b)) => a == b,
            (Self::Repetition(a), Self::Repetition(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Expr {}

/// Certification is ignored: a plain container equals its certified
/// counterpart if their payloads are equal.
impl PartialEq<Terminal> for Expr {
    fn eq(&self, other: &Terminal) -> bool {
        match (self, other) {
            (Self::Terminal(a), b) => a == b,
            (Self::Alternative(a), Terminal::Alternative(b)) => a == b,
            (Self::Optional(a), Terminal::Optional(b)) => a == b,
            (Self::Repetition(a), Terminal::Repetition(b)) => a == b,
            _ => false,
        }
    }
}

impl PartialEq<Expr> for Terminal {
    fn eq(&self, other: &Expr) -> bool {
        other == self
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Terminal(terminal) => write!(f, "{terminal}"),
            Self::Name(name) => write!(f, "{name}"),
            Self::Sequence(sequence) => write!(f, "{sequence}"),
            Self::Alternative(alternative) => write!(f, "{alternative}"),
            Self::Optional(optional) => write!(f, "{optional}"),
            Self::Repetition(repetition) => write!(f, "{repetition}"),
        }
    }
}

impl From<Terminal> for Expr {
    fn from(value: Terminal) -> Self {
        Self::Terminal(value)
    }
}

impl From<Name> for Expr {
    fn from(value: Name) -> Self {
        Self::Name(value)
    }
}

impl From<Alternative<Terminal>> for Expr {
    fn from(value: Alternative<Terminal>) -> Self {
        Self::Terminal(Terminal::Alternative(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ebnf::ast::Expression;

    fn expr(expression: Expression) -> Expr {
        Expr::from_ebnf(&expression).unwrap()
    }

    fn name(id: &str) -> Expr {
        Name::new(id).unwrap().into()
    }

    #[test]
    fn it_simplifies_literals() {
        assert_eq!(expr(Expression::token("")), Terminal::Empty);
        assert_eq!(expr(Expression::token("a")), Terminal::Byte(b'a'));
        assert_eq!(expr(Expression::token("λ")), Terminal::Rune('λ'));
        assert_eq!(expr(Expression::token("if")), Terminal::from_literal("if"));
        assert!(matches!(
            expr(Expression::token("if")),
            Expr::Terminal(Terminal::Token(_))
        ));
    }

    #[test]
    fn it_simplifies_ranges() {
        assert_eq!(expr(Expression::range("a", "a")), Terminal::Byte(b'a'));
        assert!(matches!(
            expr(Expression::range("a", "z")),
            Expr::Terminal(Terminal::Range(_))
        ));
        assert!(matches!(
            Expr::from_ebnf(&Expression::range("z", "a")),
            Err(Error::InvalidRange { .. })
        ));
    }

    #[test]
    fn it_unwraps_groups_and_single_element_lists() {
        assert_eq!(expr(Expression::group(Expression::name("a"))), name("a"));
        assert_eq!(
            expr(Expression::Sequence(vec![Expression::name("a")])),
            name("a")
        );
        assert_eq!(
            expr(Expression::Alternative(vec![Expression::name("a")])),
            name("a")
        );
    }

    #[test]
    fn it_rejects_empty_lists() {
        assert!(matches!(
            Expr::from_ebnf(&Expression::Sequence(vec![])),
            Err(Error::EmptySequence)
        ));
        assert!(matches!(
            Expr::from_ebnf(&Expression::Alternative(vec![])),
            Err(Error::EmptyAlternative)
        ));
    }

    #[test]
    fn it_rejects_invalid_names() {
        assert!(matches!(
            Expr::from_ebnf(&Expression::name("1abc")),
            Err(Error::InvalidName(_))
        ));
        assert!(matches!(
            Expr::from_ebnf(&Expression::name("")),
            Err(Error::InvalidName(_))
        ));
        assert!(Name::new("_λ1").is_ok());
        assert!(Name::new("a-b").is_err());
        assert!(Name::new("\u{902}x").is_err());
        assert!(Name::new("\u{2160}x").is_err());
        assert!(Name::new("x\u{2160}").is_ok());
    }

    #[test]
    fn it_adds_context_to_element_errors() {
        let error = Expr::from_ebnf(&Expression::Sequence(vec![
            Expression::name("a"),
            Expression::range("z", "a"),
        ]))
        .unwrap_err();
        assert!(matches!(
            error,
            Error::Element {
                kind: "sequence",
                index: 1,
                ..
            }
        ));
        assert!(matches!(error.root_cause(), Error::InvalidRange { .. }));
    }

    #[test]
    fn it_flattens_alternatives() {
        let flat = expr(Expression::Alternative(vec![
            Expression::name("a"),
            Expression::group(Expression::Alternative(vec![
                Expression::name("b"),
                Expression::name("c"),
            ])),
        ]));
        let Expr::Alternative(alternative) = &flat
        else {
            panic!("expected a plain alternative");
        };
        assert_eq!(alternative.body(), &[name("a"), name("b"), name("c")]);
    }

    #[test]
    fn it_certifies_terminal_alternatives() {
        let certified = expr(Expression::Alternative(vec![
            Expression::token("a"),
            Expression::token("λ"),
            Expression::range("0", "9"),
        ]));
        assert!(matches!(
            certified,
            Expr::Terminal(Terminal::Alternative(_))
        ));

        let plain = Alternative::new_unchecked(vec![
            Expr::from(Terminal::Byte(b'a')),
            Expr::from(Terminal::Rune('λ')),
            Expr::from(Range::new('0', '9').unwrap()),
        ]);
        assert_eq!(certified, Expr::Alternative(plain.clone()));
        assert_eq!(Expr::Alternative(plain.clone()), certified);

        let Ok(terminal) = Expr::Alternative(plain).into_terminal()
        else {
            panic!("expected the alternative to be certified");
        };
        assert_eq!(certified, terminal);
    }

    #[test]
    fn it_keeps_mixed_alternatives_plain() {
        let mixed = expr(Expression::Alternative(vec![
            Expression::token("a"),
            Expression::name("b"),
        ]));
        assert!(matches!(mixed, Expr::Alternative(_)));
        assert!(mixed.into_terminal().is_err());
    }

    #[test]
    fn it_compares_alternatives_positionally() {
        let ab = expr(Expression::Alternative(vec![
            Expression::name("a"),
            Expression::name("b"),
        ]));
        let ba = expr(Expression::Alternative(vec![
            Expression::name("b"),
            Expression::name("a"),
        ]));
        assert_ne!(ab, ba);
    }

    #[test]
    fn it_simplifies_optionals() {
        let repetition = expr(Expression::repetition(Expression::name("x")));
        assert_eq!(
            expr(Expression::option(Expression::repetition(Expression::name("x")))),
            repetition
        );

        let optional = expr(Expression::option(Expression::name("x")));
        assert!(matches!(optional, Expr::Optional(_)));
        assert_eq!(
            expr(Expression::option(Expression::option(Expression::name("x")))),
            optional
        );

        assert_eq!(
            expr(Expression::option(Expression::repetition(Expression::token("x")))),
            Terminal::repetition(Terminal::Byte(b'x'))
        );
        assert_eq!(
            expr(Expression::option(Expression::token(""))),
            Terminal::Empty
        );
    }

    #[test]
    fn it_certifies_terminal_optionals_and_repetitions() {
        assert_eq!(
            expr(Expression::option(Expression::token("a"))),
            Terminal::optional(Terminal::Byte(b'a'))
        );
        assert_eq!(
            expr(Expression::repetition(Expression::token("a"))),
            Terminal::repetition(Terminal::Byte(b'a'))
        );
        assert!(matches!(
            expr(Expression::repetition(Expression::name("a"))),
            Expr::Repetition(_)
        ));
    }

    #[test]
    fn it_clones_deeply() {
        let original = expr(Expression::Sequence(vec![
            Expression::name("a"),
            Expression::option(Expression::name("b")),
            Expression::token("if"),
        ]));
        let clone = original.clone();
        assert_eq!(clone, original);

        let Expr::Sequence(sequence) = clone
        else {
            panic!("expected a sequence");
        };
        let mut elements = sequence.into_elements();
        elements[0] = name("z");
        elements.pop();
        let modified = Expr::sequence(elements).unwrap();

        assert_ne!(modified, original);
        let Expr::Sequence(sequence) = &original
        else {
            panic!("expected a sequence");
        };
        assert_eq!(sequence.elements().len(), 3);
        assert_eq!(sequence.elements()[0], name("a"));
    }

    #[test]
    fn it_displays_expressions() {
        let e = expr(Expression::Sequence(vec![
            Expression::name("a"),
            Expression::group(Expression::Alternative(vec![
                Expression::name("b"),
                Expression::token("c"),
            ])),
            Expression::option(Expression::name("d")),
            Expression::repetition(Expression::range("0", "9")),
        ]));
        assert_eq!(e.to_string(), "a (b | \"c\") [d] {\"0\" … \"9\"}");
    }
}
