//! The raw, unsimplified EBNF tree.
//!
//! This is what a grammar reader hands to [`Grammar::from_ebnf`]. Nothing here
//! is validated; all checks happen when the tree is normalized into an
//! [`Expr`].
//!
//! [`Grammar::from_ebnf`]: crate::Grammar::from_ebnf
//! [`Expr`]: crate::Expr

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Grammar(pub Vec<Production>);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Production {
    pub name: Name,
    pub expr: Expression,
}

#[derive(
    Clone,
    Debug,
    Hash,
    PartialEq,
    Eq,
    derive_more::Display,
    derive_more::From,
    derive_more::AsRef,
)]
pub struct Name(pub String);

impl<'a> From<&'a str> for Name {
    fn from(value: &'a str) -> Self {
        Name(value.to_owned())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, derive_more::From, derive_more::AsRef)]
pub struct Literal(pub String);

impl<'a> From<&'a str> for Literal {
    fn from(value: &'a str) -> Self {
        value.to_owned().into()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expression {
    /// `"text"`
    Token(Literal),
    /// `"begin" … "end"`
    Range { begin: Literal, end: Literal },
    /// `[ body ]`
    Option(Box<Expression>),
    /// `{ body }`
    Repetition(Box<Expression>),
    /// `( body )`
    Group(Box<Expression>),
    Name(Name),
    /// `a b c`
    Sequence(Vec<Expression>),
    /// `a | b | c`
    Alternative(Vec<Expression>),
}

impl Expression {
    pub fn token(text: impl Into<String>) -> Self {
        Self::Token(Literal(text.into()))
    }

    pub fn range(begin: impl Into<String>, end: impl Into<String>) -> Self {
        Self::Range {
            begin: Literal(begin.into()),
            end: Literal(end.into()),
        }
    }

    pub fn option(body: Expression) -> Self {
        Self::Option(Box::new(body))
    }

    pub fn repetition(body: Expression) -> Self {
        Self::Repetition(Box::new(body))
    }

    pub fn group(body: Expression) -> Self {
        Self::Group(Box::new(body))
    }

    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(Name(name.into()))
    }
}

impl Production {
    pub fn new(name: impl Into<String>, expr: Expression) -> Self {
        Self {
            name: Name(name.into()),
            expr,
        }
    }
}
