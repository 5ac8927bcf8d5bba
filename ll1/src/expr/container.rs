use std::fmt::{
    self,
    Display,
};

use itertools::Itertools;

use super::{
    Expr,
    Terminal,
};

/// `a | b | c`
///
/// `Alternative<Expr>` is the plain alternative, `Alternative<Terminal>` the
/// certified one (see [`Terminal::Alternative`]). Both compare equal if their
/// bodies do.
#[derive(Clone, Debug, Hash)]
pub struct Alternative<E = Expr> {
    body: Vec<E>,
}

impl<E> Alternative<E> {
    pub(crate) fn new_unchecked(body: Vec<E>) -> Self {
        debug_assert!(body.len() >= 2);
        Self { body }
    }

    pub fn body(&self) -> &[E] {
        &self.body
    }

    pub fn into_body(self) -> Vec<E> {
        self.body
    }
}

impl Alternative<Expr> {
    /// Returns the certified alternative, if every branch is a terminal.
    pub fn certify(self) -> Result<Alternative<Terminal>, Self> {
        if !self.body.iter().all(Expr::is_terminal) {
            return Err(self);
        }
        let body = self
            .body
            .into_iter()
            .filter_map(|expr| expr.into_terminal().ok())
            .collect();
        Ok(Alternative { body })
    }
}

impl From<Alternative<Terminal>> for Alternative<Expr> {
    fn from(value: Alternative<Terminal>) -> Self {
        Self {
            body: value.body.into_iter().map(Expr::Terminal).collect(),
        }
    }
}

impl<A: PartialEq<B>, B> PartialEq<Alternative<B>> for Alternative<A> {
    fn eq(&self, other: &Alternative<B>) -> bool {
        self.body.len() == other.body.len()
            && self.body.iter().zip(&other.body).all(|(a, b)| a == b)
    }
}

impl<E: Eq> Eq for Alternative<E> {}

impl<E: Display> Display for Alternative<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.body.iter().format(" | "))
    }
}

/// `[ body ]`
#[derive(Clone, Debug, Hash)]
pub struct Optional<E = Expr> {
    body: Box<E>,
}

impl<E> Optional<E> {
    pub(crate) fn new(body: E) -> Self {
        Self {
            body: Box::new(body),
        }
    }

    pub fn body(&self) -> &E {
        &self.body
    }

    pub fn into_body(self) -> E {
        *self.body
    }
}

impl Optional<Expr> {
    /// Returns the certified optional, if the body is a terminal.
    pub fn certify(self) -> Result<Optional<Terminal>, Self> {
        match *self.body {
            Expr::Terminal(body) => Ok(Optional::new(body)),
            body => Err(Self::new(body)),
        }
    }
}

impl From<Optional<Terminal>> for Optional<Expr> {
    fn from(value: Optional<Terminal>) -> Self {
        Self::new(Expr::Terminal(value.into_body()))
    }
}

impl<A: PartialEq<B>, B> PartialEq<Optional<B>> for Optional<A> {
    fn eq(&self, other: &Optional<B>) -> bool {
        self.body.as_ref() == other.body.as_ref()
    }
}

impl<E: Eq> Eq for Optional<E> {}

impl<E: Display> Display for Optional<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}]", self.body)
    }
}

/// `{ body }`
#[derive(Clone, Debug, Hash)]
pub struct Repetition<E = Expr> {
    body: Box<E>,
}

impl<E> Repetition<E> {
    pub(crate) fn new(body: E) -> Self {
        Self {
            body: Box::new(body),
        }
    }

    pub fn body(&self) -> &E {
        &self.body
    }

    pub fn into_body(self) -> E {
        *self.body
    }
}

impl Repetition<Expr> {
    /// Returns the certified repetition, if the body is a terminal.
    pub fn certify(self) -> Result<Repetition<Terminal>, Self> {
        match *self.body {
            Expr::Terminal(body) => Ok(Repetition::new(body)),
            body => Err(Self::new(body)),
        }
    }
}

impl From<Repetition<Terminal>> for Repetition<Expr> {
    fn from(value: Repetition<Terminal>) -> Self {
        Self::new(Expr::Terminal(value.into_body()))
    }
}

impl<A: PartialEq<B>, B> PartialEq<Repetition<B>> for Repetition<A> {
    fn eq(&self, other: &Repetition<B>) -> bool {
        self.body.as_ref() == other.body.as_ref()
    }
}

impl<E: Eq> Eq for Repetition<E> {}

impl<E: Display> Display for Repetition<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{{}}}", self.body)
    }
}

/// `a b c`
///
/// Sequences are never certified, even if all elements are terminals.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sequence {
    elements: Vec<Expr>,
}

impl Sequence {
    pub(crate) fn new_unchecked(elements: Vec<Expr>) -> Self {
        debug_assert!(elements.len() >= 2);
        Self { elements }
    }

    pub fn elements(&self) -> &[Expr] {
        &self.elements
    }

    pub fn into_elements(self) -> Vec<Expr> {
        self.elements
    }
}

impl Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, element) in self.elements.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            // alternatives bind weaker than sequences
            if element.is_alternative() {
                write!(f, "({element})")?;
            }
            else {
                write!(f, "{element}")?;
            }
        }
        Ok(())
    }
}
