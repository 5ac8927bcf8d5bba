//! Named productions and the static analyses over them.
//!
//! Productions refer to each other by [`Name`] only, so recursive grammars are
//! just repeated lookups. Every traversal keeps a set of visited names, which
//! guarantees termination on cyclic grammars.

mod first;
mod nullable;

use std::{
    borrow::Borrow,
    collections::{
        HashSet,
        VecDeque,
    },
    fmt::{
        self,
        Display,
    },
};

use indexmap::{
    IndexMap,
    IndexSet,
};

pub use self::{
    first::FirstSets,
    nullable::Emptiness,
};
use crate::{
    ebnf::ast,
    Error,
    Expr,
    Name,
    Terminal,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Production {
    name: Name,
    expr: Expr,
}

impl Production {
    pub fn new(name: Name, expr: Expr) -> Self {
        Self { name, expr }
    }

    /// Normalizes a raw production. Errors are annotated with the production
    /// name.
    pub fn from_ebnf(production: &ast::Production) -> Result<Self, Error> {
        let id = &production.name.0;
        let name = Name::new(id.as_str()).map_err(|e| e.in_production(id.as_str()))?;
        let expr = Expr::from_ebnf(&production.expr).map_err(|e| e.in_production(id.as_str()))?;
        Ok(Self { name, expr })
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }
}

impl Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} = {} .", self.name, self.expr)
    }
}

impl Borrow<str> for Name {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

/// A set of uniquely named productions.
///
/// Once populated, a grammar is only read by the analyses, so it can be shared
/// between threads.
#[derive(Clone, Debug, Default)]
pub struct Grammar {
    productions: IndexMap<Name, Production>,
}

impl Grammar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_ebnf(grammar: &ast::Grammar) -> Result<Self, Error> {
        let mut this = Self::new();
        for production in &grammar.0 {
            this.insert(Production::from_ebnf(production)?)?;
        }
        tracing::debug!(productions = this.len(), "grammar created");
        Ok(this)
    }

    /// Adds a production.
    ///
    /// Productions can't be redefined: a second production with the same name
    /// is an error.
    pub fn insert(&mut self, production: Production) -> Result<(), Error> {
        if self.productions.contains_key(&production.name) {
            return Err(Error::Duplicate(production.name.to_string()));
        }
        tracing::trace!("production: {}", production);
        self.productions.insert(production.name.clone(), production);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Production> {
        self.productions.get(name)
    }

    pub fn productions(&self) -> impl Iterator<Item = &Production> {
        self.productions.values()
    }

    pub fn len(&self) -> usize {
        self.productions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.productions.is_empty()
    }

    pub(crate) fn resolve(&self, name: &str) -> Result<&Production, Error> {
        self.productions
            .get(name)
            .ok_or_else(|| Error::Undefined(name.to_owned()))
    }

    /// Checks that every referenced production is defined.
    pub fn check(&self) -> Result<(), Error> {
        for production in self.productions() {
            for name in self.names(production.name.as_str(), false)? {
                self.resolve(name.as_str())
                    .map_err(|e| e.in_production(production.name.as_str()))?;
            }
        }
        Ok(())
    }

    /// Returns the distinct terminal leaves reachable from `start`, in
    /// breadth-first discovery order.
    ///
    /// Certified containers are expanded into their leaves. Only if
    /// `recursive` is set, referenced productions are expanded too.
    pub fn terminals(&self, start: &str, recursive: bool) -> Result<Vec<Terminal>, Error> {
        let mut terminals = IndexSet::new();
        self.traverse(
            start,
            recursive,
            |terminal| {
                terminals.insert(terminal);
            },
            |_| {},
        )?;
        Ok(terminals.into_iter().cloned().collect())
    }

    /// Returns the distinct names reachable from `start`, starting with
    /// `start` itself, in breadth-first discovery order.
    ///
    /// Only if `recursive` is set, referenced productions are expanded.
    pub fn names(&self, start: &str, recursive: bool) -> Result<Vec<Name>, Error> {
        let mut names = vec![];
        self.traverse(start, recursive, |_| {}, |name| names.push(name.clone()))?;
        Ok(names)
    }

    fn traverse<'g>(
        &'g self,
        start: &str,
        recursive: bool,
        mut on_terminal: impl FnMut(&'g Terminal),
        mut on_name: impl FnMut(&'g Name),
    ) -> Result<(), Error> {
        let start = self.resolve(start)?;

        let mut visited = HashSet::new();
        visited.insert(&start.name);
        on_name(&start.name);

        let mut queue = VecDeque::from([Node::Expr(&start.expr)]);

        while let Some(node) = queue.pop_front() {
            match node {
                Node::Expr(Expr::Terminal(terminal)) => queue.push_front(Node::Terminal(terminal)),
                Node::Expr(Expr::Name(name)) => {
                    if !visited.insert(name) {
                        continue;
                    }
                    on_name(name);
                    if recursive {
                        tracing::trace!("expanding {}", name);
                        queue.push_back(Node::Expr(&self.resolve(name.as_str())?.expr));
                    }
                }
                Node::Expr(Expr::Sequence(sequence)) => {
                    queue.extend(sequence.elements().iter().map(Node::Expr))
                }
                Node::Expr(Expr::Alternative(alternative)) => {
                    queue.extend(alternative.body().iter().map(Node::Expr))
                }
                Node::Expr(Expr::Optional(optional)) => queue.push_back(Node::Expr(optional.body())),
                Node::Expr(Expr::Repetition(repetition)) => {
                    queue.push_back(Node::Expr(repetition.body()))
                }
                Node::Terminal(Terminal::Alternative(alternative)) => {
                    queue.extend(alternative.body().iter().map(Node::Terminal))
                }
                Node::Terminal(Terminal::Optional(optional)) => {
                    queue.push_back(Node::Terminal(optional.body()))
                }
                Node::Terminal(Terminal::Repetition(repetition)) => {
                    queue.push_back(Node::Terminal(repetition.body()))
                }
                Node::Terminal(leaf) => on_terminal(leaf),
            }
        }

        Ok(())
    }
}

impl Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for production in self.productions() {
            writeln!(f, "{production}")?;
        }
        Ok(())
    }
}

#[derive(Copy, Clone, Debug)]
enum Node<'g> {
    Expr(&'g Expr),
    Terminal(&'g Terminal),
}
