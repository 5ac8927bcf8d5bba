use std::collections::{
    HashMap,
    HashSet,
};

use super::Grammar;
use crate::{
    Error,
    Expr,
    Name,
};

/// Whether an expression derives the empty string, as far as a single
/// traversal can tell.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Emptiness {
    Nullable,
    NotNullable,

    /// The answer depends on a production that is already being examined
    /// further up, e.g. for `s = s .`. Use [`FirstSets::is_nullable`] for a
    /// definite answer.
    ///
    /// [`FirstSets::is_nullable`]: super::FirstSets::is_nullable
    Indeterminate,
}

impl From<bool> for Emptiness {
    fn from(value: bool) -> Self {
        if value {
            Self::Nullable
        }
        else {
            Self::NotNullable
        }
    }
}

impl Grammar {
    /// Returns whether `expr` derives the empty string.
    ///
    /// A production that is referenced while it is already being examined
    /// further up is indeterminate, which is reported as `false`.
    pub fn match_empty(&self, expr: &Expr) -> Result<bool, Error> {
        Ok(self.emptiness(expr)? == Emptiness::Nullable)
    }

    /// Like [`Grammar::match_empty`], but tells apart expressions that only
    /// looped back into productions that were already being examined.
    pub fn emptiness(&self, expr: &Expr) -> Result<Emptiness, Error> {
        let mut visitor = EmptinessVisitor::default();
        visitor.visit(self, expr)
    }
}

/// Call-scoped state of an emptiness check.
#[derive(Default)]
struct EmptinessVisitor<'a> {
    /// Productions on the current path.
    visiting: HashSet<&'a Name>,

    /// Determinate results of productions that were already examined.
    known: HashMap<&'a Name, Emptiness>,
}

impl<'a> EmptinessVisitor<'a> {
    fn visit(&mut self, grammar: &'a Grammar, expr: &'a Expr) -> Result<Emptiness, Error> {
        match expr {
            Expr::Terminal(terminal) => Ok(terminal.is_nullable().into()),
            Expr::Name(name) => {
                if let Some(result) = self.known.get(name) {
                    return Ok(*result);
                }
                if !self.visiting.insert(name) {
                    return Ok(Emptiness::Indeterminate);
                }

                let production = grammar.resolve(name.as_str())?;
                let result = self.visit(grammar, production.expr());
                self.visiting.remove(name);

                let result = result?;
                if result != Emptiness::Indeterminate {
                    self.known.insert(name, result);
                }
                Ok(result)
            }
            Expr::Sequence(sequence) => {
                let mut result = Emptiness::Nullable;
                for element in sequence.elements() {
                    match self.visit(grammar, element)? {
                        Emptiness::NotNullable => return Ok(Emptiness::NotNullable),
                        Emptiness::Indeterminate => result = Emptiness::Indeterminate,
                        Emptiness::Nullable => {}
                    }
                }
                Ok(result)
            }
            Expr::Alternative(alternative) => {
                let mut result = Emptiness::NotNullable;
                for branch in alternative.body() {
                    match self.visit(grammar, branch)? {
                        Emptiness::Nullable => return Ok(Emptiness::Nullable),
                        Emptiness::Indeterminate => result = Emptiness::Indeterminate,
                        Emptiness::NotNullable => {}
                    }
                }
                Ok(result)
            }
            Expr::Optional(_) | Expr::Repetition(_) => Ok(Emptiness::Nullable),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ebnf::ast::Expression,
        grammar::tests::grammar,
    };

    fn production(g: &Grammar, name: &str) -> Expr {
        g.get(name).unwrap().expr().clone()
    }

    #[test]
    fn it_matches_empty_terminals() {
        let g = grammar(vec![
            ("empty", Expression::token("")),
            ("byte", Expression::token("a")),
            ("optional", Expression::option(Expression::token("if"))),
            (
                "alternative",
                Expression::Alternative(vec![Expression::token("a"), Expression::token("")]),
            ),
        ]);
        assert!(g.match_empty(&production(&g, "empty")).unwrap());
        assert!(!g.match_empty(&production(&g, "byte")).unwrap());
        assert!(g.match_empty(&production(&g, "optional")).unwrap());
        assert!(g.match_empty(&production(&g, "alternative")).unwrap());
    }

    #[test]
    fn it_follows_names() {
        let g = grammar(vec![
            (
                "s",
                Expression::Sequence(vec![Expression::name("a"), Expression::name("b")]),
            ),
            ("a", Expression::repetition(Expression::name("s"))),
            ("b", Expression::option(Expression::token("x"))),
            (
                "t",
                Expression::Sequence(vec![Expression::name("a"), Expression::token("x")]),
            ),
        ]);
        assert!(g.match_empty(&production(&g, "s")).unwrap());
        assert!(!g.match_empty(&production(&g, "t")).unwrap());
    }

    #[test]
    fn it_expands_repeated_references() {
        let g = grammar(vec![
            (
                "s",
                Expression::Sequence(vec![Expression::name("t"), Expression::name("t")]),
            ),
            ("t", Expression::option(Expression::token("x"))),
            (
                "u",
                Expression::Alternative(vec![
                    Expression::Sequence(vec![Expression::name("v"), Expression::token("x")]),
                    Expression::Sequence(vec![Expression::name("v"), Expression::name("v")]),
                ]),
            ),
            ("v", Expression::repetition(Expression::token("y"))),
        ]);
        let s = production(&g, "s");
        assert_eq!(g.emptiness(&s).unwrap(), Emptiness::Nullable);
        assert!(g.match_empty(&s).unwrap());
        assert!(g.first().unwrap().is_nullable("s"));

        assert!(g.match_empty(&production(&g, "u")).unwrap());
    }

    #[test]
    fn it_terminates_on_self_reference() {
        let g = grammar(vec![("s", Expression::name("s"))]);
        let expr = production(&g, "s");
        assert_eq!(g.emptiness(&expr).unwrap(), Emptiness::Indeterminate);
        assert!(!g.match_empty(&expr).unwrap());
    }

    #[test]
    fn it_prefers_determinate_answers() {
        let g = grammar(vec![
            (
                "s",
                Expression::Alternative(vec![
                    Expression::Sequence(vec![Expression::name("s"), Expression::token("a")]),
                    Expression::name("s"),
                    Expression::token(""),
                ]),
            ),
            (
                "t",
                Expression::Sequence(vec![Expression::name("t"), Expression::token("a")]),
            ),
        ]);
        assert_eq!(
            g.emptiness(&production(&g, "s")).unwrap(),
            Emptiness::Nullable
        );
        assert_eq!(
            g.emptiness(&production(&g, "t")).unwrap(),
            Emptiness::NotNullable
        );
    }

    #[test]
    fn it_rejects_undefined_names() {
        let g = grammar(vec![(
            "s",
            Expression::Sequence(vec![Expression::name("missing"), Expression::token("a")]),
        )]);
        assert!(matches!(
            g.match_empty(&production(&g, "s")),
            Err(Error::Undefined(name)) if name == "missing"
        ));
    }
}
