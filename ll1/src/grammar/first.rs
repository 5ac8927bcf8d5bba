use indexmap::IndexSet;

use super::Grammar;
use crate::{
    Error,
    Expr,
    Name,
    Terminal,
};

/// The FIRST set of every production in a [`Grammar`].
///
/// A set holds the leaf terminals that can start a derivation of the
/// production. It contains [`Terminal::Empty`] if and only if the production
/// can derive the empty string.
///
/// Leaf terminals are kept in the order they were first found. `Empty` is not
/// part of that order: it is added once a pass finds the whole production
/// nullable, after the members that pass found, even when an optional or a
/// nullable reference came first.
///
/// The sets borrow the grammar they were computed for, so they can't outlive a
/// change to it.
#[derive(Clone, Debug)]
pub struct FirstSets<'g> {
    grammar: &'g Grammar,
    /// Indexed like `grammar.productions`.
    sets: Vec<IndexSet<Terminal>>,
}

impl<'g> FirstSets<'g> {
    pub fn get(&self, name: &str) -> Option<&IndexSet<Terminal>> {
        self.grammar
            .productions
            .get_index_of(name)
            .and_then(|index| self.sets.get(index))
    }

    /// Whether the production derives the empty string. Undefined productions
    /// are not nullable.
    pub fn is_nullable(&self, name: &str) -> bool {
        self.get(name)
            .map_or(false, |set| set.contains(&Terminal::Empty))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'g Name, &IndexSet<Terminal>)> + '_ {
        self.grammar.productions.keys().zip(&self.sets)
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

impl Grammar {
    /// Computes the FIRST sets of all productions.
    ///
    /// Every production is recomputed from the current table until a whole pass
    /// adds nothing. Sets only grow and are bounded by the finite set of leaf
    /// terminals, so this always converges. Left recursion is fine: a
    /// reference to a production that is still being computed just contributes
    /// what is known so far.
    pub fn first(&self) -> Result<FirstSets<'_>, Error> {
        let mut first = FirstSets {
            grammar: self,
            sets: vec![IndexSet::new(); self.len()],
        };

        let mut passes = 1;
        while self.update_first(&mut first)? {
            passes += 1;
        }
        tracing::debug!(passes, productions = first.len(), "FIRST sets converged");

        Ok(first)
    }

    /// Runs one pass over all productions. Returns whether any set changed.
    fn update_first(&self, first: &mut FirstSets) -> Result<bool, Error> {
        let mut changed = false;

        for (index, production) in self.productions().enumerate() {
            let mut set = IndexSet::new();
            let nullable = first_of_expr(production.expr(), first, &mut set)
                .map_err(|e| e.in_production(production.name().as_str()))?;
            if nullable {
                set.insert(Terminal::Empty);
            }

            let current = &mut first.sets[index];
            for terminal in set {
                if !current.contains(&terminal) {
                    tracing::trace!("FIRST({}) += {}", production.name(), terminal);
                    current.insert(terminal);
                    changed = true;
                }
            }
        }

        Ok(changed)
    }
}

/// Adds the non-empty members of FIRST(`expr`) to `out` and returns whether
/// `expr` is nullable.
fn first_of_expr(
    expr: &Expr,
    sets: &FirstSets,
    out: &mut IndexSet<Terminal>,
) -> Result<bool, Error> {
    match expr {
        Expr::Terminal(terminal) => Ok(first_of_terminal(terminal, out)),
        Expr::Name(name) => {
            let set = sets
                .get(name.as_str())
                .ok_or_else(|| Error::Undefined(name.to_string()))?;
            let mut nullable = false;
            for terminal in set {
                if *terminal == Terminal::Empty {
                    nullable = true;
                }
                else {
                    out.insert(terminal.clone());
                }
            }
            Ok(nullable)
        }
        Expr::Sequence(sequence) => {
            for element in sequence.elements() {
                if !first_of_expr(element, sets, out)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Expr::Alternative(alternative) => {
            let mut nullable = false;
            for branch in alternative.body() {
                nullable |= first_of_expr(branch, sets, out)?;
            }
            Ok(nullable)
        }
        Expr::Optional(optional) => {
            first_of_expr(optional.body(), sets, out)?;
            Ok(true)
        }
        Expr::Repetition(repetition) => {
            first_of_expr(repetition.body(), sets, out)?;
            Ok(true)
        }
    }
}

fn first_of_terminal(terminal: &Terminal, out: &mut IndexSet<Terminal>) -> bool {
    match terminal {
        Terminal::Empty => true,
        Terminal::Byte(_) | Terminal::Rune(_) | Terminal::Token(_) | Terminal::Range(_) => {
            out.insert(terminal.clone());
            false
        }
        Terminal::Alternative(alternative) => {
            let mut nullable = false;
            for branch in alternative.body() {
                nullable |= first_of_terminal(branch, out);
            }
            nullable
        }
        Terminal::Optional(optional) => {
            first_of_terminal(optional.body(), out);
            true
        }
        Terminal::Repetition(repetition) => {
            first_of_terminal(repetition.body(), out);
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ebnf::ast::Expression,
        expr::Range,
        grammar::tests::grammar,
    };

    fn set(terminals: &[Terminal]) -> IndexSet<Terminal> {
        terminals.iter().cloned().collect()
    }

    #[test]
    fn it_adds_empty_for_nullable_productions() {
        let g = grammar(vec![(
            "s",
            Expression::Alternative(vec![Expression::token("a"), Expression::token("")]),
        )]);
        let first = g.first().unwrap();
        assert_eq!(
            first.get("s").unwrap(),
            &set(&[Terminal::Byte(b'a'), Terminal::Empty])
        );
        assert!(first.is_nullable("s"));
    }

    #[test]
    fn it_appends_empty_last() {
        let g = grammar(vec![
            ("s", Expression::option(Expression::token("a"))),
            (
                "t",
                Expression::Sequence(vec![
                    Expression::option(Expression::token("b")),
                    Expression::token("c"),
                ]),
            ),
            (
                "u",
                Expression::Alternative(vec![Expression::token(""), Expression::token("d")]),
            ),
        ]);
        let first = g.first().unwrap();
        let order = |name| first.get(name).unwrap().iter().cloned().collect::<Vec<_>>();
        assert_eq!(order("s"), [Terminal::Byte(b'a'), Terminal::Empty]);
        assert_eq!(order("t"), [Terminal::Byte(b'b'), Terminal::Byte(b'c')]);
        assert_eq!(order("u"), [Terminal::Byte(b'd'), Terminal::Empty]);
    }

    #[test]
    fn it_handles_left_recursion() {
        let g = grammar(vec![(
            "s",
            Expression::Alternative(vec![
                Expression::Sequence(vec![Expression::name("s"), Expression::token("a")]),
                Expression::token("b"),
            ]),
        )]);
        let first = g.first().unwrap();
        assert_eq!(first.get("s").unwrap(), &set(&[Terminal::Byte(b'b')]));
        assert!(!first.is_nullable("s"));
    }

    #[test]
    fn it_handles_mutual_recursion() {
        let g = grammar(vec![
            (
                "a",
                Expression::Alternative(vec![
                    Expression::Sequence(vec![Expression::name("b"), Expression::token("x")]),
                    Expression::token("y"),
                ]),
            ),
            (
                "b",
                Expression::Alternative(vec![
                    Expression::Sequence(vec![Expression::name("a"), Expression::token("z")]),
                    Expression::option(Expression::token("w")),
                ]),
            ),
        ]);
        let first = g.first().unwrap();

        // b is nullable, so x starts a as well
        assert_eq!(
            first.get("b").unwrap(),
            &set(&[
                Terminal::Byte(b'y'),
                Terminal::Byte(b'w'),
                Terminal::Empty,
                Terminal::Byte(b'x')
            ])
        );
        assert!(first.is_nullable("b"));
        assert_eq!(
            first.get("a").unwrap(),
            &set(&[Terminal::Byte(b'y'), Terminal::Byte(b'w'), Terminal::Byte(b'x')])
        );
        assert!(!first.is_nullable("a"));
    }

    #[test]
    fn it_stops_at_the_first_non_nullable_element() {
        let g = grammar(vec![
            (
                "s",
                Expression::Sequence(vec![
                    Expression::option(Expression::token("if")),
                    Expression::repetition(Expression::range("0", "9")),
                    Expression::name("t"),
                    Expression::token("λ"),
                ]),
            ),
            ("t", Expression::token("end")),
        ]);
        let first = g.first().unwrap();
        assert_eq!(
            first.get("s").unwrap(),
            &set(&[
                Terminal::from_literal("if"),
                Range::new('0', '9').unwrap(),
                Terminal::from_literal("end"),
            ])
        );
    }

    #[test]
    fn it_is_stable_once_converged() {
        let g = grammar(vec![
            (
                "list",
                Expression::Sequence(vec![
                    Expression::name("item"),
                    Expression::repetition(Expression::Sequence(vec![
                        Expression::token(","),
                        Expression::name("item"),
                    ])),
                ]),
            ),
            (
                "item",
                Expression::Alternative(vec![Expression::name("list"), Expression::token("x")]),
            ),
        ]);
        let mut first = g.first().unwrap();
        let converged = first.sets.clone();
        assert!(!g.update_first(&mut first).unwrap());
        assert_eq!(first.sets, converged);
        assert_eq!(g.first().unwrap().sets, converged);
    }

    #[test]
    fn it_rejects_undefined_names() {
        let g = grammar(vec![("s", Expression::name("missing"))]);
        let error = g.first().unwrap_err();
        assert!(matches!(error.root_cause(), Error::Undefined(name) if name == "missing"));
    }

    #[test]
    fn it_iterates_in_production_order() {
        let g = grammar(vec![
            ("b", Expression::token("x")),
            ("a", Expression::token("y")),
        ]);
        let first = g.first().unwrap();
        let names = first
            .iter()
            .map(|(name, _)| name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, ["b", "a"]);
    }
}
