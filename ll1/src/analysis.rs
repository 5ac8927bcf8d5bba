//! Everything a code emitter needs to know about a grammar, for one start
//! symbol.

use std::collections::HashMap;

use itertools::Itertools;

use crate::{
    grammar::FirstSets,
    lex::{
        lex_cases,
        CodePointSet,
        LexCase,
    },
    Error,
    Grammar,
    Name,
    Terminal,
};

#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error("invalid start symbol: {0:?}")]
    Start(String),

    #[error("invalid type prefix: {0:?}")]
    TypePrefix(String),

    #[error("invalid label for {terminal}: {label:?}")]
    Label { terminal: String, label: String },

    #[error("label {0:?} is used for more than one terminal")]
    DuplicateLabel(String),
}

/// User-chosen labels for terminals.
#[derive(Clone, Debug, Default)]
pub struct TerminalNames {
    pub bytes: HashMap<u8, String>,
    pub runes: HashMap<char, String>,
    pub tokens: HashMap<String, String>,
    /// Keyed by `(lo, hi)`.
    pub ranges: HashMap<(char, char), String>,
}

impl TerminalNames {
    /// Returns the configured label for a leaf terminal.
    pub fn get(&self, terminal: &Terminal) -> Option<&str> {
        match terminal {
            Terminal::Byte(b) => self.bytes.get(b),
            Terminal::Rune(c) => self.runes.get(c),
            Terminal::Token(token) => self.tokens.get(token.as_str()),
            Terminal::Range(range) => {
                self.ranges
                    .get(&(range.lo().to_char(), range.hi().to_char()))
            }
            _ => None,
        }
        .map(String::as_str)
    }

    fn labels(&self) -> impl Iterator<Item = (String, &str)> {
        let bytes = self
            .bytes
            .iter()
            .map(|(b, label)| (Terminal::Byte(*b).to_string(), label.as_str()));
        let runes = self
            .runes
            .iter()
            .map(|(c, label)| (format!("{:?}", c.to_string()), label.as_str()));
        let tokens = self
            .tokens
            .iter()
            .map(|(token, label)| (format!("{token:?}"), label.as_str()));
        let ranges = self
            .ranges
            .iter()
            .map(|((lo, hi), label)| (format!("{lo:?} … {hi:?}"), label.as_str()));
        bytes.chain(runes).chain(tokens).chain(ranges)
    }

    pub fn check(&self) -> Result<(), CheckError> {
        for (terminal, label) in self.labels() {
            if Name::new(label).is_err() {
                return Err(CheckError::Label {
                    terminal,
                    label: label.to_owned(),
                });
            }
        }

        if let Some(label) = self.labels().map(|(_, label)| label).duplicates().next() {
            return Err(CheckError::DuplicateLabel(label.to_owned()));
        }

        Ok(())
    }
}

/// Analysis parameters
#[derive(Clone, Debug)]
pub struct AnalysisParameters {
    /// The production the analysis starts from.
    ///
    /// Default: `root`
    pub start: String,

    /// Whether referenced productions are analyzed too, or only the start
    /// production itself.
    ///
    /// Default: `true`
    pub recursive: bool,

    /// Prefix for labels of terminals that have none configured. The label is
    /// the prefix followed by the terminal's index.
    ///
    /// Default: `symbol`
    pub type_prefix: String,

    pub terminal_names: TerminalNames,
}

impl Default for AnalysisParameters {
    fn default() -> Self {
        Self {
            start: "root".to_owned(),
            recursive: true,
            type_prefix: "symbol".to_owned(),
            terminal_names: TerminalNames::default(),
        }
    }
}

impl AnalysisParameters {
    pub fn check(&self) -> Result<(), CheckError> {
        if Name::new(self.start.as_str()).is_err() {
            return Err(CheckError::Start(self.start.clone()));
        }
        if Name::new(self.type_prefix.as_str()).is_err() {
            return Err(CheckError::TypePrefix(self.type_prefix.clone()));
        }
        self.terminal_names.check()?;
        Ok(())
    }

    fn label(&self, index: usize, terminal: &Terminal) -> String {
        self.terminal_names
            .get(terminal)
            .map(ToOwned::to_owned)
            .unwrap_or_else(|| format!("{}{}", self.type_prefix, index))
    }
}

/// A terminal reachable from the start symbol.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TerminalInfo {
    pub label: String,
    pub terminal: Terminal,
    pub cases: Vec<LexCase>,
}

/// A production whose expression is a terminal, and can thus be recognized
/// by the lexer alone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lexeme<'g> {
    pub name: &'g Name,
    pub terminal: &'g Terminal,
    pub cases: Vec<LexCase>,

    /// Set if the terminal is an alternative of bytes, runes and ranges.
    pub code_points: Option<CodePointSet>,
}

/// The result of analyzing a grammar for one start symbol.
#[derive(Clone, Debug)]
pub struct Analysis<'g> {
    pub start: &'g Name,

    /// The start symbol followed by every production it (transitively)
    /// references.
    pub names: Vec<Name>,

    pub terminals: Vec<TerminalInfo>,

    pub lexemes: Vec<Lexeme<'g>>,

    /// FIRST sets of all productions in the grammar.
    pub first: FirstSets<'g>,
}

impl<'g> Analysis<'g> {
    pub fn new(grammar: &'g Grammar, parameters: &AnalysisParameters) -> Result<Self, Error> {
        parameters.check()?;

        let start = grammar.resolve(&parameters.start)?.name();
        let names = grammar.names(&parameters.start, parameters.recursive)?;
        let first = grammar.first()?;

        let terminals = grammar
            .terminals(&parameters.start, parameters.recursive)?
            .into_iter()
            .enumerate()
            .map(|(index, terminal)| {
                TerminalInfo {
                    label: parameters.label(index, &terminal),
                    cases: lex_cases(&terminal),
                    terminal,
                }
            })
            .collect::<Vec<_>>();

        let mut lexemes = vec![];
        for name in &names {
            let production = grammar.resolve(name.as_str())?;
            let Some(terminal) = production.expr().as_terminal()
            else {
                continue;
            };

            let code_points = match terminal {
                Terminal::Alternative(alternative) => CodePointSet::from_alternative(alternative).ok(),
                _ => None,
            };

            lexemes.push(Lexeme {
                name: production.name(),
                terminal,
                cases: lex_cases(terminal),
                code_points,
            });
        }

        tracing::debug!(
            start = %start,
            names = names.len(),
            terminals = terminals.len(),
            lexemes = lexemes.len(),
            "analysis complete"
        );

        Ok(Self {
            start,
            names,
            terminals,
            lexemes,
            first,
        })
    }
}
