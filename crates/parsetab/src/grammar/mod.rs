//! # Grammar Module
//!
//! The context-free grammar model: symbols, productions, and the immutable
//! [`Grammar`] that the analyses and table builders consume.
//!
//! Symbols compare by name **and** kind, so a terminal `x` and a
//! non-terminal `x` are distinct. Two sentinel terminals exist: [`Symbol::epsilon`]
//! (the empty string, appearing only inside FIRST sets) and [`Symbol::end`]
//! (the `$` end-of-input marker).

pub mod analysis;

use std::fmt;

use compact_str::CompactString;
use hashbrown::HashSet;

use crate::error::GrammarError;

/// Name of the empty-string sentinel terminal.
pub const EPSILON: &str = "\u{03b5}";
/// Name of the end-of-input marker terminal.
pub const END_MARKER: &str = "$";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SymbolKind {
    Terminal,
    NonTerminal,
}

/// A grammar symbol: a name tagged terminal or non-terminal.
///
/// Immutable after construction; equality, hashing and ordering use both
/// fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol {
    pub name: CompactString,
    pub kind: SymbolKind,
}

impl Symbol {
    #[must_use]
    pub fn new(name: impl Into<CompactString>, kind: SymbolKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    #[must_use]
    pub fn terminal(name: impl Into<CompactString>) -> Self {
        Self::new(name, SymbolKind::Terminal)
    }

    #[must_use]
    pub fn non_terminal(name: impl Into<CompactString>) -> Self {
        Self::new(name, SymbolKind::NonTerminal)
    }

    /// The `ε` sentinel. It never occurs in a production right-hand side
    /// held by a [`Grammar`]; empty alternatives become empty RHS vectors.
    #[must_use]
    pub fn epsilon() -> Self {
        Self::terminal(EPSILON)
    }

    /// The `$` end-of-input marker.
    #[must_use]
    pub fn end() -> Self {
        Self::terminal(END_MARKER)
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.kind == SymbolKind::Terminal
    }

    #[must_use]
    pub fn is_non_terminal(&self) -> bool {
        self.kind == SymbolKind::NonTerminal
    }

    #[must_use]
    pub fn is_epsilon(&self) -> bool {
        self.kind == SymbolKind::Terminal && self.name == EPSILON
    }

    #[must_use]
    pub fn is_end(&self) -> bool {
        self.kind == SymbolKind::Terminal && self.name == END_MARKER
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A production `left -> right`. An empty `right` is an ε-production.
///
/// Identity is by value over all fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Production {
    pub left: Symbol,
    pub right: Vec<Symbol>,
}

impl Production {
    #[must_use]
    pub fn new(left: Symbol, right: Vec<Symbol>) -> Self {
        Self { left, right }
    }

    #[must_use]
    pub fn is_epsilon(&self) -> bool {
        self.right.is_empty()
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ->", self.left)?;
        if self.right.is_empty() {
            return write!(f, " {EPSILON}");
        }
        for sym in &self.right {
            write!(f, " {sym}")?;
        }
        Ok(())
    }
}

/// An immutable context-free grammar: an ordered production list, the
/// terminal and non-terminal sets, and a designated start symbol.
#[derive(Debug, Clone)]
pub struct Grammar {
    productions: Vec<Production>,
    terminals: HashSet<Symbol, ahash::RandomState>,
    non_terminals: HashSet<Symbol, ahash::RandomState>,
    start: Symbol,
}

impl Grammar {
    /// Parse the line-oriented `A -> α | β` text format.
    ///
    /// Blank lines and lines starting with `#` are skipped. Symbols are
    /// whitespace-separated; `|` separates alternatives; a lone `ε` is the
    /// empty alternative. A name is a non-terminal iff it ever appears on a
    /// left-hand side. The first production's LHS is the start symbol.
    ///
    /// # Errors
    ///
    /// Returns [`GrammarError::MalformedProduction`] for a non-comment line
    /// without `->`, and [`GrammarError::Empty`] when nothing was parsed.
    pub fn parse(text: &str) -> Result<Self, GrammarError> {
        let mut builder = GrammarBuilder::new();
        for (idx, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (left, right) = line
                .split_once("->")
                .ok_or(GrammarError::MalformedProduction { line: idx + 1 })?;
            let left = left.trim();
            if left.is_empty() || left.split_whitespace().count() != 1 {
                return Err(GrammarError::MalformedProduction { line: idx + 1 });
            }
            for alternative in right.split('|') {
                let symbols: Vec<&str> = alternative.split_whitespace().collect();
                builder = builder.production(left, &symbols);
            }
        }
        builder.build()
    }

    /// Build a grammar from explicit productions, keeping the symbol kinds
    /// exactly as given. `start` defaults to the first production's LHS.
    ///
    /// Unlike [`Grammar::parse`], this does not reconcile kinds: a
    /// non-terminal on a right-hand side that never appears on a left-hand
    /// side stays a non-terminal, and analysis will warn about it.
    ///
    /// # Errors
    ///
    /// Returns [`GrammarError::Empty`] when `productions` is empty.
    pub fn from_productions(
        productions: Vec<Production>,
        start: Option<Symbol>,
    ) -> Result<Self, GrammarError> {
        if productions.is_empty() {
            return Err(GrammarError::Empty);
        }
        let mut terminals: HashSet<Symbol, ahash::RandomState> = HashSet::default();
        let mut non_terminals: HashSet<Symbol, ahash::RandomState> = HashSet::default();
        for production in &productions {
            non_terminals.insert(production.left.clone());
            for symbol in &production.right {
                match symbol.kind {
                    SymbolKind::Terminal => {
                        terminals.insert(symbol.clone());
                    }
                    SymbolKind::NonTerminal => {
                        non_terminals.insert(symbol.clone());
                    }
                }
            }
        }
        let start = start.unwrap_or_else(|| productions[0].left.clone());
        Ok(Self {
            productions,
            terminals,
            non_terminals,
            start,
        })
    }

    #[must_use]
    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    /// Productions whose left-hand side is `left`, in declaration order.
    pub fn productions_for<'a>(
        &'a self,
        left: &'a Symbol,
    ) -> impl Iterator<Item = &'a Production> + 'a {
        self.productions.iter().filter(move |p| p.left == *left)
    }

    #[must_use]
    pub fn terminals(&self) -> &HashSet<Symbol, ahash::RandomState> {
        &self.terminals
    }

    #[must_use]
    pub fn non_terminals(&self) -> &HashSet<Symbol, ahash::RandomState> {
        &self.non_terminals
    }

    #[must_use]
    pub fn start(&self) -> &Symbol {
        &self.start
    }

    /// All grammar symbols in a deterministic order: non-terminals first,
    /// then terminals, each sorted. The LR worklist iterates this.
    #[must_use]
    pub fn symbols(&self) -> Vec<Symbol> {
        let mut non_terminals: Vec<Symbol> = self.non_terminals.iter().cloned().collect();
        non_terminals.sort();
        let mut terminals: Vec<Symbol> = self.terminals.iter().cloned().collect();
        terminals.sort();
        non_terminals.extend(terminals);
        non_terminals
    }
}

/// Accumulates raw productions, then resolves symbol kinds in [`build`]:
/// a name is a non-terminal iff it appears on some left-hand side.
///
/// [`build`]: GrammarBuilder::build
#[derive(Debug, Default)]
pub struct GrammarBuilder {
    raw: Vec<(CompactString, Vec<CompactString>)>,
    start: Option<CompactString>,
}

impl GrammarBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a production. A lone `ε` (or an empty slice) is the empty RHS.
    #[must_use]
    pub fn production(mut self, left: &str, right: &[&str]) -> Self {
        let right: Vec<CompactString> = right
            .iter()
            .filter(|s| **s != EPSILON)
            .map(|s| CompactString::from(*s))
            .collect();
        self.raw.push((CompactString::from(left), right));
        self
    }

    /// Override the default start symbol (first production's LHS).
    #[must_use]
    pub fn start(mut self, name: &str) -> Self {
        self.start = Some(CompactString::from(name));
        self
    }

    /// Resolve kinds and freeze the grammar.
    ///
    /// # Errors
    ///
    /// Returns [`GrammarError::Empty`] when no production was added, and
    /// [`GrammarError::UnknownStart`] when an explicit start symbol has no
    /// production.
    pub fn build(self) -> Result<Grammar, GrammarError> {
        if self.raw.is_empty() {
            return Err(GrammarError::Empty);
        }

        let lhs_names: HashSet<&CompactString, ahash::RandomState> =
            self.raw.iter().map(|(left, _)| left).collect();

        let start_name = match self.start {
            Some(name) => {
                if !lhs_names.contains(&name) {
                    return Err(GrammarError::UnknownStart { name });
                }
                name
            }
            None => self.raw[0].0.clone(),
        };

        let kind_of = |name: &CompactString| {
            if lhs_names.contains(name) {
                SymbolKind::NonTerminal
            } else {
                SymbolKind::Terminal
            }
        };

        let mut productions = Vec::with_capacity(self.raw.len());
        let mut terminals: HashSet<Symbol, ahash::RandomState> = HashSet::default();
        let mut non_terminals: HashSet<Symbol, ahash::RandomState> = HashSet::default();

        for (left, right) in &self.raw {
            let left = Symbol::non_terminal(left.clone());
            non_terminals.insert(left.clone());
            let right: Vec<Symbol> = right
                .iter()
                .map(|name| {
                    let sym = Symbol::new(name.clone(), kind_of(name));
                    if sym.is_terminal() {
                        terminals.insert(sym.clone());
                    }
                    sym
                })
                .collect();
            productions.push(Production::new(left, right));
        }

        Ok(Grammar {
            productions,
            terminals,
            non_terminals,
            start: Symbol::non_terminal(start_name),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_equality_uses_name_and_kind() {
        assert_ne!(Symbol::terminal("x"), Symbol::non_terminal("x"));
        assert_eq!(Symbol::terminal("x"), Symbol::terminal("x"));
    }

    #[test]
    fn sentinels() {
        assert!(Symbol::epsilon().is_epsilon());
        assert!(Symbol::end().is_end());
        assert!(Symbol::epsilon().is_terminal());
    }

    #[test]
    fn parse_resolves_kinds_by_lhs_occurrence() {
        let grammar = Grammar::parse("S -> a S | b").unwrap();
        assert_eq!(grammar.productions().len(), 2);
        assert_eq!(grammar.start(), &Symbol::non_terminal("S"));
        assert!(grammar.terminals().contains(&Symbol::terminal("a")));
        assert!(grammar.terminals().contains(&Symbol::terminal("b")));
        assert!(grammar.non_terminals().contains(&Symbol::non_terminal("S")));
        assert_eq!(
            grammar.productions()[0].right,
            vec![Symbol::terminal("a"), Symbol::non_terminal("S")]
        );
    }

    #[test]
    fn parse_epsilon_alternative_is_empty_rhs() {
        let grammar = Grammar::parse("A -> a A | \u{03b5}").unwrap();
        assert!(grammar.productions()[1].is_epsilon());
    }

    #[test]
    fn parse_skips_comments_and_blank_lines() {
        let grammar = Grammar::parse("# expression grammar\n\nE -> E + T | T\nT -> id\n").unwrap();
        assert_eq!(grammar.productions().len(), 3);
    }

    #[test]
    fn parse_rejects_missing_arrow() {
        let err = Grammar::parse("S = a").unwrap_err();
        assert_eq!(err, GrammarError::MalformedProduction { line: 1 });
    }

    #[test]
    fn builder_rejects_unknown_start() {
        let err = GrammarBuilder::new()
            .production("S", &["a"])
            .start("T")
            .build()
            .unwrap_err();
        assert!(matches!(err, GrammarError::UnknownStart { .. }));
    }

    #[test]
    fn production_display_shows_epsilon_for_empty_rhs() {
        let p = Production::new(Symbol::non_terminal("A"), vec![]);
        assert_eq!(format!("{p}"), "A -> \u{03b5}");
    }

    #[test]
    fn symbols_order_is_deterministic() {
        let grammar = Grammar::parse("S -> a T\nT -> b").unwrap();
        let symbols = grammar.symbols();
        assert_eq!(
            symbols,
            vec![
                Symbol::non_terminal("S"),
                Symbol::non_terminal("T"),
                Symbol::terminal("a"),
                Symbol::terminal("b"),
            ]
        );
    }
}
