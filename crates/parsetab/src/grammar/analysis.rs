//! # Grammar Analysis
//!
//! FIRST/FOLLOW fixed-point computation over a [`Grammar`].
//!
//! Both sets are monotone over a finite symbol universe, so the full-scan
//! iteration terminates; grammars in the hundreds of productions converge in
//! a handful of passes.

use hashbrown::{HashMap, HashSet};

use crate::grammar::{Grammar, Symbol};

type SymbolSet = HashSet<Symbol, ahash::RandomState>;
type SetMap = HashMap<Symbol, SymbolSet, ahash::RandomState>;

/// A non-fatal observation made during analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisWarning {
    /// A symbol occurs on a right-hand side but never on a left-hand side
    /// and is not a declared terminal. It is treated as a terminal.
    UnresolvedSymbol { symbol: Symbol },
}

/// FIRST and FOLLOW sets for every symbol of a grammar.
#[derive(Debug, Clone)]
pub struct GrammarAnalysis {
    first: SetMap,
    follow: SetMap,
    warnings: Vec<AnalysisWarning>,
}

impl GrammarAnalysis {
    /// Run both fixed points.
    #[must_use]
    pub fn analyze(grammar: &Grammar) -> Self {
        let mut warnings = Vec::new();
        let first = compute_first(grammar, &mut warnings);
        let follow = compute_follow(grammar, &first);
        Self {
            first,
            follow,
            warnings,
        }
    }

    /// FIRST(X): terminals that can begin a derivation from `X`, plus `ε`
    /// when `X` is nullable.
    #[must_use]
    pub fn first(&self, symbol: &Symbol) -> Option<&SymbolSet> {
        self.first.get(symbol)
    }

    /// FOLLOW(A) for non-terminal `A`.
    #[must_use]
    pub fn follow(&self, symbol: &Symbol) -> Option<&SymbolSet> {
        self.follow.get(symbol)
    }

    #[must_use]
    pub fn warnings(&self) -> &[AnalysisWarning] {
        &self.warnings
    }

    /// FIRST of a symbol sequence: the union over the longest nullable
    /// prefix, plus `ε` iff every element is nullable. The empty sequence
    /// yields `{ε}`.
    ///
    /// Terminals absent from the analyzed grammar (the `$` lookahead in LR
    /// item sequences, for instance) contribute themselves.
    #[must_use]
    pub fn first_of_sequence(&self, sequence: &[Symbol]) -> SymbolSet {
        let epsilon = Symbol::epsilon();
        let mut result: SymbolSet = HashSet::default();
        if sequence.is_empty() {
            result.insert(epsilon);
            return result;
        }
        for (i, symbol) in sequence.iter().enumerate() {
            let nullable = match self.first.get(symbol) {
                Some(first_x) => {
                    for sym in first_x {
                        if *sym != epsilon {
                            result.insert(sym.clone());
                        }
                    }
                    first_x.contains(&epsilon)
                }
                None if symbol.is_terminal() => {
                    result.insert(symbol.clone());
                    false
                }
                None => false,
            };
            if !nullable {
                break;
            }
            if i == sequence.len() - 1 {
                result.insert(epsilon.clone());
            }
        }
        result
    }

    /// Whether the sequence derives `ε`.
    #[must_use]
    pub fn is_nullable(&self, sequence: &[Symbol]) -> bool {
        let epsilon = Symbol::epsilon();
        sequence
            .iter()
            .all(|sym| self.first.get(sym).is_some_and(|f| f.contains(&epsilon)))
    }
}

fn compute_first(grammar: &Grammar, warnings: &mut Vec<AnalysisWarning>) -> SetMap {
    let epsilon = Symbol::epsilon();
    let mut first: SetMap = HashMap::default();

    for terminal in grammar.terminals() {
        let mut set: SymbolSet = HashSet::default();
        set.insert(terminal.clone());
        first.insert(terminal.clone(), set);
    }
    for non_terminal in grammar.non_terminals() {
        first.insert(non_terminal.clone(), HashSet::default());
    }
    let mut epsilon_set: SymbolSet = HashSet::default();
    epsilon_set.insert(epsilon.clone());
    first.entry(epsilon.clone()).or_insert(epsilon_set);

    // A non-terminal on a RHS with no production of its own gets
    // FIRST(X) = {X}, once, with a warning; it behaves as a terminal from
    // here on.
    for production in grammar.productions() {
        for symbol in &production.right {
            if symbol.is_non_terminal()
                && grammar.productions_for(symbol).next().is_none()
                && !warnings
                    .iter()
                    .any(|w| matches!(w, AnalysisWarning::UnresolvedSymbol { symbol: s } if s == symbol))
            {
                warnings.push(AnalysisWarning::UnresolvedSymbol {
                    symbol: symbol.clone(),
                });
                let mut set: SymbolSet = HashSet::default();
                set.insert(symbol.clone());
                first.insert(symbol.clone(), set);
            }
        }
    }

    let mut changed = true;
    while changed {
        changed = false;
        for production in grammar.productions() {
            let mut additions: Vec<Symbol> = Vec::new();
            let mut all_nullable = true;
            for symbol in &production.right {
                let first_x = &first[symbol];
                for sym in first_x {
                    if *sym != epsilon {
                        additions.push(sym.clone());
                    }
                }
                if !first_x.contains(&epsilon) {
                    all_nullable = false;
                    break;
                }
            }
            if all_nullable {
                additions.push(epsilon.clone());
            }
            let first_a = first.get_mut(&production.left).expect("LHS is registered");
            for sym in additions {
                if first_a.insert(sym) {
                    changed = true;
                }
            }
        }
    }

    first
}

fn compute_follow(grammar: &Grammar, first: &SetMap) -> SetMap {
    let epsilon = Symbol::epsilon();
    let mut follow: SetMap = HashMap::default();
    for non_terminal in grammar.non_terminals() {
        follow.insert(non_terminal.clone(), HashSet::default());
    }
    follow
        .get_mut(grammar.start())
        .expect("start symbol is a non-terminal")
        .insert(Symbol::end());

    let mut changed = true;
    while changed {
        changed = false;
        for production in grammar.productions() {
            for (i, x_i) in production.right.iter().enumerate() {
                if !x_i.is_non_terminal() {
                    continue;
                }
                let mut additions: Vec<Symbol> = Vec::new();
                let mut tail_nullable = true;
                for x_j in &production.right[i + 1..] {
                    let first_j = &first[x_j];
                    for sym in first_j {
                        if *sym != epsilon {
                            additions.push(sym.clone());
                        }
                    }
                    if !first_j.contains(&epsilon) {
                        tail_nullable = false;
                        break;
                    }
                }
                if tail_nullable {
                    if let Some(follow_b) = follow.get(&production.left) {
                        additions.extend(follow_b.iter().cloned());
                    }
                }
                let follow_i = follow.get_mut(x_i).expect("non-terminal is registered");
                for sym in additions {
                    if follow_i.insert(sym) {
                        changed = true;
                    }
                }
            }
        }
    }

    follow
}
