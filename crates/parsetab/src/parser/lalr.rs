//! LALR(1): kernel-based merging of the LR(1) collection, ACTION/GOTO
//! table construction with conflict classification, and the shift/reduce
//! driver.
//!
//! Conflicts are diagnostics, not errors: the first entry written to a cell
//! stays, the collision is recorded, and the caller decides whether a
//! non-empty conflict list is fatal. Only a collision on the `$` accept
//! cell aborts construction — the augmented start production makes that
//! impossible for any well-formed collection.

use hashbrown::HashMap;

use crate::error::{LalrBuildError, ParseError};
use crate::grammar::{Grammar, Production, Symbol};
use crate::lexer::Token;
use crate::parser::lr::{ItemSet, Kernel, Lr1Automaton, LrItem};

/// A parse action. Reduce carries an index into the augmented production
/// list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Shift(usize),
    Reduce(usize),
    Accept,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    ShiftReduce,
    ReduceReduce,
}

/// A cell collision: the entry that stayed, the one that was refused, and
/// the classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub state: usize,
    pub symbol: Symbol,
    pub existing: Action,
    pub attempted: Action,
    pub kind: ConflictKind,
}

/// The merged LALR(1) parsing table.
#[derive(Debug, Clone)]
pub struct LalrTable {
    productions: Vec<Production>,
    states: Vec<ItemSet>,
    action: HashMap<(usize, Symbol), Action, ahash::RandomState>,
    goto_table: HashMap<(usize, Symbol), usize, ahash::RandomState>,
    conflicts: Vec<Conflict>,
}

impl LalrTable {
    /// Build the LR(1) collection for `grammar`, merge it, and fill the
    /// tables.
    ///
    /// # Errors
    ///
    /// Returns [`LalrBuildError::AcceptConflict`] if the `$` accept cell
    /// would be overwritten — an invariant violation, unlike ordinary
    /// conflicts which land in [`LalrTable::conflicts`].
    pub fn build(grammar: &Grammar) -> Result<Self, LalrBuildError> {
        Self::from_automaton(&Lr1Automaton::build(grammar))
    }

    /// Merge an existing collection. Useful when the caller also wants the
    /// canonical automaton itself.
    ///
    /// # Errors
    ///
    /// See [`LalrTable::build`].
    pub fn from_automaton(automaton: &Lr1Automaton) -> Result<Self, LalrBuildError> {
        // Group LR(1) states by kernel, in state order, so the group of
        // state 0 becomes LALR state 0.
        let lr1_states = automaton.states();
        let mut lalr_of_kernel: HashMap<Kernel, usize, ahash::RandomState> = HashMap::default();
        let mut lr1_to_lalr: Vec<usize> = Vec::with_capacity(lr1_states.len());
        let mut states: Vec<ItemSet> = Vec::new();

        for state in lr1_states {
            let kernel = Lr1Automaton::kernel(state);
            let lalr_index = match lalr_of_kernel.get(&kernel) {
                Some(&existing) => existing,
                None => {
                    let index = states.len();
                    states.push(ItemSet::new());
                    lalr_of_kernel.insert(kernel, index);
                    index
                }
            };
            // Item-set union is exactly the per-kernel-entry lookahead
            // union the merge calls for.
            states[lalr_index].extend(state.iter().cloned());
            lr1_to_lalr.push(lalr_index);
        }

        // Re-target transitions. GOTO depends only on kernels, so merged
        // edges agree wherever they collapse.
        let mut transitions: HashMap<(usize, Symbol), usize, ahash::RandomState> =
            HashMap::default();
        for ((from, symbol), to) in automaton.transitions() {
            transitions.insert((lr1_to_lalr[*from], symbol.clone()), lr1_to_lalr[*to]);
        }

        let mut table = Self {
            productions: automaton.productions().to_vec(),
            states,
            action: HashMap::default(),
            goto_table: HashMap::default(),
            conflicts: Vec::new(),
        };
        table.fill(&transitions)?;
        Ok(table)
    }

    fn fill(
        &mut self,
        transitions: &HashMap<(usize, Symbol), usize, ahash::RandomState>,
    ) -> Result<(), LalrBuildError> {
        let end = Symbol::end();

        for state_index in 0..self.states.len() {
            // BTreeSet iteration keeps the fill order deterministic.
            let items: Vec<LrItem> = self.states[state_index].iter().cloned().collect();
            for item in items {
                match self.productions[item.production].right.get(item.dot) {
                    Some(symbol) if symbol.is_terminal() => {
                        if let Some(&target) = transitions.get(&(state_index, symbol.clone())) {
                            self.try_set(state_index, symbol.clone(), Action::Shift(target))?;
                        }
                    }
                    Some(_) => {}
                    None => {
                        // Complete item: accept for the augmented
                        // production on `$`, reduce otherwise.
                        if item.production == 0 && item.lookahead == end {
                            self.try_set(state_index, end.clone(), Action::Accept)?;
                        } else {
                            self.try_set(
                                state_index,
                                item.lookahead.clone(),
                                Action::Reduce(item.production),
                            )?;
                        }
                    }
                }
            }
        }

        for ((state, symbol), &target) in transitions {
            if symbol.is_non_terminal() {
                self.goto_table.insert((*state, symbol.clone()), target);
            }
        }

        Ok(())
    }

    /// First writer wins; later distinct writes become [`Conflict`]s.
    fn try_set(
        &mut self,
        state: usize,
        symbol: Symbol,
        action: Action,
    ) -> Result<(), LalrBuildError> {
        match self.action.get(&(state, symbol.clone())) {
            None => {
                self.action.insert((state, symbol), action);
                Ok(())
            }
            Some(&existing) if existing == action => Ok(()),
            Some(&existing) => {
                let kind = match (existing, action) {
                    (Action::Accept, _) | (_, Action::Accept) => {
                        return Err(LalrBuildError::AcceptConflict { state, existing });
                    }
                    (Action::Shift(_), Action::Reduce(_))
                    | (Action::Reduce(_), Action::Shift(_)) => ConflictKind::ShiftReduce,
                    (Action::Reduce(_), Action::Reduce(_)) => ConflictKind::ReduceReduce,
                    // The transition map has one target per (state, symbol).
                    (Action::Shift(_), Action::Shift(_)) => {
                        unreachable!("distinct shift targets on one symbol")
                    }
                };
                self.conflicts.push(Conflict {
                    state,
                    symbol,
                    existing,
                    attempted: action,
                    kind,
                });
                Ok(())
            }
        }
    }

    #[must_use]
    pub fn action(&self, state: usize, terminal: &Symbol) -> Option<Action> {
        self.action.get(&(state, terminal.clone())).copied()
    }

    #[must_use]
    pub fn goto(&self, state: usize, non_terminal: &Symbol) -> Option<usize> {
        self.goto_table
            .get(&(state, non_terminal.clone()))
            .copied()
    }

    /// Collected Shift/Reduce and Reduce/Reduce diagnostics. Whether they
    /// are fatal is the caller's call.
    #[must_use]
    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }

    /// Augmented production list; index 0 is `S' → S`.
    #[must_use]
    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    /// Merged states, state 0 first.
    #[must_use]
    pub fn states(&self) -> &[ItemSet] {
        &self.states
    }
}

/// The shift/reduce engine over a built table.
#[derive(Debug, Clone, Copy)]
pub struct LalrParser<'a> {
    table: &'a LalrTable,
}

impl<'a> LalrParser<'a> {
    #[must_use]
    pub fn new(table: &'a LalrTable) -> Self {
        Self { table }
    }

    /// Decide whether the token stream belongs to the language. Terminals
    /// match on token-type name.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] with the state and offending token.
    pub fn parse(&self, tokens: &[Token]) -> Result<(), ParseError> {
        let kinds: Vec<&str> = tokens.iter().map(|t| t.kind.as_str()).collect();
        self.parse_kinds(&kinds)
    }

    /// Same as [`parse`], over bare token-type names.
    ///
    /// # Errors
    ///
    /// See [`parse`].
    ///
    /// [`parse`]: LalrParser::parse
    pub fn parse_kinds(&self, kinds: &[&str]) -> Result<(), ParseError> {
        let mut stack: Vec<usize> = vec![0];
        let mut position = 0;

        loop {
            let state = *stack.last().unwrap_or(&0);
            let current = kinds
                .get(position)
                .copied()
                .unwrap_or(crate::grammar::END_MARKER);
            let terminal = Symbol::terminal(current);

            match self.table.action(state, &terminal) {
                None => {
                    return Err(ParseError::NoAction {
                        state,
                        token: current.into(),
                        position,
                    })
                }
                Some(Action::Shift(target)) => {
                    stack.push(target);
                    position += 1;
                }
                Some(Action::Reduce(index)) => {
                    let production = &self.table.productions()[index];
                    // An ε-production pops nothing.
                    for _ in 0..production.right.len() {
                        stack.pop();
                    }
                    let exposed = *stack.last().unwrap_or(&0);
                    let Some(target) = self.table.goto(exposed, &production.left) else {
                        return Err(ParseError::NoGoto {
                            state: exposed,
                            non_terminal: production.left.name.clone(),
                        });
                    };
                    stack.push(target);
                }
                Some(Action::Accept) => return Ok(()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::grammar::Grammar;

    fn expression_table() -> LalrTable {
        let grammar =
            Grammar::parse("E -> E + T | T\nT -> T * F | F\nF -> ( E ) | id").unwrap();
        LalrTable::build(&grammar).unwrap()
    }

    #[test]
    fn expression_grammar_merges_to_twelve_states() {
        let table = expression_table();
        assert_eq!(table.states().len(), 12);
        assert!(table.conflicts().is_empty());
    }

    #[test]
    fn expression_grammar_parses_arithmetic() {
        let table = expression_table();
        let parser = LalrParser::new(&table);

        assert!(parser.parse_kinds(&["id", "+", "id", "*", "id"]).is_ok());
        assert!(parser.parse_kinds(&["(", "id", ")"]).is_ok());
        assert!(parser.parse_kinds(&["id"]).is_ok());

        let err = parser.parse_kinds(&["id", "+"]).unwrap_err();
        assert!(matches!(
            err,
            ParseError::NoAction { token, .. } if token == "$"
        ));
        assert!(parser.parse_kinds(&["+", "id"]).is_err());
        assert!(parser.parse_kinds(&["(", "id"]).is_err());
    }

    #[test]
    fn dangling_else_produces_shift_reduce_conflict() {
        let grammar = Grammar::parse(
            "S -> if S else S | if S | x",
        )
        .unwrap();
        let table = LalrTable::build(&grammar).unwrap();
        assert!(table
            .conflicts()
            .iter()
            .any(|c| c.kind == ConflictKind::ShiftReduce && c.symbol == Symbol::terminal("else")));
    }

    #[test]
    fn overlapping_reductions_produce_reduce_reduce_conflict() {
        // A and B both derive `x` with identical context.
        let grammar = Grammar::parse("S -> A | B\nA -> x\nB -> x").unwrap();
        let table = LalrTable::build(&grammar).unwrap();
        assert!(table
            .conflicts()
            .iter()
            .any(|c| c.kind == ConflictKind::ReduceReduce));
    }

    #[test]
    fn first_writer_wins_on_conflicts() {
        let grammar = Grammar::parse("S -> A | B\nA -> x\nB -> x").unwrap();
        let table = LalrTable::build(&grammar).unwrap();
        let conflict = &table.conflicts()[0];
        assert_eq!(
            table.action(conflict.state, &conflict.symbol),
            Some(conflict.existing)
        );
    }

    #[test]
    fn epsilon_production_reduces_without_popping() {
        // S -> a B b ; B -> ε | c
        let grammar = Grammar::parse("S -> a B b\nB -> c | \u{03b5}").unwrap();
        let table = LalrTable::build(&grammar).unwrap();
        assert!(table.conflicts().is_empty());
        let parser = LalrParser::new(&table);
        assert!(parser.parse_kinds(&["a", "b"]).is_ok());
        assert!(parser.parse_kinds(&["a", "c", "b"]).is_ok());
        assert!(parser.parse_kinds(&["a", "c"]).is_err());
    }

    #[test]
    fn right_recursive_grammar_accepts_and_rejects() {
        let grammar = Grammar::parse("S -> a S | b").unwrap();
        let table = LalrTable::build(&grammar).unwrap();
        let parser = LalrParser::new(&table);

        assert!(parser.parse_kinds(&["b"]).is_ok());
        assert!(parser.parse_kinds(&["a", "a", "b"]).is_ok());
        assert!(parser.parse_kinds(&[]).is_err());
        assert!(parser.parse_kinds(&["b", "a"]).is_err());
    }

    #[test]
    fn merged_states_union_lookaheads() {
        let table = expression_table();
        // Every LALR state's kernel appears exactly once.
        let kernels: BTreeSet<Kernel> =
            table.states().iter().map(Lr1Automaton::kernel).collect();
        assert_eq!(kernels.len(), table.states().len());
    }
}
