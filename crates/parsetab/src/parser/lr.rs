//! LR(1) items and the canonical collection: CLOSURE, GOTO, and the
//! worklist construction over the augmented grammar.
//!
//! States are item sets compared by value; the FIFO worklist makes state
//! numbering match the usual textbook discovery order. Items reference
//! productions by index into the augmented production list, whose entry 0
//! is always `S' → S`.

use std::collections::{BTreeSet, VecDeque};

use hashbrown::HashMap;

use crate::grammar::analysis::GrammarAnalysis;
use crate::grammar::{Grammar, Production, Symbol};

/// An LR(1) item `[A → α • β, a]`: a production index, a dot position, and
/// a single lookahead terminal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LrItem {
    pub production: usize,
    pub dot: usize,
    pub lookahead: Symbol,
}

impl LrItem {
    #[must_use]
    pub fn new(production: usize, dot: usize, lookahead: Symbol) -> Self {
        Self {
            production,
            dot,
            lookahead,
        }
    }

    /// The symbol right after the dot, or `None` for a complete item.
    #[must_use]
    pub fn symbol_after_dot<'a>(&self, productions: &'a [Production]) -> Option<&'a Symbol> {
        productions[self.production].right.get(self.dot)
    }

    /// Same item with the dot advanced one symbol.
    #[must_use]
    pub fn advanced(&self) -> Self {
        Self {
            production: self.production,
            dot: self.dot + 1,
            lookahead: self.lookahead.clone(),
        }
    }
}

/// A state of the collection: an item set. `BTreeSet` gives value equality
/// and a canonical iteration order for free.
pub type ItemSet = BTreeSet<LrItem>;

/// The kernel of a state: its `(production, dot)` pairs with lookaheads
/// dropped. Two LR(1) states merge under LALR iff their kernels agree.
pub type Kernel = BTreeSet<(usize, usize)>;

/// The canonical LR(1) collection for an augmented grammar.
#[derive(Debug, Clone)]
pub struct Lr1Automaton {
    /// Augmented production list; index 0 is `S' → S`.
    productions: Vec<Production>,
    /// Closed item sets in discovery order.
    states: Vec<ItemSet>,
    /// `(state, symbol) → state` edges.
    transitions: HashMap<(usize, Symbol), usize, ahash::RandomState>,
    analysis: GrammarAnalysis,
}

impl Lr1Automaton {
    /// Build the collection for `grammar`.
    ///
    /// The grammar is augmented with a fresh start symbol `S'` (the start
    /// symbol's name with a `'` appended) and the production `S' → S`;
    /// state 0 is `CLOSURE({[S' → •S, $]})`.
    #[must_use]
    pub fn build(grammar: &Grammar) -> Self {
        let analysis = GrammarAnalysis::analyze(grammar);

        let augmented_start =
            Symbol::non_terminal(format!("{}'", grammar.start().name));
        let mut productions = Vec::with_capacity(grammar.productions().len() + 1);
        productions.push(Production::new(
            augmented_start,
            vec![grammar.start().clone()],
        ));
        productions.extend(grammar.productions().iter().cloned());

        let mut automaton = Self {
            productions,
            states: Vec::new(),
            transitions: HashMap::default(),
            analysis,
        };

        let mut initial = ItemSet::new();
        initial.insert(LrItem::new(0, 0, Symbol::end()));
        let initial = automaton.closure(&initial);

        let mut index_of: HashMap<ItemSet, usize, ahash::RandomState> = HashMap::default();
        automaton.states.push(initial.clone());
        index_of.insert(initial, 0);

        let symbols = grammar.symbols();
        let mut worklist: VecDeque<usize> = VecDeque::new();
        worklist.push_back(0);

        while let Some(current) = worklist.pop_front() {
            for symbol in &symbols {
                let target = automaton.goto(&automaton.states[current], symbol);
                if target.is_empty() {
                    continue;
                }
                let target_index = match index_of.get(&target) {
                    Some(&existing) => existing,
                    None => {
                        let index = automaton.states.len();
                        automaton.states.push(target.clone());
                        index_of.insert(target, index);
                        worklist.push_back(index);
                        index
                    }
                };
                automaton
                    .transitions
                    .insert((current, symbol.clone()), target_index);
            }
        }

        automaton
    }

    /// CLOSURE(I): for every `[A → α • B β, a]` with non-terminal `B`, add
    /// `[B → •γ, b]` for each production `B → γ` and each terminal
    /// `b ∈ FIRST(βa)`, to fixpoint.
    #[must_use]
    pub fn closure(&self, items: &ItemSet) -> ItemSet {
        let mut closure = items.clone();
        let mut worklist: VecDeque<LrItem> = items.iter().cloned().collect();

        while let Some(item) = worklist.pop_front() {
            let Some(after_dot) = self.symbol_after_dot(&item).cloned() else {
                continue;
            };
            if !after_dot.is_non_terminal() {
                continue;
            }

            // β a: the tail after B, with the item's lookahead appended.
            let production = &self.productions[item.production];
            let mut beta: Vec<Symbol> = production.right[item.dot + 1..].to_vec();
            beta.push(item.lookahead.clone());
            let first_beta_a = self.analysis.first_of_sequence(&beta);

            for (index, candidate) in self.productions.iter().enumerate() {
                if candidate.left != after_dot {
                    continue;
                }
                for lookahead in &first_beta_a {
                    if lookahead.is_epsilon() {
                        continue;
                    }
                    let new_item = LrItem::new(index, 0, lookahead.clone());
                    if closure.insert(new_item.clone()) {
                        worklist.push_back(new_item);
                    }
                }
            }
        }

        closure
    }

    /// GOTO(I, X): advance the dot over `X` in every applicable item, then
    /// close.
    #[must_use]
    pub fn goto(&self, items: &ItemSet, symbol: &Symbol) -> ItemSet {
        let moved: ItemSet = items
            .iter()
            .filter(|item| self.symbol_after_dot(item) == Some(symbol))
            .map(LrItem::advanced)
            .collect();
        if moved.is_empty() {
            return moved;
        }
        self.closure(&moved)
    }

    fn symbol_after_dot<'a>(&'a self, item: &LrItem) -> Option<&'a Symbol> {
        item.symbol_after_dot(&self.productions)
    }

    /// The `(production, dot)` kernel of a state.
    #[must_use]
    pub fn kernel(state: &ItemSet) -> Kernel {
        state
            .iter()
            .map(|item| (item.production, item.dot))
            .collect()
    }

    #[must_use]
    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    #[must_use]
    pub fn states(&self) -> &[ItemSet] {
        &self.states
    }

    #[must_use]
    pub fn transitions(&self) -> &HashMap<(usize, Symbol), usize, ahash::RandomState> {
        &self.transitions
    }
}
