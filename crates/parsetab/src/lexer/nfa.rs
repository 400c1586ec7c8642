//! Thompson construction of NFAs from postfix regexes, and the union of
//! several labeled rule automata under one synthetic start state.
//!
//! States live in a per-automaton arena and edges store destination indices,
//! so the cycles produced by `*` and `+` need no shared ownership. Ids are
//! assigned in construction order and stay stable for the automaton's
//! lifetime.

use compact_str::CompactString;
use hashbrown::HashSet;
use smallvec::SmallVec;

use crate::error::RegexError;
use crate::lexer::regex::{self, CONCAT};

/// Index of a state inside its automaton's arena.
pub type StateId = usize;

/// Token label on an accepting state. Lower priority wins ties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptTag {
    pub token: CompactString,
    pub priority: i32,
}

/// One NFA state: outgoing edges (`None` symbol = ε) plus an optional
/// accept tag.
#[derive(Debug, Clone, Default)]
pub struct NfaState {
    pub transitions: SmallVec<[(Option<char>, StateId); 4]>,
    pub accept: Option<AcceptTag>,
}

impl NfaState {
    /// Destinations reachable on ε.
    pub fn epsilon_transitions(&self) -> impl Iterator<Item = StateId> + '_ {
        self.transitions
            .iter()
            .filter(|(symbol, _)| symbol.is_none())
            .map(|&(_, to)| to)
    }

    /// Destinations reachable on `symbol`.
    pub fn transitions_on(&self, symbol: char) -> impl Iterator<Item = StateId> + '_ {
        self.transitions
            .iter()
            .filter(move |(s, _)| *s == Some(symbol))
            .map(|&(_, to)| to)
    }
}

/// A fragment under construction: the entry and exit of a sub-automaton.
#[derive(Debug, Clone, Copy)]
struct Fragment {
    start: StateId,
    end: StateId,
}

/// An ε-NFA. A freshly built single-regex automaton has a unique end state;
/// after [`Nfa::union`] there is no unique end and each rule's original end
/// keeps its own accept tag.
#[derive(Debug, Clone)]
pub struct Nfa {
    states: Vec<NfaState>,
    start: StateId,
    end: Option<StateId>,
}

impl Nfa {
    /// Compile an infix regex through postfix into an automaton.
    ///
    /// # Errors
    ///
    /// Returns a [`RegexError`] for empty patterns, operand underflow,
    /// unbalanced parentheses, or disconnected fragments.
    pub fn compile(pattern: &str) -> Result<Self, RegexError> {
        Self::from_postfix(&regex::to_postfix(pattern))
    }

    /// Thompson construction over a postfix expression.
    ///
    /// # Errors
    ///
    /// See [`Nfa::compile`].
    pub fn from_postfix(postfix: &str) -> Result<Self, RegexError> {
        if postfix.is_empty() {
            return Err(RegexError::EmptyPattern);
        }

        let mut states: Vec<NfaState> = Vec::new();
        let mut stack: Vec<Fragment> = Vec::new();

        let alloc = |states: &mut Vec<NfaState>| -> StateId {
            states.push(NfaState::default());
            states.len() - 1
        };

        for (position, c) in postfix.chars().enumerate() {
            if matches!(c, '(' | ')') {
                return Err(RegexError::UnbalancedParentheses);
            }
            if regex::is_operand(c) {
                let start = alloc(&mut states);
                let end = alloc(&mut states);
                states[start].transitions.push((Some(c), end));
                stack.push(Fragment { start, end });
            } else if c == CONCAT {
                let b = stack.pop().ok_or(RegexError::MissingOperand {
                    operator: c,
                    position,
                })?;
                let a = stack.pop().ok_or(RegexError::MissingOperand {
                    operator: c,
                    position,
                })?;
                states[a.end].transitions.push((None, b.start));
                stack.push(Fragment {
                    start: a.start,
                    end: b.end,
                });
            } else if c == '|' {
                let b = stack.pop().ok_or(RegexError::MissingOperand {
                    operator: c,
                    position,
                })?;
                let a = stack.pop().ok_or(RegexError::MissingOperand {
                    operator: c,
                    position,
                })?;
                let start = alloc(&mut states);
                let end = alloc(&mut states);
                states[start].transitions.push((None, a.start));
                states[start].transitions.push((None, b.start));
                states[a.end].transitions.push((None, end));
                states[b.end].transitions.push((None, end));
                stack.push(Fragment { start, end });
            } else {
                // `*`, `+`, `?`
                let a = stack.pop().ok_or(RegexError::MissingOperand {
                    operator: c,
                    position,
                })?;
                let start = alloc(&mut states);
                let end = alloc(&mut states);
                states[start].transitions.push((None, a.start));
                match c {
                    '*' => {
                        states[start].transitions.push((None, end));
                        states[a.end].transitions.push((None, a.start));
                        states[a.end].transitions.push((None, end));
                    }
                    '+' => {
                        states[a.end].transitions.push((None, a.start));
                        states[a.end].transitions.push((None, end));
                    }
                    '?' => {
                        states[start].transitions.push((None, end));
                        states[a.end].transitions.push((None, end));
                    }
                    other => {
                        return Err(RegexError::MissingOperand {
                            operator: other,
                            position,
                        })
                    }
                }
                stack.push(Fragment { start, end });
            }
        }

        let fragment = stack.pop().ok_or(RegexError::EmptyPattern)?;
        if !stack.is_empty() {
            return Err(RegexError::DanglingFragments {
                count: stack.len() + 1,
            });
        }

        Ok(Self {
            states,
            start: fragment.start,
            end: Some(fragment.end),
        })
    }

    /// Combine rule automata under a fresh start state joined by ε-edges.
    ///
    /// Accept tags set on each rule's end state survive untouched; the
    /// combined automaton has no unique end state.
    #[must_use]
    pub fn union(rules: Vec<Nfa>) -> Self {
        let capacity = 1 + rules.iter().map(|n| n.states.len()).sum::<usize>();
        let mut states: Vec<NfaState> = Vec::with_capacity(capacity);
        states.push(NfaState::default());
        let start = 0;

        for rule in rules {
            let offset = states.len();
            for mut state in rule.states {
                for (_, to) in &mut state.transitions {
                    *to += offset;
                }
                states.push(state);
            }
            states[start].transitions.push((None, rule.start + offset));
        }

        Self {
            states,
            start,
            end: None,
        }
    }

    /// Build an ε-free automaton from explicit per-state edge lists, in
    /// order. Used to reinterpret a DFA as an NFA.
    #[must_use]
    pub fn from_deterministic(
        start: StateId,
        states: impl IntoIterator<Item = (Vec<(char, StateId)>, Option<AcceptTag>)>,
    ) -> Self {
        let states = states
            .into_iter()
            .map(|(edges, accept)| NfaState {
                transitions: edges.into_iter().map(|(c, to)| (Some(c), to)).collect(),
                accept,
            })
            .collect();
        Self {
            states,
            start,
            end: None,
        }
    }

    /// Mark the unique end state accepting with `token` and `priority`.
    ///
    /// No-op on a combined automaton (which has no unique end).
    pub fn set_accept(&mut self, token: impl Into<CompactString>, priority: i32) {
        if let Some(end) = self.end {
            self.states[end].accept = Some(AcceptTag {
                token: token.into(),
                priority,
            });
        }
    }

    #[must_use]
    pub fn states(&self) -> &[NfaState] {
        &self.states
    }

    #[must_use]
    pub fn start(&self) -> StateId {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> Option<StateId> {
        self.end
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Every literal character appearing on a non-ε edge. Drives the
    /// strict-alphabet check.
    #[must_use]
    pub fn literal_symbols(&self) -> HashSet<char, ahash::RandomState> {
        self.states
            .iter()
            .flat_map(|state| state.transitions.iter())
            .filter_map(|(symbol, _)| *symbol)
            .collect()
    }

    /// ε-closure of a set of states: the input plus everything reachable
    /// through ε-edges alone.
    #[must_use]
    pub fn epsilon_closure(&self, seed: &[StateId]) -> HashSet<StateId, ahash::RandomState> {
        let mut closure: HashSet<StateId, ahash::RandomState> = seed.iter().copied().collect();
        let mut stack: Vec<StateId> = seed.to_vec();
        while let Some(id) = stack.pop() {
            for next in self.states[id].epsilon_transitions() {
                if closure.insert(next) {
                    stack.push(next);
                }
            }
        }
        closure
    }

    /// Direct simulation: does the automaton accept `input`?
    ///
    /// A state counts as accepting when it carries an accept tag, or when it
    /// is the unique end state of a single-regex automaton.
    #[must_use]
    pub fn accepts(&self, input: &str) -> bool {
        let mut current = self.epsilon_closure(&[self.start]);
        for c in input.chars() {
            let mut moved: Vec<StateId> = Vec::new();
            for &id in &current {
                moved.extend(self.states[id].transitions_on(c));
            }
            if moved.is_empty() {
                return false;
            }
            current = self.epsilon_closure(&moved);
        }
        current
            .iter()
            .any(|&id| self.states[id].accept.is_some() || self.end == Some(id))
    }
}
