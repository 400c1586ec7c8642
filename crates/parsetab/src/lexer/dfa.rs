//! Subset construction: determinizing an ε-NFA over a caller-supplied
//! alphabet.
//!
//! A DFA state is identified by the set of NFA states it represents; subset
//! construction deduplicates on that set, so its value equality is
//! load-bearing. The supplied alphabet may be wider than the characters the
//! patterns use — the extra columns simply stay dead.

use std::collections::VecDeque;

use hashbrown::{HashMap, HashSet};

use crate::lexer::nfa::{AcceptTag, Nfa, StateId};

/// One deterministic state: its id, the sorted NFA-state set it stands for,
/// the winning accept tag (if any NFA state in the set accepts), and its
/// transition map.
#[derive(Debug, Clone)]
pub struct DfaState {
    pub id: usize,
    /// Sorted; equal sets mean equal states.
    pub nfa_states: Vec<StateId>,
    pub accept: Option<AcceptTag>,
    pub transitions: HashMap<char, usize, ahash::RandomState>,
}

impl DfaState {
    #[must_use]
    pub fn is_final(&self) -> bool {
        self.accept.is_some()
    }

    #[must_use]
    pub fn token_name(&self) -> Option<&str> {
        self.accept.as_ref().map(|tag| tag.token.as_str())
    }

    #[must_use]
    pub fn transition(&self, symbol: char) -> Option<usize> {
        self.transitions.get(&symbol).copied()
    }
}

/// A deterministic automaton produced by subset construction or
/// minimization.
#[derive(Debug, Clone)]
pub struct Dfa {
    start: usize,
    states: Vec<DfaState>,
}

impl Dfa {
    pub(crate) fn new(start: usize, states: Vec<DfaState>) -> Self {
        Self { start, states }
    }

    /// Determinize `nfa` over `alphabet`.
    ///
    /// State 0 is the ε-closure of the NFA start; further states are
    /// discovered worklist-first, enumerating alphabet symbols in the given
    /// order, so the state numbering is deterministic for a fixed alphabet
    /// order.
    #[must_use]
    pub fn from_nfa(nfa: &Nfa, alphabet: &[char]) -> Self {
        let mut states: Vec<DfaState> = Vec::new();
        let mut index_of: HashMap<Vec<StateId>, usize, ahash::RandomState> = HashMap::default();
        let mut worklist: VecDeque<usize> = VecDeque::new();

        let start_set = sorted(nfa.epsilon_closure(&[nfa.start()]));
        states.push(DfaState {
            id: 0,
            accept: winning_tag(nfa, &start_set),
            nfa_states: start_set.clone(),
            transitions: HashMap::default(),
        });
        index_of.insert(start_set, 0);
        worklist.push_back(0);

        while let Some(current) = worklist.pop_front() {
            for &symbol in alphabet {
                let mut moved: Vec<StateId> = Vec::new();
                for &id in &states[current].nfa_states {
                    moved.extend(nfa.states()[id].transitions_on(symbol));
                }
                if moved.is_empty() {
                    continue;
                }
                let target_set = sorted(nfa.epsilon_closure(&moved));
                let target = match index_of.get(&target_set) {
                    Some(&existing) => existing,
                    None => {
                        let id = states.len();
                        states.push(DfaState {
                            id,
                            accept: winning_tag(nfa, &target_set),
                            nfa_states: target_set.clone(),
                            transitions: HashMap::default(),
                        });
                        index_of.insert(target_set, id);
                        worklist.push_back(id);
                        id
                    }
                };
                states[current].transitions.insert(symbol, target);
            }
        }

        Self { start: 0, states }
    }

    #[must_use]
    pub fn start(&self) -> usize {
        self.start
    }

    #[must_use]
    pub fn states(&self) -> &[DfaState] {
        &self.states
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// The characters actually used by some transition, sorted.
    #[must_use]
    pub fn alphabet(&self) -> Vec<char> {
        let mut chars: HashSet<char, ahash::RandomState> = HashSet::default();
        for state in &self.states {
            chars.extend(state.transitions.keys().copied());
        }
        let mut chars: Vec<char> = chars.into_iter().collect();
        chars.sort_unstable();
        chars
    }

    /// Linear walk: does the automaton accept `input`? Rejects on the first
    /// missing transition.
    #[must_use]
    pub fn accepts(&self, input: &str) -> bool {
        let mut current = self.start;
        for c in input.chars() {
            match self.states[current].transition(c) {
                Some(next) => current = next,
                None => return false,
            }
        }
        self.states[current].is_final()
    }

    /// Reinterpret the DFA as an NFA (no ε-edges, same accept tags).
    ///
    /// Feeding the result back through [`Dfa::from_nfa`] must yield an
    /// isomorphic automaton — subset construction is idempotent on
    /// deterministic input.
    #[must_use]
    pub fn to_nfa(&self) -> Nfa {
        Nfa::from_deterministic(
            self.start,
            self.states.iter().map(|state| {
                let edges: Vec<(char, usize)> = state
                    .transitions
                    .iter()
                    .map(|(&c, &to)| (c, to))
                    .collect();
                (edges, state.accept.clone())
            }),
        )
    }
}

fn sorted(set: HashSet<StateId, ahash::RandomState>) -> Vec<StateId> {
    let mut ids: Vec<StateId> = set.into_iter().collect();
    ids.sort_unstable();
    ids
}

/// Scan a DFA state's NFA set for accepting states; minimum priority wins,
/// ties broken by the earliest (lowest-id) occurrence.
fn winning_tag(nfa: &Nfa, set: &[StateId]) -> Option<AcceptTag> {
    let mut best: Option<&AcceptTag> = None;
    for &id in set {
        if let Some(tag) = nfa.states()[id].accept.as_ref() {
            let better = match best {
                Some(current) => tag.priority < current.priority,
                None => true,
            };
            if better {
                best = Some(tag);
            }
        }
    }
    best.cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(pattern: &str, token: &str, priority: i32) -> Nfa {
        let mut nfa = Nfa::compile(pattern).unwrap();
        nfa.set_accept(token, priority);
        nfa
    }

    #[test]
    fn determinizes_grouped_star_then_plus() {
        let nfa = single("(a|b)*c+", "ABC", 0);
        let dfa = Dfa::from_nfa(&nfa, &['a', 'b', 'c']);

        for accepted in ["c", "ac", "bc", "abc", "ababcc"] {
            assert!(dfa.accepts(accepted), "should accept {accepted:?}");
        }
        for rejected in ["", "a", "ab", "ccd"] {
            assert!(!dfa.accepts(rejected), "should reject {rejected:?}");
        }
    }

    #[test]
    fn start_state_is_epsilon_closure_of_nfa_start() {
        let nfa = single("a", "A", 0);
        let dfa = Dfa::from_nfa(&nfa, &['a']);
        assert_eq!(dfa.start(), 0);
        let closure = nfa.epsilon_closure(&[nfa.start()]);
        assert_eq!(dfa.states()[0].nfa_states.len(), closure.len());
    }

    #[test]
    fn nfa_sets_are_deduplicated() {
        // a* loops back to the same subset on every `a`.
        let nfa = single("a*", "A", 0);
        let dfa = Dfa::from_nfa(&nfa, &['a']);
        let loops: Vec<usize> = dfa
            .states()
            .iter()
            .filter_map(|s| s.transition('a'))
            .collect();
        // All `a` transitions land on one state.
        assert!(loops.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn union_resolves_token_by_priority() {
        let combined = Nfa::union(vec![single("if", "KEYWORD", 0), single("if", "IDENTIFIER", 1)]);
        let dfa = Dfa::from_nfa(&combined, &['i', 'f']);
        let accepting: Vec<&DfaState> = dfa.states().iter().filter(|s| s.is_final()).collect();
        assert_eq!(accepting.len(), 1);
        assert_eq!(accepting[0].token_name(), Some("KEYWORD"));
    }

    #[test]
    fn wider_alphabet_leaves_dead_columns() {
        let nfa = single("a", "A", 0);
        let dfa = Dfa::from_nfa(&nfa, &['a', 'z']);
        assert!(dfa.accepts("a"));
        assert!(!dfa.accepts("z"));
        assert!(dfa
            .states()
            .iter()
            .all(|s| s.transition('z').is_none()));
    }

    #[test]
    fn union_of_two_rules_recognizes_both_languages() {
        let combined = Nfa::union(vec![
            single("(a|b)*c+", "ABC", 1),
            single("d(e|f)g*", "DEFG", 0),
        ]);
        let dfa = Dfa::from_nfa(&combined, &['a', 'b', 'c', 'd', 'e', 'f', 'g']);

        assert!(dfa.accepts("bbbc"));
        assert!(dfa.accepts("de"));
        assert!(dfa.accepts("dfggg"));
        assert!(!dfa.accepts("d"));
        assert!(!dfa.accepts("cde"));
    }

    #[test]
    fn dfa_reinterpreted_as_nfa_is_fixed_point() {
        let nfa = single("(a|b)*c+", "ABC", 0);
        let dfa = Dfa::from_nfa(&nfa, &['a', 'b', 'c']);
        let again = Dfa::from_nfa(&dfa.to_nfa(), &['a', 'b', 'c']);
        assert_eq!(dfa.len(), again.len());
        for input in ["c", "abc", "ab", ""] {
            assert_eq!(dfa.accepts(input), again.accepts(input));
        }
    }
}
