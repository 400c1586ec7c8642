//! DFA minimization by table-filling with union-find partition refinement.
//!
//! Pairs of states are marked distinguishable, starting from the
//! accepting/non-accepting split, then propagated backwards along
//! transitions until fixpoint; unmarked pairs are merged. Two accepting
//! states carrying *different token names* are distinguished up front —
//! merging them would conflate token classes even though the plain
//! accepting/non-accepting test cannot tell them apart.

use hashbrown::HashMap;

use crate::lexer::dfa::{Dfa, DfaState};
use crate::lexer::nfa::AcceptTag;

/// Produce the minimal DFA equivalent to `dfa` over `alphabet`.
///
/// The result is a new automaton; the input is left untouched. When all
/// accepting states share one token tag the output is the unique minimal
/// DFA up to isomorphism, and the state count never increases.
#[must_use]
pub fn minimize(dfa: &Dfa, alphabet: &[char]) -> Dfa {
    let states = dfa.states();
    let n = states.len();
    if n <= 1 {
        return dfa.clone();
    }

    let mut table = PairTable::new(n);

    // Initial marking: accepting vs non-accepting, and accepting states
    // whose token names differ.
    for i in 0..n {
        for j in i + 1..n {
            let (a, b) = (&states[i], &states[j]);
            let distinguishable = match (&a.accept, &b.accept) {
                (Some(_), None) | (None, Some(_)) => true,
                (Some(ta), Some(tb)) => ta.token != tb.token,
                (None, None) => false,
            };
            if distinguishable {
                table.mark(i, j);
            }
        }
    }

    // Iterative marking: a pair splits when some symbol leads it to a
    // marked pair, or when exactly one side has the transition.
    let mut changed = true;
    while changed {
        changed = false;
        for i in 0..n {
            for j in i + 1..n {
                if table.is_marked(i, j) {
                    continue;
                }
                for &symbol in alphabet {
                    let t1 = states[i].transition(symbol);
                    let t2 = states[j].transition(symbol);
                    let split = match (t1, t2) {
                        (None, None) => false,
                        (Some(a), Some(b)) => a != b && table.is_marked(a.min(b), a.max(b)),
                        _ => true,
                    };
                    if split {
                        table.mark(i, j);
                        changed = true;
                        break;
                    }
                }
            }
        }
    }

    // Union every unmarked pair, then rebuild one state per class.
    let mut partition = UnionFind::new(n);
    for i in 0..n {
        for j in i + 1..n {
            if !table.is_marked(i, j) {
                partition.union(i, j);
            }
        }
    }

    // Classes numbered by their smallest member, so the class holding the
    // old start (state 0 of a subset-construction DFA) stays first.
    let mut class_of_root: HashMap<usize, usize, ahash::RandomState> = HashMap::default();
    let mut members: Vec<Vec<usize>> = Vec::new();
    for id in 0..n {
        let root = partition.find(id);
        let class = *class_of_root.entry(root).or_insert_with(|| {
            members.push(Vec::new());
            members.len() - 1
        });
        members[class].push(id);
    }

    let class_of = |id: usize, partition: &mut UnionFind| class_of_root[&partition.find(id)];

    let mut minimized: Vec<DfaState> = Vec::with_capacity(members.len());
    for (class, group) in members.iter().enumerate() {
        let accept = winning_tag(states, group);
        let mut nfa_states: Vec<usize> = group
            .iter()
            .flat_map(|&id| states[id].nfa_states.iter().copied())
            .collect();
        nfa_states.sort_unstable();
        nfa_states.dedup();

        // Members of a class are transition-equivalent, so any
        // representative works; take the smallest.
        let representative = group[0];
        let mut transitions: HashMap<char, usize, ahash::RandomState> = HashMap::default();
        for &symbol in alphabet {
            if let Some(target) = states[representative].transition(symbol) {
                transitions.insert(symbol, class_of(target, &mut partition));
            }
        }

        minimized.push(DfaState {
            id: class,
            nfa_states,
            accept,
            transitions,
        });
    }

    let start = class_of(dfa.start(), &mut partition);
    Dfa::new(start, minimized)
}

/// Highest-priority accept tag among the class members, earliest member
/// breaking ties.
fn winning_tag(states: &[DfaState], group: &[usize]) -> Option<AcceptTag> {
    let mut best: Option<&AcceptTag> = None;
    for &id in group {
        if let Some(tag) = states[id].accept.as_ref() {
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

/// Triangular table of distinguishability marks, indexed by `(i, j)` with
/// `i < j`.
struct PairTable {
    n: usize,
    marked: Vec<bool>,
}

impl PairTable {
    fn new(n: usize) -> Self {
        Self {
            n,
            marked: vec![false; n * n],
        }
    }

    fn mark(&mut self, i: usize, j: usize) {
        debug_assert!(i < j);
        self.marked[i * self.n + j] = true;
    }

    fn is_marked(&self, i: usize, j: usize) -> bool {
        debug_assert!(i < j);
        self.marked[i * self.n + j]
    }
}

/// Union-find with path compression; union by root id keeps things simple
/// at the sizes involved.
struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, mut id: usize) -> usize {
        while self.parent[id] != id {
            self.parent[id] = self.parent[self.parent[id]];
            id = self.parent[id];
        }
        id
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            self.parent[rb] = ra;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::nfa::Nfa;

    fn single(pattern: &str, token: &str, priority: i32) -> Nfa {
        let mut nfa = Nfa::compile(pattern).unwrap();
        nfa.set_accept(token, priority);
        nfa
    }

    #[test]
    fn equivalent_accepting_states_collapse() {
        // a|b yields two accepting subset states with identical (empty)
        // outgoing behavior and the same tag; they must merge.
        let nfa = single("a|b", "AB", 0);
        let alphabet = ['a', 'b'];
        let dfa = Dfa::from_nfa(&nfa, &alphabet);
        let min = minimize(&dfa, &alphabet);

        assert!(min.len() < dfa.len());
        assert!(min.accepts("a"));
        assert!(min.accepts("b"));
        assert!(!min.accepts("ab"));
        assert!(!min.accepts(""));
    }

    #[test]
    fn language_is_preserved() {
        let nfa = single("(a|b)*c+", "ABC", 0);
        let alphabet = ['a', 'b', 'c'];
        let dfa = Dfa::from_nfa(&nfa, &alphabet);
        let min = minimize(&dfa, &alphabet);

        for input in ["c", "ac", "bc", "abc", "ababcc", "", "a", "ab", "cb"] {
            assert_eq!(
                dfa.accepts(input),
                min.accepts(input),
                "language changed on {input:?}"
            );
        }
        assert!(min.len() <= dfa.len());
    }

    #[test]
    fn minimization_is_idempotent() {
        let nfa = single("(a|b)*abb", "SUFFIX", 0);
        let alphabet = ['a', 'b'];
        let dfa = Dfa::from_nfa(&nfa, &alphabet);
        let once = minimize(&dfa, &alphabet);
        let twice = minimize(&once, &alphabet);
        assert_eq!(once.len(), twice.len());
    }

    #[test]
    fn distinct_token_names_are_never_merged() {
        // Both rule endpoints are accepting sinks with no outgoing edges;
        // bare table-filling would merge them and lose a token class.
        let combined = Nfa::union(vec![single("a", "A", 1), single("b", "B", 0)]);
        let alphabet = ['a', 'b'];
        let dfa = Dfa::from_nfa(&combined, &alphabet);
        let min = minimize(&dfa, &alphabet);

        let names: Vec<&str> = min
            .states()
            .iter()
            .filter_map(DfaState::token_name)
            .collect();
        assert!(names.contains(&"A"));
        assert!(names.contains(&"B"));
    }

    #[test]
    fn same_tag_sinks_do_merge() {
        let combined = Nfa::union(vec![single("a", "X", 1), single("b", "X", 0)]);
        let alphabet = ['a', 'b'];
        let dfa = Dfa::from_nfa(&combined, &alphabet);
        let min = minimize(&dfa, &alphabet);

        let accepting = min.states().iter().filter(|s| s.is_final()).count();
        assert_eq!(accepting, 1);
        assert!(min.accepts("a"));
        assert!(min.accepts("b"));
    }

    #[test]
    fn start_class_stays_first() {
        let nfa = single("ab", "AB", 0);
        let alphabet = ['a', 'b'];
        let dfa = Dfa::from_nfa(&nfa, &alphabet);
        let min = minimize(&dfa, &alphabet);
        assert_eq!(min.start(), 0);
    }
}
