use std::{
    borrow::BorrowMut,
    collections::{BTreeMap, BTreeSet, VecDeque},
    hash::Hash,
    sync::Arc,
};

use super::Nfa;
use crate::{closure_builder::ClosureBuilder, dfa::Dfa, memoize::Memoize};

/// A DFA state produced by subset construction: the set of NFA states it
/// stands for.  Equal sets share one allocation.
pub type DfaState<N> = Arc<BTreeSet<N>>;

pub struct DfaBuilder<'a, S, N> {
    nfa: &'a Nfa<S, N>,
    closure: ClosureBuilder<N>,
}

impl<'a, S: Clone + Ord, N: Clone + Ord + Hash> DfaBuilder<'a, S, N> {
    pub fn new(nfa: &'a Nfa<S, N>) -> Self {
        Self {
            nfa,
            closure: ClosureBuilder::default(),
        }
    }

    fn solve_closure<B: BorrowMut<BTreeSet<N>>>(&mut self, set: B) -> B {
        let nfa = self.nfa;
        self.closure.solve(set, |n| {
            nfa.get(n)
                .into_iter()
                .flat_map(|n| n.nil_edges().iter().cloned())
                .collect::<Vec<_>>()
        })
    }

    /// Union of the targets of every member of `set` on each symbol
    fn moves(&self, set: &BTreeSet<N>) -> BTreeMap<S, BTreeSet<N>> {
        let mut moves: BTreeMap<S, BTreeSet<N>> = BTreeMap::new();

        for node in set.iter().filter_map(|n| self.nfa.get(n)) {
            for (sym, targets) in node.edges().filter_map(|(s, t)| s.map(|s| (s, t))) {
                moves
                    .entry(sym.clone())
                    .or_default()
                    .extend(targets.iter().cloned());
            }
        }

        moves
    }

    pub fn build(&mut self) -> Dfa<S, DfaState<N>> {
        let mut memo = Memoize::default();
        let nfa_accept: BTreeSet<&N> = self.nfa.accepting().collect();

        self.closure.init([self.nfa.start().clone()]);
        let start = memo.memoize(self.solve_closure(BTreeSet::new()));

        let mut states: BTreeMap<DfaState<N>, BTreeMap<S, DfaState<N>>> = BTreeMap::new();
        let mut accept = BTreeSet::new();
        let mut q: VecDeque<_> = [Arc::clone(&start)].into_iter().collect();

        while let Some(state_set) = q.pop_front() {
            if states.contains_key(&state_set) {
                continue;
            }

            if state_set.iter().any(|n| nfa_accept.contains(n)) {
                accept.insert(Arc::clone(&state_set));
            }

            let mut edges = BTreeMap::new();
            for (sym, targets) in self.moves(&state_set) {
                self.closure.init(targets);
                let next = memo.memoize(self.solve_closure(BTreeSet::new()));

                if !states.contains_key(&next) {
                    q.push_back(Arc::clone(&next));
                }

                edges.insert(sym, next);
            }

            states.insert(state_set, edges);
        }

        // Every move target is a nonempty closure, so the empty set is free
        // to act as the sink
        let sink = memo.memoize(BTreeSet::new());
        debug_assert!(!states.contains_key(&sink));
        states.insert(Arc::clone(&sink), BTreeMap::new());

        let alphabet = self.nfa.alphabet().clone();
        for edges in states.values_mut() {
            for sym in &alphabet {
                edges
                    .entry(sym.clone())
                    .or_insert_with(|| Arc::clone(&sink));
            }
        }

        tracing::trace!(
            nfa_states = self.nfa.len(),
            dfa_states = states.len(),
            interned = memo.len(),
            "Subset construction finished"
        );

        Dfa::new(alphabet, states, start, accept, Some(sink))
    }
}

#[cfg(test)]
mod test {
    use std::collections::BTreeSet;

    use proptest::prelude::*;

    use crate::{nfa::Nfa, re};

    /// 0 -a-> 1 -ϵ-> 2 -ϵ-> 1, 2 -b-> 3
    fn looped() -> Nfa<char> {
        let mut nfa = Nfa::new(0);
        for n in 1..=3 {
            nfa.insert(n);
        }
        nfa.connect(&0, 1, Some('a'));
        nfa.connect(&1, 2, None);
        nfa.connect(&2, 1, None);
        nfa.connect(&2, 3, Some('b'));
        nfa.set_accept(&3, true);
        nfa
    }

    #[test]
    fn epsilon_closure_handles_cycles() {
        let nfa = looped();
        assert_eq!(nfa.epsilon_closure(&1), BTreeSet::from([1, 2]));
        assert_eq!(nfa.epsilon_closure(&0), BTreeSet::from([0]));
    }

    #[test]
    fn subset_states() {
        let dfa = looped().compile();

        assert_eq!(**dfa.start(), BTreeSet::from([0]));
        assert_eq!(dfa.len(), 4);
        assert!(dfa.is_total());

        let after_a = dfa.step(dfa.start(), &'a').unwrap();
        assert_eq!(**after_a, BTreeSet::from([1, 2]));

        let after_b = dfa.step(after_a, &'b').unwrap();
        assert!(dfa.is_accepting(after_b));

        let sink = dfa.sink().unwrap();
        assert!(sink.is_empty());
        assert_eq!(dfa.step(dfa.start(), &'b'), Some(sink));
        assert_eq!(dfa.step(sink, &'a'), Some(sink));

        assert!(dfa.accept("ab".chars()));
        assert!(!dfa.accept("a".chars()));
        assert!(!dfa.accept("abb".chars()));
        assert!(!dfa.accept("ac".chars()));
    }

    proptest! {
        #[test]
        fn compiled_dfa_is_total(r in re::re(6, 32, 2, crate::prop::symbol())) {
            let dfa = r.thompson().compile();
            prop_assert!(dfa.is_total());
            prop_assert!(dfa.sink().is_some_and(|s| !dfa.is_accepting(s)));
        }

        #[test]
        fn dfa_matches_regex(
            r in re::re(6, 32, 2, crate::prop::symbol()),
            words in prop::collection::vec(crate::prop::word(0..8), 1..16),
        ) {
            let nfa = r.thompson();
            let dfa = nfa.compile();

            for word in words {
                let chars: Vec<char> = word.chars().collect();
                prop_assert_eq!(
                    dfa.accept(&chars),
                    r.matches(&chars),
                    "{} on {:?}",
                    r,
                    word,
                );
            }
        }

        #[test]
        fn compiling_twice_is_stable(
            r in re::re(6, 32, 2, crate::prop::symbol()),
            words in prop::collection::vec(crate::prop::word(0..8), 1..16),
        ) {
            let lhs = r.thompson().compile();
            let rhs = r.clone().thompson().compile();

            prop_assert_eq!(lhs.len(), rhs.len());
            for word in words {
                prop_assert_eq!(lhs.accept(word.chars()), rhs.accept(word.chars()));
            }
        }
    }
}
