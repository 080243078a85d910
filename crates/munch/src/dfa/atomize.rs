use std::collections::BTreeMap;

use super::{Dfa, Node};
use crate::free::Free;

/// Assigns dense integer labels to DFA states, start state first
#[derive(Debug)]
struct DfaAtomizer<N> {
    free: Free<usize>,
    used: BTreeMap<N, usize>,
}

impl<N> Default for DfaAtomizer<N> {
    fn default() -> Self {
        Self {
            free: Free::default(),
            used: BTreeMap::new(),
        }
    }
}

impl<N: Ord> DfaAtomizer<N> {
    fn get(&mut self, node: N) -> usize { *self.used.entry(node).or_insert_with(|| self.free.fresh()) }

    fn labels(self) -> Vec<N> {
        let mut labels: Vec<_> = self.used.into_iter().collect();
        labels.sort_unstable_by_key(|&(_, i)| i);
        labels.into_iter().map(|(n, _)| n).collect()
    }
}

impl<S: Ord, N: Clone + Ord> Dfa<S, N> {
    /// Relabel states as `0..len`, with the start state as 0.  Returns the
    /// relabelled automaton and the original label of each state.
    #[must_use]
    pub fn atomize(self) -> (Dfa<S, usize>, Vec<N>) {
        let mut atoms = DfaAtomizer::default();
        let Dfa {
            alphabet,
            states,
            start,
            accept,
            sink,
        } = self;

        let start = atoms.get(start);
        let states = states
            .into_iter()
            .map(|(n, Node(e))| {
                let n = atoms.get(n);
                (n, Node(e.into_iter().map(|(s, t)| (s, atoms.get(t))).collect()))
            })
            .collect();
        let accept = accept.into_iter().map(|n| atoms.get(n)).collect();
        let sink = sink.map(|n| atoms.get(n));

        let dfa = Dfa {
            alphabet,
            states,
            start,
            accept,
            sink,
        };

        (dfa, atoms.labels())
    }
}
