//! Deterministic automata and the runners built on them

use std::{
    borrow::{Borrow, Cow},
    collections::{BTreeMap, BTreeSet},
};

use crate::dot;

mod atomize;
mod scanner;

pub use scanner::{Munch, Scanner};

/// Outgoing transitions of a single DFA state
#[derive(Debug, Clone)]
#[repr(transparent)]
pub struct Node<S, N>(BTreeMap<S, N>);

impl<S, N> Node<S, N> {
    /// Transitions in symbol order
    #[inline]
    pub fn edges(&self) -> impl Iterator<Item = (&S, &N)> { self.0.iter() }
}

/// A deterministic finite automaton.
///
/// Automata produced by subset construction are total: every state has a
/// transition on every symbol of the alphabet, with otherwise unmatched
/// inputs routed to a non-accepting sink state.
#[derive(Debug, Clone)]
pub struct Dfa<S, N> {
    alphabet: BTreeSet<S>,
    states: BTreeMap<N, Node<S, N>>,
    start: N,
    accept: BTreeSet<N>,
    sink: Option<N>,
}

impl<S: Ord, N: Ord> Dfa<S, N> {
    /// Assemble an automaton from its parts.
    ///
    /// # Panics
    /// Panics if the start state, an accepting state, the sink or a
    /// transition target is not one of `states`.
    pub fn new(
        alphabet: BTreeSet<S>,
        states: impl IntoIterator<Item = (N, BTreeMap<S, N>)>,
        start: N,
        accept: BTreeSet<N>,
        sink: Option<N>,
    ) -> Self {
        let states: BTreeMap<_, _> = states.into_iter().map(|(k, v)| (k, Node(v))).collect();

        assert!(states.contains_key(&start), "Start state is not in the automaton");
        assert!(
            accept.iter().chain(&sink).all(|n| states.contains_key(n)),
            "Accepting or sink state is not in the automaton"
        );
        assert!(
            states
                .values()
                .flat_map(|Node(e)| e.values())
                .all(|n| states.contains_key(n)),
            "Transition target is not in the automaton"
        );

        Self {
            alphabet,
            states,
            start,
            accept,
            sink,
        }
    }

    /// The state every run begins in
    #[inline]
    pub fn start(&self) -> &N { &self.start }

    /// Every symbol some transition consumes
    #[inline]
    pub fn alphabet(&self) -> &BTreeSet<S> { &self.alphabet }

    /// Every state with its transitions, in label order
    #[inline]
    pub fn states(&self) -> impl Iterator<Item = (&N, &Node<S, N>)> { self.states.iter() }

    /// Number of states, including the sink
    #[inline]
    pub fn len(&self) -> usize { self.states.len() }

    /// Always false for an automaton built with [`new`](Self::new)
    #[inline]
    pub fn is_empty(&self) -> bool { self.states.is_empty() }

    /// True if a run ending in `state` accepts
    #[inline]
    pub fn is_accepting(&self, state: &N) -> bool { self.accept.contains(state) }

    /// The explicit non-accepting state unmatched inputs are routed to, if
    /// this automaton has one
    #[inline]
    pub fn sink(&self) -> Option<&N> { self.sink.as_ref() }

    /// True if `state` is the recorded sink
    #[inline]
    pub fn is_sink(&self, state: &N) -> bool { self.sink.as_ref() == Some(state) }

    /// The state reached from `state` on `sym`, if there is a transition
    #[inline]
    pub fn step(&self, state: &N, sym: &S) -> Option<&N> { self.states.get(state)?.0.get(sym) }

    /// True if every state has a transition on every symbol of the alphabet
    pub fn is_total(&self) -> bool {
        self.states
            .values()
            .all(|Node(e)| self.alphabet.iter().all(|s| e.contains_key(s)))
    }

    /// Run the automaton over `word` from the start state.  A missing
    /// transition rejects the word outright.
    pub fn accept<I: IntoIterator>(&self, word: I) -> bool
    where I::Item: Borrow<S> {
        word.into_iter()
            .try_fold(&self.start, |state, sym| self.step(state, sym.borrow()))
            .is_some_and(|state| self.is_accepting(state))
    }

    /// Relabel every state with `f`, which must be injective over the states
    /// of this automaton
    pub fn map_states<M: Ord>(self, f: impl Fn(N) -> M) -> Dfa<S, M> {
        let Self {
            alphabet,
            states,
            start,
            accept,
            sink,
        } = self;

        Dfa {
            alphabet,
            states: states
                .into_iter()
                .map(|(n, Node(e))| (f(n), Node(e.into_iter().map(|(s, t)| (s, f(t))).collect())))
                .collect(),
            start: f(start),
            accept: accept.into_iter().map(&f).collect(),
            sink: sink.map(&f),
        }
    }
}

impl<S, N: Ord> Dfa<S, N> {
    /// Lay out this automaton as a Graphviz graph, leaving out the sink
    pub fn dot<'a>(
        &self,
        fmt_sym: impl Fn(&S) -> Cow<'a, str>,
        fmt_state: impl Fn(&N) -> Cow<'a, str>,
    ) -> dot::Graph<'a> {
        let ids: BTreeMap<_, _> = self
            .states
            .keys()
            .zip(0_u32..)
            .collect();

        dot::Graph::state_machine(
            self.states
                .iter()
                .filter(|(n, _)| self.sink.as_ref() != Some(*n))
                .map(|(n, Node(e))| {
                    let edges: Vec<_> = e
                        .iter()
                        .filter(|(_, t)| self.sink.as_ref() != Some(*t))
                        .map(|(s, t)| (s, ids[t]))
                        .collect();

                    (ids[n], fmt_state(n), self.accept.contains(n), edges)
                }),
            ids[&self.start],
            fmt_sym,
        )
    }
}

#[cfg(test)]
mod test {
    use std::collections::{BTreeMap, BTreeSet};

    use super::Dfa;

    /// Even number of 'a's, with no sink
    fn parity() -> Dfa<char, bool> {
        Dfa::new(
            BTreeSet::from(['a', 'b']),
            [
                (false, BTreeMap::from([('a', true), ('b', false)])),
                (true, BTreeMap::from([('a', false)])),
            ],
            false,
            BTreeSet::from([false]),
            None,
        )
    }

    #[test]
    fn accept_folds_transitions() {
        let dfa = parity();

        assert!(dfa.accept("".chars()));
        assert!(dfa.accept("aa".chars()));
        assert!(dfa.accept("baab".chars()));
        assert!(!dfa.accept("ab".chars()));
        // no transition on 'b' after an odd number of 'a's
        assert!(!dfa.accept("abab".chars()));
        // nor on symbols outside the alphabet
        assert!(!dfa.accept("c".chars()));
        assert!(!dfa.is_total());
    }

    #[test]
    fn map_and_atomize() {
        let dfa = parity().map_states(|b| if b { "odd" } else { "even" });
        assert_eq!(*dfa.start(), "even");
        assert!(!dfa.accept("aba".chars()));
        assert!(dfa.accept("aab".chars()));

        let (atoms, labels) = dfa.atomize();
        assert_eq!(*atoms.start(), 0);
        assert_eq!(labels[*atoms.start()], "even");
        assert_eq!(atoms.len(), 2);
        assert!(atoms.accept("baab".chars()));
        assert!(!atoms.accept("a".chars()));
    }

    #[test]
    #[should_panic = "Transition target is not in the automaton"]
    fn rejects_dangling_edges() {
        let _ = Dfa::new(
            BTreeSet::from(['a']),
            [(0, BTreeMap::from([('a', 1)]))],
            0,
            BTreeSet::new(),
            None,
        );
    }
}
