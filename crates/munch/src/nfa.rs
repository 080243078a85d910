//! Nondeterministic automata with epsilon moves and subset construction

use std::{
    borrow::Cow,
    collections::{BTreeMap, BTreeSet},
    hash::Hash,
};

use self::dfa_builder::DfaBuilder;
use crate::{closure_builder::ClosureBuilder, dfa::Dfa, dot, free::Free};

mod dfa_builder;

pub use dfa_builder::DfaState;

/// A single NFA state: its epsilon edges, its labelled edges and whether it
/// accepts
#[derive(Debug, Clone)]
pub struct Node<S, N> {
    nil: BTreeSet<N>,
    map: BTreeMap<S, BTreeSet<N>>,
    accept: bool,
}

impl<S, N> Default for Node<S, N> {
    fn default() -> Self {
        Self {
            nil: BTreeSet::new(),
            map: BTreeMap::new(),
            accept: false,
        }
    }
}

impl<S: Ord, N> Node<S, N> {
    /// Targets of epsilon edges
    #[inline]
    pub fn nil_edges(&self) -> &BTreeSet<N> { &self.nil }

    /// Targets reachable by consuming `by`, or by an epsilon move if `by` is
    /// `None`
    #[inline]
    pub fn targets(&self, by: Option<&S>) -> Option<&BTreeSet<N>> {
        match by {
            None => Some(&self.nil),
            Some(s) => self.map.get(s),
        }
    }

    /// All outgoing edges, epsilon edges first
    pub fn edges(&self) -> impl Iterator<Item = (Option<&S>, &BTreeSet<N>)> {
        [(None, &self.nil)]
            .into_iter()
            .filter(|(_, n)| !n.is_empty())
            .chain(self.map.iter().map(|(s, n)| (Some(s), n)))
    }

    /// Whether this state accepts
    #[inline]
    pub fn is_accepting(&self) -> bool { self.accept }
}

/// A nondeterministic finite automaton with epsilon moves.
///
/// States are labelled with `N` and every state referenced by an edge is a
/// member of the automaton.
#[derive(Debug, Clone)]
pub struct Nfa<S, N = u32> {
    alphabet: BTreeSet<S>,
    nodes: BTreeMap<N, Node<S, N>>,
    start: N,
}

impl<S: Ord, N: Clone + Ord> Nfa<S, N> {
    /// An automaton holding only a non-accepting start state
    pub fn new(start: N) -> Self {
        let mut me = Self {
            alphabet: BTreeSet::new(),
            nodes: BTreeMap::new(),
            start: start.clone(),
        };
        assert!(me.insert(start));
        me
    }
}

impl<S: Ord, N: Ord> Nfa<S, N> {
    /// The state every run begins in
    #[inline]
    pub fn start(&self) -> &N { &self.start }

    /// Every symbol some edge consumes
    #[inline]
    pub fn alphabet(&self) -> &BTreeSet<S> { &self.alphabet }

    /// State labels in order
    #[inline]
    pub fn states(&self) -> impl Iterator<Item = &N> { self.nodes.keys() }

    /// Number of states
    #[inline]
    pub fn len(&self) -> usize { self.nodes.len() }

    /// Always false, since the start state is a member
    #[inline]
    pub fn is_empty(&self) -> bool { self.nodes.is_empty() }

    /// Accepting states in label order
    pub fn accepting(&self) -> impl Iterator<Item = &N> {
        self.nodes
            .iter()
            .filter_map(|(n, node)| node.accept.then_some(n))
    }

    /// Look up a state and its edges
    #[inline]
    pub fn get(&self, node: &N) -> Option<&Node<S, N>> { self.nodes.get(node) }

    /// Make `node` the start state
    pub(crate) fn set_start(&mut self, node: N) {
        assert!(
            self.nodes.contains_key(&node),
            "Start state is not in the automaton"
        );
        self.start = node;
    }

    /// Add a state with no edges, returning false if it already existed
    #[inline]
    pub fn insert(&mut self, node: N) -> bool {
        use std::collections::btree_map::Entry;

        match self.nodes.entry(node) {
            Entry::Vacant(v) => {
                v.insert(Node::default());
                true
            },
            Entry::Occupied(_) => false,
        }
    }

    /// Mark `node` as accepting or not
    ///
    /// # Panics
    /// Panics if `node` is not a state of this automaton.
    pub fn set_accept(&mut self, node: &N, accept: bool) {
        self.nodes
            .get_mut(node)
            .unwrap_or_else(|| panic!("Cannot mark a state outside the automaton"))
            .accept = accept;
    }

    /// Add an edge from `from` to `to` consuming `by`, or an epsilon edge if
    /// `by` is `None`.  Returns false if the edge already existed.
    pub fn connect(&mut self, from: &N, to: N, by: Option<S>) -> bool
    where S: Clone {
        assert!(
            self.nodes.contains_key(&to),
            "Edge target is not in the automaton"
        );
        let node = self
            .nodes
            .get_mut(from)
            .unwrap_or_else(|| panic!("Edge source is not in the automaton"));

        match by {
            Some(sym) => {
                self.alphabet.insert(sym.clone());
                node.map.entry(sym).or_default().insert(to)
            },
            None => node.nil.insert(to),
        }
    }

    /// True if any edge, epsilon or not, leads to `node`
    pub fn has_incoming(&self, node: &N) -> bool {
        self.nodes
            .values()
            .flat_map(Node::edges)
            .any(|(_, to)| to.contains(node))
    }

    /// Relabel every state with `f`.  `f` must be injective over the states of
    /// this automaton.
    pub fn map_states<M: Ord>(self, f: impl Fn(N) -> M) -> Nfa<S, M> {
        let Self {
            alphabet,
            nodes,
            start,
        } = self;

        let relabel = |set: BTreeSet<N>| set.into_iter().map(&f).collect::<BTreeSet<_>>();

        let nodes: BTreeMap<_, _> = nodes
            .into_iter()
            .map(|(n, Node { nil, map, accept })| {
                let node = Node {
                    nil: relabel(nil),
                    map: map.into_iter().map(|(s, t)| (s, relabel(t))).collect(),
                    accept,
                };
                (f(n), node)
            })
            .collect();
        let start = f(start);

        debug_assert!(nodes.contains_key(&start));

        Nfa {
            alphabet,
            nodes,
            start,
        }
    }
}

impl<S: Clone + Ord, N: Clone + Ord> Nfa<S, N> {
    /// All states reachable from `state` by epsilon moves alone, including
    /// `state` itself
    pub fn epsilon_closure(&self, state: &N) -> BTreeSet<N> {
        let mut closure = ClosureBuilder::default();
        closure.init([state.clone()]);
        closure.solve(BTreeSet::new(), |n| {
            self.nodes
                .get(n)
                .into_iter()
                .flat_map(|n| n.nil.iter().cloned())
                .collect::<Vec<_>>()
        })
    }
}

impl<S: Clone + Ord, N: Clone + Ord + Hash> Nfa<S, N> {
    /// Run subset construction, producing a total DFA over this automaton's
    /// alphabet
    #[inline]
    #[must_use]
    pub fn compile(&self) -> Dfa<S, DfaState<N>> { DfaBuilder::new(self).build() }
}

impl<S, N: Ord> Nfa<S, N> {
    /// Lay out this automaton as a Graphviz graph, with epsilon edges
    /// labelled `ϵ`
    pub fn dot<'a>(
        &self,
        fmt_sym: impl Fn(&S) -> Cow<'a, str>,
        fmt_state: impl Fn(&N) -> Cow<'a, str>,
    ) -> dot::Graph<'a> {
        let mut free_id = Free::from(0_u32);
        let ids: BTreeMap<_, _> = self.nodes.keys().map(|n| (n, free_id.fresh())).collect();
        let ids = &ids;

        dot::Graph::state_machine(
            self.nodes.iter().map(|(n, node)| {
                let edges: Vec<_> = [(None, &node.nil)]
                    .into_iter()
                    .chain(node.map.iter().map(|(s, t)| (Some(s), t)))
                    .flat_map(|(s, t)| t.iter().map(move |t| (s, ids[t])))
                    .collect();

                (ids[n], fmt_state(n), node.accept, edges)
            }),
            ids[&self.start],
            |s: Option<&S>| s.map_or_else(|| "ϵ".into(), &fmt_sym),
        )
    }
}
