use super::Regex;
use crate::{free::Free, nfa::Nfa};

/// A partially built automaton: its entry state and the states that will
/// accept once it is complete.
#[derive(Debug)]
struct Fragment {
    start: u32,
    accept: Vec<u32>,
    /// Whether any edge leads back into `start`
    reentrant: bool,
}

#[derive(Debug)]
enum Visit<'a, S> {
    Enter(&'a Regex<S>),
    Exit(&'a Regex<S>),
    /// Exit of a node whose entry state was allocated before its operands
    ExitFrom(&'a Regex<S>, u32),
}

/// Thompson construction.
///
/// The expression is walked with an explicit stack, building one fragment per
/// node inside a single automaton.  Labels come from one running allocator,
/// so fragments never share a state and are never relabelled.
#[derive(Debug)]
pub struct NfaBuilder<S> {
    nfa: Nfa<S>,
    free: Free<u32>,
}

impl<S: Clone + Ord> NfaBuilder<S> {
    fn state(&mut self) -> u32 {
        let n = self.free.fresh();
        self.nfa.insert(n);
        n
    }

    fn pop(frags: &mut Vec<Fragment>) -> Fragment {
        frags
            .pop()
            .unwrap_or_else(|| unreachable!("Operand fragment missing"))
    }

    pub fn build(regex: &Regex<S>) -> Nfa<S> {
        let mut me = Self {
            nfa: Nfa::new(0),
            free: Free::default(),
        };
        let mut stack = vec![Visit::Enter(regex)];
        let mut frags = vec![];

        while let Some(visit) = stack.pop() {
            match visit {
                Visit::Enter(re) => match re {
                    Regex::Lit(s) => {
                        let start = me.state();
                        let end = me.state();
                        me.nfa.connect(&start, end, Some(s.clone()));
                        frags.push(Fragment {
                            start,
                            accept: vec![end],
                            reentrant: false,
                        });
                    },
                    Regex::Cat(l, r) => {
                        stack.extend([Visit::Exit(re), Visit::Enter(&**r), Visit::Enter(&**l)]);
                    },
                    Regex::Alt(l, r) => {
                        let start = me.state();
                        stack.extend([
                            Visit::ExitFrom(re, start),
                            Visit::Enter(&**r),
                            Visit::Enter(&**l),
                        ]);
                    },
                    Regex::Star(r) => {
                        let start = me.state();
                        stack.extend([Visit::ExitFrom(re, start), Visit::Enter(&**r)]);
                    },
                    Regex::Plus(r) | Regex::Opt(r) => {
                        stack.extend([Visit::Exit(re), Visit::Enter(&**r)]);
                    },
                },
                Visit::Exit(re) => {
                    let frag = me.exit(re, &mut frags);
                    frags.push(frag);
                },
                Visit::ExitFrom(re, start) => {
                    let frag = me.exit_from(re, start, &mut frags);
                    frags.push(frag);
                },
            }
        }

        let root = Self::pop(&mut frags);
        debug_assert!(frags.is_empty());

        for f in &root.accept {
            me.nfa.set_accept(f, true);
        }
        me.nfa.set_start(root.start);
        me.nfa
    }

    fn exit(&mut self, regex: &Regex<S>, frags: &mut Vec<Fragment>) -> Fragment {
        let inner = Self::pop(frags);

        match regex {
            Regex::Cat(..) => {
                let lhs = Self::pop(frags);
                for f in &lhs.accept {
                    self.nfa.connect(f, inner.start, None);
                }

                Fragment {
                    start: lhs.start,
                    accept: inner.accept,
                    reentrant: lhs.reentrant,
                }
            },
            Regex::Plus(_) => {
                let loop_head = self.state();
                for f in &inner.accept {
                    self.nfa.connect(f, inner.start, None);
                }
                self.nfa.connect(&loop_head, inner.start, None);

                let mut accept = inner.accept;
                accept.push(loop_head);
                Fragment {
                    start: inner.start,
                    accept,
                    reentrant: true,
                }
            },
            // Accepting a start state that can be re-entered would also
            // accept whatever leads back into it
            Regex::Opt(_) if inner.reentrant => {
                let entry = self.state();
                self.nfa.connect(&entry, inner.start, None);

                let mut accept = inner.accept;
                accept.push(entry);
                Fragment {
                    start: entry,
                    accept,
                    reentrant: false,
                }
            },
            Regex::Opt(_) => {
                let mut accept = inner.accept;
                if !accept.contains(&inner.start) {
                    accept.push(inner.start);
                }

                Fragment {
                    start: inner.start,
                    accept,
                    reentrant: false,
                }
            },
            Regex::Lit(_) | Regex::Alt(..) | Regex::Star(_) => {
                unreachable!("Node has no plain exit step")
            },
        }
    }

    fn exit_from(
        &mut self,
        regex: &Regex<S>,
        start: u32,
        frags: &mut Vec<Fragment>,
    ) -> Fragment {
        match regex {
            Regex::Alt(..) => {
                let rhs = Self::pop(frags);
                let lhs = Self::pop(frags);
                self.nfa.connect(&start, lhs.start, None);
                self.nfa.connect(&start, rhs.start, None);

                let mut accept = lhs.accept;
                accept.extend(rhs.accept);
                Fragment {
                    start,
                    accept,
                    reentrant: false,
                }
            },
            Regex::Star(_) => {
                let inner = Self::pop(frags);
                self.nfa.connect(&start, inner.start, None);
                for f in &inner.accept {
                    self.nfa.connect(f, start, None);
                }

                Fragment {
                    start,
                    accept: vec![start],
                    reentrant: true,
                }
            },
            Regex::Lit(_) | Regex::Cat(..) | Regex::Plus(_) | Regex::Opt(_) => {
                unreachable!("Node has no preallocated entry state")
            },
        }
    }
}

impl<S: Clone + Ord> Regex<S> {
    /// Build a nondeterministic automaton accepting the language of this
    /// expression
    #[inline]
    #[must_use]
    pub fn thompson(&self) -> Nfa<S> { NfaBuilder::build(self) }
}

#[cfg(test)]
mod test {
    use std::collections::BTreeSet;

    use proptest::prelude::*;

    use crate::re::{self, Regex};

    fn lit(c: char) -> Regex<char> { Regex::Lit(c) }

    #[test]
    fn literal_shape() {
        let nfa = lit('a').thompson();

        assert_eq!(*nfa.start(), 0);
        assert_eq!(nfa.states().copied().collect::<Vec<_>>(), [0, 1]);
        assert_eq!(nfa.accepting().copied().collect::<Vec<_>>(), [1]);
        assert_eq!(
            nfa.get(&0).unwrap().targets(Some(&'a')),
            Some(&BTreeSet::from([1]))
        );
    }

    #[test]
    fn cat_shape() {
        let nfa = Regex::cat(lit('a'), lit('b')).thompson();

        assert_eq!(nfa.states().copied().collect::<Vec<_>>(), [0, 1, 2, 3]);
        assert_eq!(*nfa.start(), 0);
        assert_eq!(nfa.accepting().copied().collect::<Vec<_>>(), [3]);
        assert_eq!(nfa.get(&1).unwrap().nil_edges(), &BTreeSet::from([2]));
        assert_eq!(nfa.alphabet(), &BTreeSet::from(['a', 'b']));
    }

    #[test]
    fn alt_shape() {
        let nfa = Regex::alt(lit('a'), lit('b')).thompson();

        assert_eq!(nfa.states().copied().collect::<Vec<_>>(), [0, 1, 2, 3, 4]);
        assert_eq!(nfa.get(&0).unwrap().nil_edges(), &BTreeSet::from([1, 3]));
        assert_eq!(nfa.accepting().copied().collect::<Vec<_>>(), [2, 4]);
    }

    #[test]
    fn star_accepts_empty() {
        let nfa = Regex::Star(lit('a').into()).thompson();

        assert_eq!(*nfa.start(), 0);
        assert!(nfa.get(&0).unwrap().is_accepting());
        assert!(nfa.get(&2).unwrap().nil_edges().contains(&0));
    }

    #[test]
    fn plus_adds_loop_state() {
        let nfa = Regex::Plus(lit('a').into()).thompson();

        assert_eq!(nfa.len(), 3);
        assert_eq!(*nfa.start(), 0);
        assert_eq!(nfa.accepting().copied().collect::<Vec<_>>(), [1, 2]);
        assert!(nfa.get(&1).unwrap().nil_edges().contains(&0));
    }

    #[test]
    fn opt_marks_start_accepting() {
        let nfa = Regex::Opt(lit('a').into()).thompson();
        assert_eq!(nfa.len(), 2);
        assert!(nfa.get(nfa.start()).unwrap().is_accepting());
    }

    #[test]
    fn reentrant_starts_stay_rejecting() {
        for pat in ["(a+b)?", "(a+b)*"] {
            let dfa = re::parse(pat).unwrap().thompson().compile();
            assert!(!dfa.accept("a".chars()), "{pat} accepted \"a\"");
            assert!(!dfa.accept("aab".chars().chain("a".chars())), "{pat} accepted \"aaba\"");
            assert!(dfa.accept("".chars()));
            assert!(dfa.accept("aab".chars()));
        }
    }

    #[test]
    fn long_patterns() {
        let pat = "ab".repeat(5_000);
        let nfa = re::parse(&pat).unwrap().thompson();

        assert_eq!(nfa.len(), 20_000);
        assert_eq!(*nfa.start(), 0);
        assert_eq!(nfa.accepting().copied().collect::<Vec<_>>(), [19_999]);

        let dfa = nfa.compile();
        assert!(dfa.accept(pat.chars()));
        assert!(!dfa.accept(pat[1..].chars()));
        assert!(!dfa.accept(pat[..pat.len() - 1].chars()));
    }

    #[test]
    fn long_alternations() {
        let words: Vec<String> = (0..2_000).map(|i| format!("k{i}")).collect();
        let pat = words.join("|");
        assert!(pat.len() > 10_000);

        let dfa = re::parse(&pat).unwrap().thompson().compile();
        assert!(dfa.accept("k0".chars()));
        assert!(dfa.accept("k1999".chars()));
        assert!(!dfa.accept("k2000".chars()));
    }

    proptest! {
        #[test]
        fn labels_are_dense(r in re::re(6, 32, 2, crate::prop::symbol())) {
            let nfa = r.thompson();
            let states: Vec<u32> = nfa.states().copied().collect();
            let max = *states.last().unwrap();

            prop_assert_eq!(states.len(), usize::try_from(max).unwrap() + 1);
            prop_assert!(nfa.states().any(|s| s == nfa.start()));
        }
    }
}
