use std::borrow::Borrow;

use super::Dfa;

/// Outcome of running a [`Scanner`] over some input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Munch {
    /// Length of the longest accepted prefix, if any prefix was accepted
    pub accepted: Option<usize>,
    /// Whether the input ran out before the automaton became stuck
    pub exhausted: bool,
}

/// Incremental maximal-munch runner for a single automaton.
///
/// The scanner advances one symbol at a time, remembering the most recent
/// accepting position, and stops as soon as it reaches the sink or a state
/// with no transition on the next symbol.
#[derive(Debug)]
pub struct Scanner<'a, S, N> {
    dfa: &'a Dfa<S, N>,
    state: Option<&'a N>,
    pos: usize,
    last_accept: Option<usize>,
}

impl<'a, S: Ord, N: Ord> Scanner<'a, S, N> {
    /// Start a run at the automaton's start state
    #[must_use]
    pub fn new(dfa: &'a Dfa<S, N>) -> Self {
        let mut me = Self {
            dfa,
            state: None,
            pos: 0,
            last_accept: None,
        };
        me.set_state(Some(dfa.start()));
        me
    }

    fn set_state(&mut self, to: Option<&'a N>) {
        self.state = to.filter(|s| !self.dfa.is_sink(s));
        if self.state.is_some_and(|s| self.dfa.is_accepting(s)) {
            self.last_accept = Some(self.pos);
        }
    }

    /// True once no further input can lead to acceptance
    #[inline]
    pub fn is_trapped(&self) -> bool { self.state.is_none() }

    /// Number of symbols consumed when the run last passed through an
    /// accepting state
    #[inline]
    pub fn last_accept(&self) -> Option<usize> { self.last_accept }

    /// Consume one symbol, returning false if the scanner is trapped
    /// afterwards
    pub fn feed(&mut self, sym: &S) -> bool {
        let Some(state) = self.state else {
            return false;
        };

        self.pos += 1;
        self.set_state(self.dfa.step(state, sym));
        !self.is_trapped()
    }

    /// Feed `input` until it runs out or the scanner is trapped
    pub fn munch<I: IntoIterator>(mut self, input: I) -> Munch
    where I::Item: Borrow<S> {
        let mut input = input.into_iter();

        let exhausted = loop {
            if self.is_trapped() {
                break false;
            }

            let Some(sym) = input.next() else {
                break true;
            };

            self.feed(sym.borrow());
        };

        Munch {
            accepted: self.last_accept,
            exhausted,
        }
    }
}

#[cfg(test)]
mod test {
    use proptest::prelude::*;

    use super::{Munch, Scanner};
    use crate::re;

    #[test]
    fn remembers_last_accept() {
        let dfa = re::parse("ab(cd)*").unwrap().thompson().compile();

        assert_eq!(Scanner::new(&dfa).munch("abcdcx".chars()), Munch {
            accepted: Some(4),
            exhausted: false,
        });
        assert_eq!(Scanner::new(&dfa).munch("abcdc".chars()), Munch {
            accepted: Some(4),
            exhausted: true,
        });
        assert_eq!(Scanner::new(&dfa).munch("x".chars()), Munch {
            accepted: None,
            exhausted: false,
        });
        assert_eq!(Scanner::new(&dfa).munch("".chars()), Munch {
            accepted: None,
            exhausted: true,
        });
    }

    #[test]
    fn feeds_one_symbol_at_a_time() {
        let dfa = re::parse("ab?").unwrap().thompson().compile();
        let mut scanner = Scanner::new(&dfa);

        assert_eq!(scanner.last_accept(), None);
        assert!(scanner.feed(&'a'));
        assert_eq!(scanner.last_accept(), Some(1));
        assert!(scanner.feed(&'b'));
        assert_eq!(scanner.last_accept(), Some(2));
        assert!(!scanner.feed(&'b'));
        assert!(scanner.is_trapped());
        assert_eq!(scanner.last_accept(), Some(2));
    }

    #[test]
    fn empty_prefix() {
        let dfa = re::parse("a*").unwrap().thompson().compile();

        assert_eq!(Scanner::new(&dfa).munch("b".chars()), Munch {
            accepted: Some(0),
            exhausted: false,
        });
    }

    proptest! {
        #[test]
        fn agrees_with_prefix_search(
            r in re::re(6, 32, 2, crate::prop::symbol()),
            word in crate::prop::word(0..12),
        ) {
            let dfa = r.thompson().compile();
            let chars: Vec<char> = word.chars().collect();

            let expected = (0..=chars.len()).rev().find(|&i| dfa.accept(&chars[..i]));
            prop_assert_eq!(Scanner::new(&dfa).munch(&chars).accepted, expected);
        }
    }
}
