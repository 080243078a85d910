//! Regular expression trees and their pattern syntax

use std::fmt;

pub use syntax::{ParseError, parse};

mod nfa_builder;
pub mod syntax;

/// A regular expression over symbols of type `S`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Regex<S> {
    /// A single symbol
    Lit(S),
    /// Concatenation
    Cat(Box<Regex<S>>, Box<Regex<S>>),
    /// Alternation
    Alt(Box<Regex<S>>, Box<Regex<S>>),
    /// Zero or more repetitions
    Star(Box<Regex<S>>),
    /// One or more repetitions
    Plus(Box<Regex<S>>),
    /// Zero or one occurrence
    Opt(Box<Regex<S>>),
}

impl<S> Regex<S> {
    /// `lhs` followed by `rhs`
    #[inline]
    #[must_use]
    pub fn cat(lhs: Self, rhs: Self) -> Self { Self::Cat(lhs.into(), rhs.into()) }

    /// Either `lhs` or `rhs`
    #[inline]
    #[must_use]
    pub fn alt(lhs: Self, rhs: Self) -> Self { Self::Alt(lhs.into(), rhs.into()) }

    /// Left-nested alternation of the given symbols, or `None` if there are
    /// none
    pub fn one_of<I: IntoIterator<Item = S>>(syms: I) -> Option<Self> {
        syms.into_iter()
            .map(Self::Lit)
            .reduce(|lhs, rhs| Self::alt(lhs, rhs))
    }
}

/// Prints the expression back in pattern syntax, fully parenthesized so that
/// parsing the output reproduces the same tree
impl fmt::Display for Regex<char> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lit(c) if c.is_alphanumeric() => write!(f, "{c}"),
            Self::Lit(c) => write!(f, "\\{c}"),
            Self::Cat(l, r) => write!(f, "({l})({r})"),
            Self::Alt(l, r) => write!(f, "({l})|({r})"),
            Self::Star(r) => write!(f, "({r})*"),
            Self::Plus(r) => write!(f, "({r})+"),
            Self::Opt(r) => write!(f, "({r})?"),
        }
    }
}

#[cfg(test)]
impl<S: PartialEq> Regex<S> {
    /// Naive matcher used as an oracle for the automaton pipeline
    pub(crate) fn matches(&self, word: &[S]) -> bool { self.ends(word, 0).contains(&word.len()) }

    fn ends(&self, word: &[S], start: usize) -> std::collections::BTreeSet<usize> {
        use std::collections::BTreeSet;

        let repeat = |r: &Self, mut seen: BTreeSet<usize>| {
            let mut frontier: Vec<_> = seen.iter().copied().collect();
            while let Some(i) = frontier.pop() {
                for j in r.ends(word, i) {
                    if seen.insert(j) {
                        frontier.push(j);
                    }
                }
            }
            seen
        };

        match self {
            Self::Lit(s) => word
                .get(start)
                .filter(|&c| c == s)
                .map(|_| start + 1)
                .into_iter()
                .collect(),
            Self::Cat(l, r) => l
                .ends(word, start)
                .into_iter()
                .flat_map(|i| r.ends(word, i))
                .collect(),
            Self::Alt(l, r) => {
                let mut set = l.ends(word, start);
                set.extend(r.ends(word, start));
                set
            },
            Self::Star(r) => repeat(r, BTreeSet::from([start])),
            Self::Plus(r) => repeat(r, r.ends(word, start)),
            Self::Opt(r) => {
                let mut set = r.ends(word, start);
                set.insert(start);
                set
            },
        }
    }
}

#[cfg(any(test, feature = "proptest"))]
pub use prop::*;

#[cfg(any(test, feature = "proptest"))]
mod prop {
    use proptest::prelude::*;

    use super::Regex;

    /// Random regex trees with literals drawn from `chr`
    pub fn re(
        depth: u32,
        tree_size: u32,
        branch_size: u32,
        chr: impl Strategy<Value = char> + 'static,
    ) -> impl Strategy<Value = Regex<char>> {
        chr.prop_map(Regex::Lit)
            .prop_recursive(depth, tree_size, branch_size, |s| {
                prop_oneof![
                    (s.clone(), s.clone()).prop_map(|(l, r)| Regex::cat(l, r)),
                    (s.clone(), s.clone()).prop_map(|(l, r)| Regex::alt(l, r)),
                    s.clone().prop_map(|r| Regex::Star(r.into())),
                    s.clone().prop_map(|r| Regex::Plus(r.into())),
                    s.prop_map(|r| Regex::Opt(r.into())),
                ]
            })
    }
}
