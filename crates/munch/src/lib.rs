//! Maximal-munch lexer generator: regex parsing, Thompson construction,
//! subset construction and a longest-match token driver

#![deny(
    clippy::disallowed_methods,
    clippy::suspicious,
    clippy::style,
    clippy::clone_on_ref_ptr,
    missing_debug_implementations,
    missing_copy_implementations
)]
#![warn(clippy::pedantic, missing_docs)]
#![allow(clippy::module_name_repetitions)]

mod closure_builder;
pub mod dfa;
pub mod dot;
mod free;
pub mod lexer;
mod memoize;
pub mod nfa;
pub mod re;

pub use lexer::{Column, ColumnMode, CompileError, LexError, Lexer, LexerConfig, ScanStrategy, Token};

#[cfg(any(test, feature = "proptest"))]
pub mod prop {
    //! Strategies for generating inputs in property tests

    use proptest::prelude::*;

    /// Symbols drawn from a small alphabet so generated words hit real
    /// transitions
    pub fn symbol() -> impl Strategy<Value = char> + Clone { prop::char::range('a', 'd') }

    /// Characters that parse as bare literals in pattern syntax
    pub fn symbol_safe() -> impl Strategy<Value = char> + Clone {
        prop::sample::select(vec!['a', 'b', 'c', 'x', '0', '7', '_', '-', '.', '@'])
    }

    /// Short words over [`symbol`]
    pub fn word(len: impl Into<prop::sample::SizeRange>) -> impl Strategy<Value = String> {
        prop::collection::vec(symbol(), len).prop_map(|v| v.into_iter().collect())
    }
}
