//! Maximal-munch tokenization over a list of compiled token automata

use std::fmt;

use crate::{
    dfa::{Dfa, Scanner},
    re::{self, ParseError},
};

/// How the lexer searches for the longest match at each position
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum ScanStrategy {
    /// Re-run every automaton from its start state on every prefix
    Reference,
    /// Advance every automaton once over the remaining input, stopping each
    /// as soon as it is trapped
    #[default]
    Incremental,
}

/// How error positions are reported
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum ColumnMode {
    /// The 1-based column of the offending character within its line
    #[default]
    Exact,
    /// The running-index arithmetic of the classic tokenizer these error
    /// messages come from, quirks included
    Compat,
}

/// Runtime options for a [`Lexer`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct LexerConfig {
    /// Longest-match search strategy
    pub strategy: ScanStrategy,
    /// Error position reporting
    pub columns: ColumnMode,
}

/// A token pattern that failed to parse
#[derive(Debug, thiserror::Error)]
#[error("Invalid pattern {pattern:?} for token {name:?}")]
pub struct CompileError {
    /// Name of the offending token
    pub name: String,
    /// The pattern as given
    pub pattern: String,
    /// What was wrong with it
    #[source]
    pub source: ParseError,
}

/// Position reported by a lexing error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    /// A character position
    Char(usize),
    /// The input ended while a token could still have matched
    Eof,
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Char(n) => write!(f, "{n}"),
            Self::Eof => f.write_str("EOF"),
        }
    }
}

/// Error produced when the input cannot be split into tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum LexError {
    /// No token matches a non-empty prefix of the remaining input
    #[error("No viable alternative at character {at}, line {line}")]
    NoViableAlternative {
        /// Where the failure was detected
        at: Column,
        /// Number of line breaks consumed before the failure
        line: usize,
    },
}

/// A lexeme tagged with the name of the token that matched it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token<'a> {
    /// Name of the matching token
    pub name: &'a str,
    /// The matched slice of the input
    pub text: &'a str,
}

#[derive(Debug)]
struct Rule {
    name: String,
    pattern: String,
    dfa: Dfa<char, usize>,
}

/// A compiled token specification.
///
/// Rules keep their declaration order, which decides between matches of
/// equal length.
#[derive(Debug)]
pub struct Lexer {
    rules: Vec<Rule>,
    config: LexerConfig,
}

impl Lexer {
    /// Compile an ordered list of `(name, pattern)` pairs
    ///
    /// # Errors
    /// Returns an error naming the first rule whose pattern fails to parse.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn compile<I, N, P>(spec: I) -> Result<Self, CompileError>
    where
        I: IntoIterator<Item = (N, P)>,
        N: Into<String>,
        P: Into<String>,
    {
        let rules = spec
            .into_iter()
            .map(|(name, pattern)| {
                let name = name.into();
                let pattern = pattern.into();
                let regex = match re::parse(&pattern) {
                    Ok(r) => r,
                    Err(source) => {
                        return Err(CompileError {
                            name,
                            pattern,
                            source,
                        });
                    },
                };

                let nfa = regex.thompson();
                let (dfa, _) = nfa.compile().atomize();
                tracing::debug!(
                    token = name.as_str(),
                    pattern = pattern.as_str(),
                    nfa_states = nfa.len(),
                    dfa_states = dfa.len(),
                    "Compiled token"
                );

                Ok(Rule { name, pattern, dfa })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            rules,
            config: LexerConfig::default(),
        })
    }

    /// Replace the runtime options
    #[must_use]
    pub fn with_config(self, config: LexerConfig) -> Self { Self { config, ..self } }

    /// The current runtime options
    #[inline]
    #[must_use]
    pub fn config(&self) -> LexerConfig { self.config }

    /// The `(name, pattern)` pairs this lexer was compiled from
    pub fn tokens(&self) -> impl Iterator<Item = (&str, &str)> {
        self.rules
            .iter()
            .map(|r| (r.name.as_str(), r.pattern.as_str()))
    }

    /// The automaton of the first token declared as `name`
    #[must_use]
    pub fn dfa(&self, name: &str) -> Option<&Dfa<char, usize>> {
        self.rules.iter().find(|r| r.name == name).map(|r| &r.dfa)
    }

    /// Split `input` into tokens, always taking the longest non-empty match
    /// and preferring the earliest declared token among equally long ones.
    ///
    /// # Errors
    /// Fails at the first position no token can consume.
    pub fn lex<'a>(&'a self, input: &'a str) -> Result<Vec<Token<'a>>, LexError> {
        let chars: Vec<char> = input.chars().collect();
        let mut cursor = Cursor::new(chars.len());
        let mut toks = vec![];
        let mut pos = 0;
        let mut byte = 0;

        while pos < chars.len() {
            let rest = &chars[pos..];

            let Some((rule, len)) = self.longest_match(rest) else {
                let err = self.error_at(&cursor, rest);
                tracing::debug!(%err, pos, "No token matched");
                return Err(err);
            };

            let bytes: usize = rest[..len].iter().map(|c| c.len_utf8()).sum();
            let text = &input[byte..byte + bytes];
            tracing::trace!(token = rule.name.as_str(), text, "Matched token");

            cursor.advance(text, len);
            toks.push(Token {
                name: &rule.name,
                text,
            });
            pos += len;
            byte += bytes;
        }

        Ok(toks)
    }

    /// Like [`lex`](Self::lex), but as owned `(name, text)` pairs with a
    /// failure reported as a single pair with an empty name
    #[must_use]
    pub fn lex_pairs(&self, input: &str) -> Vec<(String, String)> {
        match self.lex(input) {
            Ok(toks) => toks
                .into_iter()
                .map(|Token { name, text }| (name.to_owned(), text.to_owned()))
                .collect(),
            Err(e) => vec![(String::new(), e.to_string())],
        }
    }

    fn longest_match(&self, rest: &[char]) -> Option<(&Rule, usize)> {
        let mut best: Option<(&Rule, usize)> = None;

        match self.config.strategy {
            ScanStrategy::Reference => {
                for len in 1..=rest.len() {
                    for rule in &self.rules {
                        if rule.dfa.accept(&rest[..len]) && best.is_none_or(|(_, l)| len > l) {
                            best = Some((rule, len));
                        }
                    }
                }
            },
            ScanStrategy::Incremental => {
                for rule in &self.rules {
                    if let Some(len) = Scanner::new(&rule.dfa).munch(rest).accepted
                        && len > 0
                        && best.is_none_or(|(_, l)| len > l)
                    {
                        best = Some((rule, len));
                    }
                }
            },
        }

        best
    }

    /// True if some token could still match were the input longer
    fn runs_off_end(&self, rest: &[char]) -> bool {
        self.rules.iter().any(|Rule { dfa, .. }| match self.config.strategy {
            ScanStrategy::Reference => rest
                .iter()
                .try_fold(dfa.start(), |s, c| dfa.step(s, c).filter(|t| !dfa.is_sink(t)))
                .is_some(),
            ScanStrategy::Incremental => Scanner::new(dfa).munch(rest).exhausted,
        })
    }

    fn error_at(&self, cursor: &Cursor, rest: &[char]) -> LexError {
        let at = match self.config.columns {
            ColumnMode::Exact => {
                if self.runs_off_end(rest) {
                    Column::Eof
                } else {
                    Column::Char(cursor.column)
                }
            },
            ColumnMode::Compat => {
                let mut index = cursor.index;
                if rest
                    .first()
                    .is_some_and(|&c| !self.rules.iter().any(|r| r.pattern.contains(c)))
                {
                    index = index.saturating_sub(1);
                }

                if index >= cursor.size {
                    Column::Eof
                } else {
                    Column::Char(index)
                }
            },
        };

        LexError::NoViableAlternative {
            at,
            line: cursor.line,
        }
    }
}

/// Position bookkeeping for both column models
#[derive(Debug)]
struct Cursor {
    line: usize,
    column: usize,
    index: usize,
    size: usize,
}

impl Cursor {
    fn new(size: usize) -> Self {
        Self {
            line: 0,
            column: 1,
            index: 1,
            size,
        }
    }

    fn advance(&mut self, text: &str, len: usize) {
        let newlines = text.matches('\n').count();

        self.index += len;
        if newlines > 0 {
            self.line += newlines;
            self.size = self.size.saturating_sub(self.index);
            self.index = 1;
        }

        self.column = match text.rfind('\n') {
            Some(i) => text[i + 1..].chars().count() + 1,
            None => self.column + len,
        };
    }
}
