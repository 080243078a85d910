use arbitrary::Arbitrary;
use munch::{ColumnMode, Lexer, LexerConfig, ScanStrategy, re::Regex};

#[derive(Debug, Clone, Copy, Arbitrary)]
pub struct Symbol(u8);

impl Symbol {
    fn char(self) -> char { char::from(b'a' + self.0 % 4) }
}

#[derive(Debug, Clone, Arbitrary)]
pub enum Pattern {
    Lit(Symbol),
    Cat(Box<Pattern>, Box<Pattern>),
    Alt(Box<Pattern>, Box<Pattern>),
    Star(Box<Pattern>),
    Plus(Box<Pattern>),
    Opt(Box<Pattern>),
}

impl Pattern {
    fn regex(&self) -> Regex<char> {
        match self {
            Self::Lit(s) => Regex::Lit(s.char()),
            Self::Cat(l, r) => Regex::cat(l.regex(), r.regex()),
            Self::Alt(l, r) => Regex::alt(l.regex(), r.regex()),
            Self::Star(r) => Regex::Star(r.regex().into()),
            Self::Plus(r) => Regex::Plus(r.regex().into()),
            Self::Opt(r) => Regex::Opt(r.regex().into()),
        }
    }
}

#[derive(Debug, Arbitrary)]
pub struct Input {
    rules: Vec<Pattern>,
    word: Vec<Symbol>,
}

impl Input {
    /// Lex the word with both scan strategies and assert they agree
    pub fn run_differential(&self) {
        if self.rules.is_empty() {
            return;
        }

        let spec: Vec<_> = self
            .rules
            .iter()
            .enumerate()
            .map(|(i, p)| (format!("T{i}"), p.regex().to_string()))
            .collect();
        let word: String = self.word.iter().map(|s| s.char()).collect();

        for columns in [ColumnMode::Exact, ColumnMode::Compat] {
            let [reference, incremental] =
                [ScanStrategy::Reference, ScanStrategy::Incremental].map(|strategy| {
                    Lexer::compile(spec.clone())
                        .unwrap()
                        .with_config(LexerConfig { strategy, columns })
                        .lex_pairs(&word)
                });

            assert_eq!(reference, incremental, "{spec:?} on {word:?}");
        }
    }
}
