//! Pattern syntax.
//!
//! A pattern is a sequence of literals joined by `|`, postfix `*`, `+` and
//! `?`, and parentheses. Concatenation is implicit. Alphanumerics, line feeds
//! and the punctuation `@ - . _ / :` stand for themselves; any other character
//! must be preceded by a backslash, which is how operators, spaces and
//! parentheses are matched. The classes `[a-z]`, `[A-Z]` and `[0-9]` expand to
//! an alternation of their members; no other bracket syntax exists, so any
//! other `[` must be escaped.

use std::fmt;

use super::Regex;

/// Postfix operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unop {
    /// `*`
    Star,
    /// `+`
    Plus,
    /// `?`
    Opt,
}

/// Infix operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binop {
    /// Implicit, between adjacent operands
    Cat,
    /// `|`
    Alt,
}

impl Binop {
    /// Binding strength; postfix operators bind tighter than either (3)
    #[inline]
    fn priority(self) -> u8 {
        match self {
            Self::Cat => 2,
            Self::Alt => 1,
        }
    }
}

/// An operator named in a [`ParseError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// A postfix operator
    Unop(Unop),
    /// An infix operator
    Binop(Binop),
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unop(Unop::Star) => "'*'",
            Self::Unop(Unop::Plus) => "'+'",
            Self::Unop(Unop::Opt) => "'?'",
            Self::Binop(Binop::Cat) => "concatenation",
            Self::Binop(Binop::Alt) => "'|'",
        })
    }
}

/// Error produced for a malformed pattern.  Positions are character offsets
/// into the pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The pattern contains no operands
    #[error("Empty regular expression")]
    Empty,
    /// An operator lacks one of its operands
    #[error("Missing operand for {0} at character {1}")]
    MissingOperand(Op, usize),
    /// `()` with nothing inside
    #[error("Empty parentheses at character {0}")]
    EmptyGroup(usize),
    /// A `)` with no matching `(`
    #[error("Found extraneous right parenthesis at character {0}")]
    TrailingParen(usize),
    /// A `(` with no matching `)`
    #[error("Unclosed parenthesis at character {0}")]
    UnclosedParen(usize),
    /// A backslash at the very end of the pattern
    #[error("Unterminated escape sequence at character {0}")]
    TrailingEscape(usize),
    /// A character that is only a literal when escaped
    #[error("Unescaped {0:?} at character {1}")]
    Unescaped(char, usize),
}

/// Built-in character classes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Class {
    Lower,
    Upper,
    Digit,
}

impl Class {
    const ALL: [Self; 3] = [Self::Lower, Self::Upper, Self::Digit];

    fn syntax(self) -> [char; 5] {
        match self {
            Self::Lower => ['[', 'a', '-', 'z', ']'],
            Self::Upper => ['[', 'A', '-', 'Z', ']'],
            Self::Digit => ['[', '0', '-', '9', ']'],
        }
    }

    fn regex(self) -> Regex<char> {
        let members = match self {
            Self::Lower => 'a'..='z',
            Self::Upper => 'A'..='Z',
            Self::Digit => '0'..='9',
        };

        Regex::one_of(members).unwrap_or_else(|| unreachable!())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tok {
    Lit(char),
    Class(Class),
    Unop(Unop),
    Binop(Binop),
    LPar,
    RPar,
}

impl Tok {
    #[inline]
    fn ends_operand(self) -> bool {
        matches!(self, Self::Lit(_) | Self::Class(_) | Self::Unop(_) | Self::RPar)
    }

    #[inline]
    fn starts_operand(self) -> bool { matches!(self, Self::Lit(_) | Self::Class(_) | Self::LPar) }
}

/// Characters that may appear unescaped as literals
#[inline]
fn is_bare_literal(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '\n' | '@' | '-' | '.' | '_' | '/' | ':')
}

/// Split a pattern into tokens, expanding escapes and classes and inserting
/// the implicit concatenation operator
fn tokenize(pat: &str) -> Result<Vec<(usize, Tok)>, ParseError> {
    let chars: Vec<char> = pat.chars().collect();
    let mut toks: Vec<(usize, Tok)> = Vec::with_capacity(chars.len() * 2);
    let mut i = 0;

    while let Some(&c) = chars.get(i) {
        let pos = i;
        let tok = match c {
            '\\' => {
                i += 1;
                Tok::Lit(*chars.get(i).ok_or(ParseError::TrailingEscape(pos))?)
            },
            '[' => {
                if let Some(class) = Class::ALL
                    .into_iter()
                    .find(|k| chars[i..].starts_with(&k.syntax()))
                {
                    i += class.syntax().len() - 1;
                    Tok::Class(class)
                } else {
                    return Err(ParseError::Unescaped(c, pos));
                }
            },
            '(' => Tok::LPar,
            ')' => Tok::RPar,
            '|' => Tok::Binop(Binop::Alt),
            '*' => Tok::Unop(Unop::Star),
            '+' => Tok::Unop(Unop::Plus),
            '?' => Tok::Unop(Unop::Opt),
            c if is_bare_literal(c) => Tok::Lit(c),
            c => return Err(ParseError::Unescaped(c, pos)),
        };
        i += 1;

        if let Some(&(_, prev)) = toks.last()
            && prev.ends_operand()
            && tok.starts_operand()
        {
            toks.push((pos, Tok::Binop(Binop::Cat)));
        }

        toks.push((pos, tok));
    }

    Ok(toks)
}

#[derive(Debug, Clone, Copy)]
enum StackOp {
    LPar,
    Binop(Binop),
}

#[derive(Debug, Default)]
struct Parser {
    values: Vec<Regex<char>>,
    ops: Vec<(usize, StackOp)>,
}

impl Parser {
    fn reduce(&mut self, pos: usize, op: Binop) -> Result<(), ParseError> {
        let missing = ParseError::MissingOperand(Op::Binop(op), pos);
        let rhs = self.values.pop().ok_or(missing)?;
        let lhs = self.values.pop().ok_or(missing)?;

        self.values.push(match op {
            Binop::Cat => Regex::cat(lhs, rhs),
            Binop::Alt => Regex::alt(lhs, rhs),
        });

        Ok(())
    }

    fn shift_unop(&mut self, pos: usize, op: Unop, prev: Option<Tok>) -> Result<(), ParseError> {
        let missing = ParseError::MissingOperand(Op::Unop(op), pos);
        if !prev.is_some_and(Tok::ends_operand) {
            return Err(missing);
        }

        let inner = self.values.pop().ok_or(missing)?.into();
        self.values.push(match op {
            Unop::Star => Regex::Star(inner),
            Unop::Plus => Regex::Plus(inner),
            Unop::Opt => Regex::Opt(inner),
        });

        Ok(())
    }

    fn shift_binop(&mut self, pos: usize, op: Binop) -> Result<(), ParseError> {
        while let Some(&(top_pos, StackOp::Binop(top))) = self.ops.last()
            && top.priority() >= op.priority()
        {
            self.ops.pop();
            self.reduce(top_pos, top)?;
        }

        self.ops.push((pos, StackOp::Binop(op)));
        Ok(())
    }

    fn close_paren(&mut self, pos: usize) -> Result<(), ParseError> {
        loop {
            match self.ops.pop() {
                None => break Err(ParseError::TrailingParen(pos)),
                Some((_, StackOp::LPar)) => break Ok(()),
                Some((op_pos, StackOp::Binop(op))) => self.reduce(op_pos, op)?,
            }
        }
    }

    fn finish(mut self) -> Result<Regex<char>, ParseError> {
        while let Some((pos, op)) = self.ops.pop() {
            match op {
                StackOp::LPar => return Err(ParseError::UnclosedParen(pos)),
                StackOp::Binop(op) => self.reduce(pos, op)?,
            }
        }

        self.values
            .into_iter()
            .reduce(Regex::cat)
            .ok_or(ParseError::Empty)
    }
}

/// Parse a pattern into a regular expression tree
///
/// # Errors
/// Returns an error if the pattern is empty, has unbalanced parentheses, an
/// operator without an operand, an unescaped special character, or ends in a
/// lone backslash.
pub fn parse(pat: &str) -> Result<Regex<char>, ParseError> {
    let mut parser = Parser::default();
    let mut prev = None;

    for (pos, tok) in tokenize(pat)? {
        match tok {
            Tok::Lit(c) => parser.values.push(Regex::Lit(c)),
            Tok::Class(c) => parser.values.push(c.regex()),
            Tok::Unop(u) => parser.shift_unop(pos, u, prev)?,
            Tok::Binop(b) => parser.shift_binop(pos, b)?,
            Tok::LPar => parser.ops.push((pos, StackOp::LPar)),
            Tok::RPar if prev == Some(Tok::LPar) => return Err(ParseError::EmptyGroup(pos)),
            Tok::RPar => parser.close_paren(pos)?,
        }

        prev = Some(tok);
    }

    parser.finish()
}

impl std::str::FromStr for Regex<char> {
    type Err = ParseError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> { parse(s) }
}

#[cfg(test)]
mod test {
    use proptest::prelude::*;

    use super::{Binop, Op, ParseError, Unop, parse};
    use crate::re::{self, Regex};

    #[inline]
    fn lit(c: char) -> Regex<char> { Regex::Lit(c) }

    fn star(r: Regex<char>) -> Regex<char> { Regex::Star(r.into()) }

    #[test]
    fn precedence() {
        // a|b*c == a|((b*)c)
        assert_eq!(
            parse("a|b*c").unwrap(),
            Regex::alt(lit('a'), Regex::cat(star(lit('b')), lit('c'))),
        );

        // concatenation is left-associative
        assert_eq!(
            parse("abc").unwrap(),
            Regex::cat(Regex::cat(lit('a'), lit('b')), lit('c')),
        );

        assert_eq!(
            parse("a|b|c").unwrap(),
            Regex::alt(Regex::alt(lit('a'), lit('b')), lit('c')),
        );
    }

    #[test]
    fn groups() {
        assert_eq!(
            parse("(ab)+").unwrap(),
            Regex::Plus(Regex::cat(lit('a'), lit('b')).into()),
        );

        assert_eq!(
            parse("x(a|b)?y").unwrap(),
            Regex::cat(
                Regex::cat(lit('x'), Regex::Opt(Regex::alt(lit('a'), lit('b')).into())),
                lit('y'),
            ),
        );

        assert_eq!(
            parse("(a)(b)").unwrap(),
            Regex::cat(lit('a'), lit('b')),
        );
    }

    #[test]
    fn escapes() {
        assert_eq!(
            parse(r"\*\|\ ").unwrap(),
            Regex::cat(Regex::cat(lit('*'), lit('|')), lit(' ')),
        );
        assert_eq!(parse(r"\(+").unwrap(), Regex::Plus(lit('(').into()));
        assert_eq!(parse("\\\\").unwrap(), lit('\\'));
        assert_eq!(parse("a\nb").unwrap(), Regex::cat(Regex::cat(lit('a'), lit('\n')), lit('b')));
    }

    #[test]
    fn classes() {
        assert_eq!(parse("[0-9]").unwrap(), Regex::one_of('0'..='9').unwrap());

        let Regex::Plus(inner) = parse("[a-z]+").unwrap() else {
            panic!("expected a repetition");
        };
        assert_eq!(*inner, Regex::one_of('a'..='z').unwrap());

        for c in ['x', 'X', 'q', 'Q', '5'] {
            let re = parse("[a-z]|[A-Z]|[0-9]").unwrap();
            assert!(re.matches(&[c]), "{c:?} should be in the class union");
        }

        // not a recognized class, so the bracket has to be escaped
        assert_eq!(parse("[a-c]"), Err(ParseError::Unescaped('[', 0)));
        assert_eq!(
            parse(r"\[a-c\]").unwrap(),
            "\\[a-c\\]".parse::<Regex<char>>().unwrap(),
        );

        // an escaped bracket never opens a class
        assert!(!parse(r"\[a-z\]").unwrap().matches(&['q']));
    }

    #[test]
    fn errors() {
        assert_eq!(parse(""), Err(ParseError::Empty));
        assert_eq!(parse("(a"), Err(ParseError::UnclosedParen(0)));
        assert_eq!(parse("a)"), Err(ParseError::TrailingParen(1)));
        assert_eq!(parse("a()"), Err(ParseError::EmptyGroup(2)));
        assert_eq!(parse("ab\\"), Err(ParseError::TrailingEscape(2)));
        assert_eq!(parse("a b"), Err(ParseError::Unescaped(' ', 1)));
        assert_eq!(parse("a]"), Err(ParseError::Unescaped(']', 1)));
        assert_eq!(parse("a<b"), Err(ParseError::Unescaped('<', 1)));
        assert_eq!(
            parse("*a"),
            Err(ParseError::MissingOperand(Op::Unop(Unop::Star), 0)),
        );
        assert_eq!(
            parse("a(+b)"),
            Err(ParseError::MissingOperand(Op::Unop(Unop::Plus), 2)),
        );
        assert_eq!(
            parse("a|"),
            Err(ParseError::MissingOperand(Op::Binop(Binop::Alt), 1)),
        );
        assert_eq!(
            parse("|a"),
            Err(ParseError::MissingOperand(Op::Binop(Binop::Alt), 0)),
        );
    }

    proptest! {
        #[test]
        fn display_round_trip(r in re::re(6, 48, 2, crate::prop::symbol_safe())) {
            let s = r.to_string();
            let parsed = parse(&s).unwrap_or_else(|e| panic!("Error parsing {s:?}: {e}"));
            prop_assert_eq!(parsed, r);
        }

        #[test]
        fn random_patterns_never_panic(s in any::<String>()) {
            let _ = parse(&s);
        }
    }
}
