//! Tokenize a file with a lexer compiled from a JSON token specification

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

use std::{
    borrow::Cow,
    fs,
    io::{self, Read, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use munch::{ColumnMode, Lexer, LexerConfig, ScanStrategy};
use tracing_subscriber::{EnvFilter, prelude::*};

#[derive(Debug, clap::Parser)]
#[command(version, author, about)]
struct Opts {
    /// Log filter, using env_logger-like syntax
    #[arg(long, env = "RUST_LOG")]
    log_filter: Option<String>,

    /// JSON file containing an array of `[name, pattern]` pairs, in priority
    /// order
    #[arg(short, long, env = "MUNCH_SPEC")]
    spec: PathBuf,

    /// Longest-match search strategy
    #[arg(long, value_enum, default_value_t)]
    strategy: ScanStrategy,

    /// How to report the position of a lexing error
    #[arg(long, value_enum, default_value_t)]
    columns: ColumnMode,

    /// Print the automaton for the named token as a Graphviz document
    /// instead of lexing
    #[arg(long, value_name = "TOKEN")]
    dot: Option<String>,

    /// File to tokenize, or standard input if omitted
    input: Option<PathBuf>,
}

#[derive(Debug, serde::Deserialize)]
struct TokenDef(String, String);

macro_rules! init_error {
    ($($args:tt)*) => ({
        ::tracing::error!($($args)*);
        ::std::process::exit(1);
    })
}

fn init_subscriber(log_filter: &str) {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_new(log_filter)
                .unwrap_or_else(|e| init_error!("Invalid log filter {log_filter:?}: {e}")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .try_init()
        .unwrap_or_else(|e| init_error!("Error initializing logger: {e}"));
}

fn main() {
    let opts: Opts = clap::Parser::parse();
    init_subscriber(opts.log_filter.as_deref().unwrap_or("info"));

    std::process::exit(match run(opts) {
        Ok(()) => 0,
        Err(e) => {
            tracing::error!("{e:?}");
            1
        },
    });
}

#[tracing::instrument(level = "error", skip(opts))]
fn run(opts: Opts) -> Result<()> {
    let Opts {
        log_filter: _,
        spec,
        strategy,
        columns,
        dot,
        input,
    } = opts;

    let defs: Vec<TokenDef> = serde_json::from_str(
        &fs::read_to_string(&spec)
            .with_context(|| format!("Error reading token spec {}", spec.display()))?,
    )
    .with_context(|| format!("Error parsing token spec {}", spec.display()))?;

    let lexer = Lexer::compile(defs.into_iter().map(|TokenDef(n, p)| (n, p)))
        .context("Error compiling lexer")?
        .with_config(LexerConfig { strategy, columns });

    let mut stdout = io::stdout().lock();

    if let Some(name) = dot {
        let dfa = lexer
            .dfa(&name)
            .with_context(|| format!("No token named {name:?}"))?;
        let graph = dfa.dot(|c| Cow::Owned(format!("{c:?}")), |n| n.to_string().into());
        writeln!(stdout, "{graph}").context("Error writing graph")?;
        return Ok(());
    }

    let text = match input {
        Some(path) => fs::read_to_string(&path)
            .with_context(|| format!("Error reading input {}", path.display()))?,
        None => {
            let mut s = String::new();
            io::stdin()
                .read_to_string(&mut s)
                .context("Error reading standard input")?;
            s
        },
    };

    let toks = lexer.lex(&text)?;
    tracing::info!(count = toks.len(), "Lexing finished");

    for tok in toks {
        writeln!(
            stdout,
            "{}",
            serde_json::to_string(&(tok.name, tok.text)).context("Error serializing token")?
        )
        .context("Error writing token")?;
    }

    Ok(())
}
