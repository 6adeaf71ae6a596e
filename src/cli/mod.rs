//! CLI module for the Cobalt compiler
//!
//! ## Usage
//!
//! - `co <file.co>` - parse a source file
//! - `co --tokens <file.co>` - dump the token stream (debug)
//!
//! ## Exit codes
//!
//! - 0: no errors occurred
//! - 1: a source code error occurred
//! - 2: an internal compiler error occurred
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros. Command
//! functions return `CliResult<T>` instead of calling `process::exit`; only
//! the top-level `run()` handles errors and exits. Internal errors travel as
//! panics and are mapped to exit code 2 in `run()`, so they can never be
//! mistaken for source errors.

use std::fmt;
use std::fs;
use std::panic;
use std::path::PathBuf;
use std::process;

use clap::Parser;

use crate::frontend::lexer::{Lexer, TokenKind};
use crate::frontend::parser;

// ============================================================================
// CLI error handling
// ============================================================================

/// Error type for CLI operations: a user-facing message plus the exit code
/// to return to the shell.
#[derive(Debug)]
pub struct CliError {
    pub message: String,
    pub exit_code: i32,
}

impl CliError {
    /// A source-error failure (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            exit_code: 1,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub type CliResult<T> = Result<T, CliError>;

// ============================================================================
// Clap CLI definition
// ============================================================================

/// The Cobalt programming language compiler
#[derive(Parser, Debug)]
#[command(name = "co")]
#[command(version)]
#[command(about = "The Cobalt programming language compiler", long_about = None)]
pub struct Cli {
    /// Source file to compile
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Dump the token stream instead of parsing (debug)
    #[arg(long)]
    pub tokens: bool,
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point; the only place that calls `process::exit`.
pub fn run() {
    let cli = Cli::parse();

    match panic::catch_unwind(|| execute(&cli)) {
        Ok(Ok(())) => {}
        Ok(Err(err)) => {
            if !err.message.is_empty() {
                eprintln!("{err}");
            }
            process::exit(err.exit_code);
        }
        Err(_) => {
            // the panic hook has already printed the payload and backtrace
            eprintln!("internal error: unexpected compiler panic");
            process::exit(2);
        }
    }
}

fn execute(cli: &Cli) -> CliResult<()> {
    let name = cli.file.to_string_lossy();
    let file = fs::File::open(&cli.file)
        .map_err(|err| CliError::failure(format!("error: {name}: {err}")))?;

    if cli.tokens {
        return dump_tokens(file, &name);
    }

    match parser::parse(file, &name) {
        Ok(tree) => {
            tracing::debug!(decls = tree.decls.len(), "parsed {name}");
            Ok(())
        }
        Err(err) => Err(CliError::failure(format!("error: {err}"))),
    }
}

fn dump_tokens(file: fs::File, name: &str) -> CliResult<()> {
    let mut lexer = Lexer::new(file, name);
    loop {
        lexer
            .next()
            .map_err(|err| CliError::failure(format!("error: {err}")))?;
        let pos = lexer.pos();
        println!("{}:{}\t{:?}", pos.line(), pos.col(), lexer.token());
        if *lexer.token() == TokenKind::Eof {
            return Ok(());
        }
    }
}
