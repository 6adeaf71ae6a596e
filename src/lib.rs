//! Cobalt Programming Language Compiler
//!
//! Cobalt is a small, statically typed systems language. This crate provides
//! the compiler front-end: a buffered UTF-8 scanner, a recursive-descent
//! parser producing a position-carrying syntax tree, and the data structures
//! the type checker populates (kinds, types, scopes, symbols, constant
//! values).

pub mod cli;
pub mod frontend;

pub use frontend::ast;
pub use frontend::diagnostics;
pub use frontend::lexer;
pub use frontend::parser;
pub use frontend::pos;
pub use frontend::symbols;
pub use frontend::types;
pub use frontend::value;
