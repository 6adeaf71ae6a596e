//! Cobalt Compiler Frontend
//!
//! This module contains all frontend components:
//! - `pos`: compact source positions and the file-name registry
//! - `diagnostics`: syntax error values and rendering
//! - `lexer`: tokenization of source code
//! - `parser`: parsing tokens into AST
//! - `ast`: abstract syntax tree definitions
//! - `types`: the kind lattice and type records
//! - `symbols`: symbol table and scope management
//! - `value`: compile-time constant values and their arithmetic
//! - `module`: modules and procedure records

pub mod ast;
pub mod diagnostics;
pub mod lexer;
pub mod module;
pub mod parser;
pub mod pos;
pub mod symbols;
pub mod types;
pub mod value;
