//! Syntax error values
//!
//! A [`SyntaxError`] describes the first (and only) error encountered while
//! scanning or parsing a source file. The scanner and parser thread it
//! through ordinary `Result` returns; the parse entry point is the single
//! place that observes it.

use crate::frontend::pos::Pos;
use thiserror::Error;

/// A syntax error that occurred while scanning or parsing source code.
///
/// An error is considered present only if it has a known position and a
/// non-empty message; [`SyntaxError::err`] enforces that rule.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{pos}: {msg}")]
pub struct SyntaxError {
    pub pos: Pos,
    pub msg: String,
}

impl SyntaxError {
    pub fn new(pos: Pos, msg: impl Into<String>) -> Self {
        Self {
            pos,
            msg: msg.into(),
        }
    }

    /// Returns `self` only when it meets the requirements for being
    /// considered an error: a known position and a non-empty message.
    pub fn err(self) -> Option<Self> {
        if self.pos.known() && !self.msg.is_empty() {
            Some(self)
        } else {
            None
        }
    }
}
