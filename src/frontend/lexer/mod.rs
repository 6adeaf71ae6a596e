//! Lexer for the Cobalt programming language
//!
//! Converts a byte stream into tokens, handling:
//! - Keywords (`const`, `proc`, `return`, `var`) and identifiers
//! - Integer, float, and character literals
//! - Operators with their precedence, assignment operators, delimiters
//! - Line comments and nested block comments
//!
//! ## Module Structure
//!
//! - `source` - buffered rune reader with segment capture
//! - `tokens` - token and operator types
//! - `numbers` - numeric literal scanning
//! - `chars` - character literals and escape sequences

mod chars;
mod numbers;
mod source;
pub mod tokens;

pub use tokens::{LitKind, Operator, Prec, TokenKind};

use std::io::Read;

use crate::frontend::diagnostics::SyntaxError;
use crate::frontend::pos::Pos;
use source::Source;
use tokens::KEYWORDS;

/// Lexer for Cobalt source code.
///
/// The lexer is pull-based: each call to [`Lexer::next`] scans one token and
/// leaves it (with its position) available through [`Lexer::token`] and
/// [`Lexer::pos`]. The first syntax error aborts the scan.
pub struct Lexer<R> {
    src: Source<R>,

    // current token, valid after calling next()
    line: u32,
    col: u32,
    pub(crate) tok: TokenKind,
}

impl<R: Read> Lexer<R> {
    #[tracing::instrument(skip_all, fields(file = file))]
    pub fn new(reader: R, file: &str) -> Self {
        Lexer {
            src: Source::new(reader, file),
            line: 0,
            col: 0,
            tok: TokenKind::Eof,
        }
    }

    /// The current token.
    pub fn token(&self) -> &TokenKind {
        &self.tok
    }

    /// The position of the current token's first character.
    pub fn pos(&self) -> Pos {
        self.src.at(self.line, self.col)
    }

    /// An error at the most recently read character.
    pub(super) fn errorf(&self, msg: impl Into<String>) -> SyntaxError {
        self.src.error(msg)
    }

    /// An error at a byte-column offset relative to the current token start.
    pub(super) fn error_at(&self, offset: u32, msg: impl Into<String>) -> SyntaxError {
        SyntaxError::new(self.src.at(self.line, self.col + offset), msg)
    }

    pub(super) fn set_lit(&mut self, kind: LitKind) {
        let text = String::from_utf8_lossy(self.src.segment()).into_owned();
        self.tok = TokenKind::Literal { text, kind };
    }

    /// Scans the next token.
    pub fn next(&mut self) -> Result<(), SyntaxError> {
        loop {
            // skip white space
            self.src.stop();
            while matches!(self.src.ch, Some(' ' | '\t' | '\n' | '\r')) {
                self.src.nextch()?;
            }

            // token start
            let (line, col) = self.src.pos();
            self.line = line;
            self.col = col;
            self.src.start();

            let Some(ch) = self.src.ch else {
                self.tok = TokenKind::Eof;
                return Ok(());
            };

            if is_letter(ch) || !ch.is_ascii() && ch.is_alphabetic() {
                self.src.nextch()?;
                self.name()?;
                return Ok(());
            }

            match ch {
                '0'..='9' => self.number(false)?,

                '\'' => self.char_lit()?,

                '(' => {
                    self.src.nextch()?;
                    self.tok = TokenKind::LParen;
                }

                '[' => {
                    self.src.nextch()?;
                    self.tok = TokenKind::LBracket;
                }

                '{' => {
                    self.src.nextch()?;
                    self.tok = TokenKind::LBrace;
                }

                ',' => {
                    self.src.nextch()?;
                    self.tok = TokenKind::Comma;
                }

                ';' => {
                    self.src.nextch()?;
                    self.tok = TokenKind::Semi;
                }

                ')' => {
                    self.src.nextch()?;
                    self.tok = TokenKind::RParen;
                }

                ']' => {
                    self.src.nextch()?;
                    self.tok = TokenKind::RBracket;
                }

                '}' => {
                    self.src.nextch()?;
                    self.tok = TokenKind::RBrace;
                }

                ':' => {
                    self.src.nextch()?;
                    self.tok = TokenKind::Colon;
                }

                '.' => {
                    self.src.nextch()?;
                    if matches!(self.src.ch, Some('0'..='9')) {
                        self.number(true)?;
                    } else if self.src.ch == Some('*') {
                        self.src.nextch()?;
                        self.tok = TokenKind::Operator(Operator::Deref);
                    } else {
                        self.tok = TokenKind::Dot;
                    }
                }

                '+' => {
                    self.src.nextch()?;
                    if self.src.ch == Some('+') {
                        self.src.nextch()?;
                        self.tok = TokenKind::Operator(Operator::Inc);
                    } else {
                        self.assign_op(Operator::Add)?;
                    }
                }

                '-' => {
                    self.src.nextch()?;
                    if self.src.ch == Some('-') {
                        self.src.nextch()?;
                        self.tok = TokenKind::Operator(Operator::Dec);
                    } else {
                        self.assign_op(Operator::Sub)?;
                    }
                }

                '*' => {
                    // `*=` is a compound assignment, a bare `*` is Star
                    self.src.nextch()?;
                    if self.src.ch == Some('=') {
                        self.src.nextch()?;
                        self.tok = TokenKind::AssignOp(Operator::Mul);
                    } else {
                        self.tok = TokenKind::Star;
                    }
                }

                '/' => {
                    self.src.nextch()?;
                    if matches!(self.src.ch, Some('/' | '*')) {
                        self.comment()?;
                        continue;
                    }
                    self.assign_op(Operator::Div)?;
                }

                '%' => {
                    self.src.nextch()?;
                    self.assign_op(Operator::Rem)?;
                }

                '&' => {
                    self.src.nextch()?;
                    if self.src.ch == Some('&') {
                        self.src.nextch()?;
                        self.tok = TokenKind::Operator(Operator::AndAnd);
                    } else {
                        self.assign_op(Operator::And)?;
                    }
                }

                '|' => {
                    self.src.nextch()?;
                    if self.src.ch == Some('|') {
                        self.src.nextch()?;
                        self.tok = TokenKind::Operator(Operator::OrOr);
                    } else {
                        self.assign_op(Operator::Or)?;
                    }
                }

                '^' => {
                    self.src.nextch()?;
                    self.assign_op(Operator::Xor)?;
                }

                '<' => {
                    self.src.nextch()?;
                    if self.src.ch == Some('=') {
                        self.src.nextch()?;
                        self.tok = TokenKind::Operator(Operator::Leq);
                    } else if self.src.ch == Some('<') {
                        self.src.nextch()?;
                        self.assign_op(Operator::Shl)?;
                    } else {
                        self.tok = TokenKind::Operator(Operator::Lss);
                    }
                }

                '>' => {
                    self.src.nextch()?;
                    if self.src.ch == Some('=') {
                        self.src.nextch()?;
                        self.tok = TokenKind::Operator(Operator::Geq);
                    } else if self.src.ch == Some('>') {
                        self.src.nextch()?;
                        self.assign_op(Operator::Shr)?;
                    } else {
                        self.tok = TokenKind::Operator(Operator::Gtr);
                    }
                }

                '=' => {
                    self.src.nextch()?;
                    if self.src.ch == Some('=') {
                        self.src.nextch()?;
                        self.tok = TokenKind::Operator(Operator::Eql);
                    } else {
                        self.tok = TokenKind::Assign;
                    }
                }

                '!' => {
                    self.src.nextch()?;
                    if self.src.ch == Some('=') {
                        self.src.nextch()?;
                        self.tok = TokenKind::Operator(Operator::Neq);
                    } else {
                        self.tok = TokenKind::Operator(Operator::LNot);
                    }
                }

                '~' => {
                    self.src.nextch()?;
                    self.tok = TokenKind::Operator(Operator::Not);
                }

                '?' => {
                    self.src.nextch()?;
                    self.tok = TokenKind::Question;
                }

                _ => return Err(self.errorf(format!("invalid character {ch:?}"))),
            }

            return Ok(());
        }
    }

    /// Emits `AssignOp(op)` if the current character is `=`, else
    /// `Operator(op)`.
    fn assign_op(&mut self, op: Operator) -> Result<(), SyntaxError> {
        if self.src.ch == Some('=') {
            self.src.nextch()?;
            self.tok = TokenKind::AssignOp(op);
        } else {
            self.tok = TokenKind::Operator(op);
        }
        Ok(())
    }

    /// Scans the remainder of a name; the first character has been consumed.
    fn name(&mut self) -> Result<(), SyntaxError> {
        const MAX_LENGTH: usize = 100;

        // accelerate the common case (7-bit ASCII)
        while let Some(ch) = self.src.ch {
            if !is_letter(ch) && !ch.is_ascii_digit() {
                break;
            }
            self.src.nextch()?;
        }

        // general case
        if matches!(self.src.ch, Some(ch) if !ch.is_ascii()) {
            loop {
                match self.src.ch {
                    Some(ch) if ch.is_alphabetic() || ch.is_numeric() || ch == '_' => {
                        self.src.nextch()?;
                    }
                    Some(ch) if !ch.is_ascii() => {
                        return Err(
                            self.errorf(format!("invalid character {ch:?} in identifier"))
                        );
                    }
                    _ => break,
                }
            }
        }

        // possibly a keyword
        let lit = self.src.segment();
        if lit.len() >= 2 {
            if let Ok(text) = std::str::from_utf8(lit) {
                if let Some(tok) = KEYWORDS.get(text) {
                    self.tok = tok.clone();
                    return Ok(());
                }
            }
        }

        if lit.len() > MAX_LENGTH {
            return Err(self.error_at(0, "excessively long name"));
        }

        let value = String::from_utf8_lossy(lit).into_owned();
        self.tok = TokenKind::Name(value);
        Ok(())
    }

    /// Skips a comment; the current character is the `/` or `*` following
    /// the opening `/`. Block comments nest.
    fn comment(&mut self) -> Result<(), SyntaxError> {
        if self.src.ch == Some('/') {
            // line comment
            while matches!(self.src.ch, Some(ch) if ch != '\n') {
                self.src.nextch()?;
            }
            return Ok(());
        }

        // block comment, may nest
        self.src.nextch()?;
        let mut lev = 1;
        while lev > 0 {
            match self.src.ch {
                Some('/') => {
                    self.src.nextch()?;
                    if self.src.ch == Some('*') {
                        self.src.nextch()?;
                        lev += 1;
                    }
                }
                Some('*') => {
                    self.src.nextch()?;
                    if self.src.ch == Some('/') {
                        self.src.nextch()?;
                        lev -= 1;
                    }
                }
                Some(_) => self.src.nextch()?,
                None => return Err(self.error_at(0, "comment not terminated")),
            }
        }
        Ok(())
    }
}

pub(super) fn lower(ch: char) -> char {
    if ch.is_ascii() {
        (ch as u8 | 0x20) as char
    } else {
        ch
    }
}

fn is_letter(ch: char) -> bool {
    matches!(lower(ch), 'a'..='z') || ch == '_'
}

pub(super) fn is_hex(ch: char) -> bool {
    ch.is_ascii_digit() || matches!(lower(ch), 'a'..='f')
}
