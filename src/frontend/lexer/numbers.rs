//! Number scanning for the Cobalt lexer
//!
//! Handles integer and floating-point literals in all supported bases,
//! including `_` digit separators and their placement rules.

use std::io::Read;

use super::tokens::{LitKind, TokenKind};
use super::{is_hex, lower, Lexer};
use crate::frontend::diagnostics::SyntaxError;

impl<R: Read> Lexer<R> {
    /// Scans a numeric literal. `seen_point` is true when the caller already
    /// consumed a leading `.` (as in `.5`).
    pub(super) fn number(&mut self, mut seen_point: bool) -> Result<(), SyntaxError> {
        const MAX_LENGTH: usize = 200;

        let mut kind = LitKind::Int;
        let mut base: u32 = 10;
        let mut prefix = '\0'; // '\0' (decimal), '0' (0-octal), 'x', 'o', or 'b'
        let mut digsep = 0u32; // bit 0: digit present, bit 1: '_' present
        let mut invalid: i32 = -1; // offset of the first invalid digit, or < 0

        // integer part
        if !seen_point {
            if self.src.ch == Some('0') {
                self.src.nextch()?;
                match self.src.ch.map(lower) {
                    Some('x') => {
                        self.src.nextch()?;
                        base = 16;
                        prefix = 'x';
                    }
                    Some('o') => {
                        self.src.nextch()?;
                        base = 8;
                        prefix = 'o';
                    }
                    Some('b') => {
                        self.src.nextch()?;
                        base = 2;
                        prefix = 'b';
                    }
                    _ => {
                        base = 8;
                        prefix = '0';
                        digsep = 1; // leading 0
                    }
                }
            }
            digsep |= self.digits(base, Some(&mut invalid))?;
            if self.src.ch == Some('.') {
                if prefix != '\0' {
                    return Err(self.errorf("can only add decimal point to base-10 literals"));
                }
                self.src.nextch()?;
                seen_point = true;
            }
        }

        // fractional part
        if seen_point {
            kind = LitKind::Float;
            digsep |= self.digits(base, Some(&mut invalid))?;
        }

        if digsep & 1 == 0 {
            return Err(self.errorf(format!("{} literal has no digits", base_name(base))));
        }

        // exponent
        if self.src.ch.map(lower) == Some('e') {
            if prefix != '\0' {
                return Err(self.errorf("'e' exponent requires decimal mantissa"));
            }
            self.src.nextch()?;
            kind = LitKind::Float;
            if matches!(self.src.ch, Some('+' | '-')) {
                self.src.nextch()?;
            }
            digsep = self.digits(10, None)? | digsep & 2; // don't lose the sep bit
            if digsep & 1 == 0 {
                return Err(self.errorf("exponent has no digits"));
            }
        }

        let text = String::from_utf8_lossy(self.src.segment()).into_owned();

        if kind == LitKind::Int && invalid >= 0 {
            let ch = text.as_bytes()[invalid as usize] as char;
            return Err(self.error_at(
                invalid as u32,
                format!("invalid digit {ch:?} in {} literal", base_name(base)),
            ));
        }

        if digsep & 2 != 0 {
            if let Some(i) = invalid_sep(&text) {
                return Err(self.error_at(i as u32, "'_' must separate successive digits"));
            }
        }

        if text.len() > MAX_LENGTH {
            return Err(self.error_at(0, "excessively long number"));
        }

        self.tok = TokenKind::Literal { text, kind };
        Ok(())
    }

    /// Accumulates a run of digits and `_` separators in the given base.
    ///
    /// The result has bit 0 set if a digit was seen and bit 1 if a `_` was
    /// seen. For bases <= 10 the scan accepts all decimal digits, recording
    /// the byte offset (from the token start) of the first out-of-range one
    /// in `invalid`.
    fn digits(&mut self, base: u32, mut invalid: Option<&mut i32>) -> Result<u32, SyntaxError> {
        let mut digsep = 0u32;
        if base <= 10 {
            let max = (b'0' + base as u8) as char;
            while let Some(ch) = self.src.ch {
                if !ch.is_ascii_digit() && ch != '_' {
                    break;
                }
                let mut ds = 1;
                if ch == '_' {
                    ds = 2;
                } else if ch >= max {
                    if let Some(inv) = invalid.as_deref_mut() {
                        if *inv < 0 {
                            let (_, col) = self.src.pos();
                            *inv = (col - self.col) as i32; // record invalid digit offset
                        }
                    }
                }
                digsep |= ds;
                self.src.nextch()?;
            }
        } else {
            while let Some(ch) = self.src.ch {
                if !is_hex(ch) && ch != '_' {
                    break;
                }
                let mut ds = 1;
                if ch == '_' {
                    ds = 2;
                }
                digsep |= ds;
                self.src.nextch()?;
            }
        }
        Ok(digsep)
    }
}

pub(super) fn base_name(base: u32) -> &'static str {
    match base {
        2 => "binary",
        8 => "octal",
        10 => "decimal",
        16 => "hexadecimal",
        _ => unreachable!("invalid number base {base}"),
    }
}

/// Returns the byte offset of the first misplaced `_` in a literal, or
/// `None` if all separators sit between successive digits. A base prefix
/// counts as a digit.
pub(super) fn invalid_sep(x: &str) -> Option<usize> {
    let x = x.as_bytes();
    let mut x1 = ' '; // prefix char, we only care if it's 'x'
    let mut d = '.'; // digit: '_', '0' (a digit), or '.' (anything else)
    let mut i = 0;

    // a prefix counts as a digit
    if x.len() >= 2 && x[0] == b'0' {
        x1 = lower(x[1] as char);
        if x1 == 'x' || x1 == 'o' || x1 == 'b' {
            d = '0';
            i = 2;
        }
    }

    // mantissa and exponent
    while i < x.len() {
        let p = d; // previous digit
        d = x[i] as char;
        if d == '_' {
            if p != '0' {
                return Some(i);
            }
        } else if d.is_ascii_digit() || x1 == 'x' && is_hex(d) {
            d = '0';
        } else {
            if p == '_' {
                return Some(i - 1);
            }
            d = '.';
        }
        i += 1;
    }
    if d == '_' {
        return Some(x.len() - 1);
    }

    None
}
