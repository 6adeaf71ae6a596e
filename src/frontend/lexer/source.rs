//! Buffered source reader
//!
//! `Source` is a buffered rune reader specialized for scanning source code:
//! reading ASCII characters, maintaining the current (line, col) position,
//! and recording the most recently read source segment are the hot paths.
//!
//! The buffer is accessed using three indices `b` (begin), `r` (read), and
//! `e` (end):
//!
//! - If `b` is set, it points to the beginning of a segment of most recently
//!   read characters (typically a literal).
//! - `r` points to the byte immediately following the most recently read
//!   character `ch`, which starts at `r - chw`.
//! - `e` points to the byte immediately following the last byte that was
//!   read into the buffer.
//!
//! The buffer content is terminated at `buf[e]` with the sentinel byte
//! `0x80`, which makes it possible to test for the common case of an ASCII
//! character with a single comparison (see `nextch`).
//!
//! ```text
//!              +------ content in use -------+
//!              v                             v
//! buf [..read..|..segment..|ch|....unread....|s|...free...]
//!              ^           ^  ^              ^
//!              |           |  |              |
//!              b       r-chw  r              e
//! ```
//!
//! Invariant: `b <= r <= e < buf.len()` and `buf[e] == SENTINEL`.

use std::io::{self, Read};

use crate::frontend::diagnostics::SyntaxError;
use crate::frontend::pos::Pos;

/// Sentinel stored at `buf[e]`; every ASCII byte compares below it.
const SENTINEL: u8 = 0x80;

/// Maximum number of bytes in a UTF-8 encoded rune.
const UTF8_MAX: usize = 4;

// Starting points for line and column numbers.
const LINE_BASE: u32 = 1;
const COL_BASE: u32 = 1;

pub(super) struct Source<R> {
    reader: R,
    file: String,

    buf: Vec<u8>,
    ioerr: Option<io::Error>, // pending I/O error
    eof: bool,                // the reader is exhausted
    b: Option<usize>,         // start of the active segment
    r: usize,
    e: usize,

    line: u32, // 0-based source position of ch
    col: u32,
    pub(super) ch: Option<char>, // most recently read character; None at EOF
    chw: usize,                  // width of ch in bytes
}

impl<R: Read> Source<R> {
    pub(super) fn new(reader: R, file: &str) -> Self {
        let mut buf = vec![0u8; next_size(0)];
        buf[0] = SENTINEL;
        Source {
            reader,
            file: file.to_string(),
            buf,
            ioerr: None,
            eof: false,
            b: None,
            r: 0,
            e: 0,
            line: 0,
            col: 0,
            ch: Some(' '),
            chw: 0,
        }
    }

    /// The 1-based (line, col) source position of `ch`.
    pub(super) fn pos(&self) -> (u32, u32) {
        (LINE_BASE + self.line, COL_BASE + self.col)
    }

    /// A [`Pos`] for an explicit (1-based) line and column in this file.
    pub(super) fn at(&self, line: u32, col: u32) -> Pos {
        Pos::make(&self.file, line, col)
    }

    /// An error at the source position of `ch`.
    pub(super) fn error(&self, msg: impl Into<String>) -> SyntaxError {
        let (line, col) = self.pos();
        SyntaxError::new(self.at(line, col), msg)
    }

    /// Starts a new active segment, including `ch`. As long as `stop` has
    /// not been called, the segment's bytes (excluding `ch`) may be
    /// retrieved by calling `segment`.
    pub(super) fn start(&mut self) {
        self.b = Some(self.r - self.chw);
    }

    pub(super) fn stop(&mut self) {
        self.b = None;
    }

    pub(super) fn segment(&self) -> &[u8] {
        let b = self.b.expect("segment called without an active segment");
        &self.buf[b..self.r - self.chw]
    }

    /// Advances to the next character, updating position bookkeeping.
    ///
    /// At EOF, `ch` becomes `None`. A NUL byte, invalid UTF-8, a misplaced
    /// byte-order mark, and pending I/O errors are all reported as syntax
    /// errors at the offending position.
    pub(super) fn nextch(&mut self) -> Result<(), SyntaxError> {
        loop {
            self.col += self.chw as u32;
            if self.ch == Some('\n') {
                self.line += 1;
                self.col = 0;
            }

            // fast common case: at least one ASCII character
            let byte = self.buf[self.r];
            if byte < SENTINEL {
                self.r += 1;
                self.chw = 1;
                if byte == 0 {
                    return Err(self.error("invalid NUL character"));
                }
                self.ch = Some(byte as char);
                return Ok(());
            }

            // slower general case: add more bytes to the buffer until we
            // have a full rune
            while self.e - self.r < UTF8_MAX
                && !full_rune(&self.buf[self.r..self.e])
                && self.ioerr.is_none()
                && !self.eof
            {
                self.fill();
            }

            // EOF
            if self.r == self.e {
                if let Some(err) = self.ioerr.take() {
                    return Err(self.error(format!("I/O error: {err}")));
                }
                self.ch = None;
                self.chw = 0;
                return Ok(());
            }

            let (ch, chw) = decode_rune(&self.buf[self.r..self.e]);
            self.r += chw;
            self.chw = chw;

            if ch == char::REPLACEMENT_CHARACTER && chw == 1 {
                return Err(self.error("invalid UTF-8 encoding"));
            }

            // BOMs are only allowed as the first character in a file
            const BOM: char = '\u{feff}';
            if ch == BOM {
                if self.line > 0 || self.col > 0 {
                    return Err(self.error("invalid BOM in the middle of the file"));
                }
                self.ch = Some(ch);
                continue;
            }

            self.ch = Some(ch);
            return Ok(());
        }
    }

    /// Reads more source bytes into the buffer, first compacting or growing
    /// it so the active segment is preserved. Returns with at least one more
    /// byte available, or with `eof`/`ioerr` set.
    fn fill(&mut self) {
        // determine content to preserve
        let b = match self.b {
            Some(b) => {
                self.b = Some(0); // content is about to move down
                b
            }
            None => self.r,
        };
        let content_len = self.e - b;

        // grow buffer or move content down
        if content_len * 2 > self.buf.len() {
            let mut grown = vec![0u8; next_size(self.buf.len())];
            grown[..content_len].copy_from_slice(&self.buf[b..self.e]);
            self.buf = grown;
        } else if b > 0 {
            self.buf.copy_within(b..self.e, 0);
        }
        self.r -= b;
        self.e -= b;

        // read more data, tolerating a limited number of interrupts
        let mut attempts = 0;
        loop {
            let free = self.buf.len() - 1; // leave space for the sentinel
            match self.reader.read(&mut self.buf[self.e..free]) {
                Ok(0) => {
                    self.eof = true;
                    break;
                }
                Ok(n) => {
                    self.e += n;
                    break;
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {
                    attempts += 1;
                    if attempts == 10 {
                        self.ioerr = Some(io::Error::other("no progress reading source"));
                        break;
                    }
                }
                Err(err) => {
                    self.ioerr = Some(err);
                    break;
                }
            }
        }

        self.buf[self.e] = SENTINEL;
    }
}

/// Reports whether `buf` begins with a complete UTF-8 encoding of a rune.
/// An invalid lead byte counts as complete: it decodes (to an error) without
/// needing more input.
fn full_rune(buf: &[u8]) -> bool {
    match buf.first() {
        None => false,
        Some(&b) => {
            let need = match b {
                0x00..=0x7f => 1,
                0xc0..=0xdf => 2,
                0xe0..=0xef => 3,
                0xf0..=0xf7 => 4,
                _ => 1,
            };
            buf.len() >= need
        }
    }
}

/// Decodes the first rune in `buf`, which must be non-empty. Invalid input
/// decodes as `(U+FFFD, 1)`, the convention the caller uses to distinguish
/// a genuine replacement character (width 3) from an encoding error.
fn decode_rune(buf: &[u8]) -> (char, usize) {
    let len = match buf[0] {
        0x00..=0x7f => 1,
        0xc2..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf4 => 4,
        _ => return (char::REPLACEMENT_CHARACTER, 1),
    };
    let len = len.min(buf.len());
    match std::str::from_utf8(&buf[..len]) {
        Ok(s) => match s.chars().next() {
            Some(ch) => (ch, ch.len_utf8()),
            None => (char::REPLACEMENT_CHARACTER, 1),
        },
        Err(_) => (char::REPLACEMENT_CHARACTER, 1),
    }
}

/// The next bigger size for a buffer of the given size: at least 4K, doubled
/// up to 1M, then grown additively.
fn next_size(size: usize) -> usize {
    const MIN: usize = 4 << 10;
    const MAX: usize = 1 << 20;
    if size < MIN {
        return MIN;
    }
    if size <= MAX {
        return size << 1;
    }
    size + MAX
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_all<R: Read>(src: &mut Source<R>) -> Result<String, SyntaxError> {
        let mut out = String::new();
        loop {
            src.nextch()?;
            match src.ch {
                Some(ch) => out.push(ch),
                None => return Ok(out),
            }
        }
    }

    #[test]
    fn ascii_stream() {
        let mut src = Source::new("abc".as_bytes(), "t.co");
        assert_eq!(read_all(&mut src).unwrap(), "abc");
    }

    #[test]
    fn unicode_stream() {
        let mut src = Source::new("aπ☺z".as_bytes(), "t.co");
        assert_eq!(read_all(&mut src).unwrap(), "aπ☺z");
    }

    #[test]
    fn line_col_tracking() {
        let mut src = Source::new("ab\ncd".as_bytes(), "t.co");
        src.nextch().unwrap(); // 'a'
        assert_eq!(src.pos(), (1, 1));
        src.nextch().unwrap(); // 'b'
        assert_eq!(src.pos(), (1, 2));
        src.nextch().unwrap(); // '\n'
        src.nextch().unwrap(); // 'c'
        assert_eq!(src.pos(), (2, 1));
    }

    #[test]
    fn columns_count_bytes() {
        // 'π' is two bytes wide, so 'x' starts at byte column 3
        let mut src = Source::new("πx".as_bytes(), "t.co");
        src.nextch().unwrap();
        assert_eq!(src.pos(), (1, 1));
        src.nextch().unwrap();
        assert_eq!(src.pos(), (1, 3));
    }

    #[test]
    fn nul_is_an_error() {
        let mut src = Source::new(&b"a\0b"[..], "t.co");
        src.nextch().unwrap();
        let err = src.nextch().unwrap_err();
        assert_eq!(err.msg, "invalid NUL character");
        assert_eq!(err.pos.line(), 1);
        assert_eq!(err.pos.col(), 2);
    }

    #[test]
    fn invalid_utf8_is_an_error() {
        let mut src = Source::new(&[b'a', 0xff, b'b'][..], "t.co");
        src.nextch().unwrap();
        let err = src.nextch().unwrap_err();
        assert_eq!(err.msg, "invalid UTF-8 encoding");
    }

    #[test]
    fn truncated_rune_at_eof_is_an_error() {
        // lead byte of a 3-byte sequence with only one continuation byte
        let mut src = Source::new(&[0xe2, 0x98][..], "t.co");
        let err = src.nextch().unwrap_err();
        assert_eq!(err.msg, "invalid UTF-8 encoding");
    }

    #[test]
    fn leading_bom_is_skipped() {
        let mut src = Source::new("\u{feff}ab".as_bytes(), "t.co");
        assert_eq!(read_all(&mut src).unwrap(), "ab");
    }

    #[test]
    fn bom_in_the_middle_is_an_error() {
        let mut src = Source::new("a\u{feff}b".as_bytes(), "t.co");
        src.nextch().unwrap();
        let err = src.nextch().unwrap_err();
        assert_eq!(err.msg, "invalid BOM in the middle of the file");
    }

    #[test]
    fn replacement_character_in_source_is_not_an_error() {
        let mut src = Source::new("a\u{fffd}b".as_bytes(), "t.co");
        assert_eq!(read_all(&mut src).unwrap(), "a\u{fffd}b");
    }

    #[test]
    fn segment_capture() {
        let mut src = Source::new("hello world".as_bytes(), "t.co");
        src.nextch().unwrap(); // 'h'
        src.start();
        for _ in 0..5 {
            src.nextch().unwrap();
        }
        // current char is ' ', excluded from the segment
        assert_eq!(src.segment(), b"hello");
        src.stop();
    }

    /// A reader that returns one byte at a time, forcing many refills.
    struct Trickle<'a>(&'a [u8]);

    impl Read for Trickle<'_> {
        fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
            match self.0.split_first() {
                Some((&b, rest)) if !out.is_empty() => {
                    out[0] = b;
                    self.0 = rest;
                    Ok(1)
                }
                _ => Ok(0),
            }
        }
    }

    #[test]
    fn segment_survives_refills() {
        let data = "identifier_name rest".as_bytes();
        let mut src = Source::new(Trickle(data), "t.co");
        src.nextch().unwrap();
        src.start();
        for _ in 0.."identifier_name".len() {
            src.nextch().unwrap();
        }
        assert_eq!(src.segment(), b"identifier_name");
    }

    #[test]
    fn trickled_unicode_decodes() {
        let mut src = Source::new(Trickle("π☺".as_bytes()), "t.co");
        assert_eq!(read_all(&mut src).unwrap(), "π☺");
    }

    /// A reader that always fails after some prefix.
    struct Failing<'a>(&'a [u8]);

    impl Read for Failing<'_> {
        fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
            match self.0.split_first() {
                Some((&b, rest)) if !out.is_empty() => {
                    out[0] = b;
                    self.0 = rest;
                    Ok(1)
                }
                _ => Err(io::Error::other("disk on fire")),
            }
        }
    }

    #[test]
    fn io_errors_surface_with_prefix() {
        let mut src = Source::new(Failing(b"ab"), "t.co");
        src.nextch().unwrap();
        src.nextch().unwrap();
        let err = src.nextch().unwrap_err();
        assert_eq!(err.msg, "I/O error: disk on fire");
    }

    #[test]
    fn buffer_growth() {
        assert_eq!(next_size(0), 4 << 10);
        assert_eq!(next_size(4 << 10), 8 << 10);
        assert_eq!(next_size(1 << 20), 2 << 20);
        assert_eq!(next_size((1 << 20) + 1), (1 << 20) + 1 + (1 << 20));
    }
}
