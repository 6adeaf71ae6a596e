//! Compact source positions
//!
//! A [`Pos`] encodes a source file, line number, and column number in eight
//! bytes, so every AST node can carry one without any concern for memory use.
//! File names are interned in a process-wide registry; a `Pos` stores only
//! the interned index. The zero value is a valid, "unknown" position.

use std::collections::HashMap;
use std::fmt;
use std::sync::{OnceLock, RwLock};

// Bit distribution of the packed line/column word. The line bits sit at the
// more significant side so packed words compare in source order.
const LINE_BITS: u32 = 20;
const COL_BITS: u32 = 12;

/// Maximum line number representable by a [`Pos`].
/// Larger line numbers saturate to this value.
pub const LINE_MAX: u32 = (1 << LINE_BITS) - 1;

/// Maximum column number representable by a [`Pos`].
/// Larger column numbers saturate to this value.
pub const COL_MAX: u32 = (1 << COL_BITS) - 1;

const _: () = assert!(LINE_BITS + COL_BITS == 32);

/// An absolute position of a byte in a source file.
///
/// A `Pos` is considered known once it has an associated source file; the
/// default value is the canonical unknown position [`NO_POS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Pos {
    index: u32,
    lico: u32,
}

/// The zero value for [`Pos`], representing an invalid or absent position.
pub const NO_POS: Pos = Pos { index: 0, lico: 0 };

impl Pos {
    /// Creates a position from a file name and 1-based line/column numbers.
    ///
    /// Line and column numbers beyond [`LINE_MAX`]/[`COL_MAX`] saturate. An
    /// empty file name is not interned and yields an unknown position.
    pub fn make(filename: &str, line: u32, col: u32) -> Pos {
        Pos {
            index: insert(filename),
            lico: lico(line, col),
        }
    }

    /// Reports whether this is a known position.
    pub fn known(self) -> bool {
        self.index != 0
    }

    /// Reports whether `self` appears before `q` in the source code.
    /// Also reports false if either position is unknown or they are from
    /// different source files.
    pub fn before(self, q: Pos) -> bool {
        self.index != 0 && self.index == q.index && self.lico < q.lico
    }

    /// Reports whether `self` appears after `q` in the source code.
    /// Also reports false if either position is unknown or they are from
    /// different source files.
    pub fn after(self, q: Pos) -> bool {
        self.index != 0 && self.index == q.index && self.lico > q.lico
    }

    /// The file name, or an empty string for an unknown position.
    pub fn filename(self) -> String {
        lookup(self.index)
    }

    /// The line number; zero means unknown.
    pub fn line(self) -> u32 {
        self.lico >> COL_BITS
    }

    /// The column number; zero means unknown.
    pub fn col(self) -> u32 {
        self.lico & COL_MAX
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.index == 0 {
            return f.write_str("<unknown position>");
        }
        if self.line() == 0 {
            return write!(f, "{}", lookup(self.index));
        }
        if self.col() == 0 {
            return write!(f, "{}:{}", lookup(self.index), self.line());
        }
        write!(f, "{}:{}:{}", lookup(self.index), self.line(), self.col())
    }
}

/// Packs a line and column number into a single word, saturating both.
fn lico(line: u32, col: u32) -> u32 {
    line.min(LINE_MAX) << COL_BITS | col.min(COL_MAX)
}

// ----------------------------------------------------------------------------
// File-name registry

#[derive(Default)]
struct FileTable {
    names: Vec<String>,          // index -> filename
    index: HashMap<String, u32>, // filename -> index
}

fn table() -> &'static RwLock<FileTable> {
    static TABLE: OnceLock<RwLock<FileTable>> = OnceLock::new();
    TABLE.get_or_init(|| RwLock::new(FileTable::default()))
}

/// Interns `filename` into the global file table and returns its 1-based
/// index. Empty file names are not inserted; they map to index 0.
fn insert(filename: &str) -> u32 {
    if filename.is_empty() {
        return 0;
    }

    let mut t = table().write().unwrap_or_else(|e| e.into_inner());
    if let Some(&index) = t.index.get(filename) {
        return index;
    }

    let index = t.names.len() as u32 + 1;
    t.index.insert(filename.to_string(), index);
    t.names.push(filename.to_string());
    index
}

/// Looks up an index in the global file table. Index 0 and out-of-range
/// indices yield an empty string.
fn lookup(index: u32) -> String {
    if index == 0 {
        return String::new();
    }

    let t = table().read().unwrap_or_else(|e| e.into_inner());
    t.names
        .get(index as usize - 1)
        .cloned()
        .unwrap_or_default()
}
