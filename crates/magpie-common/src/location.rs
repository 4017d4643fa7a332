//! Source locations.
//!
//! Every token, node and attribute carries a [`Location`] describing the span
//! of original text it was read from, so that diagnostics can point at the
//! exact place in the input with a caret-style excerpt.

use core::fmt;

/// A span in the original source text.
///
/// `offset` and `size` are byte positions into the source data, so that
/// `data[offset..offset + size]` reproduces the spanned text exactly.
/// `line` and `column` are the human-readable position of the first byte,
/// both 1-based; `column` counts characters, not bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// Name of the file (or fragment) the span was read from.
    pub filename: String,
    /// Byte offset of the first byte of the span.
    pub offset: usize,
    /// 1-based line of the first character.
    pub line: u32,
    /// 1-based column of the first character, counted in characters.
    pub column: u32,
    /// Size of the span in bytes.
    pub size: usize,
}

impl Location {
    /// Create a new location.
    #[must_use]
    pub const fn new(filename: String, offset: usize, line: u32, column: u32, size: usize) -> Self {
        Self {
            filename,
            offset,
            line,
            column,
            size,
        }
    }

    /// Derive a sub-span within this location.
    ///
    /// `delta` is the byte (and column) distance from the start of this span
    /// to the start of the sub-span. The spanned text must not contain line
    /// breaks before `delta`; the caller is responsible for only slicing
    /// within a single line (attribute values and directive payloads never
    /// span lines).
    ///
    /// # Panics
    ///
    /// Panics in debug builds if the sub-span extends past this span.
    #[must_use]
    pub fn sliced(&self, delta: usize, size: usize) -> Self {
        debug_assert!(delta + size <= self.size, "sub-span exceeds parent span");
        Self {
            filename: self.filename.clone(),
            offset: self.offset + delta,
            line: self.line,
            column: self.column + u32::try_from(delta).unwrap_or(u32::MAX),
            size,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.filename, self.line, self.column)
    }
}
