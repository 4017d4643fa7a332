//! Fatal lexer and parser errors.
//!
//! Both error types abort the current parse; structural problems in the
//! markup (stray or unclosed tags) are not errors at this layer - the parser
//! recovers from those and leaves judging them to the rule layer.

use thiserror::Error;

use crate::location::Location;

/// No tokenization rule matched the current lexer state.
///
/// Always fatal. The message includes a truncated excerpt of the input at the
/// point of failure.
#[derive(Debug, Clone, Error)]
#[error("{message} ({location})")]
pub struct LexError {
    /// Description of the failure, including a context excerpt.
    pub message: String,
    /// Where tokenization stopped.
    pub location: Location,
}

impl LexError {
    /// Create a new lexer error.
    #[must_use]
    pub const fn new(message: String, location: Location) -> Self {
        Self { message, location }
    }
}

/// The token stream could not be assembled into a document.
///
/// Raised when an expected token never arrives (e.g. a tag is never closed
/// before the stream ends) or when a directive comment is malformed. Always
/// fatal.
#[derive(Debug, Clone, Error)]
#[error("{message} ({location})")]
pub struct ParseError {
    /// Description of the failure.
    pub message: String,
    /// Where the failing scan began.
    pub location: Location,
}

impl ParseError {
    /// Create a new parser error.
    #[must_use]
    pub const fn new(message: String, location: Location) -> Self {
        Self { message, location }
    }
}
