//! Common utilities for the Magpie markup linter.
//!
//! This crate provides shared infrastructure used by the lexer, parser, DOM
//! and selector engine:
//! - **Location** - byte-offset spans with line/column positions
//! - **Source** - input text with a starting position for embedded fragments
//! - **Errors** - the fatal lexer/parser error types
//! - **Warning System** - deduplicated colored output for recoverable oddities

pub mod error;
pub mod location;
pub mod source;
pub mod warning;

pub use error::{LexError, ParseError};
pub use location::Location;
pub use source::Source;
