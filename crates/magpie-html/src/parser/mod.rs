//! HTML parser: consumes the token sequence, constructs the DOM tree and
//! emits the ordered notification stream.

/// Conditional-comment scanning.
pub mod conditional;
/// Tree construction.
pub mod core;
/// Linter directive parsing.
pub mod directive;
/// Caller-supplied parse hooks.
pub mod hooks;

pub use self::core::{Parser, ParsingError};
pub use directive::{DirectiveAction, ParsedDirective};
pub use hooks::{NoopHooks, ParserHooks, ProcessedAttribute};
