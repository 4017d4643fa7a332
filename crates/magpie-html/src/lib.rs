//! HTML5-tolerant lexer and parser for the Magpie markup linter.
//!
//! # Scope
//!
//! This crate implements:
//! - **Lexer** - an explicit state machine turning a
//!   [`Source`](magpie_common::Source) into a one-pass token sequence:
//!   doctype, tags, attributes, raw-text content models for
//!   `<script>`/`<style>`, templating placeholders, conditional comments and
//!   linter directives.
//! - **Parser / Tree Builder** - consumes the token sequence, constructs a
//!   [`DomTree`](magpie_dom::DomTree) and emits an ordered notification
//!   stream. Malformed structure is recovered from with HTML's
//!   implicit-closing rules; foreign content is discarded except for the
//!   svg `title`/`desc` allow-list.
//!
//! # Not implemented
//!
//! - Standards-complete HTML5 tree construction (no adoption agency
//!   algorithm)
//! - Character reference resolution (linting works on the raw text)
//! - Rendering or live DOM mutation beyond what parsing needs

/// Parse notifications and the event bus.
pub mod event;
/// The tokenizer.
pub mod lexer;
/// The tree builder.
pub mod parser;

pub use event::{Event, EventBus, EventKind};
pub use lexer::{Lexer, Token, TokenData};
pub use parser::{
    DirectiveAction, NoopHooks, Parser, ParserHooks, ParsingError, ProcessedAttribute,
};
