//! CSS selector engine for the Magpie markup linter.
//!
//! # Scope
//!
//! This crate implements:
//! - **Selector parsing** - compounds with combinators (descendant, `>`,
//!   `+`, `~`, `:scope`), class/id/attribute/pseudo-class conditions
//! - **Matching** - subtree search ([`query_selector`],
//!   [`query_selector_all`]) and single-element testing ([`matches`],
//!   [`closest`]), mirror-image traversals over the
//!   [`DomTree`](magpie_dom::DomTree)
//! - **Selector generation** - unique selector paths and id selectors with
//!   CSS escaping
//!
//! # Not implemented
//!
//! - Pseudo-elements and `:not()`
//! - Attribute operators other than `=` (rejected with an error, never a
//!   silent non-match)
//! - Specificity and the cascade (a linter queries, it does not style)

/// Fatal selector errors.
pub mod error;
/// Selector generation.
pub mod generate;
/// Selector parsing and matching.
pub mod selector;

pub use error::SelectorError;
pub use generate::{generate_id_selector, generate_selector};
pub use selector::{
    Combinator, Compound, Condition, Selector, closest, matches, query_selector,
    query_selector_all,
};
