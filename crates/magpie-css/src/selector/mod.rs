//! CSS selector parsing and matching.
//!
//! A selector is a chain of compounds, each tied to the previous one by a
//! combinator. Matching runs in two directions: subtree search walks the
//! chain left-to-right generating candidates per combinator, while
//! single-element testing walks right-to-left using the inverse candidate
//! generators. See [Selectors Level 4](https://www.w3.org/TR/selectors-4/)
//! for the subset implemented here.

/// CSS escaping for selector components.
pub mod escape;
/// Subtree and single-element matching.
pub mod matcher;
/// Selector-string parsing.
pub mod parser;
/// The pseudo-class registry.
pub mod pseudo;

pub use matcher::{closest, matches, query_selector, query_selector_all};

/// [§ 16 Combinators](https://www.w3.org/TR/selectors-4/#combinators)
///
/// "A combinator is punctuation that represents a particular kind of
/// relationship between the selectors on either side."
///
/// Each compound stores the combinator relating it to the previous compound;
/// the first compound of a selector relates to the query root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// [§ 16.1](https://www.w3.org/TR/selectors-4/#descendant-combinators)
    /// Whitespace: `A B` matches a `B` anywhere below an `A`.
    Descendant,
    /// [§ 16.2](https://www.w3.org/TR/selectors-4/#child-combinators)
    /// `A > B` matches a `B` that is a direct child of an `A`.
    Child,
    /// [§ 16.3](https://www.w3.org/TR/selectors-4/#adjacent-sibling-combinators)
    /// `A + B` matches a `B` immediately following an `A`.
    AdjacentSibling,
    /// [§ 16.4](https://www.w3.org/TR/selectors-4/#general-sibling-combinators)
    /// `A ~ B` matches a `B` following an `A` among the same siblings.
    GeneralSibling,
    /// The compound applies to the query root itself (`:scope`).
    Scope,
}

/// A single condition within a compound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// `.class` - exact class-list membership.
    Class(String),
    /// `#id` - exact id match (escape sequences already reversed).
    Id(String),
    /// `[attr]` / `[attr="value"]` - existence or exact value. Any other
    /// attribute operator is rejected while parsing.
    Attribute {
        /// Lowercased attribute name.
        key: String,
        /// Expected value; `None` tests existence only.
        value: Option<String>,
    },
    /// `:pseudo` / `:pseudo(args)` - resolved through the registry when the
    /// query runs.
    Pseudo {
        /// The pseudo-class name.
        name: String,
        /// The parenthesized argument, if any.
        argument: Option<String>,
    },
}

/// [§ 4.2 Compound selectors](https://www.w3.org/TR/selectors-4/#compound)
///
/// "A compound selector is a sequence of simple selectors that are not
/// separated by a combinator": an optional tag name plus conditions, tied to
/// the previous compound by a combinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compound {
    /// How this compound relates to the previous one (or the query root).
    pub combinator: Combinator,
    /// Lowercased tag name; `None` is the universal selector.
    pub tag: Option<String>,
    /// Conditions, all of which must hold.
    pub conditions: Vec<Condition>,
}

/// A parsed selector: an ordered chain of compounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    /// The compounds, left to right. An empty chain matches nothing.
    pub compounds: Vec<Compound>,
}

impl Selector {
    /// Parse a selector string.
    ///
    /// # Errors
    ///
    /// Returns [`SelectorError::UnsupportedOperator`](crate::SelectorError::UnsupportedOperator)
    /// for attribute operators other than `=`.
    pub fn parse(text: &str) -> Result<Self, crate::SelectorError> {
        parser::parse_selector(text)
    }
}
