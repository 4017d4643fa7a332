//! Caller-supplied parse hooks.
//!
//! Templating integrations customize parsing through two seams: rewriting
//! attributes before they are recorded (e.g. aliasing `dynamic-class` to a
//! dynamic `class`) and mutating an element after construction (e.g. loading
//! alternate metadata). The parser calls the hooks; their implementations
//! live with the caller.

use magpie_common::Location;
use magpie_dom::{AttrValue, DomTree, NodeId};

/// An attribute as seen by [`ParserHooks::process_attribute`], before it is
/// recorded on the element.
#[derive(Debug, Clone)]
pub struct ProcessedAttribute {
    /// Lowercased attribute name.
    pub key: String,
    /// The value (`None` for boolean attributes).
    pub value: Option<AttrValue>,
    /// Quote character used around the value, if any.
    pub quote: Option<char>,
    /// Span of the attribute name.
    pub key_location: Location,
    /// Span of the attribute value, if one was written.
    pub value_location: Option<Location>,
    /// Original name when a previous transform aliased this attribute.
    pub original_attribute: Option<String>,
}

/// Hooks invoked by the parser during tree construction.
pub trait ParserHooks {
    /// Rewrite an attribute into zero or more attributes.
    ///
    /// The default implementation records the attribute unchanged. A
    /// transform aliasing an attribute should set
    /// [`original_attribute`](ProcessedAttribute::original_attribute) on the
    /// replacement.
    fn process_attribute(&mut self, attr: ProcessedAttribute) -> Vec<ProcessedAttribute> {
        vec![attr]
    }

    /// Mutate an element after construction, before `element:ready` fires.
    fn process_element(&mut self, tree: &mut DomTree, id: NodeId) {
        let _ = (tree, id);
    }
}

/// The default hooks: no rewriting, no mutation.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHooks;

impl ParserHooks for NoopHooks {}
