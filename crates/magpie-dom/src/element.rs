//! Element data.

use crate::attribute::{Attribute, AttrValue};
use crate::meta::ElementMeta;
use crate::token_list::TokenList;

/// How an element was closed.
///
/// The state starts at [`Open`](Closed::Open) and transitions forward
/// exactly once; the parser never reopens an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Closed {
    /// Still open (or closed implicitly at end of stream).
    Open,
    /// Closed by an explicit end tag: `<div></div>`.
    EndTag,
    /// Void element closed by its own start tag: `<input>`.
    VoidOmitted,
    /// Closed by self-closing syntax: `<input/>`.
    VoidSelfClosed,
    /// Closed because a later tag implied its end tag: `<li>a<li>b`.
    ImplicitClosed,
}

/// Element-specific data: tag name, closed state, metadata and attributes.
///
/// The attribute list is ordered and keeps duplicate keys; lookup is
/// case-insensitive and first-wins.
#[derive(Debug, Clone)]
pub struct ElementData {
    /// Lowercased tag name, prefixed with the namespace inside retained
    /// foreign content (`svg:title`).
    pub tag_name: String,
    /// Parser-relevant metadata, if the tag is known.
    pub meta: Option<ElementMeta>,
    closed: Closed,
    attributes: Vec<Attribute>,
}

impl ElementData {
    /// Create element data for the given (already lowercased) tag name.
    #[must_use]
    pub fn new(tag_name: impl Into<String>, meta: Option<ElementMeta>) -> Self {
        Self {
            tag_name: tag_name.into(),
            meta,
            closed: Closed::Open,
            attributes: Vec::new(),
        }
    }

    /// The current closed state.
    #[must_use]
    pub const fn closed(&self) -> Closed {
        self.closed
    }

    /// Whether the element has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed != Closed::Open
    }

    /// Transition the closed state.
    ///
    /// The transition is forward-only: once an element has left
    /// [`Closed::Open`] further calls are ignored, so a void element closed
    /// by its own start tag is not re-closed by a stray end tag.
    pub fn close(&mut self, how: Closed) {
        if self.closed == Closed::Open && how != Closed::Open {
            self.closed = how;
        }
    }

    /// Whether the metadata marks this element void.
    #[must_use]
    pub fn is_void(&self) -> bool {
        self.meta.is_some_and(|meta| meta.void)
    }

    /// Whether the metadata marks this element's content foreign.
    #[must_use]
    pub fn is_foreign(&self) -> bool {
        self.meta.is_some_and(|meta| meta.foreign)
    }

    /// Append an attribute occurrence. Duplicates are kept in source order.
    pub fn add_attribute(&mut self, attribute: Attribute) {
        self.attributes.push(attribute);
    }

    /// All attribute occurrences in source order.
    #[must_use]
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// The first attribute with the given (case-insensitive) key.
    #[must_use]
    pub fn get_attribute(&self, key: &str) -> Option<&Attribute> {
        let key = key.to_ascii_lowercase();
        self.attributes.iter().find(|attr| attr.key == key)
    }

    /// Every attribute with the given (case-insensitive) key, in source order.
    #[must_use]
    pub fn get_attribute_all(&self, key: &str) -> Vec<&Attribute> {
        let key = key.to_ascii_lowercase();
        self.attributes
            .iter()
            .filter(|attr| attr.key == key)
            .collect()
    }

    /// Whether any occurrence of the attribute exists.
    #[must_use]
    pub fn has_attribute(&self, key: &str) -> bool {
        self.get_attribute(key).is_some()
    }

    /// The element's id, if it has a static `id` attribute.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        match self.get_attribute("id")?.value.as_ref()? {
            AttrValue::Static(text) => Some(text),
            AttrValue::Dynamic(_) => None,
        }
    }

    /// The element's class list, split from the first `class` attribute.
    ///
    /// A dynamic class value yields an empty list that still exposes the raw
    /// expression; a missing attribute yields an empty list.
    #[must_use]
    pub fn class_list(&self) -> TokenList {
        match self.get_attribute("class") {
            Some(attr) => TokenList::new(attr.value.as_ref(), attr.value_location.as_ref()),
            None => TokenList::new(None, None),
        }
    }
}
