//! Selector generation.
//!
//! Rules need a stable way to point back at an element; these helpers build
//! a minimal selector that uniquely identifies a node in its tree.

use magpie_dom::{DomTree, NodeId};

use crate::selector::escape::escape_selector_component;

/// Build an id selector for the given raw id value.
///
/// Produces `#escaped-id` when the id can follow a `#`; an id that cannot
/// form a valid id selector (empty, or starting with an ASCII digit) falls
/// back to the `[id="..."]` attribute form.
#[must_use]
pub fn generate_id_selector(id: &str) -> String {
    if id.is_empty() || id.starts_with(|ch: char| ch.is_ascii_digit()) {
        format!("[id=\"{id}\"]")
    } else {
        format!("#{}", escape_selector_component(id))
    }
}

/// Build a unique selector path for an element by walking its ancestors.
///
/// Each step prefers a globally unique `#id` shortcut (which also ends the
/// walk); otherwise it uses the `nth-child`-qualified lowercase tag name.
/// Steps are joined root-to-node with child combinators. Returns `None` for
/// non-element nodes.
#[must_use]
pub fn generate_selector(tree: &DomTree, id: NodeId) -> Option<String> {
    if !tree.is_element(id) {
        return None;
    }
    let mut parts = Vec::new();
    let mut current = Some(id);
    while let Some(node) = current {
        let Some(element) = tree.as_element(node) else {
            break;
        };
        if let Some(element_id) = element.id()
            && is_unique_id(tree, element_id)
        {
            parts.push(generate_id_selector(element_id));
            break;
        }
        let index = tree.element_index(node).unwrap_or(1);
        parts.push(format!("{}:nth-child({index})", element.tag_name));
        current = tree.parent(node);
    }
    parts.reverse();
    Some(parts.join(" > "))
}

/// Whether exactly one element in the tree carries this id.
fn is_unique_id(tree: &DomTree, id_value: &str) -> bool {
    let count = tree
        .descendants(NodeId::ROOT)
        .filter(|&id| {
            tree.as_element(id)
                .is_some_and(|element| element.id() == Some(id_value))
        })
        .count();
    count == 1
}
