//! Selector matching.
//!
//! Two traversal directions share the compound test but mirror each other's
//! candidate generation:
//!
//! - **Subtree search** ([`query_selector`], [`query_selector_all`]) walks
//!   the chain left-to-right: each compound generates candidates below or
//!   beside the current root per its combinator, survivors recurse as the
//!   next root, survivors of the final compound are the results.
//! - **Single-element test** ([`matches`], [`closest`]) walks right-to-left:
//!   the element must satisfy the last compound, then some candidate from
//!   the inverse generator of that compound's combinator must satisfy the
//!   remaining chain.

use std::collections::HashSet;

use magpie_dom::{AttrValue, DomTree, ElementData, NodeId};

use crate::SelectorError;

use super::pseudo::{self, MatchContext};
use super::{Combinator, Compound, Condition, Selector};

/// Find every element below `root` matching the selector, in document
/// order, de-duplicated by node identity.
///
/// # Errors
///
/// Returns a [`SelectorError`] for malformed selectors, unknown
/// pseudo-classes or unimplemented attribute operators.
pub fn query_selector_all(
    tree: &DomTree,
    root: NodeId,
    selector: &str,
) -> Result<Vec<NodeId>, SelectorError> {
    let selector = Selector::parse(selector)?;
    if selector.compounds.is_empty() {
        return Ok(Vec::new());
    }
    let context = MatchContext { scope: root };
    let mut results = Vec::new();
    match_compounds(tree, &selector.compounds, root, &context, &mut results)?;
    let mut seen = HashSet::new();
    Ok(results.into_iter().filter(|id| seen.insert(*id)).collect())
}

/// Find the first element below `root` matching the selector.
///
/// # Errors
///
/// Returns a [`SelectorError`] for malformed selectors, unknown
/// pseudo-classes or unimplemented attribute operators.
pub fn query_selector(
    tree: &DomTree,
    root: NodeId,
    selector: &str,
) -> Result<Option<NodeId>, SelectorError> {
    Ok(query_selector_all(tree, root, selector)?.into_iter().next())
}

/// Test a single element against the selector (right-to-left traversal).
///
/// # Errors
///
/// Returns a [`SelectorError`] for malformed selectors, unknown
/// pseudo-classes or unimplemented attribute operators.
pub fn matches(tree: &DomTree, element: NodeId, selector: &str) -> Result<bool, SelectorError> {
    let selector = Selector::parse(selector)?;
    if selector.compounds.is_empty() {
        return Ok(false);
    }
    let context = MatchContext { scope: element };
    matches_chain(tree, &selector.compounds, element, &context)
}

/// The element itself or its nearest ancestor matching the selector.
///
/// # Errors
///
/// Returns a [`SelectorError`] for malformed selectors, unknown
/// pseudo-classes or unimplemented attribute operators.
pub fn closest(
    tree: &DomTree,
    element: NodeId,
    selector: &str,
) -> Result<Option<NodeId>, SelectorError> {
    let parsed = Selector::parse(selector)?;
    if parsed.compounds.is_empty() {
        return Ok(None);
    }
    let context = MatchContext { scope: element };
    let mut current = Some(element);
    while let Some(id) = current {
        if tree.is_element(id) && matches_chain(tree, &parsed.compounds, id, &context)? {
            return Ok(Some(id));
        }
        current = tree.parent(id);
    }
    Ok(None)
}

/// Left-to-right traversal: generate candidates for the first compound,
/// recurse with each survivor as the new root.
fn match_compounds(
    tree: &DomTree,
    compounds: &[Compound],
    root: NodeId,
    context: &MatchContext,
    results: &mut Vec<NodeId>,
) -> Result<(), SelectorError> {
    let Some((first, rest)) = compounds.split_first() else {
        return Ok(());
    };
    for candidate in forward_candidates(tree, first.combinator, root) {
        if matches_compound(tree, candidate, first, context)? {
            if rest.is_empty() {
                results.push(candidate);
            } else {
                match_compounds(tree, rest, candidate, context, results)?;
            }
        }
    }
    Ok(())
}

/// Right-to-left traversal: the element must satisfy the last compound, then
/// some inverse candidate must satisfy the remaining chain.
fn matches_chain(
    tree: &DomTree,
    compounds: &[Compound],
    element: NodeId,
    context: &MatchContext,
) -> Result<bool, SelectorError> {
    let Some((last, front)) = compounds.split_last() else {
        return Ok(true);
    };
    if !matches_compound(tree, element, last, context)? {
        return Ok(false);
    }
    if front.is_empty() {
        return Ok(true);
    }
    for candidate in inverse_candidates(tree, last.combinator, element, context) {
        if matches_chain(tree, front, candidate, context)? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Candidates generated per combinator when walking left-to-right.
fn forward_candidates(tree: &DomTree, combinator: Combinator, root: NodeId) -> Vec<NodeId> {
    match combinator {
        Combinator::Descendant => tree
            .descendants(root)
            .filter(|&id| tree.is_element(id))
            .collect(),
        Combinator::Child => tree
            .children(root)
            .iter()
            .copied()
            .filter(|&id| tree.is_element(id))
            .collect(),
        Combinator::AdjacentSibling => tree.next_element_sibling(root).into_iter().collect(),
        Combinator::GeneralSibling => tree
            .following_siblings(root)
            .into_iter()
            .filter(|&id| tree.is_element(id))
            .collect(),
        Combinator::Scope => vec![root],
    }
}

/// Mirror-image candidates used by the right-to-left traversal.
fn inverse_candidates(
    tree: &DomTree,
    combinator: Combinator,
    element: NodeId,
    context: &MatchContext,
) -> Vec<NodeId> {
    match combinator {
        Combinator::Descendant => tree
            .ancestors(element)
            .filter(|&id| tree.is_element(id))
            .collect(),
        Combinator::Child => tree
            .parent(element)
            .filter(|&id| tree.is_element(id))
            .into_iter()
            .collect(),
        Combinator::AdjacentSibling => tree
            .preceding_siblings(element)
            .into_iter()
            .find(|&id| tree.is_element(id))
            .into_iter()
            .collect(),
        Combinator::GeneralSibling => tree
            .preceding_siblings(element)
            .into_iter()
            .filter(|&id| tree.is_element(id))
            .collect(),
        Combinator::Scope => vec![context.scope],
    }
}

/// Test one element against one compound: tag, then every condition.
fn matches_compound(
    tree: &DomTree,
    id: NodeId,
    compound: &Compound,
    context: &MatchContext,
) -> Result<bool, SelectorError> {
    let Some(element) = tree.as_element(id) else {
        return Ok(false);
    };
    if let Some(tag) = &compound.tag
        && element.tag_name != *tag
    {
        return Ok(false);
    }
    for condition in &compound.conditions {
        if !matches_condition(tree, id, element, condition, context)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn matches_condition(
    tree: &DomTree,
    id: NodeId,
    element: &ElementData,
    condition: &Condition,
    context: &MatchContext,
) -> Result<bool, SelectorError> {
    match condition {
        Condition::Class(name) => Ok(element.class_list().contains(name)),
        Condition::Id(value) => Ok(element.id() == Some(value.as_str())),
        Condition::Attribute { key, value } => {
            let occurrences = element.get_attribute_all(key);
            match value {
                None => Ok(!occurrences.is_empty()),
                Some(expected) => Ok(occurrences.iter().any(|attr| match &attr.value {
                    // A boolean attribute only equals the empty string; a
                    // dynamic value is unknown and never equals anything.
                    None => expected.is_empty(),
                    Some(AttrValue::Static(actual)) => actual == expected,
                    Some(AttrValue::Dynamic(_)) => false,
                })),
            }
        }
        Condition::Pseudo { name, argument } => {
            pseudo::evaluate(tree, id, name, argument.as_deref(), context)
        }
    }
}
