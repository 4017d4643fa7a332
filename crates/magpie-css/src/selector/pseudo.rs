//! The pseudo-class registry.
//!
//! Pseudo-classes resolve through a small name-to-function table bound to a
//! per-query [`MatchContext`] carrying the scope root. An unrecognized name
//! is a fatal error raised when the query runs, never a silent non-match.

use magpie_dom::{DomTree, NodeId};

use crate::SelectorError;

/// Context shared by every compound of one top-level query.
#[derive(Debug, Clone, Copy)]
pub struct MatchContext {
    /// The element `:scope` refers to.
    pub scope: NodeId,
}

type PseudoFn = fn(&DomTree, NodeId, Option<&str>, &MatchContext) -> Result<bool, SelectorError>;

/// The registered pseudo-classes.
const REGISTRY: &[(&str, PseudoFn)] = &[
    ("first-child", first_child),
    ("last-child", last_child),
    ("nth-child", nth_child),
    ("scope", scope),
];

/// Check that a pseudo-class name is in the registry, so a bogus name fails
/// the query against any tree, not just one containing candidates.
pub(crate) fn ensure_registered(name: &str) -> Result<(), SelectorError> {
    if REGISTRY.iter().any(|(entry, _)| *entry == name) {
        Ok(())
    } else {
        Err(SelectorError::UnknownPseudoClass(name.to_string()))
    }
}

/// Evaluate a pseudo-class against an element.
///
/// # Errors
///
/// Returns [`SelectorError::UnknownPseudoClass`] for names not in the
/// registry, and argument errors from the individual pseudo-classes.
pub fn evaluate(
    tree: &DomTree,
    id: NodeId,
    name: &str,
    argument: Option<&str>,
    context: &MatchContext,
) -> Result<bool, SelectorError> {
    let Some((_, callback)) = REGISTRY.iter().find(|(entry, _)| *entry == name) else {
        return Err(SelectorError::UnknownPseudoClass(name.to_string()));
    };
    callback(tree, id, argument, context)
}

/// [§ 4.12 :first-child](https://www.w3.org/TR/selectors-4/#the-first-child-pseudo)
fn first_child(
    tree: &DomTree,
    id: NodeId,
    _argument: Option<&str>,
    _context: &MatchContext,
) -> Result<bool, SelectorError> {
    Ok(tree.element_index(id) == Some(1))
}

/// [§ 4.12 :last-child](https://www.w3.org/TR/selectors-4/#the-last-child-pseudo)
fn last_child(
    tree: &DomTree,
    id: NodeId,
    _argument: Option<&str>,
    _context: &MatchContext,
) -> Result<bool, SelectorError> {
    let Some(index) = tree.element_index(id) else {
        return Ok(false);
    };
    let Some(parent) = tree.parent(id) else {
        return Ok(false);
    };
    let count = tree
        .children(parent)
        .iter()
        .filter(|&&child| tree.is_element(child))
        .count();
    Ok(index == count)
}

/// `:nth-child(n)` with a plain integer argument only.
fn nth_child(
    tree: &DomTree,
    id: NodeId,
    argument: Option<&str>,
    _context: &MatchContext,
) -> Result<bool, SelectorError> {
    let Some(argument) = argument.filter(|argument| !argument.is_empty()) else {
        return Err(SelectorError::MissingArgument("nth-child".to_string()));
    };
    let expected: usize = argument
        .trim()
        .parse()
        .map_err(|_| SelectorError::InvalidNthChild(argument.to_string()))?;
    Ok(tree.element_index(id) == Some(expected))
}

/// `:scope` matches only the query root.
fn scope(
    _tree: &DomTree,
    id: NodeId,
    _argument: Option<&str>,
    context: &MatchContext,
) -> Result<bool, SelectorError> {
    Ok(id == context.scope)
}
