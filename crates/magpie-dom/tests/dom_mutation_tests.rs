//! Integration tests for tree mutation, attributes and the node cache.

use magpie_common::Location;
use magpie_dom::{
    AttrValue, Attribute, Closed, DomTree, DynamicValue, ElementData, NodeId, TextValue,
    element_meta,
};

fn loc(offset: usize) -> Location {
    Location::new("inline.html".to_string(), offset, 1, 1, 1)
}

fn element(tree: &mut DomTree, tag: &str) -> NodeId {
    let data = ElementData::new(tag, element_meta(tag));
    tree.alloc_element(data, loc(0))
}

#[test]
fn test_root_is_document() {
    let tree = DomTree::new("inline.html");
    let root = tree.get(NodeId::ROOT).expect("root exists");
    assert_eq!(root.node_name(), "#document");
}

#[test]
fn test_append_sets_parent_and_order() {
    let mut tree = DomTree::new("inline.html");
    let a = element(&mut tree, "a");
    let b = element(&mut tree, "b");
    tree.append(NodeId::ROOT, a);
    tree.append(NodeId::ROOT, b);
    assert_eq!(tree.children(NodeId::ROOT), [a, b]);
    assert_eq!(tree.parent(a), Some(NodeId::ROOT));
}

#[test]
fn test_append_reparents_instead_of_duplicating() {
    let mut tree = DomTree::new("inline.html");
    let div = element(&mut tree, "div");
    let span = element(&mut tree, "span");
    tree.append(NodeId::ROOT, div);
    tree.append(NodeId::ROOT, span);
    // Move span under div; it must leave the root's child list.
    tree.append(div, span);
    assert_eq!(tree.children(NodeId::ROOT), [div]);
    assert_eq!(tree.children(div), [span]);
    assert_eq!(tree.parent(span), Some(div));
}

#[test]
fn test_insert_before() {
    let mut tree = DomTree::new("inline.html");
    let a = element(&mut tree, "a");
    let b = element(&mut tree, "b");
    let c = element(&mut tree, "c");
    tree.append(NodeId::ROOT, a);
    tree.append(NodeId::ROOT, c);
    tree.insert_before(NodeId::ROOT, b, c);
    assert_eq!(tree.children(NodeId::ROOT), [a, b, c]);
}

#[test]
fn test_remove_child_detaches() {
    let mut tree = DomTree::new("inline.html");
    let a = element(&mut tree, "a");
    tree.append(NodeId::ROOT, a);
    tree.remove_child(NodeId::ROOT, a);
    assert!(tree.children(NodeId::ROOT).is_empty());
    assert_eq!(tree.parent(a), None);
}

#[test]
fn test_node_ids_are_monotonic() {
    let mut tree = DomTree::new("inline.html");
    let a = element(&mut tree, "a");
    let b = element(&mut tree, "b");
    let c = element(&mut tree, "c");
    assert!(NodeId::ROOT < a && a < b && b < c);
}

#[test]
fn test_closed_state_transitions_forward_only() {
    let mut data = ElementData::new("p", element_meta("p"));
    assert_eq!(data.closed(), Closed::Open);
    data.close(Closed::EndTag);
    assert_eq!(data.closed(), Closed::EndTag);
    // A second transition is ignored.
    data.close(Closed::ImplicitClosed);
    assert_eq!(data.closed(), Closed::EndTag);
}

#[test]
fn test_attribute_first_wins_and_all_in_order() {
    let mut data = ElementData::new("p", None);
    data.add_attribute(Attribute::new("class", Some(AttrValue::from("a")), loc(0), None));
    data.add_attribute(Attribute::new("class", Some(AttrValue::from("b")), loc(8), None));
    assert_eq!(
        data.get_attribute("class").and_then(Attribute::value_text),
        Some("a")
    );
    let values: Vec<Option<&str>> = data
        .get_attribute_all("CLASS")
        .iter()
        .map(|attr| attr.value_text())
        .collect();
    assert_eq!(values, [Some("a"), Some("b")]);
}

#[test]
fn test_dynamic_attribute_value_text_is_expression() {
    let mut data = ElementData::new("p", None);
    let value = AttrValue::Dynamic(DynamicValue::new("user.name"));
    data.add_attribute(Attribute::new("title", Some(value), loc(0), None));
    let attr = data.get_attribute("title").expect("attribute exists");
    assert!(attr.is_dynamic());
    assert_eq!(attr.value_text(), Some("user.name"));
}

#[test]
fn test_text_content_concatenates_descendants() {
    let mut tree = DomTree::new("inline.html");
    let div = element(&mut tree, "div");
    let p = element(&mut tree, "p");
    let hello = tree.alloc_text(TextValue::Static("hello ".to_string()), loc(0));
    let world = tree.alloc_text(TextValue::Static("world".to_string()), loc(6));
    tree.append(NodeId::ROOT, div);
    tree.append(div, hello);
    tree.append(div, p);
    tree.append(p, world);
    assert_eq!(tree.text_content(div), "hello world");
}

#[test]
fn test_cache_reads_absent_until_enabled() {
    let mut tree = DomTree::new("inline.html");
    let div = element(&mut tree, "div");
    tree.append(NodeId::ROOT, div);
    assert!(!tree.is_cache_enabled(div));

    // Not yet enabled: every read recomputes.
    let text = tree.alloc_text(TextValue::Static("a".to_string()), loc(0));
    tree.append(div, text);
    assert_eq!(tree.text_content(div), "a");

    tree.enable_cache(div);
    assert_eq!(tree.text_content(div), "a");

    // Enabled and memoized: later mutations no longer show through.
    let more = tree.alloc_text(TextValue::Static("b".to_string()), loc(1));
    tree.append(div, more);
    assert_eq!(tree.text_content(div), "a");
}

#[test]
fn test_rule_annotations_are_node_local() {
    let mut tree = DomTree::new("inline.html");
    let a = element(&mut tree, "a");
    let b = element(&mut tree, "b");
    tree.append(NodeId::ROOT, a);
    tree.append(NodeId::ROOT, b);
    tree.get_mut(a)
        .expect("node exists")
        .disable_rules(["attr-case"]);
    tree.get_mut(b).expect("node exists").block_rules(["no-dup"]);
    assert!(tree.get(a).expect("node").is_rule_disabled("attr-case"));
    assert!(!tree.get(b).expect("node").is_rule_disabled("attr-case"));
    assert!(tree.get(b).expect("node").is_rule_blocked("no-dup"));
}

#[test]
fn test_element_index_counts_element_siblings_only() {
    let mut tree = DomTree::new("inline.html");
    let ul = element(&mut tree, "ul");
    let text = tree.alloc_text(TextValue::Static("\n".to_string()), loc(0));
    let li1 = element(&mut tree, "li");
    let li2 = element(&mut tree, "li");
    tree.append(NodeId::ROOT, ul);
    tree.append(ul, text);
    tree.append(ul, li1);
    tree.append(ul, li2);
    assert_eq!(tree.element_index(li1), Some(1));
    assert_eq!(tree.element_index(li2), Some(2));
    assert_eq!(tree.element_index(text), None);
}

#[test]
fn test_is_descendant_of() {
    let mut tree = DomTree::new("inline.html");
    let div = element(&mut tree, "div");
    let p = element(&mut tree, "p");
    let other = element(&mut tree, "span");
    tree.append(NodeId::ROOT, div);
    tree.append(div, p);
    tree.append(NodeId::ROOT, other);
    assert!(tree.is_descendant_of(p, div));
    assert!(tree.is_descendant_of(p, NodeId::ROOT));
    assert!(!tree.is_descendant_of(other, div));
}

#[test]
fn test_dump_renders_indented_tree() {
    let mut tree = DomTree::new("inline.html");
    let div = element(&mut tree, "div");
    let text = tree.alloc_text(TextValue::Static("x".to_string()), loc(0));
    tree.append(NodeId::ROOT, div);
    tree.append(div, text);
    assert_eq!(tree.dump(NodeId::ROOT), "#document\n  div\n    #text\n");
}

#[test]
fn test_is_closed() {
    let mut data = ElementData::new("p", element_meta("p"));
    assert!(!data.is_closed());
    data.close(Closed::ImplicitClosed);
    assert!(data.is_closed());
}

#[test]
fn test_metadata_lookup() {
    assert!(element_meta("input").expect("input meta").void);
    assert!(element_meta("svg").expect("svg meta").foreign);
    assert!(element_meta("li")
        .expect("li meta")
        .implicit_closed
        .contains(&"li"));
    assert!(element_meta("custom-widget").is_none());
}
