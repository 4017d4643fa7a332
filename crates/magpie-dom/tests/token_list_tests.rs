//! Integration tests for whitespace-separated attribute token lists.

use magpie_common::Location;
use magpie_dom::{AttrValue, DynamicValue, TokenList};

fn value_location() -> Location {
    Location::new("inline.html".to_string(), 10, 1, 11, 11)
}

#[test]
fn test_splits_on_whitespace() {
    let value = AttrValue::from("foo bar baz");
    let list = TokenList::new(Some(&value), Some(&value_location()));
    assert_eq!(list.len(), 3);
    assert_eq!(list.iter().collect::<Vec<_>>(), ["foo", "bar", "baz"]);
    assert!(list.contains("bar"));
    assert!(!list.contains("ba"));
}

#[test]
fn test_collapses_repeated_whitespace() {
    let value = AttrValue::from("  a\t b ");
    let list = TokenList::new(Some(&value), None);
    assert_eq!(list.iter().collect::<Vec<_>>(), ["a", "b"]);
}

#[test]
fn test_token_locations_slice_the_value_span() {
    let value = AttrValue::from("foo bar baz");
    let list = TokenList::new(Some(&value), Some(&value_location()));
    let located: Vec<(usize, usize)> = list
        .iter_located()
        .map(|(_, location)| {
            let location = location.expect("token location");
            (location.offset, location.size)
        })
        .collect();
    assert_eq!(located, [(10, 3), (14, 3), (18, 3)]);
}

#[test]
fn test_item_by_index() {
    let value = AttrValue::from("a b");
    let list = TokenList::new(Some(&value), None);
    assert_eq!(list.item(0), Some("a"));
    assert_eq!(list.item(1), Some("b"));
    assert_eq!(list.item(2), None);
}

#[test]
fn test_dynamic_value_yields_no_tokens_but_keeps_expression() {
    let value = AttrValue::Dynamic(DynamicValue::new("classNames"));
    let list = TokenList::new(Some(&value), Some(&value_location()));
    assert!(list.is_empty());
    assert_eq!(list.value(), Some("classNames"));
}

#[test]
fn test_boolean_attribute_yields_empty_list() {
    let list = TokenList::new(None, None);
    assert!(list.is_empty());
    assert_eq!(list.value(), None);
}
