//! Integration tests for the parse notification stream and the parser hooks.

use std::cell::RefCell;
use std::rc::Rc;

use magpie_common::Source;
use magpie_dom::{AttrValue, DomTree, DynamicValue, NodeId};
use magpie_html::parser::{ParserHooks, ProcessedAttribute};
use magpie_html::{DirectiveAction, Event, EventKind, Parser};

/// Helper to parse HTML and record every event in order.
fn parse_collect(html: &str) -> (DomTree, Vec<Event>) {
    let source = Source::new(html, "inline.html");
    let mut parser = Parser::new();
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    parser.on_any(move |event| sink.borrow_mut().push(event.clone()));
    let tree = parser.parse(&source).expect("parse should succeed");
    let collected = events.borrow().clone();
    (tree, collected)
}

fn kinds(events: &[Event]) -> Vec<EventKind> {
    events.iter().map(Event::kind).collect()
}

#[test]
fn test_event_order_for_simple_element() {
    let (_, events) = parse_collect(r#"<p id="x">hi</p>"#);
    assert_eq!(
        kinds(&events),
        [
            EventKind::TagStart,
            EventKind::Attr,
            EventKind::TagReady,
            EventKind::TagEnd,
            EventKind::ElementReady,
            EventKind::DomReady,
        ]
    );
}

#[test]
fn test_element_ready_fires_exactly_once_per_element() {
    for html in ["<input>", "<input/>", "<input></input>"] {
        let (_, events) = parse_collect(html);
        let ready = events
            .iter()
            .filter(|event| matches!(event, Event::ElementReady { .. }))
            .count();
        assert_eq!(ready, 1, "in {html}");
    }
}

#[test]
fn test_unclosed_elements_are_finalized_at_eof() {
    let (_, events) = parse_collect("<div><p>hi");
    let ready = events
        .iter()
        .filter(|event| matches!(event, Event::ElementReady { .. }))
        .count();
    assert_eq!(ready, 2);
}

#[test]
fn test_stray_end_tag_still_notifies() {
    let (_, events) = parse_collect("</p>");
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::TagEnd { target: None, .. })));
}

#[test]
fn test_doctype_event() {
    let html = "<!DOCTYPE html><p></p>";
    let (_, events) = parse_collect(html);
    let doctype = events
        .iter()
        .find_map(|event| match event {
            Event::Doctype {
                tag,
                value,
                value_location,
            } => Some((tag.clone(), value.clone(), value_location.clone())),
            _ => None,
        })
        .expect("doctype event");
    assert_eq!(doctype.0, "doctype");
    assert_eq!(doctype.1, "html");
    let location = doctype.2;
    assert_eq!(&html[location.offset..location.offset + location.size], "html");
}

#[test]
fn test_conditional_events() {
    let (_, events) = parse_collect("<div><!--[if IE 6]>legacy<![endif]--></div>");
    let conditions: Vec<&str> = events
        .iter()
        .filter_map(|event| match event {
            Event::Conditional { condition, .. } => Some(condition.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(conditions, ["if IE 6", "endif"]);
}

#[test]
fn test_conditional_parent_is_enclosing_element() {
    let (tree, events) = parse_collect("<div><![if !IE]></div>");
    let parent = events
        .iter()
        .find_map(|event| match event {
            Event::Conditional { parent, .. } => Some(*parent),
            _ => None,
        })
        .expect("conditional event");
    let div = parent.expect("parent element");
    assert_eq!(tree.as_element(div).expect("element").tag_name, "div");
}

#[test]
fn test_directive_event_with_comment() {
    let html = "<!-- [html-validate-disable-next attr-case -- trust me] -->";
    let (_, events) = parse_collect(html);
    let (action, data, comment, action_location) = events
        .iter()
        .find_map(|event| match event {
            Event::Directive {
                action,
                data,
                comment,
                action_location,
                ..
            } => Some((*action, data.clone(), comment.clone(), action_location.clone())),
            _ => None,
        })
        .expect("directive event");
    assert_eq!(action, DirectiveAction::DisableNext);
    assert_eq!(data, "attr-case");
    assert_eq!(comment, "trust me");
    assert_eq!(
        &html[action_location.offset..action_location.offset + action_location.size],
        "disable-next"
    );
}

#[test]
fn test_directive_colon_comment_variant() {
    let (_, events) = parse_collect("<!-- [html-validate-disable-block foo: because] -->");
    let (action, data, comment) = events
        .iter()
        .find_map(|event| match event {
            Event::Directive {
                action,
                data,
                comment,
                ..
            } => Some((*action, data.clone(), comment.clone())),
            _ => None,
        })
        .expect("directive event");
    assert_eq!(action, DirectiveAction::DisableBlock);
    assert_eq!(data, "foo");
    assert_eq!(comment, "because");
}

#[test]
fn test_no_events_for_discarded_foreign_content() {
    let (tree, events) = parse_collect("<svg><script>not js</script></svg>");
    for event in &events {
        if let Event::TagStart { target, .. } = event {
            assert_eq!(tree.as_element(*target).expect("element").tag_name, "svg");
        }
    }
}

#[test]
fn test_subscribers_run_in_registration_order() {
    let source = Source::new("<p></p>", "inline.html");
    let mut parser = Parser::new();
    let order = Rc::new(RefCell::new(Vec::new()));
    for label in [1, 2, 3] {
        let sink = Rc::clone(&order);
        parser.on(EventKind::TagStart, move |_| sink.borrow_mut().push(label));
    }
    let _ = parser.parse(&source).expect("parse should succeed");
    assert_eq!(*order.borrow(), [1, 2, 3]);
}

/// A hook aliasing `dynamic-class` into a dynamic `class` attribute.
struct AliasHooks;

impl ParserHooks for AliasHooks {
    fn process_attribute(&mut self, attr: ProcessedAttribute) -> Vec<ProcessedAttribute> {
        if attr.key == "dynamic-class" {
            let value = attr
                .value
                .as_ref()
                .map(|value| AttrValue::Dynamic(DynamicValue::new(value.text())));
            vec![ProcessedAttribute {
                key: "class".to_string(),
                value,
                original_attribute: Some("dynamic-class".to_string()),
                ..attr
            }]
        } else {
            vec![attr]
        }
    }
}

#[test]
fn test_process_attribute_hook_aliases_attributes() {
    let source = Source::new(r#"<p dynamic-class="expr"></p>"#, "inline.html");
    let mut parser = Parser::new();
    let mut hooks = AliasHooks;
    let tree = parser
        .parse_with_hooks(&source, &mut hooks)
        .expect("parse should succeed");

    let p = tree.children(NodeId::ROOT)[0];
    let element = tree.as_element(p).expect("element");
    let class = element.get_attribute("class").expect("aliased attribute");
    assert!(class.is_dynamic());
    assert_eq!(class.value_text(), Some("expr"));
    assert_eq!(class.original_attribute.as_deref(), Some("dynamic-class"));
    assert!(element.get_attribute("dynamic-class").is_none());

    // A dynamic class list yields no tokens but keeps the expression.
    let classes = element.class_list();
    assert!(classes.is_empty());
    assert_eq!(classes.value(), Some("expr"));
}

/// A hook recording every element it is asked to post-process.
#[derive(Default)]
struct RecordingHooks {
    seen: Vec<String>,
}

impl ParserHooks for RecordingHooks {
    fn process_element(&mut self, tree: &mut DomTree, id: NodeId) {
        if let Some(element) = tree.as_element(id) {
            self.seen.push(element.tag_name.clone());
        }
    }
}

#[test]
fn test_process_element_hook_runs_once_per_element() {
    let source = Source::new("<div><input><p>x</p></div>", "inline.html");
    let mut parser = Parser::new();
    let mut hooks = RecordingHooks::default();
    let _ = parser
        .parse_with_hooks(&source, &mut hooks)
        .expect("parse should succeed");
    assert_eq!(hooks.seen, ["input", "p", "div"]);
}
