//! Parse notifications.
//!
//! The parser emits an ordered stream of typed events while building the
//! tree. Events carry arena [`NodeId`]s rather than references, so
//! subscribers can record them during the parse and query the finished tree
//! afterwards. Dispatch is synchronous: per-kind subscribers run in
//! registration order, then the wildcard subscribers.

use std::collections::HashMap;

use strum_macros::Display;

use magpie_common::Location;
use magpie_dom::{AttrValue, NodeId};

use crate::parser::directive::DirectiveAction;

/// The name of an event, used for subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum EventKind {
    /// A start tag was seen.
    #[strum(serialize = "tag:start")]
    TagStart,
    /// An attribute was recorded on the current element.
    #[strum(serialize = "attr")]
    Attr,
    /// All attributes of a start tag are known.
    #[strum(serialize = "tag:ready")]
    TagReady,
    /// An element was closed (explicitly, implicitly or at end of stream).
    #[strum(serialize = "tag:end")]
    TagEnd,
    /// An element is fully constructed.
    #[strum(serialize = "element:ready")]
    ElementReady,
    /// The doctype declaration was parsed.
    #[strum(serialize = "doctype")]
    Doctype,
    /// A conditional comment was seen.
    #[strum(serialize = "conditional")]
    Conditional,
    /// A linter directive comment was parsed.
    #[strum(serialize = "directive")]
    Directive,
    /// The document is fully parsed.
    #[strum(serialize = "dom:ready")]
    DomReady,
}

/// A parse notification.
#[derive(Debug, Clone)]
pub enum Event {
    /// A start tag was seen; the element exists but has no attributes yet.
    TagStart {
        /// The element being opened.
        target: NodeId,
        /// Span of the opening `<tag`.
        location: Location,
    },
    /// An attribute was recorded on `target`.
    Attr {
        /// The element carrying the attribute.
        target: NodeId,
        /// Lowercased attribute name.
        key: String,
        /// The attribute value (`None` for boolean attributes).
        value: Option<AttrValue>,
        /// Quote character used around the value, if any.
        quote: Option<char>,
        /// Span of the attribute name.
        key_location: Location,
        /// Span of the attribute value, if one was written.
        value_location: Option<Location>,
        /// Original name when a hook aliased this attribute.
        original_attribute: Option<String>,
    },
    /// All attributes of a start tag are known.
    TagReady {
        /// The element whose start tag finished.
        target: NodeId,
        /// Span of the tag terminator.
        location: Location,
    },
    /// An element was closed.
    TagEnd {
        /// The element that was closed, or `None` for a stray end tag that
        /// matched nothing.
        target: Option<NodeId>,
        /// The element that was active when the close happened.
        previous: NodeId,
        /// Span of whatever caused the close.
        location: Location,
    },
    /// An element is fully constructed; fires exactly once per element.
    ElementReady {
        /// The finished element.
        target: NodeId,
        /// Span of whatever caused the close.
        location: Location,
    },
    /// The doctype declaration was parsed.
    Doctype {
        /// The declaration keyword (always `doctype`).
        tag: String,
        /// The raw doctype value, e.g. `html`.
        value: String,
        /// Span of the value.
        value_location: Location,
    },
    /// A conditional comment was seen. The construct creates no tree nodes.
    Conditional {
        /// The condition text, e.g. `if IE 6`.
        condition: String,
        /// The element the comment appeared in, if any.
        parent: Option<NodeId>,
        /// Span of the conditional.
        location: Location,
    },
    /// A linter directive comment was parsed.
    Directive {
        /// The directive action.
        action: DirectiveAction,
        /// The options text (typically rule ids), possibly empty.
        data: String,
        /// The free-form comment, possibly empty.
        comment: String,
        /// Span of the whole directive comment.
        location: Location,
        /// Span of the action word.
        action_location: Location,
        /// Span of the options text, when present.
        options_location: Option<Location>,
        /// Span of the comment text, when present.
        comment_location: Option<Location>,
    },
    /// The document is fully parsed and every element has fired
    /// `element:ready`.
    DomReady,
}

impl Event {
    /// The kind used to route this event to subscribers.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::TagStart { .. } => EventKind::TagStart,
            Self::Attr { .. } => EventKind::Attr,
            Self::TagReady { .. } => EventKind::TagReady,
            Self::TagEnd { .. } => EventKind::TagEnd,
            Self::ElementReady { .. } => EventKind::ElementReady,
            Self::Doctype { .. } => EventKind::Doctype,
            Self::Conditional { .. } => EventKind::Conditional,
            Self::Directive { .. } => EventKind::Directive,
            Self::DomReady => EventKind::DomReady,
        }
    }
}

/// A registered event callback.
pub type EventCallback = Box<dyn FnMut(&Event)>;

/// Synchronous typed event bus.
///
/// Subscribers for a kind run in registration order; the wildcard list runs
/// after them for every event.
#[derive(Default)]
pub struct EventBus {
    listeners: HashMap<EventKind, Vec<EventCallback>>,
    wildcard: Vec<EventCallback>,
}

impl EventBus {
    /// Create an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to a single event kind.
    pub fn on(&mut self, kind: EventKind, callback: impl FnMut(&Event) + 'static) {
        self.listeners
            .entry(kind)
            .or_default()
            .push(Box::new(callback));
    }

    /// Subscribe to every event.
    pub fn any(&mut self, callback: impl FnMut(&Event) + 'static) {
        self.wildcard.push(Box::new(callback));
    }

    /// Deliver an event to its subscribers, then to the wildcard list.
    pub fn emit(&mut self, event: &Event) {
        if let Some(callbacks) = self.listeners.get_mut(&event.kind()) {
            for callback in callbacks {
                callback(event);
            }
        }
        for callback in &mut self.wildcard {
            callback(event);
        }
    }
}

impl core::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EventBus")
            .field("kinds", &self.listeners.keys().collect::<Vec<_>>())
            .field("wildcard", &self.wildcard.len())
            .finish()
    }
}
