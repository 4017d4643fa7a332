//! Element attributes.
//!
//! Attributes preserve everything the rule layer needs to point back at the
//! source: the key and value each carry their own [`Location`], duplicates
//! are kept in source order, and values produced by templating transforms
//! keep the raw expression text as a [`DynamicValue`].

use core::fmt;

use magpie_common::Location;

/// A value that is not statically known, e.g. a template interpolation bound
/// to an attribute by a `process_attribute` hook.
///
/// The raw expression text is retained so diagnostics can show it, but value
/// comparisons treat the value as unknown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicValue {
    expr: String,
}

impl DynamicValue {
    /// Wrap a raw expression string.
    #[must_use]
    pub fn new(expr: impl Into<String>) -> Self {
        Self { expr: expr.into() }
    }

    /// The raw expression text.
    #[must_use]
    pub fn expr(&self) -> &str {
        &self.expr
    }
}

impl fmt::Display for DynamicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)
    }
}

/// An attribute value: a literal string or an unresolved expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    /// A literal value as written in the markup.
    Static(String),
    /// An unresolved templating expression.
    Dynamic(DynamicValue),
}

impl AttrValue {
    /// The textual form of the value: the literal string for static values,
    /// the raw expression text for dynamic values.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Static(text) => text,
            Self::Dynamic(dynamic) => dynamic.expr(),
        }
    }

    /// Whether this value is an unresolved expression.
    #[must_use]
    pub const fn is_dynamic(&self) -> bool {
        matches!(self, Self::Dynamic(_))
    }
}

impl From<&str> for AttrValue {
    fn from(text: &str) -> Self {
        Self::Static(text.to_string())
    }
}

/// A single attribute occurrence on an element.
///
/// An element keeps every occurrence, so `<p class="a" class="b">` carries
/// two attributes with the key `class`. Keys are lowercased on construction;
/// HTML attribute names are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Lowercased attribute name.
    pub key: String,
    /// The value, or `None` for a boolean attribute (`<input disabled>`).
    pub value: Option<AttrValue>,
    /// Span of the attribute name.
    pub key_location: Location,
    /// Span of the attribute value, if one was written.
    pub value_location: Option<Location>,
    /// The original attribute name when a hook aliased this attribute from
    /// another (e.g. `dynamic-class` rewritten to `class`).
    pub original_attribute: Option<String>,
}

impl Attribute {
    /// Create an attribute, lowercasing the key.
    #[must_use]
    pub fn new(
        key: &str,
        value: Option<AttrValue>,
        key_location: Location,
        value_location: Option<Location>,
    ) -> Self {
        Self {
            key: key.to_ascii_lowercase(),
            value,
            key_location,
            value_location,
            original_attribute: None,
        }
    }

    /// The value text: `None` for boolean attributes, the literal string for
    /// static values, the raw expression text for dynamic values.
    #[must_use]
    pub fn value_text(&self) -> Option<&str> {
        self.value.as_ref().map(AttrValue::text)
    }

    /// Whether the attribute was written without a value.
    #[must_use]
    pub const fn is_boolean(&self) -> bool {
        self.value.is_none()
    }

    /// Whether the value is an unresolved expression.
    #[must_use]
    pub fn is_dynamic(&self) -> bool {
        self.value.as_ref().is_some_and(AttrValue::is_dynamic)
    }
}
