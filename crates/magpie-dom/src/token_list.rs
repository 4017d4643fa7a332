//! Whitespace-separated attribute tokens.
//!
//! `class`, `rel`, `headers` and friends hold space-separated token lists.
//! [`TokenList`] splits such a value while preserving a [`Location`] for each
//! token, sliced out of the attribute-value span, so rules can point at a
//! single offending class name.

use magpie_common::Location;

use crate::attribute::AttrValue;

/// A parsed token list from a whitespace-separated attribute value.
#[derive(Debug, Clone)]
pub struct TokenList {
    tokens: Vec<(String, Option<Location>)>,
    raw: Option<String>,
}

impl TokenList {
    /// Split an attribute value into tokens.
    ///
    /// A missing value (boolean attribute) yields an empty list. A
    /// [`DynamicValue`](crate::attribute::DynamicValue) yields zero tokens
    /// but [`value`](Self::value) still exposes the raw expression text.
    /// Token locations are sliced from `value_location` when it is known.
    #[must_use]
    pub fn new(value: Option<&AttrValue>, value_location: Option<&Location>) -> Self {
        match value {
            None => Self {
                tokens: Vec::new(),
                raw: None,
            },
            Some(AttrValue::Dynamic(dynamic)) => Self {
                tokens: Vec::new(),
                raw: Some(dynamic.expr().to_string()),
            },
            Some(AttrValue::Static(text)) => Self {
                tokens: split_tokens(text, value_location),
                raw: Some(text.clone()),
            },
        }
    }

    /// The raw attribute value this list was split from, if any.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    /// Number of tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether the list holds no tokens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// The token at `index`, if present.
    #[must_use]
    pub fn item(&self, index: usize) -> Option<&str> {
        self.tokens.get(index).map(|(token, _)| token.as_str())
    }

    /// Whether `token` occurs in the list (exact match).
    #[must_use]
    pub fn contains(&self, token: &str) -> bool {
        self.tokens.iter().any(|(candidate, _)| candidate == token)
    }

    /// Iterate over the tokens.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(|(token, _)| token.as_str())
    }

    /// Iterate over tokens together with their source locations.
    pub fn iter_located(&self) -> impl Iterator<Item = (&str, Option<&Location>)> {
        self.tokens
            .iter()
            .map(|(token, location)| (token.as_str(), location.as_ref()))
    }
}

fn split_tokens(text: &str, value_location: Option<&Location>) -> Vec<(String, Option<Location>)> {
    let mut tokens = Vec::new();
    let mut start = None;
    for (index, ch) in text.char_indices() {
        if ch.is_ascii_whitespace() {
            if let Some(begin) = start.take() {
                tokens.push(make_token(text, begin, index, value_location));
            }
        } else if start.is_none() {
            start = Some(index);
        }
    }
    if let Some(begin) = start {
        tokens.push(make_token(text, begin, text.len(), value_location));
    }
    tokens
}

fn make_token(
    text: &str,
    begin: usize,
    end: usize,
    value_location: Option<&Location>,
) -> (String, Option<Location>) {
    let token = text[begin..end].to_string();
    let location = value_location.map(|location| location.sliced(begin, end - begin));
    (token, location)
}
