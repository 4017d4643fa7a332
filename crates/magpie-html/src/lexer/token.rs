//! Lexical tokens.
//!
//! Every token carries the [`Location`] of the span it was read from, so
//! `data[offset..offset + size]` reproduces the matched text exactly (the
//! synthetic end-of-file token has size zero). The payload is a sum type
//! with only the fields relevant to each kind, letting the parser match
//! exhaustively.

use core::fmt;

use magpie_common::Location;

/// Kind-specific token payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenData {
    /// A U+FEFF byte order mark at the very start of the input.
    UnicodeBom,

    /// A run of inter-token whitespace: a single line break, or horizontal
    /// whitespace optionally followed by one line break. Never spans more
    /// than one line break, so positions stay per-line accurate.
    Whitespace {
        /// The matched whitespace.
        text: String,
    },

    /// `<!DOCTYPE ` including the single whitespace character after the
    /// keyword.
    DoctypeOpen {
        /// The matched text as written (case is preserved).
        text: String,
    },

    /// The doctype payload, everything up to (not including) `>`.
    DoctypeValue {
        /// The raw doctype value, e.g. `html`.
        value: String,
    },

    /// The `>` terminating a doctype.
    DoctypeClose,

    /// `<tag` or `</tag`.
    TagOpen {
        /// Whether this is an end tag (`</`).
        close: bool,
        /// The tag name as written (case is preserved).
        tag: String,
    },

    /// `>` or `/>` terminating a tag.
    TagClose {
        /// Whether the tag used self-closing syntax (`/>`).
        self_closed: bool,
    },

    /// An attribute name.
    AttrName {
        /// The name as written (case is preserved).
        name: String,
    },

    /// `=value`, `="value"` or `='value'` following an attribute name.
    AttrValue {
        /// The value with quotes stripped.
        value: String,
        /// The quote character, if the value was quoted.
        quote: Option<char>,
    },

    /// A run of plain text. Never contains `<` or a line break.
    Text {
        /// The matched text.
        text: String,
    },

    /// A templating placeholder (`<% %>`, `<? ?>` or `<$ $>`), atomic even
    /// mid-text.
    Templating {
        /// The full placeholder including delimiters.
        expr: String,
    },

    /// Raw `<script>` content up to (not including) the closing tag.
    Script {
        /// The raw content.
        text: String,
    },

    /// Raw `<style>` content up to (not including) the closing tag.
    Style {
        /// The raw content.
        text: String,
    },

    /// `<!-- ... -->`.
    Comment {
        /// The comment body between the delimiters.
        text: String,
    },

    /// An Internet Explorer conditional comment, either comment-wrapped
    /// (`<!--[if IE]>`, `<![endif]-->`) or bare (`<![if !IE]>`).
    Conditional {
        /// The full matched text; the parser scans it for `<![...]>`-shaped
        /// runs.
        text: String,
    },

    /// A linter directive comment `<!-- [html-validate-... ] -->`.
    Directive {
        /// Everything between `[html-validate-` and `-->`.
        text: String,
        /// Byte offset of `text` from the start of the token, for computing
        /// sub-spans.
        text_offset: usize,
    },

    /// End of input. Synthetic; carries a zero-sized location.
    Eof,
}

/// A lexical token: payload plus source span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Kind-specific payload.
    pub data: TokenData,
    /// The span of source text this token was read from.
    pub location: Location,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.data {
            TokenData::UnicodeBom => write!(f, "BOM"),
            TokenData::Whitespace { .. } => write!(f, "Whitespace"),
            TokenData::DoctypeOpen { text } => write!(f, "{text}"),
            TokenData::DoctypeValue { value } => write!(f, "DoctypeValue({value})"),
            TokenData::DoctypeClose => write!(f, ">"),
            TokenData::TagOpen { close, tag } => {
                write!(f, "<{}{tag}", if *close { "/" } else { "" })
            }
            TokenData::TagClose { self_closed } => {
                write!(f, "{}", if *self_closed { "/>" } else { ">" })
            }
            TokenData::AttrName { name } => write!(f, "{name}"),
            TokenData::AttrValue { value, .. } => write!(f, "={value}"),
            TokenData::Text { text } => write!(f, "Text({text})"),
            TokenData::Templating { expr } => write!(f, "Templating({expr})"),
            TokenData::Script { .. } => write!(f, "Script(...)"),
            TokenData::Style { .. } => write!(f, "Style(...)"),
            TokenData::Comment { .. } => write!(f, "Comment(...)"),
            TokenData::Conditional { text } => write!(f, "Conditional({text})"),
            TokenData::Directive { text, .. } => write!(f, "Directive({text})"),
            TokenData::Eof => write!(f, "EOF"),
        }
    }
}
