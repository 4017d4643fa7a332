//! Selector-string parsing.
//!
//! The selector is split on unescaped, unquoted whitespace into segments;
//! each segment is a compound optionally prefixed by a combinator glyph (a
//! bare glyph segment applies to the following compound). A compound is an
//! optional tag name followed by conditions. Delimiter characters inside
//! quoted attribute values or behind a backslash escape never split.

use crate::SelectorError;

use super::escape::unescape_selector_component;
use super::{Combinator, Compound, Condition, Selector};

/// Characters that end a tag name or identifier within a compound.
const DELIMITERS: [char; 4] = ['.', '#', '[', ':'];

pub(crate) fn parse_selector(text: &str) -> Result<Selector, SelectorError> {
    let mut compounds = Vec::new();
    let mut pending: Option<Combinator> = None;
    for segment in split_segments(text) {
        if let Some(glyph) = combinator_glyph(&segment) {
            pending = Some(glyph);
            continue;
        }
        let (prefix, body) = split_glyph_prefix(&segment);
        let mut combinator = pending.take().or(prefix).unwrap_or(Combinator::Descendant);
        if body == ":scope" && combinator == Combinator::Descendant {
            combinator = Combinator::Scope;
        }
        compounds.push(parse_compound(body, combinator)?);
    }
    Ok(Selector { compounds })
}

/// Split on unescaped, unquoted whitespace. A space terminating a hex
/// code-point escape (`\3a `) belongs to the escape and does not split.
fn split_segments(text: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => {
                current.push(ch);
                if let Some(&next) = chars.peek() {
                    if next.is_ascii_hexdigit() {
                        let mut digits = 0;
                        while digits < 6
                            && let Some(&digit) = chars.peek()
                            && digit.is_ascii_hexdigit()
                        {
                            current.push(digit);
                            let _ = chars.next();
                            digits += 1;
                        }
                        if chars.peek() == Some(&' ') {
                            current.push(' ');
                            let _ = chars.next();
                        }
                    } else {
                        current.push(next);
                        let _ = chars.next();
                    }
                }
            }
            '"' | '\'' => {
                if quote == Some(ch) {
                    quote = None;
                } else if quote.is_none() {
                    quote = Some(ch);
                }
                current.push(ch);
            }
            ch if ch.is_whitespace() && quote.is_none() => {
                if !current.is_empty() {
                    segments.push(core::mem::take(&mut current));
                }
            }
            ch => current.push(ch),
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

fn combinator_glyph(segment: &str) -> Option<Combinator> {
    match segment {
        ">" => Some(Combinator::Child),
        "+" => Some(Combinator::AdjacentSibling),
        "~" => Some(Combinator::GeneralSibling),
        _ => None,
    }
}

fn split_glyph_prefix(segment: &str) -> (Option<Combinator>, &str) {
    if let Some(rest) = segment.strip_prefix('>') {
        (Some(Combinator::Child), rest)
    } else if let Some(rest) = segment.strip_prefix('+') {
        (Some(Combinator::AdjacentSibling), rest)
    } else if let Some(rest) = segment.strip_prefix('~') {
        (Some(Combinator::GeneralSibling), rest)
    } else {
        (None, segment)
    }
}

fn parse_compound(body: &str, combinator: Combinator) -> Result<Compound, SelectorError> {
    let mut rest = body;

    let tag = if let Some(after) = rest.strip_prefix('*') {
        rest = after;
        None
    } else {
        let len = rest
            .chars()
            .take_while(|ch| !DELIMITERS.contains(ch))
            .map(char::len_utf8)
            .sum::<usize>();
        if len > 0 {
            let tag = rest[..len].to_ascii_lowercase();
            rest = &rest[len..];
            Some(tag)
        } else {
            None
        }
    };

    let mut conditions = Vec::new();
    while let Some(ch) = rest.chars().next() {
        match ch {
            '.' => {
                let (raw, consumed) = read_ident(&rest[1..]);
                conditions.push(Condition::Class(raw.to_string()));
                rest = &rest[1 + consumed..];
            }
            '#' => {
                let (raw, consumed) = read_ident(&rest[1..]);
                conditions.push(Condition::Id(unescape_selector_component(raw)));
                rest = &rest[1 + consumed..];
            }
            '[' => {
                let end = find_bracket_end(&rest[1..]);
                conditions.push(parse_attribute(&rest[1..1 + end])?);
                rest = rest[1 + end..].strip_prefix(']').unwrap_or("");
            }
            ':' => {
                let (name, consumed) = read_pseudo_name(&rest[1..]);
                super::pseudo::ensure_registered(name)?;
                rest = &rest[1 + consumed..];
                let mut argument = None;
                if rest.starts_with('(') {
                    let end = rest[1..].find(')').map_or(rest.len() - 1, |index| index);
                    argument = Some(rest[1..1 + end].trim().to_string());
                    rest = rest[1 + end..].strip_prefix(')').unwrap_or("");
                }
                conditions.push(Condition::Pseudo {
                    name: name.to_string(),
                    argument,
                });
            }
            _ => break,
        }
    }

    Ok(Compound {
        combinator,
        tag,
        conditions,
    })
}

/// Read an identifier, keeping escape sequences intact. Returns the raw
/// slice and its byte length.
fn read_ident(text: &str) -> (&str, usize) {
    let mut len = 0;
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            len += ch.len_utf8();
            if let Some(escaped) = chars.next() {
                len += escaped.len_utf8();
                // A hex escape may be terminated by a space that belongs to
                // the escape sequence.
                if escaped.is_ascii_hexdigit() {
                    let tail = &text[len..];
                    let digits = tail
                        .chars()
                        .take_while(char::is_ascii_hexdigit)
                        .take(5)
                        .map(char::len_utf8)
                        .sum::<usize>();
                    len += digits;
                    if text[len..].starts_with(' ') {
                        len += 1;
                    }
                    chars = text[len..].chars();
                }
            }
        } else if DELIMITERS.contains(&ch) {
            break;
        } else {
            len += ch.len_utf8();
        }
    }
    (&text[..len], len)
}

fn read_pseudo_name(text: &str) -> (&str, usize) {
    let len = text
        .chars()
        .take_while(|ch| ch.is_ascii_alphanumeric() || *ch == '-')
        .map(char::len_utf8)
        .sum::<usize>();
    (&text[..len], len)
}

/// Byte length of the bracketed attribute expression, honoring quotes.
fn find_bracket_end(text: &str) -> usize {
    let mut quote: Option<char> = None;
    let mut len = 0;
    for ch in text.chars() {
        match ch {
            '"' | '\'' => {
                if quote == Some(ch) {
                    quote = None;
                } else if quote.is_none() {
                    quote = Some(ch);
                }
            }
            ']' if quote.is_none() => return len,
            _ => {}
        }
        len += ch.len_utf8();
    }
    len
}

fn parse_attribute(inner: &str) -> Result<Condition, SelectorError> {
    let Some(eq) = inner.find('=') else {
        return Ok(Condition::Attribute {
            key: inner.trim().to_ascii_lowercase(),
            value: None,
        });
    };
    if eq > 0 {
        let previous = inner.as_bytes()[eq - 1];
        if matches!(previous, b'^' | b'$' | b'*' | b'~' | b'|') {
            return Err(SelectorError::UnsupportedOperator(char::from(previous)));
        }
    }
    let key = inner[..eq].trim().to_ascii_lowercase();
    let raw = inner[eq + 1..].trim();
    let value = strip_quotes(raw);
    Ok(Condition::Attribute {
        key,
        value: Some(value.to_string()),
    })
}

fn strip_quotes(raw: &str) -> &str {
    for quote in ['"', '\''] {
        if raw.len() >= 2 && raw.starts_with(quote) && raw.ends_with(quote) {
            return &raw[1..raw.len() - 1];
        }
    }
    raw
}
