//! CSS escaping for selector components.
//!
//! Escaping follows the CSS "escape a character as code point" serialization:
//! tab, LF and CR become a hex code-point escape with a trailing space, and
//! anything outside `[A-Za-z0-9_-]` gets a single backslash prefix. Parsing
//! reverses the code-point escapes before comparison.

use core::fmt::Write as _;

/// Escape a string for use as a selector component (an id after `#`).
#[must_use]
pub fn escape_selector_component(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '\t' | '\n' | '\r') {
            // "escape a character as code point": hex digits then a space so
            // the following character is not consumed by the escape.
            let _ = write!(out, "\\{:x} ", u32::from(ch));
        } else if ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-') {
            out.push(ch);
        } else {
            out.push('\\');
            out.push(ch);
        }
    }
    out
}

/// Reverse [`escape_selector_component`]: resolve code-point escapes (up to
/// six hex digits plus one optional trailing space) and plain
/// backslash-prefixed characters.
#[must_use]
pub fn unescape_selector_component(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        let Some(&next) = chars.peek() else {
            out.push(ch);
            break;
        };
        if next.is_ascii_hexdigit() {
            let mut value = 0_u32;
            let mut digits = 0;
            while digits < 6 {
                let Some(&digit) = chars.peek() else { break };
                let Some(hex) = digit.to_digit(16) else { break };
                value = value * 16 + hex;
                let _ = chars.next();
                digits += 1;
            }
            if chars.peek() == Some(&' ') {
                let _ = chars.next();
            }
            out.push(char::from_u32(value).unwrap_or(char::REPLACEMENT_CHARACTER));
        } else {
            out.push(next);
            let _ = chars.next();
        }
    }
    out
}
