//! Linter directive comments.
//!
//! A directive comment has the shape
//! `<!-- [html-validate-ACTION OPTIONS -- COMMENT] -->` where the comment
//! separator may also be written `:`. The lexer hands over the payload after
//! the `html-validate-` marker; this module splits it into action, options
//! and comment with byte ranges so the parser can derive a [`Location`]
//! (magpie_common::Location) for each part independently.

use strum_macros::{Display, EnumString};

/// The recognized directive actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum DirectiveAction {
    /// Re-enable rules previously disabled by a directive.
    Enable,
    /// Disable rules for the rest of the document.
    Disable,
    /// Disable rules until the enclosing element is closed.
    DisableBlock,
    /// Disable rules for the next element.
    DisableNext,
}

/// A byte range `(start, length)` relative to the directive payload.
pub type DirectiveRange = (usize, usize);

/// A successfully parsed directive payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDirective {
    /// The directive action.
    pub action: DirectiveAction,
    /// Range of the action word.
    pub action_range: DirectiveRange,
    /// The options text (typically a rule-id list), possibly empty.
    pub options: String,
    /// Range of the options text, when non-empty.
    pub options_range: Option<DirectiveRange>,
    /// The free-form comment, possibly empty.
    pub comment: String,
    /// Range of the comment text, when non-empty.
    pub comment_range: Option<DirectiveRange>,
}

/// Why a directive payload failed to parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectiveError {
    /// The payload does not end with `]`.
    MissingBracket,
    /// The action word is not one of the recognized actions.
    UnknownAction {
        /// The offending action word.
        name: String,
        /// Range of the action word.
        range: DirectiveRange,
    },
}

/// Parse a directive payload (the text between `[html-validate-` and `-->`).
///
/// # Errors
///
/// Returns [`DirectiveError::MissingBracket`] when the closing `]` is
/// missing and [`DirectiveError::UnknownAction`] when the action word is not
/// recognized.
pub fn parse_directive(text: &str) -> Result<ParsedDirective, DirectiveError> {
    let trimmed = text.trim_end();
    let Some(inner) = trimmed.strip_suffix(']') else {
        return Err(DirectiveError::MissingBracket);
    };

    let action_len = inner
        .bytes()
        .take_while(|byte| !byte.is_ascii_whitespace())
        .count();
    let action_text = &inner[..action_len];
    let action: DirectiveAction = action_text
        .parse()
        .map_err(|_| DirectiveError::UnknownAction {
            name: action_text.to_string(),
            range: (0, action_len),
        })?;

    let rest_start = action_len
        + inner[action_len..]
            .bytes()
            .take_while(u8::is_ascii_whitespace)
            .count();
    let rest = &inner[rest_start..];

    let (options, options_range, comment, comment_range) = match find_separator(rest) {
        None => {
            let options = rest.trim_end();
            (
                options.to_string(),
                range_of(options, rest_start, 0),
                String::new(),
                None,
            )
        }
        Some((index, sep_len)) => {
            let options = rest[..index].trim_end();
            let raw_comment = &rest[index + sep_len..];
            let lead = raw_comment.len() - raw_comment.trim_start().len();
            let comment = raw_comment.trim();
            (
                options.to_string(),
                range_of(options, rest_start, 0),
                comment.to_string(),
                range_of(comment, rest_start, index + sep_len + lead),
            )
        }
    };

    Ok(ParsedDirective {
        action,
        action_range: (0, action_len),
        options,
        options_range,
        comment,
        comment_range,
    })
}

/// Find the options/comment separator: the earliest of `--` or `:`.
fn find_separator(rest: &str) -> Option<(usize, usize)> {
    let dashes = rest.find("--").map(|index| (index, 2));
    let colon = rest.find(':').map(|index| (index, 1));
    match (dashes, colon) {
        (Some(a), Some(b)) => Some(if a.0 <= b.0 { a } else { b }),
        (first, second) => first.or(second),
    }
}

const fn range_of(text: &str, base: usize, delta: usize) -> Option<DirectiveRange> {
    if text.is_empty() {
        None
    } else {
        Some((base + delta, text.len()))
    }
}
