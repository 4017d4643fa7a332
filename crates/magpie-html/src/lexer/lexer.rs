//! The tokenizer state machine.
//!
//! Each state tries an ordered list of matchers; the first match wins,
//! consumes the matched length and performs the state transition. The
//! transition out of the tag states is computed from the token just emitted:
//! closing the opening tag of `<script>` or `<style>` switches the content
//! model to the corresponding raw-text state.
//!
//! No matcher applying is a fatal [`LexError`] carrying the location and a
//! truncated excerpt of the offending input.

use strum_macros::Display;

use magpie_common::{LexError, Location, Source};

use super::token::{Token, TokenData};

/// Maximum number of characters quoted back in a tokenization error.
const CONTEXT_LEN: usize = 13;

/// The marker opening a linter directive comment.
const DIRECTIVE_MARKER: &str = "[html-validate-";

/// The tokenizer states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum State {
    /// Start of input: BOM, xml prolog, doctype, leading whitespace.
    Initial,
    /// Inside `<!DOCTYPE ...>`.
    Doctype,
    /// Inside a tag, before or between attributes.
    Tag,
    /// After an attribute name, expecting an optional value.
    Attr,
    /// Ordinary markup content.
    Text,
    /// Inside a `<![CDATA[ ... ]]>` section (skipped).
    Cdata,
    /// Raw `<script>` content.
    Script,
    /// Raw `<style>` content.
    Style,
}

/// A single-use tokenizer over a [`Source`].
///
/// Produces an ordered token sequence terminated by an explicit
/// [`Eof`](TokenData::Eof) token. The sequence is pull-based and never
/// rewound.
pub struct Lexer<'src> {
    data: &'src str,
    filename: &'src str,
    pos: usize,
    line: u32,
    column: u32,
    base_offset: usize,
    state: State,
    /// Lowercased name of the tag currently being lexed, driving the
    /// content-model switch at its `TagClose`.
    current_tag: Option<String>,
    current_tag_is_close: bool,
    finished: bool,
}

impl<'src> Lexer<'src> {
    /// Create a tokenizer positioned at the start of the source.
    #[must_use]
    pub fn new(source: &'src Source) -> Self {
        Self {
            data: &source.data,
            filename: &source.filename,
            pos: 0,
            line: source.line,
            column: source.column,
            base_offset: source.offset,
            state: State::Initial,
            current_tag: None,
            current_tag_is_close: false,
            finished: false,
        }
    }

    /// The current state, for diagnostics.
    #[must_use]
    pub const fn state(&self) -> State {
        self.state
    }

    /// Tokenize the next token.
    ///
    /// # Errors
    ///
    /// Returns a [`LexError`] when no rule matches the input in the current
    /// state, or when the input ends inside an unfinished construct.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        loop {
            if self.pos >= self.data.len() {
                return self.handle_eof();
            }
            let before_pos = self.pos;
            let before_state = self.state;
            let token = match self.state {
                State::Initial => self.tokenize_initial(),
                State::Doctype => Ok(Some(self.tokenize_doctype())),
                State::Tag => self.tokenize_tag(),
                State::Attr => Ok(self.tokenize_attr()),
                State::Text => self.tokenize_text(),
                State::Cdata => self.tokenize_cdata(),
                State::Script => Ok(Some(self.tokenize_raw("script", before_state))),
                State::Style => Ok(Some(self.tokenize_raw("style", before_state))),
            }?;
            // A transition that consumes nothing and stays in the same state
            // would loop forever; fail fast naming the stuck state.
            if self.pos == before_pos && self.state == before_state && token.is_none() {
                return Err(LexError::new(
                    format!("lexer made no progress in {before_state} state"),
                    self.cursor_location(0),
                ));
            }
            if let Some(token) = token {
                return Ok(token);
            }
        }
    }

    fn handle_eof(&mut self) -> Result<Token, LexError> {
        match self.state {
            State::Initial | State::Text | State::Script | State::Style => {
                Ok(self.emit(0, TokenData::Eof))
            }
            state => Err(LexError::new(
                format!("unexpected end of input in {state} state"),
                self.cursor_location(0),
            )),
        }
    }

    // =========================================================================
    // Per-state rules
    // =========================================================================

    fn tokenize_initial(&mut self) -> Result<Option<Token>, LexError> {
        let rest = self.rest();

        if rest.starts_with('\u{FEFF}') {
            return Ok(Some(self.emit('\u{FEFF}'.len_utf8(), TokenData::UnicodeBom)));
        }

        // An xml prolog is consumed without emitting a token, together with
        // one trailing line break.
        if rest.starts_with("<?xml")
            && let Some(end) = rest.find("?>")
        {
            let mut len = end + 2;
            len += newline_len(&rest[len..]);
            self.advance(len);
            return Ok(None);
        }

        if starts_with_ci(rest, "<!doctype")
            && rest[9..].chars().next().is_some_and(|ch| ch.is_ascii_whitespace())
        {
            // Take a whole line break so a CRLF pair is never split across
            // two tokens (each pair must count as one line break).
            let nl = newline_len(&rest[9..]);
            let len = 9 + if nl > 0 { nl } else { 1 };
            let text = rest[..len].to_string();
            self.state = State::Doctype;
            return Ok(Some(self.emit(len, TokenData::DoctypeOpen { text })));
        }

        let ws = whitespace_len(rest);
        if ws > 0 {
            let text = rest[..ws].to_string();
            return Ok(Some(self.emit(ws, TokenData::Whitespace { text })));
        }

        // Anything else is ordinary content; reconsume in the text state.
        self.state = State::Text;
        Ok(None)
    }

    fn tokenize_doctype(&mut self) -> Token {
        let rest = self.rest();
        if rest.starts_with('>') {
            self.state = State::Text;
            return self.emit(1, TokenData::DoctypeClose);
        }
        let len = rest.find('>').unwrap_or(rest.len());
        let value = rest[..len].to_string();
        self.emit(len, TokenData::DoctypeValue { value })
    }

    fn tokenize_tag(&mut self) -> Result<Option<Token>, LexError> {
        let rest = self.rest();

        if rest.starts_with("/>") {
            self.leave_tag(true);
            return Ok(Some(self.emit(2, TokenData::TagClose { self_closed: true })));
        }
        if rest.starts_with('>') {
            self.leave_tag(false);
            return Ok(Some(self.emit(1, TokenData::TagClose { self_closed: false })));
        }

        let ws = whitespace_len(rest);
        if ws > 0 {
            let text = rest[..ws].to_string();
            return Ok(Some(self.emit(ws, TokenData::Whitespace { text })));
        }

        let name_len = rest
            .chars()
            .take_while(|ch| !is_attr_name_terminator(*ch))
            .map(char::len_utf8)
            .sum::<usize>();
        if name_len > 0 {
            let name = rest[..name_len].to_string();
            self.state = State::Attr;
            return Ok(Some(self.emit(name_len, TokenData::AttrName { name })));
        }

        Err(self.no_rule_error())
    }

    fn tokenize_attr(&mut self) -> Option<Token> {
        let rest = self.rest();
        if let Some(after) = rest.strip_prefix('=') {
            for quote in ['"', '\''] {
                if after.starts_with(quote)
                    && let Some(end) = after[1..].find(quote)
                {
                    let value = after[1..1 + end].to_string();
                    self.state = State::Tag;
                    return Some(self.emit(
                        1 + 1 + end + 1,
                        TokenData::AttrValue {
                            value,
                            quote: Some(quote),
                        },
                    ));
                }
            }
            let unquoted = after
                .chars()
                .take_while(|ch| !ch.is_ascii_whitespace() && *ch != '>')
                .map(char::len_utf8)
                .sum::<usize>();
            if unquoted > 0 {
                let value = after[..unquoted].to_string();
                self.state = State::Tag;
                return Some(self.emit(1 + unquoted, TokenData::AttrValue { value, quote: None }));
            }
        }
        // No value: a boolean attribute. Back to the tag state without a token.
        self.state = State::Tag;
        None
    }

    fn tokenize_text(&mut self) -> Result<Option<Token>, LexError> {
        let rest = self.rest();

        let ws = whitespace_len(rest);
        if ws > 0 {
            let text = rest[..ws].to_string();
            return Ok(Some(self.emit(ws, TokenData::Whitespace { text })));
        }

        for (open, close) in [("<%", "%>"), ("<?", "?>"), ("<$", "$>")] {
            if rest.starts_with(open)
                && let Some(end) = rest[2..].find(close)
            {
                let len = 2 + end + 2;
                let expr = rest[..len].to_string();
                return Ok(Some(self.emit(len, TokenData::Templating { expr })));
            }
        }

        if rest.starts_with("<![CDATA[") {
            self.advance(9);
            self.state = State::Cdata;
            return Ok(None);
        }

        if let Some((len, text, text_offset)) = match_directive(rest) {
            return Ok(Some(self.emit(len, TokenData::Directive { text, text_offset })));
        }

        if let Some(len) = match_conditional(rest) {
            let text = rest[..len].to_string();
            return Ok(Some(self.emit(len, TokenData::Conditional { text })));
        }

        if rest.starts_with("<!--")
            && let Some(end) = rest[4..].find("-->")
        {
            let text = rest[4..4 + end].to_string();
            return Ok(Some(self.emit(4 + end + 3, TokenData::Comment { text })));
        }

        if let Some((len, close, tag)) = match_tag_open(rest) {
            self.current_tag = Some(tag.to_ascii_lowercase());
            self.current_tag_is_close = close;
            self.state = State::Tag;
            return Ok(Some(self.emit(len, TokenData::TagOpen { close, tag })));
        }

        let text_len = rest
            .chars()
            .take_while(|ch| !matches!(ch, '<' | '\r' | '\n'))
            .map(char::len_utf8)
            .sum::<usize>();
        if text_len > 0 {
            let text = rest[..text_len].to_string();
            return Ok(Some(self.emit(text_len, TokenData::Text { text })));
        }

        Err(self.no_rule_error())
    }

    fn tokenize_cdata(&mut self) -> Result<Option<Token>, LexError> {
        let rest = self.rest();
        if let Some(end) = rest.find("]]>") {
            self.advance(end + 3);
            self.state = State::Text;
            return Ok(None);
        }
        Err(self.no_rule_error())
    }

    fn tokenize_raw(&mut self, tag: &str, state: State) -> Token {
        let rest = self.rest();
        let end_tag = format!("</{tag}");
        if starts_with_ci(rest, &end_tag) {
            let name = rest[2..end_tag.len()].to_string();
            self.current_tag = Some(tag.to_string());
            self.current_tag_is_close = true;
            self.state = State::Tag;
            return self.emit(end_tag.len(), TokenData::TagOpen { close: true, tag: name });
        }
        let len = find_ci(rest, &end_tag).unwrap_or(rest.len());
        let text = rest[..len].to_string();
        let data = match state {
            State::Style => TokenData::Style { text },
            _ => TokenData::Script { text },
        };
        self.emit(len, data)
    }

    /// Decide the state after a `TagClose`, based on the tag that was just
    /// closed: the opening tags of `script`/`style` switch the content model
    /// to raw text.
    fn leave_tag(&mut self, self_closed: bool) {
        self.state = if self.current_tag_is_close || self_closed {
            State::Text
        } else {
            match self.current_tag.as_deref() {
                Some("script") => State::Script,
                Some("style") => State::Style,
                _ => State::Text,
            }
        };
    }

    // =========================================================================
    // Cursor helpers
    // =========================================================================

    fn rest(&self) -> &'src str {
        &self.data[self.pos..]
    }

    /// Build a token spanning the next `len` bytes and advance past them.
    fn emit(&mut self, len: usize, data: TokenData) -> Token {
        let location = self.cursor_location(len);
        self.advance(len);
        Token { data, location }
    }

    fn cursor_location(&self, size: usize) -> Location {
        Location::new(
            self.filename.to_string(),
            self.base_offset + self.pos,
            self.line,
            self.column,
            size,
        )
    }

    /// Advance the cursor, counting each of `\r\n`, `\r` and `\n` as exactly
    /// one line break.
    fn advance(&mut self, len: usize) {
        let text = &self.data[self.pos..self.pos + len];
        let mut chars = text.chars().peekable();
        while let Some(ch) = chars.next() {
            match ch {
                '\r' => {
                    self.line += 1;
                    self.column = 1;
                    if chars.peek() == Some(&'\n') {
                        let _ = chars.next();
                    }
                }
                '\n' => {
                    self.line += 1;
                    self.column = 1;
                }
                _ => self.column += 1,
            }
        }
        self.pos += len;
    }

    fn no_rule_error(&self) -> LexError {
        let excerpt: String = self.rest().chars().take(CONTEXT_LEN).collect();
        LexError::new(
            format!(
                "failed to tokenize: no rule matched in {} state near '{excerpt}'",
                self.state
            ),
            self.cursor_location(excerpt.len()),
        )
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let result = self.next_token();
        if matches!(&result, Err(_) | Ok(Token { data: TokenData::Eof, .. })) {
            self.finished = true;
        }
        Some(result)
    }
}

// =============================================================================
// Matchers
// =============================================================================

/// Length of the whitespace run at the start of `rest`: one line break, or
/// horizontal whitespace optionally followed by one line break. Zero if the
/// input does not start with whitespace.
fn whitespace_len(rest: &str) -> usize {
    let nl = newline_len(rest);
    if nl > 0 {
        return nl;
    }
    let horizontal = rest
        .bytes()
        .take_while(|byte| matches!(byte, b' ' | b'\t'))
        .count();
    if horizontal == 0 {
        return 0;
    }
    horizontal + newline_len(&rest[horizontal..])
}

/// Length of a single leading line break (`\r\n`, `\r` or `\n`), or zero.
fn newline_len(rest: &str) -> usize {
    if rest.starts_with("\r\n") {
        2
    } else if rest.starts_with('\r') || rest.starts_with('\n') {
        1
    } else {
        0
    }
}

/// Match `<tag` / `</tag`. Returns `(length, close, tag name)`.
fn match_tag_open(rest: &str) -> Option<(usize, bool, String)> {
    let after = rest.strip_prefix('<')?;
    let (close, name_part) = match after.strip_prefix('/') {
        Some(stripped) => (true, stripped),
        None => (false, after),
    };
    if !name_part.chars().next().is_some_and(|ch| ch.is_ascii_alphabetic()) {
        return None;
    }
    let name_len = name_part
        .chars()
        .take_while(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | ':' | '_'))
        .count();
    let tag = name_part[..name_len].to_string();
    let prefix = if close { 2 } else { 1 };
    Some((prefix + name_len, close, tag))
}

/// Match a directive comment `<!-- [html-validate-... -->`. Returns the total
/// length, the payload after the marker, and the payload's byte offset.
fn match_directive(rest: &str) -> Option<(usize, String, usize)> {
    let after = rest.strip_prefix("<!--")?;
    let ws = after
        .bytes()
        .take_while(|byte| byte.is_ascii_whitespace())
        .count();
    if !after[ws..].starts_with(DIRECTIVE_MARKER) {
        return None;
    }
    let text_offset = 4 + ws + DIRECTIVE_MARKER.len();
    let end = rest[text_offset..].find("-->")?;
    let text = rest[text_offset..text_offset + end].to_string();
    Some((text_offset + end + 3, text, text_offset))
}

/// Match one of the conditional-comment forms: `<!--[...]>`, `<![...]-->` or
/// `<![...]>`. Returns the total length. CDATA sections must be ruled out
/// before calling this.
fn match_conditional(rest: &str) -> Option<usize> {
    let (start, comment_open) = if rest.starts_with("<!--[") {
        (5, true)
    } else if rest.starts_with("<![") {
        (3, false)
    } else {
        return None;
    };
    let bracket = rest[start..].find(']')?;
    let after = start + bracket + 1;
    if comment_open {
        return rest[after..].starts_with('>').then_some(after + 1);
    }
    if rest[after..].starts_with("-->") {
        Some(after + 3)
    } else if rest[after..].starts_with('>') {
        Some(after + 1)
    } else {
        None
    }
}

/// Characters terminating an attribute name.
fn is_attr_name_terminator(ch: char) -> bool {
    ch.is_ascii_whitespace() || matches!(ch, '"' | '\'' | '<' | '>' | '/' | '=')
}

/// Case-insensitive `starts_with` for ASCII needles.
fn starts_with_ci(haystack: &str, needle: &str) -> bool {
    haystack.len() >= needle.len()
        && haystack.as_bytes()[..needle.len()].eq_ignore_ascii_case(needle.as_bytes())
}

/// Case-insensitive `find` for ASCII needles.
fn find_ci(haystack: &str, needle: &str) -> Option<usize> {
    haystack.to_ascii_lowercase().find(&needle.to_ascii_lowercase())
}
