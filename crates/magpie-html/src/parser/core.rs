//! Tree construction.
//!
//! The parser drains the token stream on demand and builds a best-effort DOM
//! tree, emitting the ordered notification stream as it goes. Malformed
//! structure (stray end tags, unclosed elements) is recovered from, never
//! fatal; judging recovered structures is left to the rule layer.

use thiserror::Error;

use magpie_common::warning::warn_once;
use magpie_common::{LexError, Location, ParseError, Source};
use magpie_dom::{
    Attribute, AttrValue, Closed, DomTree, DynamicValue, ElementData, NodeId, TextValue,
    element_meta,
};

use super::conditional::scan_conditions;
use super::directive::{DirectiveError, parse_directive};
use super::hooks::{NoopHooks, ParserHooks, ProcessedAttribute};
use crate::event::{Event, EventBus, EventKind};
use crate::lexer::{Lexer, Token, TokenData};

/// A fatal parsing failure: either tokenization failed or the token stream
/// could not be assembled into a document.
#[derive(Debug, Error)]
pub enum ParsingError {
    /// Tokenization failed.
    #[error(transparent)]
    Lex(#[from] LexError),
    /// The token stream was malformed.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl ParsingError {
    /// The location the failure points at.
    #[must_use]
    pub const fn location(&self) -> &Location {
        match self {
            Self::Lex(error) => &error.location,
            Self::Parse(error) => &error.location,
        }
    }
}

/// The HTML parser: token stream in, [`DomTree`] plus notifications out.
///
/// Subscribers registered with [`on`](Self::on) / [`on_any`](Self::on_any)
/// receive the notification stream of every subsequent parse.
#[derive(Debug, Default)]
pub struct Parser {
    bus: EventBus,
}

impl Parser {
    /// Create a parser with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to a single event kind.
    pub fn on(&mut self, kind: EventKind, callback: impl FnMut(&Event) + 'static) {
        self.bus.on(kind, callback);
    }

    /// Subscribe to every event.
    pub fn on_any(&mut self, callback: impl FnMut(&Event) + 'static) {
        self.bus.any(callback);
    }

    /// Parse a source into a DOM tree with the default (no-op) hooks.
    ///
    /// # Errors
    ///
    /// Returns a [`ParsingError`] when tokenization fails or the token
    /// stream ends inside an unfinished construct.
    pub fn parse(&mut self, source: &Source) -> Result<DomTree, ParsingError> {
        let mut hooks = NoopHooks;
        self.parse_with_hooks(source, &mut hooks)
    }

    /// Parse a source into a DOM tree with caller-supplied hooks.
    ///
    /// # Errors
    ///
    /// Returns a [`ParsingError`] when tokenization fails or the token
    /// stream ends inside an unfinished construct.
    pub fn parse_with_hooks(
        &mut self,
        source: &Source,
        hooks: &mut dyn ParserHooks,
    ) -> Result<DomTree, ParsingError> {
        let builder = TreeBuilder {
            tree: DomTree::new(&*source.filename),
            stack: vec![NodeId::ROOT],
            lexer: Lexer::new(source),
            bus: &mut self.bus,
            hooks,
            ns_prefix: "",
            pending_void: None,
            eof_location: None,
        };
        builder.run()
    }
}

/// Per-parse state: the tree under construction, the open-element stack and
/// the lexer being drained.
struct TreeBuilder<'a, 'src> {
    tree: DomTree,
    /// Open-element stack; index 0 is always the document node and the top
    /// is the active element.
    stack: Vec<NodeId>,
    lexer: Lexer<'src>,
    bus: &'a mut EventBus,
    hooks: &'a mut dyn ParserHooks,
    /// `""` normally, `"svg:"` while parsing retained foreign content.
    ns_prefix: &'static str,
    /// A void element whose start tag has been consumed but whose closed
    /// state depends on whether its own end tag follows directly.
    pending_void: Option<NodeId>,
    eof_location: Option<Location>,
}

impl TreeBuilder<'_, '_> {
    fn run(mut self) -> Result<DomTree, ParsingError> {
        loop {
            let token = self.lexer.next_token()?;
            if self.process_token(token)? {
                break;
            }
        }
        // Anything left open is force-closed active -> root so that every
        // opened element reaches element:ready exactly once.
        let eof_location = self.eof_location.take().unwrap_or_else(|| {
            self.tree
                .get(NodeId::ROOT)
                .map_or_else(|| Location::new(String::new(), 0, 1, 1, 0), |node| node.location.clone())
        });
        while self.stack.len() > 1 {
            self.close_active(Closed::ImplicitClosed, eof_location.clone());
        }
        self.bus.emit(&Event::DomReady);
        self.tree.enable_cache(NodeId::ROOT);
        Ok(self.tree)
    }

    /// Process one token. Returns `true` at end of input.
    fn process_token(&mut self, token: Token) -> Result<bool, ParsingError> {
        if self.resolve_pending_void(&token)? {
            return Ok(false);
        }
        let Token { data, location } = token;
        match data {
            TokenData::Eof => {
                self.eof_location = Some(location);
                Ok(true)
            }
            TokenData::UnicodeBom | TokenData::Comment { .. } => Ok(false),
            TokenData::Whitespace { text }
            | TokenData::Text { text }
            | TokenData::Script { text }
            | TokenData::Style { text } => {
                self.append_text(TextValue::Static(text), location);
                Ok(false)
            }
            TokenData::Templating { expr } => {
                self.append_text(TextValue::Dynamic(DynamicValue::new(expr)), location);
                Ok(false)
            }
            TokenData::DoctypeOpen { .. } => {
                self.handle_doctype(location)?;
                Ok(false)
            }
            TokenData::TagOpen { close, tag } => {
                if close {
                    self.handle_end_tag(&tag, location)?;
                } else {
                    self.handle_start_tag(&tag, location)?;
                }
                Ok(false)
            }
            TokenData::Conditional { text } => {
                self.handle_conditional(&text, location);
                Ok(false)
            }
            TokenData::Directive { text, text_offset } => {
                self.handle_directive(&text, text_offset, location)?;
                Ok(false)
            }
            TokenData::DoctypeValue { .. }
            | TokenData::DoctypeClose
            | TokenData::AttrName { .. }
            | TokenData::AttrValue { .. }
            | TokenData::TagClose { .. } => Err(ParseError::new(
                format!("unexpected token {data}", data = TokenDisplay(&data)),
                location,
            )
            .into()),
        }
    }

    /// Decide how a pending void element closes: an immediately following
    /// matching end tag closes it as [`Closed::EndTag`], anything else means
    /// the end tag was omitted. Returns `true` when the token was consumed.
    fn resolve_pending_void(&mut self, token: &Token) -> Result<bool, ParsingError> {
        let Some(id) = self.pending_void.take() else {
            return Ok(false);
        };
        if let TokenData::TagOpen { close: true, tag } = &token.data {
            let qualified = self.qualified(&tag.to_ascii_lowercase());
            let is_own_end_tag = self
                .tree
                .as_element(id)
                .is_some_and(|element| element.tag_name == qualified);
            if is_own_end_tag {
                let _ = self.skip_until_tag_close(&token.location)?;
                self.close_active(Closed::EndTag, token.location.clone());
                return Ok(true);
            }
        }
        self.close_active(Closed::VoidOmitted, token.location.clone());
        Ok(false)
    }

    // =========================================================================
    // Start and end tags
    // =========================================================================

    fn handle_start_tag(&mut self, tag: &str, open_location: Location) -> Result<(), ParsingError> {
        let tag_lc = tag.to_ascii_lowercase();

        // Implicit close: the incoming tag may imply the active element's
        // end tag was omitted (`<li>a<li>b`).
        loop {
            let implies_close = self.active_element().is_some_and(|element| {
                element
                    .meta
                    .is_some_and(|meta| meta.implicit_closed.contains(&tag_lc.as_str()))
            });
            if !implies_close {
                break;
            }
            self.close_active(Closed::ImplicitClosed, open_location.clone());
        }

        let meta = element_meta(&tag_lc);
        let data = ElementData::new(self.qualified(&tag_lc), meta);
        let id = self.tree.alloc_element(data, open_location.clone());
        let parent = self.stack.last().copied().unwrap_or(NodeId::ROOT);
        self.tree.append(parent, id);
        self.stack.push(id);
        self.bus.emit(&Event::TagStart {
            target: id,
            location: open_location.clone(),
        });

        let (self_closed, close_location) = self.consume_attributes(id, &open_location)?;
        self.bus.emit(&Event::TagReady {
            target: id,
            location: close_location.clone(),
        });

        let is_void = meta.is_some_and(|meta| meta.void);
        let is_foreign = meta.is_some_and(|meta| meta.foreign);
        if self_closed {
            self.close_active(Closed::VoidSelfClosed, close_location);
        } else if is_void {
            self.pending_void = Some(id);
        } else if is_foreign {
            self.discard_foreign_body(&tag_lc, &open_location)?;
        }
        Ok(())
    }

    fn handle_end_tag(&mut self, tag: &str, open_location: Location) -> Result<(), ParsingError> {
        let tag_lc = tag.to_ascii_lowercase();
        let qualified = self.qualified(&tag_lc);
        let _ = self.skip_until_tag_close(&open_location)?;

        // Implicit close: an enclosing end tag may imply the active
        // element's end tag was omitted (`<p>text</div>`).
        loop {
            let implies_close = self.active_element().is_some_and(|element| {
                element.tag_name != qualified
                    && element
                        .meta
                        .is_some_and(|meta| meta.implicit_closed.contains(&tag_lc.as_str()))
            });
            if !implies_close {
                break;
            }
            self.close_active(Closed::ImplicitClosed, open_location.clone());
        }

        // A stray end tag closes the nearest matching open ancestor if one
        // exists, otherwise it is structurally ignored (still notified).
        let matched = self.stack.iter().rposition(|&id| {
            self.tree
                .as_element(id)
                .is_some_and(|element| element.tag_name == qualified)
        });
        match matched {
            None => {
                warn_once(
                    "Parser",
                    &format!("stray end tag </{tag_lc}> has no matching open element"),
                );
                let previous = self.stack.last().copied().unwrap_or(NodeId::ROOT);
                self.bus.emit(&Event::TagEnd {
                    target: None,
                    previous,
                    location: open_location,
                });
            }
            Some(index) => {
                while self.stack.len() - 1 > index {
                    self.close_active(Closed::ImplicitClosed, open_location.clone());
                }
                self.close_active(Closed::EndTag, open_location);
            }
        }
        Ok(())
    }

    /// Consume attribute-name/value pairs until the tag terminator. Returns
    /// the self-closed flag and the terminator's location.
    fn consume_attributes(
        &mut self,
        id: NodeId,
        open_location: &Location,
    ) -> Result<(bool, Location), ParsingError> {
        let mut pending: Option<(String, Location)> = None;
        loop {
            let token = self.lexer.next_token()?;
            match token.data {
                TokenData::Whitespace { .. } => {}
                TokenData::AttrName { name } => {
                    if let Some((key, key_location)) = pending.take() {
                        self.record_attribute(id, &key, key_location, None, None, None);
                    }
                    pending = Some((name, token.location));
                }
                TokenData::AttrValue { value, quote } => {
                    if let Some((key, key_location)) = pending.take() {
                        let delta = 1 + usize::from(quote.is_some());
                        let value_location = token.location.sliced(delta, value.len());
                        self.record_attribute(
                            id,
                            &key,
                            key_location,
                            Some(value),
                            quote,
                            Some(value_location),
                        );
                    }
                }
                TokenData::TagClose { self_closed } => {
                    if let Some((key, key_location)) = pending.take() {
                        self.record_attribute(id, &key, key_location, None, None, None);
                    }
                    return Ok((self_closed, token.location));
                }
                TokenData::Eof => {
                    return Err(ParseError::new(
                        "stream ended before tag was closed".to_string(),
                        open_location.clone(),
                    )
                    .into());
                }
                _ => {
                    return Err(ParseError::new(
                        "unexpected token while parsing tag".to_string(),
                        token.location,
                    )
                    .into());
                }
            }
        }
    }

    /// Run one raw attribute through `process_attribute` and record every
    /// replacement, emitting an `attr` event each.
    fn record_attribute(
        &mut self,
        id: NodeId,
        key: &str,
        key_location: Location,
        value: Option<String>,
        quote: Option<char>,
        value_location: Option<Location>,
    ) {
        let initial = ProcessedAttribute {
            key: key.to_ascii_lowercase(),
            value: value.map(AttrValue::Static),
            quote,
            key_location,
            value_location,
            original_attribute: None,
        };
        for attr in self.hooks.process_attribute(initial) {
            let key = attr.key.to_ascii_lowercase();
            let mut record = Attribute::new(
                &key,
                attr.value.clone(),
                attr.key_location.clone(),
                attr.value_location.clone(),
            );
            record.original_attribute = attr.original_attribute.clone();
            if let Some(element) = self.tree.as_element_mut(id) {
                element.add_attribute(record);
            }
            self.bus.emit(&Event::Attr {
                target: id,
                key,
                value: attr.value,
                quote: attr.quote,
                key_location: attr.key_location,
                value_location: attr.value_location,
                original_attribute: attr.original_attribute,
            });
        }
    }

    // =========================================================================
    // Foreign content
    // =========================================================================

    /// Discard everything up to the end tag matching the foreign root,
    /// tracking nesting by tag name. Direct `<title>`/`<desc>` children of
    /// an svg root are parsed normally under the `svg:` namespace instead.
    fn discard_foreign_body(
        &mut self,
        root_tag: &str,
        root_location: &Location,
    ) -> Result<(), ParsingError> {
        let mut depth = 1_usize;
        loop {
            let token = self.lexer.next_token()?;
            let Token { data, location } = token;
            match data {
                TokenData::Eof => {
                    return Err(ParseError::new(
                        format!("stream ended before closing </{root_tag}>"),
                        root_location.clone(),
                    )
                    .into());
                }
                TokenData::TagOpen { close, tag } => {
                    let tag_lc = tag.to_ascii_lowercase();
                    if tag_lc == root_tag {
                        if close {
                            depth -= 1;
                            if depth == 0 {
                                return self.handle_end_tag(&tag, location);
                            }
                            let _ = self.skip_until_tag_close(&location)?;
                        } else {
                            let self_closed = self.skip_until_tag_close(&location)?;
                            if !self_closed {
                                depth += 1;
                            }
                        }
                    } else if depth == 1
                        && !close
                        && root_tag == "svg"
                        && matches!(tag_lc.as_str(), "title" | "desc")
                    {
                        self.parse_retained(&tag, location)?;
                    } else {
                        let _ = self.skip_until_tag_close(&location)?;
                    }
                }
                _ => {}
            }
        }
    }

    /// Parse an allow-listed child of a foreign root as a normal element
    /// under the `svg:` namespace, then hand control back to discarding.
    fn parse_retained(&mut self, tag: &str, open_location: Location) -> Result<(), ParsingError> {
        self.ns_prefix = "svg:";
        let result = self.parse_retained_inner(tag, open_location);
        self.ns_prefix = "";
        result
    }

    fn parse_retained_inner(
        &mut self,
        tag: &str,
        open_location: Location,
    ) -> Result<(), ParsingError> {
        let tag_lc = tag.to_ascii_lowercase();
        let base = self.stack.len();
        self.handle_start_tag(tag, open_location.clone())?;
        while self.stack.len() > base {
            let token = self.lexer.next_token()?;
            if matches!(token.data, TokenData::Eof) {
                return Err(ParseError::new(
                    format!("stream ended before closing </{tag_lc}>"),
                    open_location,
                )
                .into());
            }
            let _ = self.process_token(token)?;
        }
        Ok(())
    }

    /// Drain tokens through the next `TagClose`, discarding attribute junk.
    /// Returns the self-closed flag.
    fn skip_until_tag_close(&mut self, at: &Location) -> Result<bool, ParsingError> {
        loop {
            let token = self.lexer.next_token()?;
            match token.data {
                TokenData::TagClose { self_closed } => return Ok(self_closed),
                TokenData::Whitespace { .. }
                | TokenData::AttrName { .. }
                | TokenData::AttrValue { .. } => {}
                TokenData::Eof => {
                    return Err(ParseError::new(
                        "stream ended before tag was closed".to_string(),
                        at.clone(),
                    )
                    .into());
                }
                _ => {
                    return Err(ParseError::new(
                        "unexpected token while parsing tag".to_string(),
                        token.location,
                    )
                    .into());
                }
            }
        }
    }

    // =========================================================================
    // Doctype, directives, conditionals
    // =========================================================================

    fn handle_doctype(&mut self, open_location: Location) -> Result<(), ParsingError> {
        let token = self.lexer.next_token()?;
        let Token {
            data: TokenData::DoctypeValue { value },
            location: value_location,
        } = token
        else {
            return Err(
                ParseError::new("expected doctype value".to_string(), open_location).into(),
            );
        };
        let close = self.lexer.next_token()?;
        if !matches!(close.data, TokenData::DoctypeClose) {
            return Err(ParseError::new("doctype never closed".to_string(), open_location).into());
        }
        self.tree.set_doctype(&*value);
        self.bus.emit(&Event::Doctype {
            tag: "doctype".to_string(),
            value,
            value_location,
        });
        Ok(())
    }

    fn handle_directive(
        &mut self,
        text: &str,
        text_offset: usize,
        location: Location,
    ) -> Result<(), ParsingError> {
        let parsed = match parse_directive(text) {
            Ok(parsed) => parsed,
            Err(DirectiveError::MissingBracket) => {
                return Err(ParseError::new(
                    "missing end bracket on directive comment".to_string(),
                    location,
                )
                .into());
            }
            Err(DirectiveError::UnknownAction { name, range }) => {
                return Err(ParseError::new(
                    format!("unknown directive action '{name}'"),
                    location.sliced(text_offset + range.0, range.1),
                )
                .into());
            }
        };
        let slice = |range: (usize, usize)| location.sliced(text_offset + range.0, range.1);
        self.bus.emit(&Event::Directive {
            action: parsed.action,
            data: parsed.options,
            comment: parsed.comment,
            action_location: slice(parsed.action_range),
            options_location: parsed.options_range.map(slice),
            comment_location: parsed.comment_range.map(slice),
            location,
        });
        Ok(())
    }

    fn handle_conditional(&mut self, text: &str, location: Location) {
        let parent = self.active_element_id();
        for condition in scan_conditions(text) {
            self.bus.emit(&Event::Conditional {
                condition,
                parent,
                location: location.clone(),
            });
        }
    }

    // =========================================================================
    // Stack helpers
    // =========================================================================

    fn qualified(&self, tag_lc: &str) -> String {
        format!("{}{tag_lc}", self.ns_prefix)
    }

    fn active_element_id(&self) -> Option<NodeId> {
        self.stack
            .last()
            .copied()
            .filter(|&id| self.tree.is_element(id))
    }

    fn active_element(&self) -> Option<&ElementData> {
        self.active_element_id()
            .and_then(|id| self.tree.as_element(id))
    }

    /// Pop and finalize the active element: fix its closed state, run the
    /// `process_element` hook, emit `tag:end` + `element:ready` and enable
    /// the node cache. The document node is never popped.
    fn close_active(&mut self, how: Closed, location: Location) {
        if self.stack.len() <= 1 {
            return;
        }
        let Some(id) = self.stack.pop() else {
            return;
        };
        if let Some(element) = self.tree.as_element_mut(id) {
            element.close(how);
        }
        self.hooks.process_element(&mut self.tree, id);
        self.bus.emit(&Event::TagEnd {
            target: Some(id),
            previous: id,
            location: location.clone(),
        });
        self.bus.emit(&Event::ElementReady {
            target: id,
            location,
        });
        self.tree.enable_cache(id);
    }

    fn append_text(&mut self, text: TextValue, location: Location) {
        let parent = self.stack.last().copied().unwrap_or(NodeId::ROOT);
        let id = self.tree.alloc_text(text, location);
        self.tree.append(parent, id);
    }
}

/// Terse token-kind display for error messages.
struct TokenDisplay<'a>(&'a TokenData);

impl core::fmt::Display for TokenDisplay<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self.0 {
            TokenData::DoctypeValue { .. } => "doctype value",
            TokenData::DoctypeClose => "doctype close",
            TokenData::AttrName { .. } => "attribute name",
            TokenData::AttrValue { .. } => "attribute value",
            TokenData::TagClose { .. } => "tag close",
            _ => "token",
        };
        write!(f, "{name}")
    }
}
