//! Built-in element metadata.
//!
//! The parser consults three per-tag facts while building the tree: whether
//! the element is void, which incoming tag names force-close it, and whether
//! its content is foreign (not ordinary HTML). The full content-model
//! validator lives outside this crate; a `process_element` hook may replace
//! an element's metadata after construction.

/// Parser-relevant facts about an element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementMeta {
    /// The element can never have children or an end tag (`<img>`).
    pub void: bool,
    /// Tag names whose arrival implies this element's end tag was omitted.
    pub implicit_closed: &'static [&'static str],
    /// Descendants are not parsed as ordinary HTML (`<svg>`).
    pub foreign: bool,
}

impl ElementMeta {
    const fn void() -> Self {
        Self {
            void: true,
            implicit_closed: &[],
            foreign: false,
        }
    }

    const fn implicit(closers: &'static [&'static str]) -> Self {
        Self {
            void: false,
            implicit_closed: closers,
            foreign: false,
        }
    }

    const fn foreign() -> Self {
        Self {
            void: false,
            implicit_closed: &[],
            foreign: true,
        }
    }
}

/// Elements whose arrival closes an open `<p>`.
///
/// Per [§ 4.4.1 The p element](https://html.spec.whatwg.org/multipage/grouping-content.html#the-p-element):
/// "A p element's end tag can be omitted if the p element is immediately
/// followed by an address, article, aside, blockquote, ... element".
const P_CLOSERS: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "details",
    "div",
    "dl",
    "fieldset",
    "figcaption",
    "figure",
    "footer",
    "form",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "hgroup",
    "hr",
    "main",
    "menu",
    "nav",
    "ol",
    "p",
    "pre",
    "section",
    "table",
    "ul",
];

/// Look up the built-in metadata for a tag name (must be lowercase).
///
/// Returns `None` for unknown or custom elements, which are treated as
/// ordinary non-void elements with no implicit closing.
#[must_use]
pub fn element_meta(tag: &str) -> Option<ElementMeta> {
    // [§ 13.1.2 Elements](https://html.spec.whatwg.org/multipage/syntax.html#void-elements)
    // "Void elements only have a start tag; end tags must not be specified."
    match tag {
        "area" | "base" | "br" | "col" | "embed" | "hr" | "img" | "input" | "link" | "meta"
        | "param" | "source" | "track" | "wbr" => Some(ElementMeta::void()),

        // [§ 13.1.2.4 Optional tags](https://html.spec.whatwg.org/multipage/syntax.html#optional-tags)
        "li" => Some(ElementMeta::implicit(&["li"])),
        "p" => Some(ElementMeta::implicit(P_CLOSERS)),
        "dd" | "dt" => Some(ElementMeta::implicit(&["dd", "dt"])),
        "td" | "th" => Some(ElementMeta::implicit(&["td", "th", "tr"])),
        "tr" => Some(ElementMeta::implicit(&["tr"])),
        "thead" | "tbody" => Some(ElementMeta::implicit(&["tbody", "tfoot"])),
        "option" => Some(ElementMeta::implicit(&["option", "optgroup"])),
        "optgroup" => Some(ElementMeta::implicit(&["optgroup"])),
        "head" => Some(ElementMeta::implicit(&["body"])),

        "svg" | "math" => Some(ElementMeta::foreign()),

        _ => None,
    }
}
