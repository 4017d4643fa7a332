//! Integration tests for the HTML lexer.

use magpie_common::Source;
use magpie_html::lexer::{Lexer, Token, TokenData};

/// Helper to tokenize a string, expecting success.
fn lex(text: &str) -> Vec<Token> {
    let source = Source::new(text, "inline.html");
    Lexer::new(&source)
        .collect::<Result<Vec<_>, _>>()
        .expect("tokenization should succeed")
}

/// Helper to tokenize a string, expecting failure.
fn lex_error(text: &str) -> String {
    let source = Source::new(text, "inline.html");
    let error = Lexer::new(&source)
        .collect::<Result<Vec<_>, _>>()
        .expect_err("tokenization should fail");
    error.message
}

#[test]
fn test_token_spans_reproduce_source() {
    let src = r#"<p class="a">x</p>"#;
    let tokens = lex(src);
    let slices: Vec<&str> = tokens
        .iter()
        .map(|token| &src[token.location.offset..token.location.offset + token.location.size])
        .collect();
    assert_eq!(
        slices,
        ["<p", " ", "class", r#"="a""#, ">", "x", "</p", ">", ""]
    );
}

#[test]
fn test_line_and_column_tracking() {
    let tokens = lex("a\nb");
    assert!(matches!(&tokens[0].data, TokenData::Text { text } if text == "a"));
    assert_eq!((tokens[0].location.line, tokens[0].location.column), (1, 1));
    assert!(matches!(&tokens[1].data, TokenData::Whitespace { .. }));
    assert!(matches!(&tokens[2].data, TokenData::Text { text } if text == "b"));
    assert_eq!((tokens[2].location.line, tokens[2].location.column), (2, 1));
}

#[test]
fn test_crlf_counts_as_one_line_break() {
    let tokens = lex("a\r\nb");
    assert!(matches!(&tokens[1].data, TokenData::Whitespace { text } if text == "\r\n"));
    assert_eq!((tokens[2].location.line, tokens[2].location.column), (2, 1));
}

#[test]
fn test_lone_cr_counts_as_one_line_break() {
    let tokens = lex("a\rb");
    assert_eq!((tokens[2].location.line, tokens[2].location.column), (2, 1));
}

#[test]
fn test_doctype_tokens() {
    let tokens = lex("<!DOCTYPE html>");
    assert!(matches!(&tokens[0].data, TokenData::DoctypeOpen { text } if text == "<!DOCTYPE "));
    assert!(matches!(&tokens[1].data, TokenData::DoctypeValue { value } if value == "html"));
    assert!(matches!(&tokens[2].data, TokenData::DoctypeClose));
    assert!(matches!(&tokens[3].data, TokenData::Eof));
}

#[test]
fn test_unicode_bom() {
    let tokens = lex("\u{FEFF}<p></p>");
    assert!(matches!(&tokens[0].data, TokenData::UnicodeBom));
    assert!(matches!(&tokens[1].data, TokenData::TagOpen { close: false, tag } if tag == "p"));
}

#[test]
fn test_xml_prolog_is_skipped() {
    let tokens = lex("<?xml version=\"1.0\"?>\n<p></p>");
    assert!(matches!(&tokens[0].data, TokenData::TagOpen { close: false, tag } if tag == "p"));
}

#[test]
fn test_attribute_forms() {
    let tokens = lex("<input disabled value=foo id='x'>");
    let names: Vec<&str> = tokens
        .iter()
        .filter_map(|token| match &token.data {
            TokenData::AttrName { name } => Some(name.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(names, ["disabled", "value", "id"]);

    let values: Vec<(&str, Option<char>)> = tokens
        .iter()
        .filter_map(|token| match &token.data {
            TokenData::AttrValue { value, quote } => Some((value.as_str(), *quote)),
            _ => None,
        })
        .collect();
    assert_eq!(values, [("foo", None), ("x", Some('\''))]);
}

#[test]
fn test_self_closing_syntax() {
    let tokens = lex("<br/>");
    assert!(matches!(&tokens[1].data, TokenData::TagClose { self_closed: true }));
}

#[test]
fn test_script_content_is_raw_text() {
    let tokens = lex("<script>if (a < b) {}</script>");
    assert!(matches!(&tokens[2].data, TokenData::Script { text } if text == "if (a < b) {}"));
    assert!(matches!(&tokens[3].data, TokenData::TagOpen { close: true, tag } if tag == "script"));
}

#[test]
fn test_style_content_is_raw_text() {
    let tokens = lex("<style>p > em { color: red }</style>");
    assert!(matches!(&tokens[2].data, TokenData::Style { text } if text == "p > em { color: red }"));
}

#[test]
fn test_script_end_tag_is_case_insensitive() {
    let tokens = lex("<script>x</SCRIPT>");
    assert!(matches!(&tokens[2].data, TokenData::Script { text } if text == "x"));
    assert!(matches!(&tokens[3].data, TokenData::TagOpen { close: true, tag } if tag == "SCRIPT"));
}

#[test]
fn test_templating_placeholder_is_atomic() {
    let tokens = lex("a<% user.name %>b");
    assert!(matches!(&tokens[0].data, TokenData::Text { text } if text == "a"));
    assert!(
        matches!(&tokens[1].data, TokenData::Templating { expr } if expr == "<% user.name %>")
    );
    assert!(matches!(&tokens[2].data, TokenData::Text { text } if text == "b"));
}

#[test]
fn test_templating_dollar_form() {
    let tokens = lex("<$ value $>");
    assert!(matches!(&tokens[0].data, TokenData::Templating { expr } if expr == "<$ value $>"));
}

#[test]
fn test_conditional_comment_tokens() {
    let tokens = lex("<!--[if IE]>x<![endif]-->");
    assert!(matches!(&tokens[0].data, TokenData::Conditional { text } if text == "<!--[if IE]>"));
    assert!(matches!(&tokens[1].data, TokenData::Text { text } if text == "x"));
    assert!(
        matches!(&tokens[2].data, TokenData::Conditional { text } if text == "<![endif]-->")
    );
}

#[test]
fn test_bare_conditional_token() {
    let tokens = lex("<![if !IE]>");
    assert!(matches!(&tokens[0].data, TokenData::Conditional { text } if text == "<![if !IE]>"));
}

#[test]
fn test_directive_token() {
    let tokens = lex("<!-- [html-validate-disable-next foo] -->");
    match &tokens[0].data {
        TokenData::Directive { text, text_offset } => {
            assert!(text.starts_with("disable-next foo"));
            assert_eq!(*text_offset, "<!-- [html-validate-".len());
        }
        other => panic!("expected directive token, got {other:?}"),
    }
}

#[test]
fn test_cdata_is_skipped() {
    let tokens = lex("a<![CDATA[ignored]]>b");
    assert!(matches!(&tokens[0].data, TokenData::Text { text } if text == "a"));
    assert!(matches!(&tokens[1].data, TokenData::Text { text } if text == "b"));
}

#[test]
fn test_comment_token() {
    let tokens = lex("<!-- hi -->");
    assert!(matches!(&tokens[0].data, TokenData::Comment { text } if text == " hi "));
}

#[test]
fn test_stray_angle_bracket_fails() {
    let message = lex_error("< p");
    assert!(message.contains("no rule matched"), "got: {message}");
}

#[test]
fn test_eof_inside_tag_fails() {
    let message = lex_error("<p class");
    assert!(message.contains("unexpected end of input"), "got: {message}");
}

#[test]
fn test_unterminated_comment_fails() {
    let message = lex_error("<!-- never closed");
    assert!(message.contains("no rule matched"), "got: {message}");
}

#[test]
fn test_fragment_positions_offset_locations() {
    let source = Source::fragment("<p></p>", "page.html", 10, 5, 120);
    let tokens: Vec<Token> = Lexer::new(&source)
        .collect::<Result<Vec<_>, _>>()
        .expect("tokenization should succeed");
    assert_eq!(tokens[0].location.line, 10);
    assert_eq!(tokens[0].location.column, 5);
    assert_eq!(tokens[0].location.offset, 120);
}

#[test]
fn test_stream_ends_with_eof_token() {
    let tokens = lex("");
    assert_eq!(tokens.len(), 1);
    assert!(matches!(&tokens[0].data, TokenData::Eof));
}
