//! logos-based HTML ingestion for server-rendered markup.
//!
//! Only the subset the SSR renderer emits is understood: elements with
//! quoted, unquoted or bare attributes, text, comments and a doctype.
//! The doctype and comments are dropped, except [`EMPTY_TEXT_COMMENT`] which
//! stands for an empty text node.

use logos::Logos;

use super::node::{DomId, DomNode};
use super::tree::Dom;
use crate::vdom::{NodeKind, Property};

/// Tag used in markup for fragment nodes.
pub const FRAGMENT_TAG: &str = "raven-fragment";

/// Comment standing in for an empty text node.
pub const EMPTY_TEXT_COMMENT: &str = "<!--t-->";

/// Elements that never have children or a closing tag.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

pub fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

/// Errors raised while parsing markup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HtmlError {
    #[error("unexpected input at byte {offset}")]
    Unexpected { offset: usize },

    #[error("closing tag `</{tag}>` at byte {offset} has no matching open tag")]
    UnmatchedClose { tag: String, offset: usize },

    #[error("`<{tag}>` is never closed")]
    Unclosed { tag: String },
}

/// HTML token produced by the lexer.
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
enum Token {
    /// `<!-- ... -->`, including the empty `<!---->` separator.
    #[regex(r"<!--([^-]|-[^-])*-->")]
    Comment,

    #[regex(r"<![dD][oO][cC][tT][yY][pP][eE][^>]*>")]
    Doctype,

    #[regex(r"</[a-zA-Z][a-zA-Z0-9-]*[ \t\n\r]*>")]
    CloseTag,

    /// `<tag ...>` or self-closing `<tag/>`. Quoted values may contain `>`.
    /// Attributes are split out by [`split_open_tag`].
    #[regex(r#"<[a-zA-Z][a-zA-Z0-9-]*([^>"']|"[^"]*"|'[^']*')*>"#)]
    OpenTag,

    #[regex(r"[^<]+")]
    Text,
}

/// Parse markup into a fresh [`Dom`]. Attributes named `marker_attribute`
/// become node markers instead of properties.
pub fn parse(input: &str, marker_attribute: &str) -> Result<Dom, HtmlError> {
    let mut dom = Dom::new();
    let mut stack: Vec<(DomId, String)> = Vec::new();

    let mut lexer = Token::lexer(input);
    while let Some(token) = lexer.next() {
        let span = lexer.span();
        let slice = lexer.slice();
        let parent = stack.last().map_or(dom.container(), |(id, _)| *id);
        match token {
            Err(()) => return Err(HtmlError::Unexpected { offset: span.start }),
            Ok(Token::Comment) if slice == EMPTY_TEXT_COMMENT => {
                dom.insert_child(parent, DomNode::text(""));
            }
            Ok(Token::Comment | Token::Doctype) => {}
            Ok(Token::Text) => {
                dom.insert_child(parent, DomNode::text(decode_entities(slice)));
            }
            Ok(Token::OpenTag) => {
                let (tag, attributes, self_closing) = split_open_tag(slice);
                let data = element_data(&tag, attributes, marker_attribute);
                let id = dom.insert_child(parent, data);
                if !self_closing && !is_void(&tag) {
                    stack.push((id, tag));
                }
            }
            Ok(Token::CloseTag) => {
                let tag = slice[2..slice.len() - 1].trim().to_ascii_lowercase();
                if is_void(&tag) {
                    continue;
                }
                let Some(depth) = stack.iter().rposition(|(_, open)| *open == tag) else {
                    return Err(HtmlError::UnmatchedClose {
                        tag,
                        offset: span.start,
                    });
                };
                if let Some((_, unclosed)) = stack.get(depth + 1) {
                    return Err(HtmlError::Unclosed {
                        tag: unclosed.clone(),
                    });
                }
                stack.truncate(depth);
            }
        }
    }

    match stack.pop() {
        Some((_, tag)) => Err(HtmlError::Unclosed { tag }),
        None => Ok(dom),
    }
}

fn element_data(tag: &str, attributes: Vec<(String, Option<String>)>, marker_attribute: &str) -> DomNode {
    let mut data = if tag == FRAGMENT_TAG {
        DomNode::new(NodeKind::Fragment)
    } else {
        DomNode::element(tag)
    };
    for (name, value) in attributes {
        if name == marker_attribute {
            data.marker = value;
            continue;
        }
        match value {
            None => {
                data.properties.insert(Property::boolean_attribute(name, true));
            }
            Some(value) if name == "style" => {
                for (property, value) in parse_style(&value) {
                    data.properties.insert(Property::style(property, value));
                }
            }
            Some(value) => {
                data.properties.insert(Property::attribute(name, value));
            }
        }
    }
    data
}

/// Split a lexed open tag into its lowercased tag name, its attributes (with
/// entities decoded) and whether it self-closes.
fn split_open_tag(slice: &str) -> (String, Vec<(String, Option<String>)>, bool) {
    let self_closing = slice.ends_with("/>");
    let end = slice.len() - if self_closing { 2 } else { 1 };
    let body = &slice[1..end];

    let name_end = body
        .find(|c: char| c.is_ascii_whitespace())
        .unwrap_or(body.len());
    let tag = body[..name_end].to_ascii_lowercase();

    let mut attributes = Vec::new();
    let mut rest = body[name_end..].trim_start();
    while !rest.is_empty() {
        let name_len = rest
            .find(|c: char| c.is_ascii_whitespace() || c == '=')
            .unwrap_or(rest.len());
        let name = rest[..name_len].to_ascii_lowercase();
        rest = rest[name_len..].trim_start();

        let value = match rest.strip_prefix('=') {
            Some(after) => {
                let after = after.trim_start();
                let (value, remaining) = match after.chars().next() {
                    Some(quote @ ('"' | '\'')) => {
                        let inner = &after[1..];
                        let close = inner.find(quote).unwrap_or(inner.len());
                        (&inner[..close], inner.get(close + 1..).unwrap_or(""))
                    }
                    _ => {
                        let len = after
                            .find(|c: char| c.is_ascii_whitespace())
                            .unwrap_or(after.len());
                        (&after[..len], &after[len..])
                    }
                };
                rest = remaining.trim_start();
                Some(decode_entities(value))
            }
            None => None,
        };
        if !name.is_empty() && name != "/" {
            attributes.push((name, value));
        }
    }
    (tag, attributes, self_closing)
}

/// Parse an inline `style` attribute into `(property, value)` pairs.
pub fn parse_style(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|declaration| {
            let (name, value) = declaration.split_once(':')?;
            let name = name.trim();
            (!name.is_empty()).then(|| (name.to_owned(), value.trim().to_owned()))
        })
        .collect()
}

/// Decode the character references the SSR escaper produces, plus numeric
/// references. Unknown references are kept verbatim.
pub fn decode_entities(input: &str) -> String {
    if !input.contains('&') {
        return input.to_owned();
    }
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let decoded = rest.find(';').and_then(|semi| {
            let decoded = match &rest[1..semi] {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                entity => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                    .and_then(char::from_u32),
            };
            decoded.map(|c| (c, semi))
        });
        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

// ===========================================================================
// Tests
// ===========================================================================
