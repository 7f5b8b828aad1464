//! Markup parser that builds immutable node forests.
//!
//! This parser uses quick-xml's streaming API. Elements are collected on a
//! stack of open frames and frozen into `Rc<Node>` when their end tag is
//! seen, so the finished forest is never mutated again.

use std::rc::Rc;

use quick_xml::escape::{resolve_predefined_entity, unescape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{Error, Result};
use crate::node::namespace::NamespaceScopes;
use crate::node::{Attribute, Element, Node};

/// How text runs are normalized while parsing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Whitespace {
    /// Collapse whitespace runs to one space, trim text at tag boundaries
    /// and drop whitespace-only text.
    #[default]
    Collapse,
    /// Keep text verbatim, including whitespace-only runs between tags.
    Preserve,
}

/// Which markup rules the parser enforces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Syntax {
    /// Well-formed XML: every element is closed and every attribute is
    /// quoted.
    #[default]
    Xml,
    /// HTML fragment rules: void elements such as `<br>` and `<input>`
    /// need no end tag, attributes may be bare (`disabled`) or unquoted
    /// (`id=x`), and common named entities resolve. Unknown entities are
    /// kept as literal text.
    Html,
}

/// Parser configuration.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Whitespace policy for text nodes.
    pub whitespace: Whitespace,
    /// Markup rules.
    pub syntax: Syntax,
}

impl ParseOptions {
    /// Options for HTML fragments with default whitespace handling.
    pub fn html() -> Self {
        ParseOptions {
            syntax: Syntax::Html,
            ..Default::default()
        }
    }
}

/// Elements that never have content in HTML and take no end tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

fn is_void_element(qname: &str) -> bool {
    VOID_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(qname))
}

/// An element whose end tag has not been seen yet.
struct OpenElement {
    qname: String,
    attributes: Vec<Attribute>,
    children: Vec<Rc<Node>>,
}

/// Markup parser producing a forest of top-level nodes.
#[derive(Debug, Clone, Default)]
pub struct MarkupParser {
    options: ParseOptions,
}

impl MarkupParser {
    /// Creates a new parser with the given options.
    pub fn new(options: ParseOptions) -> Self {
        MarkupParser { options }
    }

    /// Returns the options this parser was created with.
    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Parses a fragment from raw bytes, which must be UTF-8.
    pub fn parse_bytes(&self, src: &[u8]) -> Result<Vec<Rc<Node>>> {
        let src = std::str::from_utf8(src).map_err(|e| Error::Parse(e.to_string()))?;
        self.parse_fragment(src)
    }

    /// Parses a fragment into its top-level sibling nodes, in document order.
    pub fn parse_fragment(&self, src: &str) -> Result<Vec<Rc<Node>>> {
        self.parse_fragment_in(src, &[])
    }

    /// Parses a fragment as if it appeared inside elements carrying the
    /// given namespace declarations (`xmlns`, `xmlns:p` attributes;
    /// anything else is ignored).
    pub fn parse_fragment_in(&self, src: &str, context: &[Attribute]) -> Result<Vec<Rc<Node>>> {
        let mut reader = Reader::from_str(src.trim());
        // Whitespace handling is ours, not quick-xml's
        reader.config_mut().trim_text_start = false;
        reader.config_mut().trim_text_end = false;
        let html = self.options.syntax == Syntax::Html;
        // End tags are matched against our own stack in HTML mode, where a
        // void element's start tag never gets one
        reader.config_mut().check_end_names = !html;
        reader.config_mut().allow_unmatched_ends = html;

        let mut roots: Vec<Rc<Node>> = Vec::new();
        let mut stack: Vec<OpenElement> = Vec::new();
        let mut scopes = NamespaceScopes::new();
        scopes.enter(context);
        let mut text: Option<String> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) => {
                    self.flush_text(&mut text, &mut stack, &mut roots);
                    let (qname, attributes) = self.parse_start(e, &reader)?;
                    scopes.enter(&attributes);
                    if html && is_void_element(&qname) {
                        let name = scopes.resolve_element(&qname)?;
                        scopes.leave();
                        let node = Rc::new(Node::Element(Element::new(
                            qname,
                            name,
                            attributes,
                            Vec::new(),
                        )));
                        push_node(&mut stack, &mut roots, node);
                        continue;
                    }
                    stack.push(OpenElement {
                        qname,
                        attributes,
                        children: Vec::new(),
                    });
                }
                Ok(Event::End(ref e)) => {
                    self.flush_text(&mut text, &mut stack, &mut roots);
                    if html {
                        let end_name = e.name();
                        let end = reader
                            .decoder()
                            .decode(end_name.as_ref())
                            .map_err(|e| Error::Parse(e.to_string()))?;
                        if is_void_element(&end) {
                            continue;
                        }
                        if stack.last().is_none_or(|open| !open.qname.eq_ignore_ascii_case(&end)) {
                            return Err(Error::Parse(format!("unexpected end tag </{}>", end)));
                        }
                    }
                    let open = stack
                        .pop()
                        .ok_or_else(|| Error::Parse("unexpected end tag".to_string()))?;
                    let name = scopes.resolve_element(&open.qname)?;
                    scopes.leave();
                    let node = Rc::new(Node::Element(Element::new(
                        open.qname,
                        name,
                        open.attributes,
                        open.children,
                    )));
                    push_node(&mut stack, &mut roots, node);
                }
                Ok(Event::Empty(ref e)) => {
                    // Self-closing tag - handle like Start + End
                    self.flush_text(&mut text, &mut stack, &mut roots);
                    let (qname, attributes) = self.parse_start(e, &reader)?;
                    scopes.enter(&attributes);
                    let name = scopes.resolve_element(&qname)?;
                    scopes.leave();
                    let node = Rc::new(Node::Element(Element::new(
                        qname,
                        name,
                        attributes,
                        Vec::new(),
                    )));
                    push_node(&mut stack, &mut roots, node);
                }
                Ok(Event::Text(e)) => {
                    let raw =
                        std::str::from_utf8(e.as_ref()).map_err(|e| Error::Parse(e.to_string()))?;
                    let unescaped = unescape(raw).map_err(|e| Error::Parse(e.to_string()))?;
                    self.push_text(&mut text, &unescaped);
                }
                Ok(Event::CData(e)) => {
                    let raw =
                        std::str::from_utf8(e.as_ref()).map_err(|e| Error::Parse(e.to_string()))?;
                    self.push_text(&mut text, raw);
                }
                Ok(Event::GeneralRef(e)) => {
                    let name =
                        std::str::from_utf8(e.as_ref()).map_err(|e| Error::Parse(e.to_string()))?;
                    let resolved = resolve_reference(name, self.options.syntax)?;
                    self.push_text(&mut text, &resolved);
                }
                Ok(Event::Comment(e)) => {
                    self.flush_text(&mut text, &mut stack, &mut roots);
                    let comment = String::from_utf8_lossy(e.as_ref()).to_string();
                    push_node(&mut stack, &mut roots, Rc::new(Node::Comment(comment)));
                }
                Ok(Event::DocType(e)) => {
                    self.flush_text(&mut text, &mut stack, &mut roots);
                    let doctype = String::from_utf8_lossy(e.as_ref()).trim().to_string();
                    push_node(&mut stack, &mut roots, Rc::new(Node::Doctype(doctype)));
                }
                Ok(Event::Decl(_)) | Ok(Event::PI(_)) => {
                    // Ignore XML declaration and processing instructions
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::Parse(format!(
                        "malformed markup at byte {}: {}",
                        reader.error_position(),
                        e
                    )))
                }
            }
        }

        if let Some(open) = stack.last() {
            return Err(Error::Parse(format!("unclosed element <{}>", open.qname)));
        }
        self.flush_text(&mut text, &mut stack, &mut roots);

        Ok(roots)
    }

    /// Parses an element's name and attributes.
    fn parse_start(
        &self,
        e: &BytesStart,
        reader: &Reader<&[u8]>,
    ) -> Result<(String, Vec<Attribute>)> {
        let qname = reader
            .decoder()
            .decode(e.name().as_ref())
            .map_err(|e| Error::Parse(e.to_string()))?
            .to_string();

        let html = self.options.syntax == Syntax::Html;
        let attrs = if html {
            e.html_attributes()
        } else {
            e.attributes()
        };

        let mut attributes = Vec::new();
        for attr_result in attrs {
            let attr = attr_result.map_err(quick_xml::Error::from)?;
            let key = reader
                .decoder()
                .decode(attr.key.as_ref())
                .map_err(|e| Error::Parse(e.to_string()))?;
            let value = if html {
                attr.unescape_value_with(|entity| {
                    resolve_predefined_entity(entity).or_else(|| html_entity(entity))
                })
            } else {
                attr.unescape_value()
            }
            .map_err(|e| Error::Parse(e.to_string()))?;
            attributes.push(Attribute::new(&key, value));
        }

        Ok((qname, attributes))
    }

    fn push_text(&self, current: &mut Option<String>, chunk: &str) {
        let addition = match self.options.whitespace {
            Whitespace::Preserve => Some(chunk.to_string()),
            Whitespace::Collapse => normalize_whitespace(chunk, current.as_deref()),
        };
        if let Some(addition) = addition {
            current.get_or_insert_with(String::new).push_str(&addition);
        }
    }

    fn flush_text(
        &self,
        current: &mut Option<String>,
        stack: &mut [OpenElement],
        roots: &mut Vec<Rc<Node>>,
    ) {
        let Some(text) = current.take() else {
            return;
        };
        let text = match self.options.whitespace {
            Whitespace::Collapse => text.trim_matches(is_markup_whitespace).to_string(),
            Whitespace::Preserve => text,
        };
        if !text.is_empty() {
            push_node(stack, roots, Node::text(text));
        }
    }
}

fn push_node(stack: &mut [OpenElement], roots: &mut Vec<Rc<Node>>, node: Rc<Node>) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => roots.push(node),
    }
}

/// Named entities recognized in HTML mode beyond the XML predefined ones.
fn html_entity(name: &str) -> Option<&'static str> {
    let resolved = match name {
        "nbsp" => "\u{a0}",
        "copy" => "\u{a9}",
        "reg" => "\u{ae}",
        "trade" => "\u{2122}",
        "hellip" => "\u{2026}",
        "mdash" => "\u{2014}",
        "ndash" => "\u{2013}",
        "laquo" => "\u{ab}",
        "raquo" => "\u{bb}",
        "middot" => "\u{b7}",
        "times" => "\u{d7}",
        "euro" => "\u{20ac}",
        _ => return None,
    };
    Some(resolved)
}

/// Resolves a predefined entity or a numeric character reference.
///
/// In HTML mode a few more named entities resolve and anything else is
/// kept verbatim, as browsers do.
fn resolve_reference(name: &str, syntax: Syntax) -> Result<String> {
    let resolved = match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => name.strip_prefix('#').and_then(|num| {
            let code = match num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
                Some(hex) => u32::from_str_radix(hex, 16).ok(),
                None => num.parse::<u32>().ok(),
            };
            code.and_then(char::from_u32)
        }),
    };
    match (resolved, syntax) {
        (Some(c), _) => Ok(c.to_string()),
        (None, Syntax::Html) => Ok(html_entity(name)
            .map(String::from)
            .unwrap_or_else(|| format!("&{};", name))),
        (None, Syntax::Xml) => Err(Error::Parse(format!(
            "unknown entity reference '&{};'",
            name
        ))),
    }
}

/// XML and HTML only treat ASCII space, tab, CR and LF as whitespace, so a
/// resolved `&nbsp;` is content.
fn is_markup_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

/// Collapses consecutive whitespace to a single space.
///
/// Only returns Some if there's non-whitespace content, so whitespace-only
/// runs between tags never become text nodes.
fn normalize_whitespace(text: &str, previous: Option<&str>) -> Option<String> {
    let mut last_was_ws = previous.is_none_or(|p| p.ends_with(' '));
    let mut has_non_ws =
        previous.is_some_and(|p| !p.trim_matches(is_markup_whitespace).is_empty());
    let mut result = String::new();

    for c in text.chars() {
        if is_markup_whitespace(c) {
            if !last_was_ws {
                result.push(' ');
                last_was_ws = true;
            }
        } else {
            result.push(c);
            last_was_ws = false;
            has_non_ws = true;
        }
    }

    if has_non_ws {
        Some(result)
    } else {
        None
    }
}

/// Parses a fragment with default options.
pub fn parse_fragment(src: &str) -> Result<Vec<Rc<Node>>> {
    MarkupParser::default().parse_fragment(src)
}
