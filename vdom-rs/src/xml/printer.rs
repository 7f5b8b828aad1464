//! Markup printer for parsed nodes.
//!
//! Compact output is what the patch applier hands to a host's
//! `create_element_from_markup`, so it must re-parse to the same nodes:
//! no whitespace is introduced between tags. Pretty output is for humans.

use std::io::Write;

use crate::node::{Element, Node};

/// Options for markup printing.
#[derive(Debug, Clone, Default)]
pub struct PrintOptions {
    /// Whether to pretty-print with indentation, one node per line.
    pub pretty: bool,
}

/// Printer writing nodes as markup.
pub struct MarkupPrinter<W: Write> {
    writer: W,
    options: PrintOptions,
    indent: usize,
}

impl<W: Write> MarkupPrinter<W> {
    /// Creates a new compact printer.
    pub fn new(writer: W) -> Self {
        Self::with_options(writer, PrintOptions::default())
    }

    /// Creates a new printer with the given options.
    pub fn with_options(writer: W, options: PrintOptions) -> Self {
        MarkupPrinter {
            writer,
            options,
            indent: 0,
        }
    }

    /// Prints a node and its subtree.
    pub fn print(&mut self, node: &Node) -> std::io::Result<()> {
        match node {
            Node::Element(element) => self.element(element),
            Node::Text(text) => self.line(&to_entities(text, false)),
            Node::Comment(comment) => self.line(&format!("<!--{}-->", comment)),
            Node::Doctype(doctype) => self.line(&format!("<!DOCTYPE {}>", doctype)),
        }
    }

    /// Flushes and returns the underlying writer.
    pub fn into_inner(mut self) -> std::io::Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }

    fn element(&mut self, element: &Element) -> std::io::Result<()> {
        let mut tag = String::new();
        tag.push('<');
        tag.push_str(element.qname());
        for attr in element.attributes() {
            tag.push(' ');
            tag.push_str(&attr.key());
            tag.push_str("=\"");
            tag.push_str(&to_entities(attr.value(), true));
            tag.push('"');
        }

        if element.children().is_empty() {
            tag.push_str(" />");
            return self.line(&tag);
        }

        tag.push('>');
        self.line(&tag)?;
        self.indent += 1;
        for child in element.children() {
            self.print(child)?;
        }
        self.indent -= 1;
        self.line(&format!("</{}>", element.qname()))
    }

    fn line(&mut self, s: &str) -> std::io::Result<()> {
        if self.options.pretty {
            writeln!(self.writer, "{}{}", "  ".repeat(self.indent), s)
        } else {
            write!(self.writer, "{}", s)
        }
    }
}

/// Converts special characters to entities.
fn to_entities(s: &str, in_attribute: bool) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' if in_attribute => result.push_str("&quot;"),
            _ => result.push(c),
        }
    }
    result
}

/// Prints a node to a string.
pub fn print_to_string(node: &Node, options: &PrintOptions) -> std::io::Result<String> {
    let mut printer = MarkupPrinter::with_options(Vec::new(), options.clone());
    printer.print(node)?;
    let output = printer.into_inner()?;
    String::from_utf8(output)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

/// Prints a sequence of sibling nodes to a string.
pub fn print_fragment<'a, I>(nodes: I, options: &PrintOptions) -> std::io::Result<String>
where
    I: IntoIterator<Item = &'a Node>,
{
    let mut printer = MarkupPrinter::with_options(Vec::new(), options.clone());
    for node in nodes {
        printer.print(node)?;
    }
    let output = printer.into_inner()?;
    String::from_utf8(output)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}
