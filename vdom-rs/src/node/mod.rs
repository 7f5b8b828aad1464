//! Parsed markup units.
//!
//! A [`Node`] is what the markup parser hands to the tree model: an element
//! with its whole subtree, a run of text, or one of the parse artifacts
//! (comments, doctype) that the tree model later drops. Nodes are immutable
//! once parsed and subtrees are shared through `Rc`, so trees and patches can
//! point at them without copying.

mod element;
pub mod namespace;

pub use element::{Attribute, Element};
pub use namespace::ExpandedName;

use std::fmt;
use std::rc::Rc;

/// A parsed markup unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// An element with attributes and children.
    Element(Element),
    /// Character data.
    Text(String),
    /// A comment (without the `<!--` and `-->` markers).
    Comment(String),
    /// A doctype declaration (the part after `<!DOCTYPE`).
    Doctype(String),
}

/// What two nodes must share to be treated as the same node across renders.
///
/// For elements this is the expanded tag name only; attribute values and
/// descendants never take part. A text node has no in-place update, so its
/// content is its identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identity {
    Element(ExpandedName),
    Text(String),
    Comment,
    Doctype,
}

impl Node {
    /// Creates a text node.
    pub fn text(text: impl Into<String>) -> Rc<Node> {
        Rc::new(Node::Text(text.into()))
    }

    /// Creates an element node outside any namespace.
    pub fn element(qname: &str, attributes: Vec<Attribute>, children: Vec<Rc<Node>>) -> Rc<Node> {
        Rc::new(Node::Element(Element::plain(qname, attributes, children)))
    }

    /// Returns the node's identity.
    pub fn identity(&self) -> Identity {
        match self {
            Node::Element(e) => Identity::Element(e.name().clone()),
            Node::Text(t) => Identity::Text(t.clone()),
            Node::Comment(_) => Identity::Comment,
            Node::Doctype(_) => Identity::Doctype,
        }
    }

    /// Returns true for the node kinds the tree model keeps.
    pub fn is_addressable(&self) -> bool {
        matches!(self, Node::Element(_) | Node::Text(_))
    }

    /// Returns a reference to the element, if this is an element node.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Returns the text, if this is a text node.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Returns the children of an element; other nodes have none.
    pub fn children(&self) -> &[Rc<Node>] {
        match self {
            Node::Element(e) => e.children(),
            _ => &[],
        }
    }

    /// Short human-readable description used in logs.
    pub fn describe(&self) -> String {
        match self {
            Node::Element(e) => format!("element node <{}>", e.qname()),
            Node::Text(t) => format!("text node {:?}", t.trim()),
            Node::Comment(_) => "comment node".to_string(),
            Node::Doctype(_) => "doctype node".to_string(),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_ignores_attributes_and_children() {
        let a = Node::element("span", vec![Attribute::new("class", "a")], vec![Node::text("x")]);
        let b = Node::element("span", Vec::new(), Vec::new());
        assert_eq!(a.identity(), b.identity());

        assert_eq!(Node::text("Hello").identity(), Node::text("Hello").identity());
        assert_ne!(Node::text("Hello").identity(), Node::text("World").identity());
        assert_ne!(
            Node::element("span", Vec::new(), Vec::new()).identity(),
            Node::element("strong", Vec::new(), Vec::new()).identity()
        );
        assert_ne!(Node::text("span").identity(), b.identity());
    }

    #[test]
    fn test_addressable_kinds() {
        assert!(Node::text("x").is_addressable());
        assert!(Node::element("p", Vec::new(), Vec::new()).is_addressable());
        assert!(!Node::Comment("c".into()).is_addressable());
        assert!(!Node::Doctype("html".into()).is_addressable());
    }

    #[test]
    fn test_describe() {
        assert_eq!(Node::text("  Hello ").describe(), r#"text node "Hello""#);
        assert_eq!(
            Node::element("span", Vec::new(), Vec::new()).describe(),
            "element node <span>"
        );
    }
}
