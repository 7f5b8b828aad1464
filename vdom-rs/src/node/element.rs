//! Elements and their attributes.

use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use super::namespace::{split_qname, ExpandedName};
use super::Node;

/// A single attribute as it appeared in the source markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    prefix: Option<String>,
    local_name: String,
    value: String,
}

impl Attribute {
    /// Creates an attribute from its qualified key (`class`, `xlink:href`).
    pub fn new(key: &str, value: impl Into<String>) -> Self {
        let (prefix, local) = split_qname(key);
        Attribute {
            prefix: prefix.map(str::to_string),
            local_name: local.to_string(),
            value: value.into(),
        }
    }

    /// Returns the namespace prefix, if any.
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Returns the local part of the attribute name.
    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// Returns the fully-qualified key, namespace-prefixed when a prefix is present.
    pub fn key(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}:{}", prefix, self.local_name),
            None => self.local_name.clone(),
        }
    }

    /// Returns the attribute value.
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// A parsed element: tag identity, attributes in document order and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// The qualified name as written in the source (e.g. "div", "svg:rect").
    qname: String,
    /// Namespace URI + local name; this is the element's identity.
    name: ExpandedName,
    attributes: Vec<Attribute>,
    children: Vec<Rc<Node>>,
}

impl Element {
    /// Creates a new element.
    pub fn new(
        qname: impl Into<String>,
        name: ExpandedName,
        attributes: Vec<Attribute>,
        children: Vec<Rc<Node>>,
    ) -> Self {
        Element {
            qname: qname.into(),
            name,
            attributes,
            children,
        }
    }

    /// Creates an element outside any namespace.
    pub fn plain(qname: &str, attributes: Vec<Attribute>, children: Vec<Rc<Node>>) -> Self {
        let (_, local) = split_qname(qname);
        Element::new(qname, ExpandedName::no_namespace(local), attributes, children)
    }

    /// Returns the qualified name as written in the source.
    pub fn qname(&self) -> &str {
        &self.qname
    }

    /// Returns the expanded name used as the element's identity.
    pub fn name(&self) -> &ExpandedName {
        &self.name
    }

    /// Returns the attributes in document order.
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Looks up an attribute value by its fully-qualified key.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.key() == key)
            .map(Attribute::value)
    }

    /// Returns the attributes keyed by fully-qualified name.
    pub fn attribute_map(&self) -> FxHashMap<String, &str> {
        self.attributes
            .iter()
            .map(|attr| (attr.key(), attr.value()))
            .collect()
    }

    /// Returns the children in document order, including comments.
    pub fn children(&self) -> &[Rc<Node>] {
        &self.children
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.qname)?;
        for attr in &self.attributes {
            write!(f, " {}={:?}", attr.key(), attr.value())?;
        }
        f.write_str(">")
    }
}
