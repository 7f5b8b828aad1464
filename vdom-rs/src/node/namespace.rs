//! Namespace resolution for element tag identity.

use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use super::Attribute;
use crate::error::{Error, Result};

const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// An expanded element name: namespace URI plus local name.
///
/// This pair is the whole of an element's identity when two renders are
/// compared. The prefix used in the source markup is not part of it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExpandedName {
    /// The namespace URI (empty string for no namespace).
    pub namespace_uri: Rc<str>,
    /// The local part of the name (without prefix).
    pub local_name: String,
}

impl ExpandedName {
    /// Creates a new expanded name with a namespace.
    pub fn new(uri: impl Into<Rc<str>>, local: impl Into<String>) -> Self {
        Self {
            namespace_uri: uri.into(),
            local_name: local.into(),
        }
    }

    /// Creates an expanded name with no namespace.
    pub fn no_namespace(local: impl Into<String>) -> Self {
        Self::new("", local)
    }

    /// Returns the namespace URI, or `None` when the name has no namespace.
    pub fn namespace(&self) -> Option<&str> {
        if self.namespace_uri.is_empty() {
            None
        } else {
            Some(&self.namespace_uri)
        }
    }
}

impl fmt::Display for ExpandedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.namespace() {
            Some(uri) => write!(f, "{{{}}}{}", uri, self.local_name),
            None => f.write_str(&self.local_name),
        }
    }
}

/// Stack of prefix bindings, one scope per open element.
pub struct NamespaceScopes {
    uris: FxHashMap<String, Rc<str>>,
    scopes: Vec<FxHashMap<String, Rc<str>>>,
}

impl Default for NamespaceScopes {
    fn default() -> Self {
        Self::new()
    }
}

impl NamespaceScopes {
    /// Creates an empty scope stack with the `xml` prefix bound.
    pub fn new() -> Self {
        let mut scopes = NamespaceScopes {
            uris: FxHashMap::default(),
            scopes: vec![FxHashMap::default()],
        };
        scopes.bind("xml", XML_NAMESPACE);
        scopes
    }

    /// Opens a scope for an element and binds the declarations among its attributes.
    pub fn enter(&mut self, attributes: &[Attribute]) {
        self.scopes.push(FxHashMap::default());
        for attr in attributes {
            match (attr.prefix(), attr.local_name()) {
                (None, "xmlns") => self.bind("", attr.value()),
                (Some("xmlns"), prefix) => self.bind(prefix, attr.value()),
                _ => {}
            }
        }
    }

    /// Closes the innermost element scope.
    pub fn leave(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Resolves an element's qualified name against the open scopes.
    ///
    /// Unprefixed names take the default namespace; an undeclared prefix is
    /// a parse error.
    pub fn resolve_element(&self, qname: &str) -> Result<ExpandedName> {
        let (prefix, local) = split_qname(qname);
        match prefix {
            Some(prefix) => self
                .lookup(prefix)
                .map(|uri| ExpandedName::new(uri, local))
                .ok_or_else(|| Error::Parse(format!("undeclared namespace prefix '{}'", prefix))),
            None => Ok(match self.lookup("") {
                Some(uri) => ExpandedName::new(uri, local),
                None => ExpandedName::no_namespace(local),
            }),
        }
    }

    fn bind(&mut self, prefix: &str, uri: &str) {
        let uri = match self.uris.get(uri) {
            Some(interned) => interned.clone(),
            None => {
                let interned: Rc<str> = uri.into();
                self.uris.insert(uri.to_string(), interned.clone());
                interned
            }
        };
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(prefix.to_string(), uri);
        }
    }

    fn lookup(&self, prefix: &str) -> Option<Rc<str>> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(prefix).cloned())
            .filter(|uri| !uri.is_empty() || prefix.is_empty())
    }
}

/// Splits a qualified name into prefix and local name.
///
/// Returns (Some(prefix), local) for "prefix:local"
/// Returns (None, name) for "name" without prefix
pub fn split_qname(qname: &str) -> (Option<&str>, &str) {
    match qname.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, qname),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_qname() {
        assert_eq!(split_qname("svg:rect"), (Some("svg"), "rect"));
        assert_eq!(split_qname("rect"), (None, "rect"));
        assert_eq!(split_qname("ns:foo:bar"), (Some("ns"), "foo:bar"));
    }

    #[test]
    fn test_prefixed_element_resolves_in_scope() {
        let mut scopes = NamespaceScopes::new();
        scopes.enter(&[Attribute::new("xmlns:svg", "http://www.w3.org/2000/svg")]);

        let name = scopes.resolve_element("svg:rect").unwrap();
        assert_eq!(name.namespace(), Some("http://www.w3.org/2000/svg"));
        assert_eq!(name.local_name, "rect");

        scopes.leave();
        assert!(scopes.resolve_element("svg:rect").is_err());
    }

    #[test]
    fn test_default_namespace() {
        let mut scopes = NamespaceScopes::new();
        assert_eq!(scopes.resolve_element("div").unwrap().namespace(), None);

        scopes.enter(&[Attribute::new("xmlns", "http://www.w3.org/1999/xhtml")]);
        let name = scopes.resolve_element("div").unwrap();
        assert_eq!(name.namespace(), Some("http://www.w3.org/1999/xhtml"));

        scopes.enter(&[Attribute::new("xmlns", "")]);
        assert_eq!(scopes.resolve_element("div").unwrap().namespace(), None);
    }

    #[test]
    fn test_xml_prefix_always_bound() {
        let scopes = NamespaceScopes::new();
        let name = scopes.resolve_element("xml:lang").unwrap();
        assert_eq!(name.namespace(), Some(XML_NAMESPACE));
    }

    #[test]
    fn test_same_local_name_in_different_namespaces_differs() {
        let a = ExpandedName::new("http://example.com/a", "item");
        let b = ExpandedName::new("http://example.com/b", "item");
        assert_ne!(a, b);
        assert_eq!(a, ExpandedName::new("http://example.com/a", "item"));
        assert_eq!(a.to_string(), "{http://example.com/a}item");
    }
}
