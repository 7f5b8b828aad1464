//! In-memory live tree.
//!
//! [`Document`] is a mutable tree of reference-counted nodes with weak
//! parent links, implementing [`Host`]. It is what the CLI patches and what
//! the tests compare against fresh parses; any real rendering target plugs
//! in through the same trait.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::apply::Host;
use crate::diff::diff;
use crate::error::{Error, Result};
use crate::node::{Attribute, Element, ExpandedName, Node};
use crate::tree::Forest;
use crate::xml::{print_fragment, MarkupParser, ParseOptions, PrintOptions};

/// A reference-counted pointer to a live node.
pub type DomRef = Rc<RefCell<DomNode>>;

/// What a live node holds.
#[derive(Debug, Clone)]
pub enum DomContent {
    /// The fragment root; never printed itself.
    Container,
    /// An element with its attributes in insertion order.
    Element {
        qname: String,
        name: ExpandedName,
        attributes: Vec<Attribute>,
    },
    /// Character data.
    Text(String),
}

/// The inner data of a live node.
#[derive(Debug)]
pub struct DomNode {
    content: DomContent,
    children: Vec<DomRef>,
    /// Weak reference to the parent node.
    parent: Weak<RefCell<DomNode>>,
    /// Position among siblings; `None` while detached.
    child_pos: Option<usize>,
}

impl DomNode {
    fn new_ref(content: DomContent) -> DomRef {
        Rc::new(RefCell::new(DomNode {
            content,
            children: Vec::new(),
            parent: Weak::new(),
            child_pos: None,
        }))
    }

    /// Returns the content of this node.
    pub fn content(&self) -> &DomContent {
        &self.content
    }

    /// Returns the children as a slice.
    pub fn children(&self) -> &[DomRef] {
        &self.children
    }

    /// Returns the position among siblings, if attached.
    pub fn child_pos(&self) -> Option<usize> {
        self.child_pos
    }

    fn add_child_to_ref(parent_ref: &DomRef, child_ref: DomRef) {
        {
            let mut child = child_ref.borrow_mut();
            child.parent = Rc::downgrade(parent_ref);
            child.child_pos = Some(parent_ref.borrow().children.len());
        }
        parent_ref.borrow_mut().children.push(child_ref);
    }

    fn replace_child_to_ref(parent_ref: &DomRef, index: usize, child_ref: DomRef) {
        {
            let mut child = child_ref.borrow_mut();
            child.parent = Rc::downgrade(parent_ref);
            child.child_pos = Some(index);
        }
        let old = std::mem::replace(&mut parent_ref.borrow_mut().children[index], child_ref);
        let mut old = old.borrow_mut();
        old.parent = Weak::new();
        old.child_pos = None;
    }

    fn remove_child_to_ref(parent_ref: &DomRef, index: usize) {
        let mut parent = parent_ref.borrow_mut();
        let removed = parent.children.remove(index);
        {
            let mut removed = removed.borrow_mut();
            removed.parent = Weak::new();
            removed.child_pos = None;
        }
        // Update child positions for siblings after the removal point
        for i in index..parent.children.len() {
            parent.children[i].borrow_mut().child_pos = Some(i);
        }
    }
}

/// A live markup tree held in memory.
#[derive(Debug)]
pub struct Document {
    root: DomRef,
    parser: MarkupParser,
}

impl Default for Document {
    fn default() -> Self {
        Document::new(ParseOptions::default())
    }
}

impl Document {
    /// Creates an empty document; markup handed to it is parsed with `options`.
    pub fn new(options: ParseOptions) -> Self {
        Document {
            root: DomNode::new_ref(DomContent::Container),
            parser: MarkupParser::new(options),
        }
    }

    /// Returns the parse options used for `create_element_from_markup`.
    pub fn options(&self) -> &ParseOptions {
        self.parser.options()
    }

    /// Returns the fragment root container.
    pub fn root(&self) -> DomRef {
        self.root.clone()
    }

    /// Returns true if both handles point at the same live node.
    pub fn same_node(a: &DomRef, b: &DomRef) -> bool {
        Rc::ptr_eq(a, b)
    }

    /// Returns the qualified tag name of an element node.
    pub fn tag_of(&self, node: &DomRef) -> Option<String> {
        match &node.borrow().content {
            DomContent::Element { qname, .. } => Some(qname.clone()),
            _ => None,
        }
    }

    /// Returns the content of a text node.
    pub fn text_of(&self, node: &DomRef) -> Option<String> {
        match &node.borrow().content {
            DomContent::Text(text) => Some(text.clone()),
            _ => None,
        }
    }

    /// Freezes a live node and its subtree into a parsed node.
    ///
    /// Returns `None` for the container, which has no parsed counterpart.
    pub fn snapshot_node(&self, node: &DomRef) -> Option<Rc<Node>> {
        let node = node.borrow();
        match &node.content {
            DomContent::Container => None,
            DomContent::Text(text) => Some(Node::text(text.as_str())),
            DomContent::Element {
                qname,
                name,
                attributes,
            } => {
                let children = node
                    .children
                    .iter()
                    .filter_map(|child| self.snapshot_node(child))
                    .collect();
                Some(Rc::new(Node::Element(Element::new(
                    qname.as_str(),
                    name.clone(),
                    attributes.clone(),
                    children,
                ))))
            }
        }
    }

    /// Freezes the whole live tree into a forest.
    pub fn snapshot(&self) -> Forest {
        Forest::from_nodes(&self.root_nodes())
    }

    /// Returns true when the live tree is indistinguishable from `forest`
    /// under the differ.
    pub fn matches(&self, forest: &Forest) -> bool {
        diff(&self.snapshot(), forest).is_empty()
    }

    /// Prints a live node, or every root when given the container.
    pub fn to_markup(&self, node: &DomRef) -> Result<String> {
        self.print(node, &PrintOptions::default())
    }

    /// Prints a live node with explicit printer options.
    pub fn print(&self, node: &DomRef, options: &PrintOptions) -> Result<String> {
        let nodes = match self.snapshot_node(node) {
            Some(node) => vec![node],
            None => node
                .borrow()
                .children
                .iter()
                .filter_map(|child| self.snapshot_node(child))
                .collect(),
        };
        Ok(print_fragment(nodes.iter().map(|n| &**n), options)?)
    }

    fn root_nodes(&self) -> Vec<Rc<Node>> {
        self.root
            .borrow()
            .children
            .iter()
            .filter_map(|child| self.snapshot_node(child))
            .collect()
    }

    fn build(node: &Node) -> Option<DomRef> {
        match node {
            Node::Text(text) => Some(DomNode::new_ref(DomContent::Text(text.clone()))),
            Node::Element(element) => {
                let live = DomNode::new_ref(DomContent::Element {
                    qname: element.qname().to_string(),
                    name: element.name().clone(),
                    attributes: element.attributes().to_vec(),
                });
                for child in element.children() {
                    if let Some(child) = Document::build(child) {
                        DomNode::add_child_to_ref(&live, child);
                    }
                }
                Some(live)
            }
            Node::Comment(_) | Node::Doctype(_) => None,
        }
    }

    /// Collects the namespace declarations on `node` and its ancestors,
    /// outermost first so inner declarations win.
    fn declarations_in_scope(node: &DomRef) -> Vec<Attribute> {
        let mut chain = Vec::new();
        let mut current = Some(node.clone());
        while let Some(n) = current {
            current = n.borrow().parent.upgrade();
            chain.push(n);
        }
        chain
            .iter()
            .rev()
            .flat_map(|n| match &n.borrow().content {
                DomContent::Element { attributes, .. } => attributes
                    .iter()
                    .filter(|a| a.prefix() == Some("xmlns") || a.key() == "xmlns")
                    .cloned()
                    .collect(),
                _ => Vec::new(),
            })
            .collect()
    }

    fn position(parent: &DomRef, child: &DomRef) -> Result<usize> {
        let index = child.borrow().child_pos;
        let attached = child
            .borrow()
            .parent
            .upgrade()
            .is_some_and(|p| Rc::ptr_eq(&p, parent));
        match index {
            Some(index) if attached => Ok(index),
            _ => Err(Error::Apply(
                "node is not a child of the given parent".to_string(),
            )),
        }
    }
}

impl Host for Document {
    type Node = DomRef;

    fn child(&self, parent: &DomRef, index: usize) -> Option<DomRef> {
        parent.borrow().children.get(index).cloned()
    }

    fn child_count(&self, node: &DomRef) -> usize {
        node.borrow().children.len()
    }

    fn parent(&self, node: &DomRef) -> Option<DomRef> {
        node.borrow().parent.upgrade()
    }

    fn is_element(&self, node: &DomRef) -> bool {
        matches!(node.borrow().content, DomContent::Element { .. })
    }

    fn replace_child(&mut self, parent: &DomRef, old: &DomRef, new: DomRef) -> Result<()> {
        let index = Document::position(parent, old)?;
        DomNode::replace_child_to_ref(parent, index, new);
        Ok(())
    }

    fn append_child(&mut self, parent: &DomRef, child: DomRef) -> Result<()> {
        if matches!(parent.borrow().content, DomContent::Text(_)) {
            return Err(Error::Apply("cannot append to a text node".to_string()));
        }
        if let Some(old_parent) = self.parent(&child) {
            let index = Document::position(&old_parent, &child)?;
            DomNode::remove_child_to_ref(&old_parent, index);
        }
        DomNode::add_child_to_ref(parent, child);
        Ok(())
    }

    fn detach(&mut self, node: &DomRef) -> Result<()> {
        let parent = self
            .parent(node)
            .ok_or_else(|| Error::Apply("node is not attached".to_string()))?;
        let index = Document::position(&parent, node)?;
        DomNode::remove_child_to_ref(&parent, index);
        Ok(())
    }

    fn get_attribute(&self, node: &DomRef, key: &str) -> Option<String> {
        match &node.borrow().content {
            DomContent::Element { attributes, .. } => attributes
                .iter()
                .find(|a| a.key() == key)
                .map(|a| a.value().to_string()),
            _ => None,
        }
    }

    fn set_attribute(&mut self, node: &DomRef, key: &str, value: &str) -> Result<()> {
        match &mut node.borrow_mut().content {
            DomContent::Element { attributes, .. } => {
                let attr = Attribute::new(key, value);
                match attributes.iter_mut().find(|a| a.key() == key) {
                    Some(existing) => *existing = attr,
                    None => attributes.push(attr),
                }
                Ok(())
            }
            _ => Err(Error::Apply(format!(
                "cannot set attribute '{}' on a non-element node",
                key
            ))),
        }
    }

    fn remove_attribute(&mut self, node: &DomRef, key: &str) -> Result<()> {
        match &mut node.borrow_mut().content {
            DomContent::Element { attributes, .. } => {
                attributes.retain(|a| a.key() != key);
                Ok(())
            }
            _ => Err(Error::Apply(format!(
                "cannot remove attribute '{}' from a non-element node",
                key
            ))),
        }
    }

    fn create_text_node(&mut self, text: &str) -> DomRef {
        DomNode::new_ref(DomContent::Text(text.to_string()))
    }

    fn create_element_from_markup(&mut self, markup: &str, context: &DomRef) -> Result<DomRef> {
        let nodes = self
            .parser
            .parse_fragment_in(markup, &Document::declarations_in_scope(context))?;
        let mut elements = nodes.iter().filter(|n| n.as_element().is_some());
        match (elements.next(), elements.next()) {
            (Some(element), None) => Document::build(element)
                .ok_or_else(|| Error::Render("markup did not produce an element".to_string())),
            _ => Err(Error::Render(format!(
                "expected exactly one element in markup, found {}",
                nodes.iter().filter(|n| n.as_element().is_some()).count()
            ))),
        }
    }
}
