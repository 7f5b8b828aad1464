//! The immutable, path-addressed tree model.
//!
//! A [`Tree`] wraps one parsed [`Node`] together with its [`Path`] and the
//! trees of its element and text children. A [`Forest`] is one complete
//! render snapshot: the root trees of one parsed fragment, held under a
//! synthetic container tree so the differ can treat forest roots exactly
//! like element children.

mod path;

pub use path::Path;

use std::rc::Rc;

use crate::error::{Error, Result};
use crate::node::{Identity, Node};
use crate::xml::{MarkupParser, ParseOptions};

/// How many root trees a construction accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildMode {
    /// Exactly one element root.
    Single,
    /// Zero or more element roots.
    Forest,
}

/// One parsed node, its path, and the trees of its addressable children.
#[derive(Debug, Clone)]
pub struct Tree {
    /// `None` only for the synthetic container of a forest.
    node: Option<Rc<Node>>,
    path: Path,
    children: Vec<Tree>,
}

impl Tree {
    /// Wraps a parsed node and its subtree at the given path.
    ///
    /// Element and text children get sequential indices in document order;
    /// comments and doctype are skipped without consuming an index.
    pub fn build(node: Rc<Node>, path: Path) -> Tree {
        let children = node
            .children()
            .iter()
            .filter(|child| child.is_addressable())
            .enumerate()
            .map(|(i, child)| Tree::build(child.clone(), path.child(i)))
            .collect();
        Tree {
            node: Some(node),
            path,
            children,
        }
    }

    /// Creates the synthetic container holding root trees.
    pub fn container(children: Vec<Tree>) -> Tree {
        Tree {
            node: None,
            path: Path::root(),
            children,
        }
    }

    /// Parses markup that must contain exactly one element root.
    pub fn parse(src: &str, options: &ParseOptions) -> Result<Tree> {
        let nodes = MarkupParser::new(options.clone()).parse_fragment(src)?;
        build_roots(&nodes, BuildMode::Single)?
            .pop()
            .ok_or_else(|| Error::Parse("expected exactly one root element".to_string()))
    }

    /// Returns the wrapped node, or `None` for a forest container.
    pub fn node(&self) -> Option<&Rc<Node>> {
        self.node.as_ref()
    }

    /// Returns this tree's path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the child trees in order.
    pub fn children(&self) -> &[Tree] {
        &self.children
    }

    /// Returns the node identity, or `None` for a forest container.
    pub fn identity(&self) -> Option<Identity> {
        self.node.as_ref().map(|node| node.identity())
    }

    /// Returns true for the synthetic forest container.
    pub fn is_container(&self) -> bool {
        self.node.is_none()
    }

    /// Short human-readable description used in logs.
    pub fn describe(&self) -> String {
        match &self.node {
            Some(node) => node.describe(),
            None => "container".to_string(),
        }
    }

    /// Iterates over this tree and all descendants in document order.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }
}

/// Pre-order iterator over a tree.
pub struct Descendants<'a> {
    stack: Vec<&'a Tree>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Tree;

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.stack.pop()?;
        self.stack.extend(tree.children.iter().rev());
        Some(tree)
    }
}

/// Builds root trees from top-level parsed nodes.
///
/// Only element roots become trees and only they consume a top-level index,
/// so stray text or comments at the fragment root never shift the paths of
/// the elements after them.
pub fn build_roots(nodes: &[Rc<Node>], mode: BuildMode) -> Result<Vec<Tree>> {
    let trees = index_roots(nodes);
    if mode == BuildMode::Single && trees.len() != 1 {
        return Err(Error::Parse(format!(
            "expected exactly one root element, found {}",
            trees.len()
        )));
    }
    Ok(trees)
}

fn index_roots(nodes: &[Rc<Node>]) -> Vec<Tree> {
    nodes
        .iter()
        .filter(|node| node.as_element().is_some())
        .enumerate()
        .map(|(i, node)| Tree::build(node.clone(), Path::root().child(i)))
        .collect()
}

/// The root trees of one parsed fragment: one render snapshot.
#[derive(Debug, Clone)]
pub struct Forest {
    container: Tree,
}

impl Default for Forest {
    fn default() -> Self {
        Forest::from_trees(Vec::new())
    }
}

impl Forest {
    /// Wraps already-built root trees.
    pub fn from_trees(trees: Vec<Tree>) -> Self {
        Forest {
            container: Tree::container(trees),
        }
    }

    /// Builds a forest from top-level parsed nodes.
    pub fn from_nodes(nodes: &[Rc<Node>]) -> Self {
        Forest::from_trees(index_roots(nodes))
    }

    /// Parses fragment markup into a forest.
    pub fn parse(src: &str, options: &ParseOptions) -> Result<Self> {
        let nodes = MarkupParser::new(options.clone()).parse_fragment(src)?;
        Ok(Forest::from_nodes(&nodes))
    }

    /// Parses fragment markup from UTF-8 bytes into a forest.
    pub fn parse_bytes(src: &[u8], options: &ParseOptions) -> Result<Self> {
        let nodes = MarkupParser::new(options.clone()).parse_bytes(src)?;
        Ok(Forest::from_nodes(&nodes))
    }

    /// Returns the synthetic container whose children are the root trees.
    pub fn container(&self) -> &Tree {
        &self.container
    }

    /// Returns the root trees in order.
    pub fn trees(&self) -> &[Tree] {
        self.container.children()
    }

    /// Returns the root tree at `index`.
    pub fn get(&self, index: usize) -> Option<&Tree> {
        self.trees().get(index)
    }

    /// Returns the number of root trees.
    pub fn len(&self) -> usize {
        self.trees().len()
    }

    /// Returns true when the fragment has no element roots.
    pub fn is_empty(&self) -> bool {
        self.trees().is_empty()
    }

    /// Iterates over the root trees.
    pub fn iter(&self) -> std::slice::Iter<'_, Tree> {
        self.trees().iter()
    }
}

impl<'a> IntoIterator for &'a Forest {
    type Item = &'a Tree;
    type IntoIter = std::slice::Iter<'a, Tree>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Attribute;

    fn forest(src: &str) -> Forest {
        Forest::parse(src, &ParseOptions::default()).unwrap()
    }

    #[test]
    fn test_new_tree() {
        let trees = forest("<div><span>Hello</span><span>World</span></div>");
        assert_eq!(trees.len(), 1);

        let tree = &trees.trees()[0];
        assert_eq!(tree.describe(), "element node <div>");
        assert_eq!(tree.children().len(), 2);
        assert_eq!(*tree.path(), [0]);

        let hello = &tree.children()[0];
        assert_eq!(hello.describe(), "element node <span>");
        assert_eq!(*hello.path(), [0, 0]);
        let hello_text = &hello.children()[0];
        assert_eq!(hello_text.node().unwrap().as_text(), Some("Hello"));
        assert_eq!(*hello_text.path(), [0, 0, 0]);

        let world = &tree.children()[1];
        assert_eq!(*world.path(), [0, 1]);
        assert_eq!(world.children()[0].node().unwrap().as_text(), Some("World"));
    }

    #[test]
    fn test_paths_extend_parent_paths() {
        let trees = forest("<a><b><c>x</c><d/></b></a><e><f/></e>");
        for root in &trees {
            for tree in root.descendants() {
                for child in tree.children() {
                    assert_eq!(child.path().parent().as_ref(), Some(tree.path()));
                }
            }
        }
        assert_eq!(*trees.trees()[1].children()[0].path(), [1, 0]);
    }

    #[test]
    fn test_artifacts_do_not_consume_indices() {
        let trees = forest("stray <!-- c --><a><!-- x --><b/>text</a>more<c/>");
        assert_eq!(trees.len(), 2);
        assert_eq!(*trees.trees()[1].path(), [1]);

        let a = &trees.trees()[0];
        assert_eq!(a.children().len(), 2);
        assert_eq!(*a.children()[0].path(), [0, 0]);
        assert_eq!(a.children()[1].node().unwrap().as_text(), Some("text"));
        assert_eq!(*a.children()[1].path(), [0, 1]);
    }

    #[test]
    fn test_single_mode() {
        let options = ParseOptions::default();
        let tree = Tree::parse("<!-- lead --><main><p/></main>", &options).unwrap();
        assert_eq!(*tree.path(), [0]);
        assert!(Tree::parse("<a/><b/>", &options).unwrap_err().is_parse());
        assert!(Tree::parse("only text", &options).unwrap_err().is_parse());
    }

    #[test]
    fn test_forest_mode_accepts_empty() {
        assert!(forest("").is_empty());
        assert!(forest("just text").is_empty());
        assert!(Forest::parse("<a></b>", &ParseOptions::default()).is_err());
    }

    #[test]
    fn test_build_from_constructed_nodes() {
        let node = Node::element(
            "ul",
            vec![Attribute::new("class", "list")],
            vec![
                Node::element("li", Vec::new(), vec![Node::text("one")]),
                Rc::new(Node::Comment("skip".into())),
                Node::element("li", Vec::new(), vec![Node::text("two")]),
            ],
        );
        let tree = Tree::build(node, Path::from(vec![3]));
        assert_eq!(tree.children().len(), 2);
        assert_eq!(*tree.children()[1].path(), [3, 1]);
        assert_eq!(tree.descendants().count(), 5);
    }

    #[test]
    fn test_container() {
        let trees = forest("<a/><b/>");
        assert!(trees.container().is_container());
        assert!(trees.container().path().is_root());
        assert_eq!(trees.container().identity(), None);
        assert_eq!(trees.container().children().len(), 2);
    }
}
