//! The live host capability set.

use crate::error::Result;

/// A mutable live tree that patches can be applied to.
///
/// Implementations wrap whatever actually renders the markup (a browser
/// DOM, a UI toolkit, or [`Document`](crate::dom::Document) in memory).
/// Child indices must enumerate exactly the element and text nodes the
/// host holds, in order: that is the same convention the tree model uses
/// for paths.
pub trait Host {
    /// Handle to a live node. Cloning a handle must not clone the node.
    type Node: Clone;

    /// Returns the child of `parent` at `index`, if there is one.
    fn child(&self, parent: &Self::Node, index: usize) -> Option<Self::Node>;

    /// Returns the number of children of `node`.
    fn child_count(&self, node: &Self::Node) -> usize;

    /// Returns the parent of `node`, if it is attached.
    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;

    /// Returns true when `node` is an element (the only kind with attributes).
    fn is_element(&self, node: &Self::Node) -> bool;

    /// Puts `new` in place of `old` among the children of `parent`.
    fn replace_child(
        &mut self,
        parent: &Self::Node,
        old: &Self::Node,
        new: Self::Node,
    ) -> Result<()>;

    /// Adds `child` as the last child of `parent`.
    fn append_child(&mut self, parent: &Self::Node, child: Self::Node) -> Result<()>;

    /// Detaches `node` from its parent.
    fn detach(&mut self, node: &Self::Node) -> Result<()>;

    /// Returns the value of an attribute by its fully-qualified key.
    fn get_attribute(&self, node: &Self::Node, key: &str) -> Option<String>;

    /// Sets an attribute, replacing any previous value.
    fn set_attribute(&mut self, node: &Self::Node, key: &str, value: &str) -> Result<()>;

    /// Removes an attribute.
    fn remove_attribute(&mut self, node: &Self::Node, key: &str) -> Result<()>;

    /// Creates a detached text node.
    fn create_text_node(&mut self, text: &str) -> Self::Node;

    /// Creates a detached element from markup holding exactly one element.
    ///
    /// The markup is parsed in the context of `context`, the live node the
    /// result is about to be attached under, so namespace prefixes declared
    /// on its ancestors resolve the way they would in place.
    fn create_element_from_markup(
        &mut self,
        markup: &str,
        context: &Self::Node,
    ) -> Result<Self::Node>;
}
