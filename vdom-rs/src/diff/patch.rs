//! The closed set of edit operations produced by the differ.

use std::fmt;
use std::rc::Rc;

use crate::node::Node;
use crate::tree::Path;

/// One atomic edit against the live tree.
///
/// There is no move or reorder variant: a reordered child list always
/// shows up as `Replace` patches on the shifted positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch {
    /// Discard the subtree at `path` and put `node` in its place.
    Replace { path: Path, node: Rc<Node> },
    /// Add `node` as the last child of the node at `path`.
    Append { path: Path, node: Rc<Node> },
    /// Detach the node at `path`; `node` is the old subtree, for information.
    Remove { path: Path, node: Rc<Node> },
    /// Set an attribute that the old element did not have.
    AddAttribute {
        path: Path,
        key: String,
        value: String,
    },
    /// Change the value of an attribute both elements have.
    ModifyAttribute {
        path: Path,
        key: String,
        value: String,
    },
    /// Clear an attribute that the new element no longer has.
    DeleteAttribute { path: Path, key: String },
}

/// Fieldless mirror of [`Patch`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatchKind {
    Replace,
    Append,
    Remove,
    AddAttribute,
    ModifyAttribute,
    DeleteAttribute,
}

impl Patch {
    /// Returns the path this patch acts on.
    pub fn path(&self) -> &Path {
        match self {
            Patch::Replace { path, .. }
            | Patch::Append { path, .. }
            | Patch::Remove { path, .. }
            | Patch::AddAttribute { path, .. }
            | Patch::ModifyAttribute { path, .. }
            | Patch::DeleteAttribute { path, .. } => path,
        }
    }

    /// Returns the variant of this patch.
    pub fn kind(&self) -> PatchKind {
        match self {
            Patch::Replace { .. } => PatchKind::Replace,
            Patch::Append { .. } => PatchKind::Append,
            Patch::Remove { .. } => PatchKind::Remove,
            Patch::AddAttribute { .. } => PatchKind::AddAttribute,
            Patch::ModifyAttribute { .. } => PatchKind::ModifyAttribute,
            Patch::DeleteAttribute { .. } => PatchKind::DeleteAttribute,
        }
    }

    /// Returns the subtree carried by structural patches.
    pub fn node(&self) -> Option<&Rc<Node>> {
        match self {
            Patch::Replace { node, .. }
            | Patch::Append { node, .. }
            | Patch::Remove { node, .. } => Some(node),
            Patch::AddAttribute { .. }
            | Patch::ModifyAttribute { .. }
            | Patch::DeleteAttribute { .. } => None,
        }
    }

    /// Returns true for patches that add, remove or swap live nodes.
    pub fn is_structural(&self) -> bool {
        self.node().is_some()
    }
}

impl fmt::Display for PatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PatchKind::Replace => "Replace",
            PatchKind::Append => "Append",
            PatchKind::Remove => "Remove",
            PatchKind::AddAttribute => "AddAttribute",
            PatchKind::ModifyAttribute => "ModifyAttribute",
            PatchKind::DeleteAttribute => "DeleteAttribute",
        };
        f.write_str(name)
    }
}

impl fmt::Display for Patch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.path())?;
        match self {
            Patch::Replace { node, .. }
            | Patch::Append { node, .. }
            | Patch::Remove { node, .. } => write!(f, " {}", node.describe()),
            Patch::AddAttribute { key, value, .. } | Patch::ModifyAttribute { key, value, .. } => {
                write!(f, " {}={:?}", key, value)
            }
            Patch::DeleteAttribute { key, .. } => write!(f, " {}", key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let replace = Patch::Replace {
            path: Path::from(vec![0, 1, 0]),
            node: Node::text("Universe"),
        };
        assert_eq!(replace.to_string(), r#"Replace [0 1 0] text node "Universe""#);

        let add = Patch::AddAttribute {
            path: Path::from(vec![0, 0]),
            key: "class".into(),
            value: "hello".into(),
        };
        assert_eq!(add.to_string(), r#"AddAttribute [0 0] class="hello""#);

        let delete = Patch::DeleteAttribute {
            path: Path::from(vec![0, 0]),
            key: "class".into(),
        };
        assert_eq!(delete.to_string(), "DeleteAttribute [0 0] class");
    }

    #[test]
    fn test_accessors() {
        let append = Patch::Append {
            path: Path::root(),
            node: Node::element("li", Vec::new(), Vec::new()),
        };
        assert_eq!(append.kind(), PatchKind::Append);
        assert!(append.path().is_root());
        assert!(append.is_structural());

        let modify = Patch::ModifyAttribute {
            path: Path::from(vec![2]),
            key: "id".into(),
            value: "x".into(),
        };
        assert_eq!(modify.kind(), PatchKind::ModifyAttribute);
        assert!(modify.node().is_none());
    }
}
