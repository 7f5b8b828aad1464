//! Patch application against a live tree.
//!
//! Patches must be applied strictly in the order the differ produced them:
//! an `Append` may target a node that an earlier `Replace` created, and
//! there is no rollback. If a patch fails, the live tree is left partially
//! patched and the whole batch must be treated as failed.

mod host;

pub use host::Host;

use tracing::{debug, trace, warn};

use crate::diff::{Patch, PatchKind};
use crate::error::{Error, Result};
use crate::node::Node;
use crate::tree::Path;
use crate::xml::{print_to_string, PrintOptions};

/// Resolves `path` to a live node, returning `(parent, target)`.
///
/// Each step selects a child of the current target from the host's
/// current children. The empty path resolves to `(None, root)`.
pub fn traverse<H: Host>(
    host: &H,
    root: &H::Node,
    path: &Path,
) -> Result<(Option<H::Node>, H::Node)> {
    let mut parent = None;
    let mut target = root.clone();
    for (step, &index) in path.indices().iter().enumerate() {
        let child = host.child(&target, index).ok_or_else(|| {
            Error::Apply(format!(
                "no live node at {}: step {} wants child {} of {}",
                path,
                step,
                index,
                host.child_count(&target)
            ))
        })?;
        trace!(%path, step, index, "traverse");
        parent = Some(target);
        target = child;
    }
    Ok((parent, target))
}

/// Creates a detached live node for a parsed node and its subtree.
///
/// Text goes through `create_text_node`; elements are printed to markup and
/// handed to `create_element_from_markup` together with `context`, the live
/// node they will be attached under.
pub fn materialize<H: Host>(host: &mut H, node: &Node, context: &H::Node) -> Result<H::Node> {
    match node {
        Node::Text(text) => Ok(host.create_text_node(text)),
        Node::Element(_) => {
            let markup = print_to_string(node, &PrintOptions::default()).map_err(|e| {
                Error::Render(format!("cannot serialize {}: {}", node.describe(), e))
            })?;
            host.create_element_from_markup(&markup, context)
                .map_err(|e| match e {
                    Error::Render(_) => e,
                    other => {
                        Error::Render(format!("cannot create {}: {}", node.describe(), other))
                    }
                })
        }
        Node::Comment(_) | Node::Doctype(_) => Err(Error::Render(format!(
            "unsupported node type: {}",
            node.describe()
        ))),
    }
}

/// Applies one patch to the live tree rooted at `root`.
///
/// Use [`apply_all`] for a batch produced by the differ. Trailing `Remove`
/// patches for one parent name positions as they were before any of them
/// ran, so applying them one by one shifts the later indices onto the
/// wrong siblings or past the end.
pub fn apply<H: Host>(host: &mut H, root: &H::Node, patch: &Patch) -> Result<()> {
    debug!(%patch, "applying patch");
    match patch {
        Patch::Replace { path, node } => {
            let (parent, old) = traverse(host, root, path)?;
            let parent = parent
                .ok_or_else(|| Error::Apply(format!("cannot replace the container at {}", path)))?;
            let replacement = materialize(host, node, &parent)?;
            host.replace_child(&parent, &old, replacement)
        }
        Patch::Append { path, node } => {
            // The empty path resolves to the root itself
            let (_, target) = traverse(host, root, path)?;
            let child = materialize(host, node, &target)?;
            host.append_child(&target, child)
        }
        Patch::Remove { path, .. } => {
            let (_, target) = traverse(host, root, path)?;
            remove(host, &target, path)
        }
        Patch::AddAttribute { path, key, value } => {
            let target = element_at(host, root, path)?;
            if let Some(existing) = host.get_attribute(&target, key) {
                warn!(%path, %key, %existing, "attribute already present, overwriting");
            }
            host.set_attribute(&target, key, value)
        }
        Patch::ModifyAttribute { path, key, value } => {
            let target = element_at(host, root, path)?;
            if host.get_attribute(&target, key).is_none() {
                warn!(%path, %key, "modified attribute missing, setting it");
            }
            host.set_attribute(&target, key, value)
        }
        Patch::DeleteAttribute { path, key } => {
            let target = element_at(host, root, path)?;
            if host.get_attribute(&target, key).is_none() {
                warn!(%path, %key, "deleted attribute already missing");
                return Ok(());
            }
            host.remove_attribute(&target, key)
        }
    }
}

/// Applies patches in order, stopping at the first failure.
///
/// A run of consecutive `Remove` patches names sibling positions as they
/// were before any of them was applied, so the whole run is resolved
/// before the first node is detached.
pub fn apply_all<H: Host>(host: &mut H, root: &H::Node, patches: &[Patch]) -> Result<()> {
    let mut rest = patches;
    while let Some(first) = rest.first() {
        let run = rest
            .iter()
            .take_while(|p| p.kind() == PatchKind::Remove)
            .count();
        if run < 2 {
            apply(host, root, first)?;
            rest = &rest[1..];
            continue;
        }

        let (removals, tail) = rest.split_at(run);
        let mut targets = Vec::with_capacity(run);
        for patch in removals {
            let (_, target) = traverse(host, root, patch.path())?;
            targets.push((patch, target));
        }
        for (patch, target) in targets {
            debug!(%patch, "applying patch");
            remove(host, &target, patch.path())?;
        }
        rest = tail;
    }
    Ok(())
}

fn remove<H: Host>(host: &mut H, target: &H::Node, path: &Path) -> Result<()> {
    if path.is_root() {
        return Err(Error::Apply("cannot remove the container".to_string()));
    }
    host.detach(target)
}

fn element_at<H: Host>(host: &H, root: &H::Node, path: &Path) -> Result<H::Node> {
    let (_, target) = traverse(host, root, path)?;
    if host.is_element(&target) {
        Ok(target)
    } else {
        Err(Error::Apply(format!(
            "live node at {} is not an element",
            path
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Document;
    use crate::xml::ParseOptions;

    fn mounted(src: &str) -> (Document, <Document as Host>::Node) {
        let mut document = Document::new(ParseOptions::default());
        let root = document.root();
        let forest = crate::tree::Forest::parse(src, document.options()).unwrap();
        apply_all(&mut document, &root, &crate::diff::diff(&Default::default(), &forest)).unwrap();
        (document, root)
    }

    #[test]
    fn test_traverse() {
        let (document, root) = mounted("<div><span>Hello</span><span>World</span></div>");

        let (parent, target) = traverse(&document, &root, &Path::root()).unwrap();
        assert!(parent.is_none());
        assert!(Document::same_node(&target, &root));

        let (parent, target) = traverse(&document, &root, &Path::from(vec![0, 1, 0])).unwrap();
        assert_eq!(document.text_of(&target).as_deref(), Some("World"));
        assert_eq!(document.tag_of(&parent.unwrap()).as_deref(), Some("span"));
    }

    #[test]
    fn test_traverse_desync_is_apply_error() {
        let (document, root) = mounted("<div><span/></div>");
        let err = traverse(&document, &root, &Path::from(vec![0, 3])).unwrap_err();
        assert!(err.is_apply());
        assert!(err.to_string().contains("[0 3]"));
    }

    #[test]
    fn test_materialize_rejects_artifacts() {
        let mut document = Document::new(ParseOptions::default());
        let root = document.root();
        let err = materialize(&mut document, &Node::Comment("x".into()), &root).unwrap_err();
        assert!(err.is_render());
    }

    #[test]
    fn test_materialize_in_namespace_context() {
        let src = concat!(
            r#"<svg:svg xmlns:svg="http://www.w3.org/2000/svg">"#,
            r#"<svg:rect width="1"/></svg:svg>"#
        );
        let (mut document, root) = mounted(src);
        let forest = crate::tree::Forest::parse(src, document.options()).unwrap();
        let rect = forest.trees()[0].children()[0].node().unwrap().clone();

        let svg = document.child(&root, 0).unwrap();
        let live = materialize(&mut document, &rect, &svg).unwrap();
        assert_eq!(
            document.to_markup(&live).unwrap(),
            r#"<svg:rect width="1" />"#
        );

        // Without the declaring ancestor the prefix does not resolve
        let err = materialize(&mut document, &rect, &root).unwrap_err();
        assert!(err.is_render());
    }

    #[test]
    fn test_attribute_patch_on_text_node() {
        let (mut document, root) = mounted("<p>text</p>");
        let patch = Patch::AddAttribute {
            path: Path::from(vec![0, 0]),
            key: "class".into(),
            value: "x".into(),
        };
        assert!(apply(&mut document, &root, &patch).unwrap_err().is_apply());
    }

    #[test]
    fn test_remove_run_resolves_before_detaching() {
        let src = "<ul><li>a</li><li>b</li><li>c</li><li>d</li></ul>";
        let (mut document, root) = mounted(src);
        let old = crate::tree::Forest::parse(src, document.options()).unwrap();
        let new = crate::tree::Forest::parse("<ul><li>a</li></ul>", document.options()).unwrap();
        let patches = crate::diff::diff(&old, &new);
        assert_eq!(patches.len(), 3);

        apply_all(&mut document, &root, &patches).unwrap();
        assert_eq!(document.to_markup(&root).unwrap(), "<ul><li>a</li></ul>");
    }

    #[test]
    fn test_remove_run_one_by_one_desyncs() {
        let src = "<ul><li>a</li><li>b</li><li>c</li><li>d</li></ul>";
        let (mut document, root) = mounted(src);
        let old = crate::tree::Forest::parse(src, document.options()).unwrap();
        let new = crate::tree::Forest::parse("<ul><li>a</li></ul>", document.options()).unwrap();
        let patches = crate::diff::diff(&old, &new);

        apply(&mut document, &root, &patches[0]).unwrap();
        apply(&mut document, &root, &patches[1]).unwrap();
        // [0 1] took "b", so [0 2] took "d" instead of "c"
        assert_eq!(
            document.to_markup(&root).unwrap(),
            "<ul><li>a</li><li>c</li></ul>"
        );
        assert!(apply(&mut document, &root, &patches[2]).unwrap_err().is_apply());
    }

    #[test]
    fn test_removing_container_fails() {
        let (mut document, root) = mounted("<a/>");
        let patch = Patch::Remove {
            path: Path::root(),
            node: Node::element("a", Vec::new(), Vec::new()),
        };
        assert!(apply(&mut document, &root, &patch).unwrap_err().is_apply());
    }
}
