//! Positional tree differ.
//!
//! Nodes are paired purely by position. Only trailing surplus children are
//! appended or removed; an insertion or removal anywhere else shifts every
//! later sibling and shows up as a cascade of `Replace` patches.

use crate::tree::{Forest, Tree};

use super::Patch;

/// Computes the patches turning the `old` snapshot into the `new` one.
pub fn diff(old: &Forest, new: &Forest) -> Vec<Patch> {
    diff_trees(old.container(), new.container())
}

/// Computes the patches turning one tree into another.
///
/// Patches come out in a fixed order per node pair: replacement, attribute
/// changes, trailing appends or removals, then the shared children in index
/// order.
pub fn diff_trees(old: &Tree, new: &Tree) -> Vec<Patch> {
    let mut patches = Vec::new();
    diff_into(old, new, &mut patches);
    patches
}

fn diff_into(old: &Tree, new: &Tree, patches: &mut Vec<Patch>) {
    if old.identity() != new.identity() {
        match (new.node(), old.node()) {
            (Some(node), _) => patches.push(Patch::Replace {
                path: new.path().clone(),
                node: node.clone(),
            }),
            (None, Some(node)) => patches.push(Patch::Remove {
                path: old.path().clone(),
                node: node.clone(),
            }),
            (None, None) => {}
        }
        return;
    }

    diff_attributes(old, new, patches);

    let (old_children, new_children) = (old.children(), new.children());
    let shared = old_children.len().min(new_children.len());

    for child in &new_children[shared..] {
        if let Some(node) = child.node() {
            patches.push(Patch::Append {
                path: new.path().clone(),
                node: node.clone(),
            });
        }
    }
    for child in &old_children[shared..] {
        if let Some(node) = child.node() {
            patches.push(Patch::Remove {
                path: child.path().clone(),
                node: node.clone(),
            });
        }
    }

    for (old_child, new_child) in old_children.iter().zip(new_children) {
        diff_into(old_child, new_child, patches);
    }
}

/// Adds and modifications follow the new element's attribute order, then
/// deletions follow the old element's.
fn diff_attributes(old: &Tree, new: &Tree, patches: &mut Vec<Patch>) {
    let (Some(old_element), Some(new_element)) = (
        old.node().and_then(|n| n.as_element()),
        new.node().and_then(|n| n.as_element()),
    ) else {
        return;
    };

    let old_attrs = old_element.attribute_map();
    let new_attrs = new_element.attribute_map();

    for attr in new_element.attributes() {
        let key = attr.key();
        match old_attrs.get(&key) {
            None => patches.push(Patch::AddAttribute {
                path: new.path().clone(),
                key,
                value: attr.value().to_string(),
            }),
            Some(old_value) if *old_value != attr.value() => {
                patches.push(Patch::ModifyAttribute {
                    path: new.path().clone(),
                    key,
                    value: attr.value().to_string(),
                })
            }
            Some(_) => {}
        }
    }

    for attr in old_element.attributes() {
        let key = attr.key();
        if !new_attrs.contains_key(&key) {
            patches.push(Patch::DeleteAttribute {
                path: old.path().clone(),
                key,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::PatchKind;
    use crate::xml::ParseOptions;

    fn forest(src: &str) -> Forest {
        Forest::parse(src, &ParseOptions::default()).unwrap()
    }

    fn kinds(patches: &[Patch]) -> Vec<PatchKind> {
        patches.iter().map(Patch::kind).collect()
    }

    #[test]
    fn test_identical_forests() {
        let src = r#"<ul class="x"><li>a</li><li>b</li></ul><p/>"#;
        assert!(diff(&forest(src), &forest(src)).is_empty());
        assert!(diff(&Forest::default(), &Forest::default()).is_empty());
    }

    #[test]
    fn test_attribute_bucket_order() {
        let old = forest(r#"<a gone="1" kept="same" changed="old"/>"#);
        let new = forest(r#"<a changed="new" kept="same" added="2"/>"#);
        let patches = diff(&old, &new);

        assert_eq!(
            patches,
            vec![
                Patch::ModifyAttribute {
                    path: vec![0].into(),
                    key: "changed".into(),
                    value: "new".into(),
                },
                Patch::AddAttribute {
                    path: vec![0].into(),
                    key: "added".into(),
                    value: "2".into(),
                },
                Patch::DeleteAttribute {
                    path: vec![0].into(),
                    key: "gone".into(),
                },
            ]
        );
    }

    #[test]
    fn test_namespaced_attribute_keys() {
        let old = forest(r##"<use xmlns:xlink="http://www.w3.org/1999/xlink" xlink:href="#a"/>"##);
        let new = forest(r##"<use xmlns:xlink="http://www.w3.org/1999/xlink" href="#a"/>"##);
        let patches = diff(&old, &new);
        assert_eq!(
            kinds(&patches),
            [PatchKind::AddAttribute, PatchKind::DeleteAttribute]
        );
        assert!(matches!(&patches[1], Patch::DeleteAttribute { key, .. } if key == "xlink:href"));
    }

    #[test]
    fn test_forest_roots_are_appended_and_removed() {
        let patches = diff(&Forest::default(), &forest("<a/><b/>"));
        assert_eq!(kinds(&patches), [PatchKind::Append, PatchKind::Append]);
        assert!(patches.iter().all(|p| p.path().is_root()));

        let patches = diff(&forest("<a/><b/><c/>"), &forest("<a/>"));
        assert_eq!(kinds(&patches), [PatchKind::Remove, PatchKind::Remove]);
        assert_eq!(*patches[0].path(), [1]);
        assert_eq!(*patches[1].path(), [2]);
    }

    #[test]
    fn test_replace_does_not_descend() {
        let old = forest(r#"<div><span class="a">x</span></div>"#);
        let new = forest(r#"<section><span class="b">y</span></section>"#);
        let patches = diff(&old, &new);
        assert_eq!(kinds(&patches), [PatchKind::Replace]);
        assert_eq!(*patches[0].path(), [0]);
    }

    #[test]
    fn test_front_insertion_cascades_to_replacements() {
        let old = forest("<ul><li>b</li><li>c</li></ul>");
        let new = forest("<ul><p>a</p><li>b</li><li>c</li></ul>");
        let patches = diff(&old, &new);
        // trailing append first, then the shifted pairs
        assert_eq!(
            kinds(&patches),
            [PatchKind::Append, PatchKind::Replace, PatchKind::Replace]
        );
        assert_eq!(*patches[0].path(), [0]);
        assert_eq!(patches[0].node().unwrap().describe(), "element node <li>");
        assert_eq!(*patches[1].path(), [0, 0]);
        assert_eq!(*patches[2].path(), [0, 1, 0]);
        assert_eq!(patches[2].node().unwrap().as_text(), Some("b"));
    }

    #[test]
    fn test_element_versus_text_is_different() {
        let old = forest("<p><b>x</b></p>");
        let new = forest("<p>x</p>");
        let patches = diff(&old, &new);
        assert_eq!(kinds(&patches), [PatchKind::Replace]);
        assert_eq!(patches[0].node().unwrap().as_text(), Some("x"));
    }

    #[test]
    fn test_namespace_is_part_of_identity() {
        let old = forest(r#"<a xmlns="urn:one"/>"#);
        let new = forest(r#"<a xmlns="urn:two"/>"#);
        let patches = diff(&old, &new);
        assert_eq!(kinds(&patches), [PatchKind::Replace]);
    }

    #[test]
    fn test_container_against_tree_removes() {
        let tree = forest("<a/>");
        let patches = diff_trees(&tree.trees()[0], tree.container());
        assert_eq!(kinds(&patches), [PatchKind::Remove]);
    }
}
