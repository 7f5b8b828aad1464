//! markup-vdom - positional virtual-DOM diffing for markup fragments
//!
//! This library turns successive renders of a markup fragment into the
//! minimal-effort list of patches that updates a live tree in place.
//!
//! # Overview
//!
//! Each render is parsed into an immutable, path-addressed [`Forest`]. The
//! [`diff`] function compares the previous and the next forest node by node,
//! purely by position, and emits [`Patch`]es. [`apply_all`] replays those
//! patches against any live tree that implements [`Host`]; [`Document`] is
//! the in-memory host shipped with the crate.
//!
//! # Example
//!
//! ```
//! use markup_vdom::{Document, ParseOptions, RenderLoop};
//!
//! let document = Document::default();
//! let root = document.root();
//! let mut renderer = RenderLoop::new(document, root, ParseOptions::default());
//!
//! renderer.render("<p>Hello <b>World</b></p>").unwrap();
//! let patches = renderer.render("<p>Hello <b>Universe</b></p>").unwrap();
//! assert_eq!(patches, 1);
//! ```

pub mod apply;
pub mod diff;
pub mod dom;
pub mod error;
pub mod node;
pub mod render;
pub mod tree;
pub mod xml;

// Re-export commonly used types
pub use apply::{apply, apply_all, materialize, traverse, Host};
pub use diff::{diff, diff_trees, Patch, PatchKind};
pub use dom::{DomContent, DomNode, DomRef, Document};
pub use error::{Error, Result};
pub use node::{Attribute, Element, ExpandedName, Identity, Node};
pub use render::RenderLoop;
pub use tree::{build_roots, BuildMode, Forest, Path, Tree};
pub use xml::{
    parse_fragment, print_fragment, print_to_string, MarkupParser, MarkupPrinter, ParseOptions,
    PrintOptions, Syntax, Whitespace,
};
