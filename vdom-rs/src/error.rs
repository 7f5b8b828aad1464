//! Error types for markup-vdom.

use thiserror::Error;

/// Result type alias for markup-vdom operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building, diffing or applying trees.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed markup, or a root-count invariant violated while building trees.
    #[error("parse error: {0}")]
    Parse(String),

    /// A patch subtree could not be materialized into a live node.
    #[error("render error: {0}")]
    Render(String),

    /// Path resolution found no live node where the model expects one.
    #[error("apply error: {0}")]
    Apply(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// XML error from quick-xml.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
}

impl Error {
    /// Returns true for failures raised while turning markup into trees.
    pub fn is_parse(&self) -> bool {
        matches!(self, Error::Parse(_) | Error::Xml(_))
    }

    /// Returns true for patch materialization failures.
    pub fn is_render(&self) -> bool {
        matches!(self, Error::Render(_))
    }

    /// Returns true for structural desync between the model and the live tree.
    pub fn is_apply(&self) -> bool {
        matches!(self, Error::Apply(_))
    }
}
