//! Render-cycle driver.
//!
//! A [`RenderLoop`] keeps the state one render needs from the previous one:
//! the host, the handle of the live root, and the snapshot that was last
//! applied successfully.

use tracing::{debug, info, warn};

use crate::apply::{apply_all, Host};
use crate::diff::diff;
use crate::error::Result;
use crate::tree::Forest;
use crate::xml::ParseOptions;

/// Drives successive renders of markup into a live host.
pub struct RenderLoop<H: Host> {
    host: H,
    root: H::Node,
    baseline: Forest,
    options: ParseOptions,
}

impl<H: Host> RenderLoop<H> {
    /// Creates a render loop over an empty live root.
    ///
    /// The first render diffs against the empty forest, so it mounts every
    /// root of the markup under `root`.
    pub fn new(host: H, root: H::Node, options: ParseOptions) -> Self {
        RenderLoop {
            host,
            root,
            baseline: Forest::default(),
            options,
        }
    }

    /// Renders `markup`, returning the number of patches applied.
    ///
    /// A parse failure leaves the live tree untouched. A render or apply
    /// failure may leave it partially patched; the baseline is kept either
    /// way, and [`rebuild`](Self::rebuild) is the way back to a known state.
    pub fn render(&mut self, markup: &str) -> Result<usize> {
        let next = Forest::parse(markup, &self.options)?;
        let patches = diff(&self.baseline, &next);
        debug!(count = patches.len(), "computed patches");

        if let Err(e) = apply_all(&mut self.host, &self.root, &patches) {
            warn!(error = %e, "render failed, live tree may be out of sync");
            return Err(e);
        }

        self.baseline = next;
        Ok(patches.len())
    }

    /// Discards the live tree and mounts `markup` from scratch.
    pub fn rebuild(&mut self, markup: &str) -> Result<usize> {
        let next = Forest::parse(markup, &self.options)?;
        while let Some(child) = self.host.child(&self.root, 0) {
            self.host.detach(&child)?;
        }
        self.baseline = Forest::default();
        info!(roots = next.len(), "rebuilding live tree");

        let patches = diff(&self.baseline, &next);
        apply_all(&mut self.host, &self.root, &patches)?;
        self.baseline = next;
        Ok(patches.len())
    }

    /// Returns the snapshot last applied successfully.
    pub fn baseline(&self) -> &Forest {
        &self.baseline
    }

    /// Returns the host.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Returns the live root handle.
    pub fn root(&self) -> &H::Node {
        &self.root
    }

    /// Consumes the loop, returning the host.
    pub fn into_host(self) -> H {
        self.host
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Document;

    fn render_loop() -> RenderLoop<Document> {
        let document = Document::default();
        let root = document.root();
        RenderLoop::new(document, root, ParseOptions::default())
    }

    #[test]
    fn test_first_render_mounts() {
        let mut renderer = render_loop();
        let count = renderer.render("<h1>Title</h1><p>Body</p>").unwrap();
        assert_eq!(count, 2);
        assert_eq!(renderer.baseline().len(), 2);
        assert_eq!(
            renderer.host().to_markup(renderer.root()).unwrap(),
            "<h1>Title</h1><p>Body</p>"
        );
    }

    #[test]
    fn test_successive_renders_converge() {
        let mut renderer = render_loop();
        let next = r#"<div class="x"><span>Hello</span><span>World</span></div>"#;
        renderer.render(r#"<div><span>Hello</span></div>"#).unwrap();
        renderer.render(next).unwrap();
        assert_eq!(renderer.render(next).unwrap(), 0);

        let expected = Forest::parse(next, &ParseOptions::default()).unwrap();
        assert!(renderer.host().matches(&expected));
    }

    #[test]
    fn test_parse_error_keeps_state() {
        let mut renderer = render_loop();
        renderer.render("<p>one</p>").unwrap();
        let err = renderer.render("<p>two").unwrap_err();
        assert!(err.is_parse());
        assert_eq!(renderer.host().to_markup(renderer.root()).unwrap(), "<p>one</p>");
        assert_eq!(renderer.render("<p>one</p>").unwrap(), 0);
    }

    #[test]
    fn test_rebuild_after_desync() {
        let mut renderer = render_loop();
        renderer.render("<ul><li>a</li><li>b</li></ul>").unwrap();

        // Someone else mutates the live tree behind the loop's back
        let mut document = renderer.into_host();
        let root = document.root();
        let ul = document.child(&root, 0).unwrap();
        while let Some(li) = document.child(&ul, 0) {
            document.detach(&li).unwrap();
        }
        let mut renderer = RenderLoop::new(document, root, ParseOptions::default());
        renderer.render("<ul><li>a</li><li>b</li></ul>").unwrap();

        let err = renderer.render("<ul><li>a</li><li>c</li></ul>").unwrap_err();
        assert!(err.is_apply());

        renderer.rebuild("<ul><li>a</li><li>c</li></ul>").unwrap();
        assert_eq!(
            renderer.host().to_markup(renderer.root()).unwrap(),
            "<ul><li>a</li><li>c</li></ul>"
        );
    }
}
