//! Fits a rendered score to its container width.
//!
//! The viewer owns one renderer. Documents are reloaded only when their
//! content changes; width changes re-measure and re-zoom without reloading.

use super::renderer::{NotationRenderer, RenderError, RenderedScore};
use crate::rhythm::MarkupDocument;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use tracing::debug;

/// Smallest zoom the viewer will apply.
pub const ZOOM_MIN: f64 = 0.2;
/// Largest zoom the viewer will apply.
pub const ZOOM_MAX: f64 = 5.0;
/// Fraction of the container the score may fill.
const FIT_MARGIN: f64 = 0.995;
/// Zoom changes at or below this are not worth a second render pass.
const ZOOM_EPSILON: f64 = 0.004;

/// Zoom that makes a score of `intrinsic` width span `container`.
///
/// Always within [`ZOOM_MIN`, `ZOOM_MAX`].
///
/// # Examples
///
/// ```
/// use rhythmtui::notation::fit_zoom;
///
/// assert!((fit_zoom(82.0, 41.0) - 1.99).abs() < 1e-9);
/// assert_eq!(fit_zoom(1000.0, 1.0), 5.0);
/// ```
pub fn fit_zoom(container: f64, intrinsic: f64) -> f64 {
    let zoom = container / intrinsic * FIT_MARGIN;
    if zoom.is_nan() {
        return 1.0;
    }
    zoom.clamp(ZOOM_MIN, ZOOM_MAX)
}

fn content_hash(document: &MarkupDocument) -> u64 {
    let mut hasher = DefaultHasher::new();
    document.hash(&mut hasher);
    hasher.finish()
}

/// Displays one document, zoomed to fill its container's width.
#[derive(Debug)]
pub struct ScoreViewer<R: NotationRenderer> {
    renderer: R,
    /// Hash of the loaded document.
    loaded: Option<u64>,
    /// Last observed container width in columns.
    container_width: u16,
}

impl<R: NotationRenderer> ScoreViewer<R> {
    /// Creates a viewer with nothing loaded.
    pub fn new(renderer: R) -> Self {
        Self {
            renderer,
            loaded: None,
            container_width: 0,
        }
    }

    /// Shows a document.
    ///
    /// # Returns
    ///
    /// `true` if the document was loaded and rendered, `false` if it was
    /// identical to the one already shown.
    ///
    /// # Errors
    ///
    /// Propagates renderer failures. A failed load leaves the viewer ready
    /// to accept the next document.
    pub fn set_document(&mut self, document: &MarkupDocument) -> Result<bool, RenderError> {
        let hash = content_hash(document);
        if self.loaded == Some(hash) {
            return Ok(false);
        }

        self.loaded = None;
        self.renderer.load(document)?;
        self.loaded = Some(hash);
        debug!(hash, "Loaded notation document");

        self.render_and_fit()?;
        Ok(true)
    }

    /// Reacts to a container width change. Same-width calls do nothing.
    pub fn resize(&mut self, width: u16) -> Result<(), RenderError> {
        if width == self.container_width {
            return Ok(());
        }
        self.container_width = width;
        if self.loaded.is_some() {
            self.render_and_fit()?;
        }
        Ok(())
    }

    fn render_and_fit(&mut self) -> Result<(), RenderError> {
        self.renderer.render()?;

        let Some(intrinsic) = self.renderer.intrinsic_width() else {
            return Ok(());
        };
        if self.container_width == 0 || intrinsic <= 0.0 {
            return Ok(());
        }

        let zoom = fit_zoom(self.container_width as f64, intrinsic);
        if (self.renderer.zoom() - zoom).abs() > ZOOM_EPSILON {
            self.renderer.set_zoom(zoom);
            self.renderer.render()?;
        }
        Ok(())
    }

    /// Output of the last render, if anything is loaded.
    pub fn rendered(&self) -> Option<&RenderedScore> {
        self.loaded.and(self.renderer.rendered())
    }

    /// Current zoom.
    pub fn zoom(&self) -> f64 {
        self.renderer.zoom()
    }

    /// Last observed container width.
    pub fn container_width(&self) -> u16 {
        self.container_width
    }

    /// Drops the document and rendered output.
    pub fn dispose(&mut self) {
        self.renderer.clear();
        self.loaded = None;
        self.container_width = 0;
    }
}

impl<R: NotationRenderer> Drop for ScoreViewer<R> {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notation::renderer::StaffRenderer;
    use crate::rhythm::{compile, RhythmPattern};
    use std::cell::Cell;
    use std::rc::Rc;

    /// Wraps a staff renderer and counts passes.
    struct CountingRenderer {
        inner: StaffRenderer,
        loads: Rc<Cell<u32>>,
        renders: Rc<Cell<u32>>,
    }

    impl NotationRenderer for CountingRenderer {
        fn load(&mut self, document: &MarkupDocument) -> Result<(), RenderError> {
            self.loads.set(self.loads.get() + 1);
            self.inner.load(document)
        }

        fn render(&mut self) -> Result<&RenderedScore, RenderError> {
            self.renders.set(self.renders.get() + 1);
            self.inner.render()
        }

        fn zoom(&self) -> f64 {
            self.inner.zoom()
        }

        fn set_zoom(&mut self, zoom: f64) {
            self.inner.set_zoom(zoom);
        }

        fn intrinsic_width(&self) -> Option<f64> {
            self.inner.intrinsic_width()
        }

        fn rendered(&self) -> Option<&RenderedScore> {
            self.inner.rendered()
        }

        fn clear(&mut self) {
            self.inner.clear();
        }
    }

    fn counting_viewer() -> (ScoreViewer<CountingRenderer>, Rc<Cell<u32>>, Rc<Cell<u32>>) {
        let loads = Rc::new(Cell::new(0));
        let renders = Rc::new(Cell::new(0));
        let viewer = ScoreViewer::new(CountingRenderer {
            inner: StaffRenderer::new(),
            loads: Rc::clone(&loads),
            renders: Rc::clone(&renders),
        });
        (viewer, loads, renders)
    }

    fn doc(pattern: &[f64]) -> MarkupDocument {
        compile(&RhythmPattern::new(pattern.to_vec()), None)
    }

    #[test]
    fn test_fit_zoom_clamped() {
        for container in [0.0, 1.0, 40.0, 80.0, 10_000.0, -5.0] {
            for intrinsic in [0.0, 0.5, 41.0, 1_000.0, f64::INFINITY] {
                let zoom = fit_zoom(container, intrinsic);
                assert!((ZOOM_MIN..=ZOOM_MAX).contains(&zoom), "{container}/{intrinsic} -> {zoom}");
            }
        }
    }

    #[test]
    fn test_fit_spans_container() {
        let mut viewer = ScoreViewer::new(StaffRenderer::new());
        viewer.resize(100).unwrap();
        viewer.set_document(&doc(&[2.0, 2.0])).unwrap();

        let width = viewer.rendered().unwrap().width;
        assert!(width <= 100);
        assert!(width >= 98);
    }

    #[test]
    fn test_same_document_not_reloaded() {
        let (mut viewer, loads, renders) = counting_viewer();
        viewer.resize(41).unwrap();
        assert!(viewer.set_document(&doc(&[1.0, 1.0, 1.0, 1.0])).unwrap());
        let passes = renders.get();

        assert!(!viewer.set_document(&doc(&[1.0, 1.0, 1.0, 1.0])).unwrap());
        assert_eq!(loads.get(), 1);
        assert_eq!(renders.get(), passes);

        assert!(viewer.set_document(&doc(&[4.0])).unwrap());
        assert_eq!(loads.get(), 2);
    }

    #[test]
    fn test_resize_refits_without_reload() {
        let (mut viewer, loads, renders) = counting_viewer();
        viewer.resize(41).unwrap();
        viewer.set_document(&doc(&[2.0, 2.0])).unwrap();
        let before = renders.get();

        viewer.resize(82).unwrap();
        assert_eq!(loads.get(), 1);
        assert!(renders.get() > before);
        assert!((viewer.zoom() - 1.99).abs() < 1e-9);

        // Same width: nothing to do
        let after = renders.get();
        viewer.resize(82).unwrap();
        assert_eq!(renders.get(), after);
    }

    #[test]
    fn test_small_zoom_change_skips_second_pass() {
        let (mut viewer, _, renders) = counting_viewer();
        viewer.set_document(&doc(&[2.0, 2.0])).unwrap();
        assert_eq!(renders.get(), 1);

        // 41 * 0.995 / 41 differs from 1.0 by more than the epsilon
        viewer.resize(41).unwrap();
        assert_eq!(renders.get(), 3);

        // Both widths clamp to the maximum zoom
        viewer.resize(1000).unwrap();
        assert_eq!(renders.get(), 5);
        assert_eq!(viewer.zoom(), ZOOM_MAX);
        viewer.resize(1001).unwrap();
        assert_eq!(renders.get(), 6);
    }

    #[test]
    fn test_failed_load_can_recover() {
        let mut viewer = ScoreViewer::new(StaffRenderer::new());
        let broken = MarkupDocument::new("not a score");
        assert!(viewer.set_document(&broken).is_err());
        assert!(viewer.rendered().is_none());

        assert!(viewer.set_document(&doc(&[4.0])).unwrap());
        assert!(viewer.rendered().is_some());
    }

    #[test]
    fn test_dispose_clears_output() {
        let mut viewer = ScoreViewer::new(StaffRenderer::new());
        viewer.resize(60).unwrap();
        viewer.set_document(&doc(&[4.0])).unwrap();
        viewer.dispose();
        assert!(viewer.rendered().is_none());
        assert_eq!(viewer.container_width(), 0);
    }
}
