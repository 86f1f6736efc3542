//! Notation display for rhythm patterns.
//!
//! A [`NotationRenderer`] turns a MusicXML document into rows of text; the
//! [`ScoreViewer`] keeps one document fitted to its container's width.

mod renderer;
mod viewer;

pub use renderer::{NotationRenderer, RenderError, RenderedScore, StaffRenderer, HEADER_COLS};
pub use viewer::{fit_zoom, ScoreViewer, ZOOM_MAX, ZOOM_MIN};
